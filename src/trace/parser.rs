//! 轨迹解析器
//!
//! 在流式元素读取器之上做结构化解析：按元素名分发出 [`TraceEvent`]，
//! 处理两代数据包语法，跟踪格式版本与最大仿真时间。
//!
//! 解析是前向一次性的：流耗尽后进入终态，重新解析需要新建解析器。
//! 畸形/未知元素产出 `Invalid` 记录后继续（skip-and-continue），只有
//! 文件无法打开才算失败。

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use super::event::{Rgb, TraceEvent};
use super::reader::{ElementKind, ElementReader, RawElement};
use crate::anim::NodeId;
use crate::engine::AnimTime;

/// 低于此版本不支持显式节点颜色。
pub const COLOR_VERSION_MIN: f64 = 3.102;

/// 默认节点颜色（红）。轨迹里显式写出的红色等同于"无颜色"。
const DEFAULT_RED: Rgb = (255, 0, 0);

/// 第一行中的版本标记。
const VERSION_FIELD: &str = "ver=\"netanim-";

/// 轨迹装载失败。
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace file is invalid: {path}")]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 轨迹解析器。
pub struct TraceParser {
    reader: ElementReader<BufReader<File>>,
    version: f64,
    rx_count: u64,
    parsed_rx_count: u64,
    max_simulation_time: AnimTime,
    complete: bool,
}

impl TraceParser {
    /// 打开轨迹文件并完成两遍预扫描（版本、接收事件计数）。
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let invalid = |source| TraceError::InvalidFile {
            path: path.to_path_buf(),
            source,
        };
        let version = scan_version(path).map_err(invalid)?;
        let rx_count = scan_rx_count(path, version).map_err(invalid)?;
        let file = File::open(path).map_err(invalid)?;
        debug!(version, rx_count, path = %path.display(), "轨迹预扫描完成");
        Ok(Self {
            reader: ElementReader::new(BufReader::new(file)),
            version,
            rx_count,
            parsed_rx_count: 0,
            max_simulation_time: AnimTime::ZERO,
            complete: false,
        })
    }

    /// 预扫描得到的格式版本（`anim` 元素可在正式解析时覆盖它）。
    pub fn version(&self) -> f64 {
        self.version
    }

    /// 预扫描得到的接收事件总数（进度条量程）。
    pub fn rx_count(&self) -> u64 {
        self.rx_count
    }

    /// 目前已产出的接收事件数。
    pub fn parsed_rx_count(&self) -> u64 {
        self.parsed_rx_count
    }

    /// 迄今观察到的最大仿真时间（lastBitTx/lastBitRx 的最大值）。
    pub fn max_simulation_time(&self) -> AnimTime {
        self.max_simulation_time
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// 解析下一个元素；流耗尽后恒返回 `None`。
    pub fn parse_next(&mut self) -> Option<TraceEvent> {
        if self.complete {
            return None;
        }
        let element = match self.reader.next_element() {
            Ok(Some(element)) => element,
            // 读错误与流结束一样进入终态：不再产出记录
            Ok(None) | Err(_) => {
                self.complete = true;
                return None;
            }
        };
        if element.kind == ElementKind::Close {
            return Some(TraceEvent::Invalid);
        }
        let event = match element.name.as_str() {
            "anim" => self.parse_anim(&element),
            "topology" => TraceEvent::Topology {
                max_x: element.attr_f64("maxX"),
                max_y: element.attr_f64("maxY"),
            },
            "node" => self.parse_node(&element),
            "nodeupdate" => self.parse_node_update(&element),
            "link" => TraceEvent::Link {
                from: NodeId(element.attr_u32("fromId")),
                to: NodeId(element.attr_u32("toId")),
                from_description: element.attr("fd").unwrap_or("").to_string(),
                to_description: element.attr("td").unwrap_or("").to_string(),
                description: element.attr("ld").unwrap_or("").to_string(),
            },
            "nonp2plinkproperties" => TraceEvent::NonP2pLink {
                id: NodeId(element.attr_u32("id")),
                ipv4_address: element.attr("ipv4Address").unwrap_or("").to_string(),
            },
            "linkupdate" => TraceEvent::LinkUpdate {
                t: AnimTime(element.attr_f64("t")),
                from: NodeId(element.attr_u32("fromId")),
                to: NodeId(element.attr_u32("toId")),
                description: element.attr("ld").unwrap_or("").to_string(),
            },
            "p" => self.parse_flat_packet(&element, false),
            "wp" => self.parse_flat_packet(&element, true),
            "packet" => self.parse_nested_packet(&element, false),
            "wpacket" => self.parse_nested_packet(&element, true),
            other => {
                trace!(element = other, "未识别的元素，跳过");
                TraceEvent::Invalid
            }
        };
        Some(event)
    }

    fn parse_anim(&mut self, element: &RawElement) -> TraceEvent {
        if let Some(ver) = element.attr("ver")
            && let Some(rest) = ver.strip_prefix("netanim-")
            && let Ok(version) = rest.trim().parse::<f64>()
        {
            self.version = version;
        }
        TraceEvent::Anim {
            version: self.version,
        }
    }

    /// 节点颜色的版本门控：显式红色视为"无颜色"；其余三元组仅在
    /// 版本 ≥ 3.102 时生效，更早版本回退到默认红。
    fn gate_color(&self, element: &RawElement) -> (Option<Rgb>, bool) {
        let has_color_attr = element.has_attr("r");
        if !has_color_attr {
            return (None, false);
        }
        let rgb = (
            element.attr_u32("r") as u8,
            element.attr_u32("g") as u8,
            element.attr_u32("b") as u8,
        );
        if rgb == DEFAULT_RED {
            return (None, true);
        }
        if self.version < COLOR_VERSION_MIN {
            return (Some(DEFAULT_RED), true);
        }
        (Some(rgb), true)
    }

    fn parse_node(&self, element: &RawElement) -> TraceEvent {
        let (color, has_color_attr) = self.gate_color(element);
        TraceEvent::Node {
            id: NodeId(element.attr_u32("id")),
            x: element.attr_f64("locX"),
            y: element.attr_f64("locY"),
            description: element.attr("descr").unwrap_or("").to_string(),
            color,
            has_color_attr,
        }
    }

    fn parse_node_update(&self, element: &RawElement) -> TraceEvent {
        let (color, has_color_attr) = self.gate_color(element);
        TraceEvent::NodeUpdate {
            t: AnimTime(element.attr_f64("t")),
            id: NodeId(element.attr_u32("id")),
            description: element.attr("descr").unwrap_or("").to_string(),
            color,
            visible: element.attr_u32("visible") != 0,
            has_color_attr,
        }
    }

    fn observe_time(&mut self, t: AnimTime) {
        self.max_simulation_time = self.max_simulation_time.max(t);
    }

    /// 单元素扁平语法：`<p fId=.. fbTx=.. lbTx=.. tId=.. fbRx=.. lbRx=.. meta-info=../>`
    fn parse_flat_packet(&mut self, element: &RawElement, wireless: bool) -> TraceEvent {
        let last_bit_tx = AnimTime(element.attr_f64("lbTx"));
        self.observe_time(last_bit_tx);
        let first_bit_rx = element.attr("fbRx").map(|_| AnimTime(element.attr_f64("fbRx")));
        let last_bit_rx = element.attr("lbRx").map(|_| AnimTime(element.attr_f64("lbRx")));
        if let Some(t) = last_bit_rx {
            self.observe_time(t);
        }
        self.parsed_rx_count += 1;
        TraceEvent::PacketRx {
            from: NodeId(element.attr_u32("fId")),
            to: NodeId(element.attr_u32("tId")),
            first_bit_tx: AnimTime(element.attr_f64("fbTx")),
            last_bit_tx,
            first_bit_rx,
            last_bit_rx,
            wireless,
            meta: element
                .attr("meta-info")
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        }
    }

    /// 旧式嵌套语法：`<packet fromId=..><rx toId=../><meta info=../></packet>`
    fn parse_nested_packet(&mut self, parent: &RawElement, wireless: bool) -> TraceEvent {
        let from = NodeId(parent.attr_u32("fromId"));
        let first_bit_tx = AnimTime(parent.attr_f64("fbTx"));
        let last_bit_tx = AnimTime(parent.attr_f64("lbTx"));
        self.observe_time(last_bit_tx);

        let mut to = NodeId(0);
        let mut first_bit_rx = None;
        let mut last_bit_rx = None;
        let mut meta = None;
        loop {
            let child = match self.reader.next_element() {
                Ok(Some(child)) => child,
                // 元素中途截断：进入终态，保留已有字段
                Ok(None) | Err(_) => {
                    self.complete = true;
                    break;
                }
            };
            match (child.kind, child.name.as_str()) {
                (ElementKind::Close, name) if name == parent.name => break,
                (ElementKind::Close, _) => {}
                (_, "rx") => {
                    to = NodeId(child.attr_u32("toId"));
                    first_bit_rx = Some(AnimTime(child.attr_f64("fbRx")));
                    let lb = AnimTime(child.attr_f64("lbRx"));
                    self.observe_time(lb);
                    last_bit_rx = Some(lb);
                }
                (_, "meta") => {
                    meta = child
                        .attr("info")
                        .filter(|m| !m.is_empty())
                        .map(str::to_string);
                }
                _ => break,
            }
        }
        self.parsed_rx_count += 1;
        TraceEvent::PacketRx {
            from,
            to,
            first_bit_tx,
            last_bit_tx,
            first_bit_rx,
            last_bit_rx,
            wireless,
            meta,
        }
    }
}

/// 从首行提取 `ver="netanim-<float>"` 标记的版本号。
fn scan_version(path: &Path) -> std::io::Result<f64> {
    let mut first_line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut first_line)?;
    let Some(start) = first_line.find(VERSION_FIELD) else {
        return Ok(0.0);
    };
    let rest = &first_line[start + VERSION_FIELD.len()..];
    let end = rest.find('"').unwrap_or(rest.len());
    Ok(rest[..end].parse().unwrap_or(0.0))
}

/// 全文统计接收事件数：按版本选择属性名做子串计数。
fn scan_rx_count(path: &Path, version: f64) -> std::io::Result<u64> {
    let mut content = String::new();
    File::open(path)?.read_to_string(&mut content)?;
    let needle = if version >= COLOR_VERSION_MIN {
        " tId"
    } else {
        " toId="
    };
    Ok(content.matches(needle).count() as u64)
}
