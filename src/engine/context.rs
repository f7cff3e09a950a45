//! 引擎上下文
//!
//! 一次装载的轨迹对应一个显式构造的 [`EngineContext`] 实例：注册表、
//! 移动轨迹、更新管理器、时间线与过滤配置都由它按值持有，经由句柄
//! 传递（不存在全局单例）。宿主层（被排除在核心之外的 GUI）通过它
//! 装载轨迹、驱动 tick、下发过滤意图并读取渲染状态。

use std::path::Path;

use tracing::{debug, info};

use super::filter::{FilterConfig, PacketFilter, select_all};
use super::geometry::{Point, resolve_packet};
use super::route::{RoutePathTracker, RouteStatsProvider};
use super::time::AnimTime;
use super::timeline::PacketTimeline;
use crate::anim::{
    LinkRegistry, LinkUpdateManager, MobilityTracker, NodeRegistry, NodeShape, NodeUpdate,
    NodeUpdateManager, PacketRegistry,
};
use crate::trace::{Rgb, TraceError, TraceEvent, TraceParser};
use crate::viz::{LinkRender, NodeRender, RenderFrame};

/// 场景默认边长。
pub const DEFAULT_SCENE_SIZE: f64 = 1024.0;

/// 节点默认尺寸。
pub const DEFAULT_NODE_SIZE: f64 = 10.0;

/// 默认步进（秒）。
pub const DEFAULT_UPDATE_RATE: f64 = 0.1;

/// 每解析多少个元素让出一次控制权（协作式让出点，非线程）。
pub const PARSE_YIELD_BUDGET: usize = 2048;

/// 路径标记节点的渲染色。
const ROUTE_MARK_COLOR: Rgb = (0, 0, 255);

/// 重置种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// 整体重置：清空所有注册表（装载新轨迹前）
    Hard,
    /// 软重置：时间相关游标与激活集合回退，已解析实体保留
    Soft,
}

/// 一次装载完成后的汇总。
#[derive(Debug, Clone)]
pub struct ParseSummary {
    pub version: f64,
    pub node_count: usize,
    pub link_count: usize,
    pub packet_count: usize,
    pub rx_count: u64,
    pub max_simulation_time: f64,
}

/// 可恢复解析的单步结果。
#[derive(Debug)]
pub enum ParseStep {
    /// 预算用尽，尚未结束；宿主可随时再次调用 `step`
    InProgress { parsed_rx: u64, total_rx: u64 },
    Complete(ParseSummary),
}

/// 一次进行中的装载。没有中断/取消接口：放弃装载即丢弃会话
/// （上下文可能停留在半装载状态，装载新轨迹前需 Hard 重置）。
pub struct ParseSession {
    parser: TraceParser,
}

impl ParseSession {
    /// 最多解析 `budget` 个元素后让出。
    pub fn step(&mut self, ctx: &mut EngineContext, budget: usize) -> ParseStep {
        for _ in 0..budget.max(1) {
            match self.parser.parse_next() {
                Some(event) => ctx.dispatch(event),
                None => {
                    ctx.finish_load(&self.parser);
                    return ParseStep::Complete(ctx.parse_summary());
                }
            }
        }
        ParseStep::InProgress {
            parsed_rx: self.parser.parsed_rx_count(),
            total_rx: self.parser.rx_count(),
        }
    }
}

/// 引擎上下文：一份轨迹的全部回放状态。
pub struct EngineContext {
    version: f64,
    width: f64,
    height: f64,
    node_size: f64,
    nodes: NodeRegistry,
    links: LinkRegistry,
    packets: PacketRegistry,
    mobility: MobilityTracker,
    node_updates: NodeUpdateManager,
    link_updates: LinkUpdateManager,
    timeline: PacketTimeline,
    filters: FilterConfig,
    route_tracker: RoutePathTracker,
    route_provider: Option<Box<dyn RouteStatsProvider>>,
    rx_count: u64,
    max_simulation_time: AnimTime,
    /// 最近解析到的数据包时间戳；节点事件的移动采样用它打时间戳
    last_packet_time: AnimTime,
    wireless_detected: bool,
    packets_shown: u32,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            version: 0.0,
            width: DEFAULT_SCENE_SIZE,
            height: DEFAULT_SCENE_SIZE,
            node_size: DEFAULT_NODE_SIZE,
            nodes: NodeRegistry::default(),
            links: LinkRegistry::default(),
            packets: PacketRegistry::default(),
            mobility: MobilityTracker::default(),
            node_updates: NodeUpdateManager::default(),
            link_updates: LinkUpdateManager::default(),
            timeline: PacketTimeline::new(DEFAULT_UPDATE_RATE),
            filters: FilterConfig::default(),
            route_tracker: RoutePathTracker::default(),
            route_provider: None,
            rx_count: 0,
            max_simulation_time: AnimTime::ZERO,
            last_packet_time: AnimTime::ZERO,
            wireless_detected: false,
            packets_shown: 0,
        }
    }

    /// 打开轨迹并返回可恢复的装载会话。调度节奏由宿主决定。
    pub fn begin_load(&mut self, path: &Path) -> Result<ParseSession, TraceError> {
        self.reset(ResetKind::Hard);
        let parser = TraceParser::open(path)?;
        self.version = parser.version();
        self.rx_count = parser.rx_count();
        Ok(ParseSession { parser })
    }

    /// 一口气装载整份轨迹；每个让出点回调一次进度 `(已解析, 总数)`。
    #[tracing::instrument(skip(self, progress), fields(path = %path.display()))]
    pub fn load_trace(
        &mut self,
        path: &Path,
        mut progress: impl FnMut(u64, u64),
    ) -> Result<ParseSummary, TraceError> {
        let mut session = self.begin_load(path)?;
        loop {
            match session.step(self, PARSE_YIELD_BUDGET) {
                ParseStep::InProgress {
                    parsed_rx,
                    total_rx,
                } => progress(parsed_rx, total_rx),
                ParseStep::Complete(summary) => {
                    info!(
                        nodes = summary.node_count,
                        packets = summary.packet_count,
                        max_time = summary.max_simulation_time,
                        "✅ 轨迹装载完成"
                    );
                    return Ok(summary);
                }
            }
        }
    }

    /// 应用一条轨迹事件到各注册表。
    pub fn dispatch(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::Anim { version } => {
                self.version = version;
            }
            TraceEvent::Topology { max_x, max_y } => {
                let size = max_x.max(max_y);
                self.width = size;
                self.height = size;
            }
            TraceEvent::Node {
                id,
                x,
                y,
                description,
                color,
                has_color_attr,
            } => {
                let (node, _existed) =
                    self.nodes
                        .add(id, NodeShape::Circle, self.node_size, &description, color);
                let pos = Point::new(x, y);
                node.set_position(pos);
                self.mobility.add_sample(self.last_packet_time, id, pos);
                self.node_updates.add(
                    AnimTime::ZERO,
                    id,
                    NodeUpdate {
                        color,
                        has_color_attr,
                        description,
                        visible: true,
                    },
                );
            }
            TraceEvent::NodeUpdate {
                t,
                id,
                description,
                color,
                visible,
                has_color_attr,
            } => {
                // 引用未知节点的更新直接丢弃
                if self.nodes.contains(id) {
                    self.node_updates.add(
                        t,
                        id,
                        NodeUpdate {
                            color,
                            has_color_attr,
                            description,
                            visible,
                        },
                    );
                }
            }
            TraceEvent::Link {
                from,
                to,
                from_description,
                to_description,
                description,
            } => {
                let added = self.links.add(
                    from,
                    to,
                    true,
                    &from_description,
                    &to_description,
                    &description,
                    &mut self.nodes,
                );
                if added {
                    self.link_updates.add(AnimTime::ZERO, from, to, &description);
                }
            }
            TraceEvent::NonP2pLink { id, ipv4_address } => {
                // 共享介质按 (id, id) 自关联登记
                self.links
                    .add(id, id, false, &ipv4_address, "", "", &mut self.nodes);
            }
            TraceEvent::LinkUpdate {
                t,
                from,
                to,
                description,
            } => {
                if self.links.find(from, to).is_some() {
                    self.link_updates.add(t, from, to, &description);
                }
            }
            TraceEvent::PacketRx {
                from,
                to,
                first_bit_tx,
                last_bit_tx,
                first_bit_rx,
                last_bit_rx,
                wireless,
                meta,
            } => {
                self.last_packet_time = last_bit_rx.unwrap_or(last_bit_tx);
                if wireless {
                    self.wireless_detected = true;
                }
                self.max_simulation_time = self
                    .max_simulation_time
                    .max(last_bit_rx.unwrap_or(last_bit_tx))
                    .max(last_bit_tx);
                self.packets.add(
                    from,
                    to,
                    first_bit_tx,
                    last_bit_tx,
                    first_bit_rx,
                    last_bit_rx,
                    wireless,
                    meta.as_deref(),
                );
            }
            TraceEvent::Invalid => {}
        }
    }

    fn finish_load(&mut self, parser: &TraceParser) {
        self.version = parser.version();
        self.rx_count = parser.rx_count();
        self.max_simulation_time = self.max_simulation_time.max(parser.max_simulation_time());
        self.timeline.soft_reset();
        debug!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            packets = self.packets.len(),
            "装载收尾"
        );
    }

    fn parse_summary(&self) -> ParseSummary {
        ParseSummary {
            version: self.version,
            node_count: self.nodes.len(),
            link_count: self.links.len(),
            packet_count: self.packets.len(),
            rx_count: self.rx_count,
            max_simulation_time: self.max_simulation_time.secs(),
        }
    }

    /// 推进到 `t` 并产出一帧渲染状态。
    ///
    /// 同一 tick 内的顺序保证：位置/更新刷新 → 时间线激活 → 清除 →
    /// 路由路径 → 渲染解析。
    #[tracing::instrument(skip(self), fields(t = t.secs()))]
    pub fn tick(&mut self, t: AnimTime) -> RenderFrame {
        // 节点位置刷新
        let nodes = &mut self.nodes;
        self.mobility.update_locations(t, |id, pos| {
            let Some(node) = nodes.get_mut(id) else {
                return false;
            };
            if node.position() == pos {
                return false;
            }
            node.set_position(pos);
            true
        });

        // 带时间戳的节点/链路更新
        self.node_updates.apply(t, &mut self.nodes);
        self.link_updates.apply(t, &mut self.links);

        // 时间线：激活 + 清除
        self.timeline.advance(&self.packets, t);

        // 路由路径（开启时抑制数据包绘制）
        let route_paths = match (&self.route_provider, self.route_tracker.is_enabled()) {
            (Some(provider), true) => {
                self.route_tracker
                    .update(t, provider.as_ref(), &mut self.nodes)
            }
            _ => Vec::new(),
        };

        let mut packets = Vec::new();
        let mut wireless_circles = Vec::new();
        if !self.filters.show_route_path {
            for id in self.timeline.active_ids() {
                let Some(packet) = self.packets.get(id) else {
                    continue;
                };
                if let Some(render) =
                    resolve_packet(packet, t, &self.nodes, &self.filters, &mut wireless_circles)
                {
                    packets.push(render);
                }
            }
        }
        self.packets_shown = packets.len() as u32;

        let nodes = self
            .nodes
            .iter()
            .map(|(id, node)| {
                let marked = node.route_path_marked();
                NodeRender {
                    id: id.0,
                    x: node.position().x,
                    y: node.position().y,
                    color: if marked {
                        ROUTE_MARK_COLOR
                    } else {
                        node.color().unwrap_or(crate::anim::DEFAULT_NODE_COLOR)
                    },
                    visible: node.visible(),
                    label: node.display_label(),
                    size: node.size() * if marked { 2.0 } else { 1.0 },
                }
            })
            .collect();

        // 链路线段每 tick 由端点中心重推（节点可能移动过）
        let links = if self.filters.show_route_path {
            Vec::new()
        } else {
            self.links
                .iter()
                .map(|link| LinkRender {
                    from: link.from_id().0,
                    to: link.to_id().0,
                    line: super::geometry::LineSeg::new(
                        self.nodes.center(link.from_id()),
                        self.nodes.center(link.to_id()),
                    ),
                    label: link.current_description().to_string(),
                })
                .collect()
        };

        RenderFrame {
            t: t.secs(),
            nodes,
            links,
            packets,
            wireless_circles,
            route_paths,
            packets_shown: self.packets_shown,
        }
    }

    /// 重置。Hard 丢弃全部实体；Soft 只回退时间相关状态。
    pub fn reset(&mut self, kind: ResetKind) {
        self.timeline.soft_reset();
        self.packets_shown = 0;
        match kind {
            ResetKind::Hard => {
                self.nodes.reset();
                self.links.reset();
                self.packets.reset();
                self.mobility.reset();
                self.node_updates.reset();
                self.link_updates.reset();
                self.version = 0.0;
                self.width = DEFAULT_SCENE_SIZE;
                self.height = DEFAULT_SCENE_SIZE;
                self.rx_count = 0;
                self.max_simulation_time = AnimTime::ZERO;
                self.last_packet_time = AnimTime::ZERO;
                self.wireless_detected = false;
            }
            ResetKind::Soft => {
                self.mobility.reset_cursors();
                self.node_updates.reset_cursors();
                self.link_updates.reset_cursors();
            }
        }
    }

    // ---- 宿主查询/配置接口 ----

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// 当前待动画 + 上一帧实际绘制的包数。
    pub fn active_packet_count(&self) -> usize {
        self.timeline.active_count() + self.packets_shown as usize
    }

    pub fn max_simulation_time(&self) -> AnimTime {
        self.max_simulation_time
    }

    pub fn version(&self) -> f64 {
        self.version
    }

    pub fn scene_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn wireless_detected(&self) -> bool {
        self.wireless_detected
    }

    pub fn meta_seen(&self) -> bool {
        self.packets.meta_seen()
    }

    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterConfig) {
        self.filters = filters;
    }

    /// 元数据开关：轨迹里从未出现元数据时拒绝开启。
    pub fn set_show_meta(&mut self, show: bool) -> bool {
        if show && !self.packets.meta_seen() {
            return false;
        }
        self.filters.show_meta = show;
        show
    }

    /// 统计过滤器：`Some` 重算选中标记并返回选中数，`None` 取消过滤。
    pub fn set_packet_filter(&mut self, filter: Option<&PacketFilter>) -> usize {
        match filter {
            Some(filter) => filter.apply(&mut self.packets),
            None => {
                select_all(&mut self.packets);
                self.packets.len()
            }
        }
    }

    pub fn update_rate(&self) -> f64 {
        self.timeline.update_rate()
    }

    pub fn set_update_rate(&mut self, update_rate: f64) {
        self.timeline.set_update_rate(update_rate);
    }

    /// 统一调整节点尺寸。
    pub fn set_node_size(&mut self, size: f64) {
        self.node_size = size;
        for (_, node) in self.nodes.iter_mut() {
            node.set_size(size);
        }
    }

    pub fn set_route_stats_provider(&mut self, provider: Box<dyn RouteStatsProvider>) {
        self.route_provider = Some(provider);
    }

    /// 路由路径跟踪开关；关闭时清除标记并恢复正常渲染。
    pub fn set_route_path_tracking(&mut self, enabled: bool) {
        self.filters.show_route_path = enabled;
        self.route_tracker.set_enabled(enabled, &mut self.nodes);
    }

    pub fn is_route_path_tracking(&self) -> bool {
        self.route_tracker.is_enabled()
    }

    // ---- 测试/诊断入口 ----

    pub fn timeline(&self) -> &PacketTimeline {
        &self.timeline
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut NodeRegistry {
        &mut self.nodes
    }

    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    pub fn packets(&self) -> &PacketRegistry {
        &self.packets
    }

    pub fn packets_mut(&mut self) -> &mut PacketRegistry {
        &mut self.packets
    }

    pub fn mobility_mut(&mut self) -> &mut MobilityTracker {
        &mut self.mobility
    }
}
