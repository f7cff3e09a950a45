//! 数据包实体、元数据与注册表
//!
//! 数据包在解析到接收事件时创建，动画 id 按创建顺序单调分配。
//! 创建后除选中标记与元数据解析缓存外不可变。

use std::collections::BTreeMap;
use std::collections::btree_map;

use tracing::trace;

use super::id::{AnimPacketId, NodeId};
use crate::engine::AnimTime;

/// 元数据子记录之间的分隔标记。
const META_DELIMITER: &str = "ns3::";

/// 无线 MAC 头中与过滤相关的地址角色。
#[derive(Debug, Clone, Default)]
pub struct WifiMacInfo {
    pub da: Option<String>,
    pub ra: Option<String>,
    pub sa: Option<String>,
}

/// IPv4 头中的源/目的地址。
#[derive(Debug, Clone, Default)]
pub struct Ipv4Info {
    pub src: Option<String>,
    pub dst: Option<String>,
}

/// 从原始元数据串解析出的结构化信息。
#[derive(Debug, Clone, Default)]
pub struct PacketMeta {
    pub protocols: Vec<String>,
    pub wifi: Option<WifiMacInfo>,
    pub ipv4: Option<Ipv4Info>,
    /// 标签展示用的短形式
    pub short: String,
}

impl PacketMeta {
    /// 解析 `ns3::Xxx (..) ns3::Yyy (..)` 形式的元数据串。
    /// 无法识别的子记录只贡献协议名。
    pub fn parse(raw: &str) -> PacketMeta {
        let mut meta = PacketMeta::default();
        for chunk in raw.split(META_DELIMITER) {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            let name_end = chunk
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(chunk.len());
            let name = &chunk[..name_end];
            if name.is_empty() {
                continue;
            }
            let body = chunk
                .find('(')
                .map(|open| {
                    let rest = &chunk[open + 1..];
                    &rest[..rest.rfind(')').unwrap_or(rest.len())]
                })
                .unwrap_or("");
            meta.protocols
                .push(name.strip_suffix("Header").unwrap_or(name).to_string());
            match name {
                "WifiMacHeader" => {
                    meta.wifi = Some(WifiMacInfo {
                        da: keyed_field(body, "DA="),
                        ra: keyed_field(body, "RA="),
                        sa: keyed_field(body, "SA="),
                    });
                }
                "Ipv4Header" => {
                    meta.ipv4 = Some(parse_ipv4_endpoints(body));
                }
                _ => {}
            }
        }
        meta.short = meta.protocols.join(" ");
        meta
    }
}

/// 取 `KEY=value` 形式字段，值到逗号/空白/右括号为止。
fn keyed_field(body: &str, key: &str) -> Option<String> {
    let start = body.find(key)? + key.len();
    let rest = &body[start..];
    let end = rest
        .find(|c: char| c == ',' || c == ')' || c.is_whitespace())
        .unwrap_or(rest.len());
    let value = &rest[..end];
    (!value.is_empty()).then(|| value.to_string())
}

/// IPv4 头体内 `src > dst` 端点对。
fn parse_ipv4_endpoints(body: &str) -> Ipv4Info {
    let mut info = Ipv4Info::default();
    if let Some(gt) = body.find(" > ") {
        info.src = body[..gt].split_whitespace().last().map(str::to_string);
        info.dst = body[gt + 3..].split_whitespace().next().map(str::to_string);
    }
    info
}

/// 一个动画数据包。
#[derive(Debug, Clone)]
pub struct AnimPacket {
    anim_id: AnimPacketId,
    from: NodeId,
    to: NodeId,
    first_bit_tx: AnimTime,
    last_bit_tx: AnimTime,
    first_bit_rx: Option<AnimTime>,
    last_bit_rx: Option<AnimTime>,
    wireless: bool,
    raw_meta: Option<String>,
    meta: Option<PacketMeta>,
    selected: bool,
}

impl AnimPacket {
    pub fn anim_id(&self) -> AnimPacketId {
        self.anim_id
    }

    pub fn from_id(&self) -> NodeId {
        self.from
    }

    pub fn to_id(&self) -> NodeId {
        self.to
    }

    pub fn first_bit_tx(&self) -> AnimTime {
        self.first_bit_tx
    }

    pub fn last_bit_tx(&self) -> AnimTime {
        self.last_bit_tx
    }

    pub fn first_bit_rx(&self) -> Option<AnimTime> {
        self.first_bit_rx
    }

    pub fn last_bit_rx(&self) -> Option<AnimTime> {
        self.last_bit_rx
    }

    pub fn is_wireless(&self) -> bool {
        self.wireless
    }

    pub fn raw_meta(&self) -> Option<&str> {
        self.raw_meta.as_deref()
    }

    pub fn meta(&self) -> Option<&PacketMeta> {
        self.meta.as_ref()
    }

    pub fn short_meta(&self) -> &str {
        self.meta.as_ref().map(|m| m.short.as_str()).unwrap_or("")
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }
}

/// 数据包注册表，按动画 id（创建顺序）排序。
#[derive(Debug, Default)]
pub struct PacketRegistry {
    packets: BTreeMap<AnimPacketId, AnimPacket>,
    next_id: u64,
    meta_seen: bool,
}

impl PacketRegistry {
    /// 创建一个数据包。`from == to` 的包无意义，拒绝创建。
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        from: NodeId,
        to: NodeId,
        first_bit_tx: AnimTime,
        last_bit_tx: AnimTime,
        first_bit_rx: Option<AnimTime>,
        last_bit_rx: Option<AnimTime>,
        wireless: bool,
        meta: Option<&str>,
    ) -> Option<AnimPacketId> {
        if from == to {
            trace!(from = from.0, "from == to 的数据包被拒绝");
            return None;
        }
        let anim_id = AnimPacketId(self.next_id);
        self.next_id += 1;
        let parsed = meta.map(PacketMeta::parse);
        if parsed.is_some() {
            self.meta_seen = true;
        }
        self.packets.insert(
            anim_id,
            AnimPacket {
                anim_id,
                from,
                to,
                first_bit_tx,
                last_bit_tx,
                first_bit_rx,
                last_bit_rx,
                wireless,
                raw_meta: meta.map(str::to_string),
                meta: parsed,
                selected: true,
            },
        );
        Some(anim_id)
    }

    pub fn get(&self, id: AnimPacketId) -> Option<&AnimPacket> {
        self.packets.get(&id)
    }

    pub fn get_mut(&mut self, id: AnimPacketId) -> Option<&mut AnimPacket> {
        self.packets.get_mut(&id)
    }

    /// 从 `start`（含）开始按动画 id 顺序迭代。
    pub fn iter_from(
        &self,
        start: AnimPacketId,
    ) -> btree_map::Range<'_, AnimPacketId, AnimPacket> {
        self.packets.range(start..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimPacket> {
        self.packets.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AnimPacket> {
        self.packets.values_mut()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// 是否解析到过任何元数据（show-meta 开关的前置条件）。
    pub fn meta_seen(&self) -> bool {
        self.meta_seen
    }

    pub fn reset(&mut self) {
        self.packets.clear();
        self.next_id = 0;
        self.meta_seen = false;
    }
}
