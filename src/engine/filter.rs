//! 过滤配置
//!
//! 渲染开关与统计过滤器。统计过滤器重算每个数据包的选中标记，
//! 未被选中的包在可见性裁决中直接淘汰。

use std::collections::BTreeSet;

use super::time::AnimTime;
use crate::anim::{AnimPacket, NodeId, PacketRegistry};

/// 渲染开关集合。
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// 全局数据包渲染开关
    pub show_packets: bool,
    /// 元数据标签开关
    pub show_meta: bool,
    /// 无线同心圆开关
    pub show_wireless_circles: bool,
    /// 单播匹配模式（只影响无线包）
    pub unicast_match: bool,
    /// 路由路径跟踪（开启时抑制数据包绘制）
    pub show_route_path: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            show_packets: true,
            show_meta: true,
            show_wireless_circles: false,
            unicast_match: false,
            show_route_path: false,
        }
    }
}

/// 统计过滤器：全部条件取交集；空条件匹配一切。
#[derive(Debug, Clone, Default)]
pub struct PacketFilter {
    pub from_ids: Option<BTreeSet<NodeId>>,
    pub to_ids: Option<BTreeSet<NodeId>>,
    /// 协议名子串（对已解析的元数据协议列表逐个匹配）
    pub protocol: Option<String>,
    pub tx_after: Option<AnimTime>,
    pub tx_before: Option<AnimTime>,
}

impl PacketFilter {
    pub fn matches(&self, packet: &AnimPacket) -> bool {
        if let Some(from_ids) = &self.from_ids
            && !from_ids.contains(&packet.from_id())
        {
            return false;
        }
        if let Some(to_ids) = &self.to_ids
            && !to_ids.contains(&packet.to_id())
        {
            return false;
        }
        if let Some(protocol) = &self.protocol {
            let hit = packet
                .meta()
                .is_some_and(|m| m.protocols.iter().any(|p| p.contains(protocol.as_str())));
            if !hit {
                return false;
            }
        }
        if let Some(after) = self.tx_after
            && packet.first_bit_tx() < after
        {
            return false;
        }
        if let Some(before) = self.tx_before
            && packet.first_bit_tx() > before
        {
            return false;
        }
        true
    }

    /// 重算注册表中所有包的选中标记，返回选中数量。
    pub fn apply(&self, registry: &mut PacketRegistry) -> usize {
        let mut selected = 0;
        for packet in registry.iter_mut() {
            let hit = self.matches(packet);
            packet.set_selected(hit);
            if hit {
                selected += 1;
            }
        }
        selected
    }
}

/// 取消过滤：全部重新选中。
pub fn select_all(registry: &mut PacketRegistry) {
    for packet in registry.iter_mut() {
        packet.set_selected(true);
    }
}
