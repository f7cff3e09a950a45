//! 带时间戳的实体更新
//!
//! 节点/链路的更新事件按时间入库，播放时把 ≤ 当前时间的最新值应用到
//! 实体上。底层与移动轨迹共用同一套带前向游标的时间序列。

use std::collections::BTreeMap;

use super::id::NodeId;
use super::link::LinkRegistry;
use super::node::NodeRegistry;
use crate::engine::{AnimTime, TimeSeries};
use crate::trace::Rgb;

/// 一次节点更新的载荷。
#[derive(Debug, Clone)]
pub struct NodeUpdate {
    pub color: Option<Rgb>,
    pub has_color_attr: bool,
    pub description: String,
    pub visible: bool,
}

/// 节点更新管理器。
#[derive(Debug, Default)]
pub struct NodeUpdateManager {
    updates: BTreeMap<NodeId, TimeSeries<NodeUpdate>>,
}

impl NodeUpdateManager {
    /// 记录一次更新。引用未知节点的更新由调用方丢弃。
    pub fn add(&mut self, t: AnimTime, node: NodeId, update: NodeUpdate) {
        self.updates.entry(node).or_default().add(t, update);
    }

    /// 把 `t` 时刻生效的更新应用到各节点。
    pub fn apply(&mut self, t: AnimTime, nodes: &mut NodeRegistry) {
        for (id, series) in self.updates.iter_mut() {
            if let Some(update) = series.value_at(t)
                && let Some(node) = nodes.get_mut(*id)
            {
                node.apply_update(
                    update.color,
                    update.has_color_attr,
                    &update.description,
                    update.visible,
                );
            }
        }
    }

    pub fn reset_cursors(&mut self) {
        for series in self.updates.values_mut() {
            series.reset_cursor();
        }
    }

    pub fn reset(&mut self) {
        self.updates.clear();
    }
}

/// 链路更新管理器：标签历史按 (from, to) 入库。
#[derive(Debug, Default)]
pub struct LinkUpdateManager {
    updates: BTreeMap<(NodeId, NodeId), TimeSeries<String>>,
}

impl LinkUpdateManager {
    pub fn add(&mut self, t: AnimTime, from: NodeId, to: NodeId, description: &str) {
        self.updates
            .entry((from, to))
            .or_default()
            .add(t, description.to_string());
    }

    pub fn apply(&mut self, t: AnimTime, links: &mut LinkRegistry) {
        for ((from, to), series) in self.updates.iter_mut() {
            if let Some(description) = series.value_at(t)
                && let Some(link) = links.find_mut(*from, *to)
            {
                link.update_description(description);
            }
        }
    }

    pub fn reset_cursors(&mut self) {
        for series in self.updates.values_mut() {
            series.reset_cursor();
        }
    }

    pub fn reset(&mut self) {
        self.updates.clear();
    }
}
