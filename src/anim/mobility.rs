//! 节点移动轨迹
//!
//! 每个节点一条按时间排序的位置历史。回放以单调递增时间查询为主，
//! 向后寻址时对应节点的游标回到序列开头重扫（以回退时的开销换取
//! 正向播放的摊还 O(1)）。

use std::collections::BTreeMap;

use super::id::NodeId;
use crate::engine::{AnimTime, Point, TimeSeries};

/// 节点移动跟踪器。
#[derive(Debug, Default)]
pub struct MobilityTracker {
    histories: BTreeMap<NodeId, TimeSeries<Point>>,
}

impl MobilityTracker {
    /// 追加采样。乱序输入不拒绝，同一时间戳覆盖旧值。
    pub fn add_sample(&mut self, t: AnimTime, node: NodeId, pos: Point) {
        self.histories.entry(node).or_default().add(t, pos);
    }

    /// 时间戳 ≤ `t` 的最后一个采样位置；早于首个采样时返回首个采样
    /// （clamp-low，不外推）。没有任何采样返回 `None`。
    pub fn location_at(&mut self, node: NodeId, t: AnimTime) -> Option<Point> {
        self.histories
            .get_mut(&node)
            .and_then(|series| series.value_at(t).copied())
    }

    /// 刷新所有节点到 `t` 时刻的位置，返回是否有任何位置发生变化。
    pub fn update_locations(
        &mut self,
        t: AnimTime,
        mut apply: impl FnMut(NodeId, Point) -> bool,
    ) -> bool {
        let mut changed = false;
        for (node, series) in self.histories.iter_mut() {
            if let Some(pos) = series.value_at(t) {
                changed |= apply(*node, *pos);
            }
        }
        changed
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    pub fn sample_count(&self, node: NodeId) -> usize {
        self.histories.get(&node).map(TimeSeries::len).unwrap_or(0)
    }

    /// 软重置：所有游标回到起点，历史保留。
    pub fn reset_cursors(&mut self) {
        for series in self.histories.values_mut() {
            series.reset_cursor();
        }
    }

    /// 整体重置：清空全部历史。
    pub fn reset(&mut self) {
        self.histories.clear();
    }
}
