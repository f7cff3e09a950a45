//! 数据包时间线引擎
//!
//! 对按动画 id 排序的数据包注册表维护一个全局前向游标。每个 tick
//! 从游标处向前扫描：落入当前窗口的包进入激活集合，已成过去的包
//! 把游标推后（后续扫描不再回看历史），未来的包终止扫描（注册表
//! 从这里起都在更远的未来）。激活之后同一 tick 内执行清除。
//!
//! 向后寻址是一等操作：检测到请求时间小于上个 tick 的时间即把游标
//! 重置到注册表开头并强制清空激活集合，无需重新解析。

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::time::AnimTime;
use crate::anim::{AnimPacket, AnimPacketId, PacketRegistry};

/// 相对当前时间的窗口分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Past,
    Current,
    Future,
}

/// 数据包时间线。
#[derive(Debug)]
pub struct PacketTimeline {
    /// 前向游标：尚未被判定为"过去"的最早注册表位置
    cursor: AnimPacketId,
    active: BTreeSet<AnimPacketId>,
    update_rate: f64,
    last_time: AnimTime,
    /// 累计扫描过的条目数（正向扫描成本的观测口径）
    scanned_total: u64,
}

impl PacketTimeline {
    pub fn new(update_rate: f64) -> Self {
        Self {
            cursor: AnimPacketId(0),
            active: BTreeSet::new(),
            update_rate,
            last_time: AnimTime::ZERO,
            scanned_total: 0,
        }
    }

    pub fn update_rate(&self) -> f64 {
        self.update_rate
    }

    pub fn set_update_rate(&mut self, update_rate: f64) {
        self.update_rate = update_rate;
    }

    /// 按传输方式分类一个包相对 `t` 的窗口。
    ///
    /// 无线：`firstBitTx ≤ t < firstBitTx + updateRate` 为当前
    /// （单 tick 宽的激活窗口），之后为过去，之前为未来。
    /// 有线：没有接收时间的包永远按过去处理（无法渲染）；
    /// `t > lastBitRx` 为过去，`t < firstBitTx` 为未来，其余为当前。
    pub fn classify(&self, packet: &AnimPacket, t: AnimTime) -> TimeWindow {
        if packet.is_wireless() {
            let fb_tx = packet.first_bit_tx().secs();
            if t.secs() >= fb_tx + self.update_rate {
                return TimeWindow::Past;
            }
            if t.secs() < fb_tx {
                return TimeWindow::Future;
            }
            return TimeWindow::Current;
        }
        let Some(last_bit_rx) = packet.last_bit_rx() else {
            // 只有发送没有对应接收的包：永久跳过，不报告
            return TimeWindow::Past;
        };
        if t > last_bit_rx {
            return TimeWindow::Past;
        }
        if t < packet.first_bit_tx() {
            return TimeWindow::Future;
        }
        TimeWindow::Current
    }

    /// 推进到 `t`：激活进入窗口的包、清除已过期的包。
    pub fn advance(&mut self, registry: &PacketRegistry, t: AnimTime) {
        if t < self.last_time {
            trace!(t = t.secs(), last = self.last_time.secs(), "向后寻址，游标重置");
            self.cursor = AnimPacketId(0);
            self.force_purge();
        }

        for (id, packet) in registry.iter_from(self.cursor) {
            self.scanned_total += 1;
            match self.classify(packet, t) {
                TimeWindow::Current => {
                    self.active.insert(*id);
                }
                TimeWindow::Past => {
                    // 新的前向边界：后续扫描从这之后开始
                    self.cursor = AnimPacketId(id.0 + 1);
                }
                TimeWindow::Future => break,
            }
        }

        // 激活之后、同一 tick 内清除过期项
        let mut active = std::mem::take(&mut self.active);
        let before = active.len();
        active.retain(|id| {
            registry
                .get(*id)
                .is_some_and(|p| self.classify(p, t) == TimeWindow::Current)
        });
        if before != active.len() {
            debug!(purged = before - active.len(), active = active.len(), "清除过期包");
        }
        self.active = active;
        self.last_time = t;
    }

    pub fn active_ids(&self) -> impl Iterator<Item = AnimPacketId> + '_ {
        self.active.iter().copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, id: AnimPacketId) -> bool {
        self.active.contains(&id)
    }

    /// 无视时间清空激活集合（装载新轨迹或回退到起点时使用）。
    pub fn force_purge(&mut self) {
        self.active.clear();
    }

    /// 软重置：游标回到开头、激活集合清空、时间回零；注册表不动。
    pub fn soft_reset(&mut self) {
        self.cursor = AnimPacketId(0);
        self.force_purge();
        self.last_time = AnimTime::ZERO;
    }

    /// 迄今扫描过的注册表条目总数。
    pub fn scanned_total(&self) -> u64 {
        self.scanned_total
    }
}

impl Default for PacketTimeline {
    fn default() -> Self {
        Self::new(0.1)
    }
}
