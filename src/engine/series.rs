//! 时间序列
//!
//! 按时间排序的采样序列，带一个只向前推进的游标。
//! 回放以单调递增的时间查询为主，游标让这类查询摊还 O(1)；
//! 向后寻址时游标重置到序列开头再向前扫描。

use super::time::AnimTime;

/// 按时间排序的采样序列。相同时间戳的采样会被覆盖。
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    samples: Vec<(AnimTime, T)>,
    cursor: usize,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            cursor: 0,
        }
    }
}

impl<T> TimeSeries<T> {
    /// 插入采样。乱序输入被接受并按时间归位；同一时间戳覆盖旧值。
    pub fn add(&mut self, t: AnimTime, value: T) {
        match self.samples.binary_search_by(|(st, _)| st.cmp(&t)) {
            Ok(idx) => self.samples[idx].1 = value,
            Err(idx) => self.samples.insert(idx, (t, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 返回时间戳 ≤ `t` 的最后一个采样；早于首个采样时夹取到首个采样
    /// （clamp-low，不外推）。查询会推进游标。
    pub fn value_at(&mut self, t: AnimTime) -> Option<&T> {
        if self.samples.is_empty() {
            return None;
        }
        // 向后寻址：游标回到开头再向前扫。
        if self.cursor >= self.samples.len() || t < self.samples[self.cursor].0 {
            self.cursor = 0;
        }
        while self.cursor + 1 < self.samples.len() && self.samples[self.cursor + 1].0 <= t {
            self.cursor += 1;
        }
        Some(&self.samples[self.cursor].1)
    }

    /// 不推进游标的只读查询。
    pub fn peek_at(&self, t: AnimTime) -> Option<&T> {
        let idx = match self.samples.binary_search_by(|(st, _)| st.cmp(&t)) {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) => idx - 1,
        };
        self.samples.get(idx).map(|(_, v)| v)
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.cursor = 0;
    }
}
