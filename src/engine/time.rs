//! 仿真时间类型
//!
//! 定义回放所用的仿真时间（秒）及其全序比较。

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// 仿真时间（秒）。轨迹文件中的时间戳均为浮点秒。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AnimTime(pub f64);

impl AnimTime {
    pub const ZERO: AnimTime = AnimTime(0.0);

    pub fn from_secs(s: f64) -> AnimTime {
        AnimTime(s)
    }

    pub fn secs(self) -> f64 {
        self.0
    }
}

// f64 本身不是全序；时间戳不会出现 NaN，用 total_cmp 提供确定性排序。
impl PartialEq for AnimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for AnimTime {}

impl PartialOrd for AnimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
