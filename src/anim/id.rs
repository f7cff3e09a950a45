//! 标识符类型
//!
//! 定义节点和动画数据包的唯一标识符。

use serde::{Deserialize, Serialize};

/// 节点标识符（来自轨迹文件，trace 生命周期内稳定）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u32);

/// 动画数据包标识符（按创建顺序单调分配）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AnimPacketId(pub u64);
