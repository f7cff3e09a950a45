//! 轨迹事件记录
//!
//! 轨迹解析输出的带标签联合体，纯数据、无行为。

use crate::anim::NodeId;
use crate::engine::AnimTime;

/// RGB 颜色三元组
pub type Rgb = (u8, u8, u8);

/// 一条已解析的轨迹事件。
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// 轨迹元信息（格式版本）
    Anim { version: f64 },
    /// 拓扑尺寸
    Topology { max_x: f64, max_y: f64 },
    /// 节点定义 / 位置刷新
    Node {
        id: NodeId,
        x: f64,
        y: f64,
        description: String,
        /// `None` 表示"使用默认色"；版本门控在解析时完成
        color: Option<Rgb>,
        /// 原始元素是否携带颜色属性（r）
        has_color_attr: bool,
    },
    /// 带时间戳的节点更新
    NodeUpdate {
        t: AnimTime,
        id: NodeId,
        description: String,
        color: Option<Rgb>,
        visible: bool,
        has_color_attr: bool,
    },
    /// 点对点链路
    Link {
        from: NodeId,
        to: NodeId,
        from_description: String,
        to_description: String,
        description: String,
    },
    /// 共享介质关联（按 (id, id) 自关联登记）
    NonP2pLink { id: NodeId, ipv4_address: String },
    /// 带时间戳的链路标签更新
    LinkUpdate {
        t: AnimTime,
        from: NodeId,
        to: NodeId,
        description: String,
    },
    /// 数据包接收事件（有线/无线共用一种记录）
    PacketRx {
        from: NodeId,
        to: NodeId,
        first_bit_tx: AnimTime,
        last_bit_tx: AnimTime,
        first_bit_rx: Option<AnimTime>,
        last_bit_rx: Option<AnimTime>,
        wireless: bool,
        /// 原始元数据；缺失即 `None`（不再使用 "null" 哨兵）
        meta: Option<String>,
    },
    /// 无法识别/畸形的元素，跳过并继续
    Invalid,
}
