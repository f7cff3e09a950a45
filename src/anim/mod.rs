//! 实体模块
//!
//! 此模块包含回放涉及的实体及其注册表：节点、链路、数据包、
//! 移动轨迹与带时间戳的更新。

// 子模块声明
mod id;
mod link;
mod mobility;
mod node;
mod packet;
mod updates;

// 重新导出公共接口
pub use id::{AnimPacketId, NodeId};
pub use link::{AnimLink, LinkRegistry};
pub use mobility::MobilityTracker;
pub use node::{AnimNode, DEFAULT_NODE_COLOR, NodeRegistry, NodeShape};
pub use packet::{AnimPacket, Ipv4Info, PacketMeta, PacketRegistry, WifiMacInfo};
pub use updates::{LinkUpdateManager, NodeUpdate, NodeUpdateManager};
