//! 渲染状态输出（用于离线 JSON 回放）
//!
//! 设计目标：
//! - **结构化**：每 tick 产出一个 JSON 帧而不是绘图调用
//! - **轻量**：不绑定任何具体图形后端
//! - **可回放**：帧序列可时间轴播放、单步、过滤

mod types;

pub use types::{
    FrameLogger, LabelRender, LinkRender, NodeRender, PacketRender, RenderFrame, RoutePathRender,
    WirelessCircle,
};
