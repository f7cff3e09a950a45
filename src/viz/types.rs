use serde::{Deserialize, Serialize};

use crate::engine::LineSeg;
use crate::trace::Rgb;

/// 一个节点在某 tick 的渲染状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRender {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
    pub visible: bool,
    pub label: String,
    pub size: f64,
}

/// 旋转文本标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelRender {
    pub text: String,
    /// 旋转角（度）；西向线段翻转 180° 以保持文本可读
    pub rotation_deg: f64,
    pub x: f64,
    pub y: f64,
}

/// 一个数据包在某 tick 的渲染状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketRender {
    pub id: u64,
    pub from: u32,
    pub to: u32,
    pub wireless: bool,
    /// 有线包的插值线段；无线包无移动段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineSeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelRender>,
}

/// 一条链路在某 tick 的渲染状态（线段由两端节点中心推得）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRender {
    pub from: u32,
    pub to: u32,
    pub line: LineSeg,
    pub label: String,
}

/// 无线发射圆环（以源节点为心）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WirelessCircle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// 一条路由路径的渲染状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutePathRender {
    pub label: String,
    pub segments: Vec<LineSeg>,
}

/// 一个 tick 的完整渲染帧（JSON 可回放）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    /// 仿真时间（秒）
    pub t: f64,
    pub nodes: Vec<NodeRender>,
    pub links: Vec<LinkRender>,
    pub packets: Vec<PacketRender>,
    /// 每 tick 整体替换，不跨 tick 累积
    pub wireless_circles: Vec<WirelessCircle>,
    pub route_paths: Vec<RoutePathRender>,
    pub packets_shown: u32,
}

/// 一个简单的帧收集器（存内存，回放结束写 JSON 文件）
#[derive(Debug, Default)]
pub struct FrameLogger {
    pub frames: Vec<RenderFrame>,
}

impl FrameLogger {
    pub fn push(&mut self, frame: RenderFrame) {
        self.frames.push(frame);
    }
}
