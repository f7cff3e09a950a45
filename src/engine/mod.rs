//! 回放引擎模块
//!
//! 此模块包含回放核心：仿真时间、时间序列、数据包时间线、几何与
//! 可见性解析、路由路径跟踪、过滤配置以及对宿主暴露的引擎上下文。

// 子模块声明
mod context;
mod filter;
mod geometry;
mod route;
mod series;
mod time;
mod timeline;

// 重新导出公共接口
pub use context::{
    DEFAULT_NODE_SIZE, DEFAULT_SCENE_SIZE, DEFAULT_UPDATE_RATE, EngineContext, PARSE_YIELD_BUDGET,
    ParseSession, ParseStep, ParseSummary, ResetKind,
};
pub use filter::{FilterConfig, PacketFilter, select_all};
pub use geometry::{INTER_PACKET_GAP, LineSeg, Point, resolve_packet};
pub use route::{RoutePath, RoutePathElement, RoutePathTracker, RouteStatsProvider};
pub use series::TimeSeries;
pub use time::AnimTime;
pub use timeline::{PacketTimeline, TimeWindow};
