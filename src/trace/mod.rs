//! 轨迹输入模块
//!
//! 此模块包含轨迹文件的流式读取、事件记录模型与结构化解析器。

// 子模块声明
mod event;
mod parser;
mod reader;

// 重新导出公共接口
pub use event::{Rgb, TraceEvent};
pub use parser::{COLOR_VERSION_MIN, TraceError, TraceParser};
pub use reader::{ElementKind, ElementReader, RawElement};
