//! 流式元素读取器
//!
//! 面向轨迹文件的前向只读 tokenizer：把字节流切成一个个带属性的元素。
//! 轨迹格式是"一行一个元素"式的类 XML，这里只做结构化解析需要的最小
//! 子集：开始/自闭合/结束标签、属性表、预定义实体。命名空间、注释等
//! 通用 XML 特性不支持；`<?`/`<!` 行直接跳过。

use std::io::{self, BufRead};

/// 元素形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<name ...>`
    Open,
    /// `<name ... />`
    SelfClosing,
    /// `</name>`
    Close,
}

/// 一个已切分的元素及其属性表。
#[derive(Debug, Clone)]
pub struct RawElement {
    pub name: String,
    pub kind: ElementKind,
    attrs: Vec<(String, String)>,
}

impl RawElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// 缺失或不可解析的属性取 0，与原始轨迹的属性解码口径一致。
    pub fn attr_u32(&self, name: &str) -> u32 {
        self.attr(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn attr_f64(&self, name: &str) -> f64 {
        self.attr(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    }
}

/// 流式元素读取器。
pub struct ElementReader<R: BufRead> {
    inner: R,
    done: bool,
}

impl<R: BufRead> ElementReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// 读取下一个元素；流结束返回 `Ok(None)`。
    /// 无法识别的片段（声明、注释、裸文本）被跳过。
    pub fn next_element(&mut self) -> io::Result<Option<RawElement>> {
        loop {
            if self.done {
                return Ok(None);
            }
            let mut chunk: Vec<u8> = Vec::new();
            loop {
                let n = self.inner.read_until(b'>', &mut chunk)?;
                if n == 0 {
                    self.done = true;
                    break;
                }
                // 引号内的 '>' 不终止标签（元数据里常见 "a > b"）
                if chunk.iter().filter(|b| **b == b'"').count() % 2 == 0 {
                    break;
                }
            }
            if chunk.is_empty() {
                return Ok(None);
            }
            let text = String::from_utf8_lossy(&chunk);
            let Some(start) = text.find('<') else {
                // 元素间文本，忽略
                continue;
            };
            let end = text.rfind('>').unwrap_or(text.len());
            if end <= start + 1 {
                continue;
            }
            let body = text[start + 1..end].trim();
            if body.is_empty() || body.starts_with('?') || body.starts_with('!') {
                continue;
            }
            if let Some(element) = parse_tag(body) {
                return Ok(Some(element));
            }
        }
    }
}

fn parse_tag(body: &str) -> Option<RawElement> {
    if let Some(name) = body.strip_prefix('/') {
        return Some(RawElement {
            name: name.trim().to_string(),
            kind: ElementKind::Close,
            attrs: Vec::new(),
        });
    }
    let (body, kind) = match body.strip_suffix('/') {
        Some(stripped) => (stripped.trim_end(), ElementKind::SelfClosing),
        None => (body, ElementKind::Open),
    };
    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() {
        return None;
    }
    Some(RawElement {
        name: name.to_string(),
        kind,
        attrs: parse_attrs(&body[name_end..]),
    })
}

fn parse_attrs(mut rest: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim().to_string();
        rest = rest[eq + 1..].trim_start();
        let Some(stripped) = rest.strip_prefix('"') else {
            break;
        };
        let Some(close) = stripped.find('"') else { break };
        attrs.push((key, unescape(&stripped[..close])));
        rest = &stripped[close + 1..];
    }
    attrs
}

/// XML 预定义实体的最小反转义。
fn unescape(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
