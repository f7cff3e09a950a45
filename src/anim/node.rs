//! 节点实体与注册表
//!
//! 节点在首次被引用时创建，仅在整体重置时销毁；注册表按值持有实体，
//! 跨引用一律使用 id（弱引用 + 查找），不出现悬空指针。

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::id::NodeId;
use crate::engine::Point;
use crate::trace::Rgb;

/// 节点形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Circle,
    Rectangle,
    Image,
}

/// 默认节点颜色（红）。`color == None` 时渲染取该值。
pub const DEFAULT_NODE_COLOR: Rgb = (255, 0, 0);

/// 一个动画节点。
#[derive(Debug, Clone)]
pub struct AnimNode {
    id: NodeId,
    shape: NodeShape,
    size: f64,
    description: String,
    color: Option<Rgb>,
    visible: bool,
    position: Point,
    ipv4_addresses: BTreeSet<String>,
    mac_addresses: BTreeSet<String>,
    route_path_marked: bool,
    route_path_source: bool,
    route_path_destination: bool,
}

impl AnimNode {
    pub fn new(
        id: NodeId,
        shape: NodeShape,
        size: f64,
        description: impl Into<String>,
        color: Option<Rgb>,
    ) -> Self {
        Self {
            id,
            shape,
            size,
            description: description.into(),
            color,
            visible: true,
            position: Point::ORIGIN,
            ipv4_addresses: BTreeSet::new(),
            mac_addresses: BTreeSet::new(),
            route_path_marked: false,
            route_path_source: false,
            route_path_destination: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn shape(&self) -> NodeShape {
        self.shape
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, pos: Point) {
        self.position = pos;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// 应用一次带时间戳的节点更新。`color == None` 且未携带颜色属性时
    /// 保留当前颜色。
    pub fn apply_update(&mut self, color: Option<Rgb>, has_color_attr: bool, description: &str, visible: bool) {
        if has_color_attr {
            self.color = color;
        }
        if !description.is_empty() {
            self.description = description.to_string();
        }
        self.visible = visible;
    }

    /// 渲染标签：路径标记态覆盖为 SOURCE/DESTINATION；描述为空回退到 id。
    pub fn display_label(&self) -> String {
        if self.route_path_marked {
            if self.route_path_source {
                return "SOURCE".to_string();
            }
            if self.route_path_destination {
                return "DESTINATION".to_string();
            }
        }
        if self.description.is_empty() {
            self.id.0.to_string()
        } else {
            self.description.clone()
        }
    }

    pub fn ipv4_addresses(&self) -> &BTreeSet<String> {
        &self.ipv4_addresses
    }

    pub fn mac_addresses(&self) -> &BTreeSet<String> {
        &self.mac_addresses
    }

    pub fn add_ipv4_address(&mut self, ip: impl Into<String>) {
        self.ipv4_addresses.insert(ip.into());
    }

    pub fn add_mac_address(&mut self, mac: impl Into<String>) {
        self.mac_addresses.insert(mac.into());
    }

    /// 已知 IPv4 集合是否覆盖 `ip`。要求点分四段；末段 255（广播）
    /// 无条件命中。
    pub fn has_ipv4(&self, ip: &str) -> bool {
        let quads: Vec<&str> = ip.split('.').collect();
        if quads.len() != 4 {
            return false;
        }
        if quads[3] == "255" {
            return true;
        }
        self.ipv4_addresses.contains(ip)
    }

    /// 已知 MAC 集合是否覆盖 `mac`。要求六段冒号分隔。
    pub fn has_mac(&self, mac: &str) -> bool {
        if mac.split(':').count() != 6 {
            return false;
        }
        self.mac_addresses.contains(mac)
    }

    pub fn route_path_marked(&self) -> bool {
        self.route_path_marked
    }

    pub fn mark_route_path(&mut self, mark: bool) {
        self.route_path_marked = mark;
    }

    pub fn set_route_path_source(&mut self, source: bool) {
        self.route_path_source = source;
    }

    pub fn set_route_path_destination(&mut self, destination: bool) {
        self.route_path_destination = destination;
    }

    pub fn clear_route_marks(&mut self) {
        self.route_path_marked = false;
        self.route_path_source = false;
        self.route_path_destination = false;
    }
}

/// 节点注册表。
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, AnimNode>,
}

impl NodeRegistry {
    /// 按 id 幂等创建：已存在时返回现有实体并报告 `true`。
    pub fn add(
        &mut self,
        id: NodeId,
        shape: NodeShape,
        size: f64,
        description: &str,
        color: Option<Rgb>,
    ) -> (&mut AnimNode, bool) {
        let mut existed = true;
        let node = self.nodes.entry(id).or_insert_with(|| {
            existed = false;
            debug!(node_id = id.0, "创建节点");
            AnimNode::new(id, shape, size, description, color)
        });
        (node, existed)
    }

    pub fn get(&self, id: NodeId) -> Option<&AnimNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut AnimNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// 未知 id 的几何查询是不变量破坏（调用方必须先守卫），直接中止。
    pub fn center(&self, id: NodeId) -> Point {
        match self.nodes.get(&id) {
            Some(node) => node.position(),
            None => panic!("center: unknown node id {}", id.0),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &AnimNode)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&NodeId, &mut AnimNode)> {
        self.nodes.iter_mut()
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
    }
}
