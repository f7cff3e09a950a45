//! 链路实体与注册表
//!
//! 链路按 from 节点分桶存放，同一对节点可以累积多条（共享介质扇出）。
//! 端点描述形如 `ip~mac`，创建时拆开灌入对应节点的地址集合。

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::id::NodeId;
use super::node::NodeRegistry;

/// 一条链路。
#[derive(Debug, Clone)]
pub struct AnimLink {
    from: NodeId,
    to: NodeId,
    p2p: bool,
    interface_a: Option<String>,
    interface_b: Option<String>,
    current_description: Option<String>,
    /// 创建时的标签。更新只改 current；没有回退触发路径。
    original_description: String,
}

impl AnimLink {
    fn new(
        from: NodeId,
        to: NodeId,
        p2p: bool,
        interface_a: Option<String>,
        interface_b: Option<String>,
        description: &str,
    ) -> Self {
        Self {
            from,
            to,
            p2p,
            interface_a,
            interface_b,
            current_description: (!description.is_empty()).then(|| description.to_string()),
            original_description: description.to_string(),
        }
    }

    pub fn from_id(&self) -> NodeId {
        self.from
    }

    pub fn to_id(&self) -> NodeId {
        self.to
    }

    pub fn is_p2p(&self) -> bool {
        self.p2p
    }

    pub fn interface_a_description(&self) -> &str {
        self.interface_a.as_deref().unwrap_or("")
    }

    pub fn interface_b_description(&self) -> &str {
        self.interface_b.as_deref().unwrap_or("")
    }

    pub fn current_description(&self) -> &str {
        self.current_description.as_deref().unwrap_or("")
    }

    pub fn original_description(&self) -> &str {
        &self.original_description
    }

    pub fn update_description(&mut self, description: &str) {
        self.current_description = Some(description.to_string());
    }

    fn matches(&self, from: NodeId, to: NodeId) -> bool {
        (self.from == from && self.to == to) || (self.from == to && self.to == from)
    }
}

/// 链路注册表，按 from 节点 id 分桶。
#[derive(Debug, Default)]
pub struct LinkRegistry {
    links: BTreeMap<NodeId, Vec<AnimLink>>,
    count: usize,
}

impl LinkRegistry {
    /// 追加一条链路。端点未在节点注册表中登记时静默拒绝
    /// （轨迹约定节点事件先于链路事件）。
    pub fn add(
        &mut self,
        from: NodeId,
        to: NodeId,
        p2p: bool,
        from_description: &str,
        to_description: &str,
        link_description: &str,
        nodes: &mut NodeRegistry,
    ) -> bool {
        if !nodes.contains(from) || !nodes.contains(to) {
            trace!(from = from.0, to = to.0, "链路端点未注册，忽略");
            return false;
        }
        consume_interface_description(from_description, from, nodes);
        consume_interface_description(to_description, to, nodes);
        let interface_a = (!from_description.is_empty()).then(|| from_description.to_string());
        let interface_b = (!to_description.is_empty()).then(|| to_description.to_string());
        debug!(from = from.0, to = to.0, p2p, "添加链路");
        self.links.entry(from).or_default().push(AnimLink::new(
            from,
            to,
            p2p,
            interface_a,
            interface_b,
            link_description,
        ));
        self.count += 1;
        true
    }

    /// 任一朝向匹配的第一条链路。
    pub fn find(&self, from: NodeId, to: NodeId) -> Option<&AnimLink> {
        for key in [from, to] {
            if let Some(found) = self
                .links
                .get(&key)
                .and_then(|v| v.iter().find(|l| l.matches(from, to)))
            {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, from: NodeId, to: NodeId) -> Option<&mut AnimLink> {
        for key in [from, to] {
            let hit = self
                .links
                .get(&key)
                .is_some_and(|v| v.iter().any(|l| l.matches(from, to)));
            if hit {
                return self
                    .links
                    .get_mut(&key)
                    .and_then(|v| v.iter_mut().find(|l| l.matches(from, to)));
            }
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimLink> {
        self.links.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn reset(&mut self) {
        self.links.clear();
        self.count = 0;
    }
}

/// `ip~mac` 端点描述拆分后灌入节点地址集合。
fn consume_interface_description(description: &str, node: NodeId, nodes: &mut NodeRegistry) {
    let mut parts = description.split('~');
    if let (Some(ip), Some(mac), None) = (parts.next(), parts.next(), parts.next())
        && let Some(n) = nodes.get_mut(node)
    {
        n.add_ipv4_address(ip);
        n.add_mac_address(mac);
    }
}
