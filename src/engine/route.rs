//! 路由路径跟踪
//!
//! 跟踪开启时，每个 tick 向外部路由统计协作方查询当前最优路径，
//! 在相邻跳点中心之间连线并标记沿途节点；源节点与终点（next-hop
//! 为 "L" 的本地跳）有专属标记。关闭跟踪时清除全部标记与连线。

use tracing::debug;

use super::geometry::LineSeg;
use super::time::AnimTime;
use crate::anim::{NodeId, NodeRegistry};
use crate::viz::RoutePathRender;

/// 一跳：节点与通往下一跳的标注。
#[derive(Debug, Clone)]
pub struct RoutePathElement {
    pub node: NodeId,
    pub next_hop: String,
}

/// 某个源在当前时间的最优路径链。
#[derive(Debug, Clone)]
pub struct RoutePath {
    pub from: NodeId,
    pub destination: String,
    pub elements: Vec<RoutePathElement>,
}

/// 外部路由统计协作方。
pub trait RouteStatsProvider {
    fn route_paths(&self, t: AnimTime) -> Vec<RoutePath>;
}

/// next-hop 标注到展示文本的翻译。"C"/"-1" 只翻译文本，不做节点标记。
fn translate_next_hop(next_hop: &str) -> &str {
    match next_hop {
        "C" => "Connected",
        "L" => "Local",
        "-1" => "No Route",
        other => other,
    }
}

/// 路由路径跟踪器。OFF/ON 两态。
#[derive(Debug, Default)]
pub struct RoutePathTracker {
    enabled: bool,
    marked: Vec<NodeId>,
}

impl RoutePathTracker {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 切换跟踪状态；关闭时清除既有标记。
    pub fn set_enabled(&mut self, enabled: bool, nodes: &mut NodeRegistry) {
        self.enabled = enabled;
        if !enabled {
            self.clear_marks(nodes);
        }
    }

    /// 跟踪中每个 tick 调用：重建标记与连线，返回本 tick 的路径渲染。
    pub fn update(
        &mut self,
        t: AnimTime,
        provider: &dyn RouteStatsProvider,
        nodes: &mut NodeRegistry,
    ) -> Vec<RoutePathRender> {
        if !self.enabled {
            return Vec::new();
        }
        self.clear_marks(nodes);

        let mut rendered = Vec::new();
        for path in provider.route_paths(t) {
            if let Some(render) = self.add_path(&path, nodes) {
                rendered.push(render);
            }
        }
        debug!(paths = rendered.len(), "路由路径已重建");
        rendered
    }

    fn add_path(&mut self, path: &RoutePath, nodes: &mut NodeRegistry) -> Option<RoutePathRender> {
        let source = nodes.get_mut(path.from)?;
        source.set_route_path_source(true);
        source.mark_route_path(true);
        self.marked.push(path.from);

        let mut label = format!(
            "Route from Node:{}---> {}\n",
            path.from.0, path.destination
        );
        let mut last_pos = nodes.center(path.from);
        let mut segments = Vec::new();

        for element in path.elements.iter().skip(1) {
            label.push_str(&format!(
                "Node:{} NextHop:{}\n",
                element.node.0,
                translate_next_hop(&element.next_hop)
            ));
            let Some(node) = nodes.get_mut(element.node) else {
                continue;
            };
            if element.next_hop == "L" {
                node.set_route_path_destination(true);
            }
            node.mark_route_path(true);
            self.marked.push(element.node);
            let this_pos = nodes.center(element.node);
            segments.push(LineSeg::new(last_pos, this_pos));
            last_pos = this_pos;
        }

        Some(RoutePathRender { label, segments })
    }

    fn clear_marks(&mut self, nodes: &mut NodeRegistry) {
        for id in self.marked.drain(..) {
            if let Some(node) = nodes.get_mut(id) {
                node.clear_route_marks();
            }
        }
    }
}
