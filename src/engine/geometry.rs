//! 数据包几何与可见性解析
//!
//! 给定当前时间与一个激活数据包，计算它在链路上的插值位置、标签
//! 摆放与可见性裁决。有线包沿端点连线做线性插值（速度由链路长度
//! 与传播时延反推）；无线包不画移动段，以同心圆环表示发射。

use serde::{Deserialize, Serialize};

use super::filter::FilterConfig;
use super::time::AnimTime;
use crate::anim::{AnimPacket, NodeRegistry};
use crate::viz::{LabelRender, PacketRender, WirelessCircle};

/// 相邻数据包的视觉间隔缩放因子。
pub const INTER_PACKET_GAP: f64 = 0.98;

/// 平面坐标点。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// 线段。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSeg {
    pub p1: Point,
    pub p2: Point,
}

impl LineSeg {
    pub fn new(p1: Point, p2: Point) -> LineSeg {
        LineSeg { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        let dx = self.p2.x - self.p1.x;
        let dy = self.p2.y - self.p1.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 线段与 x 轴的夹角（度，逆时针，y 轴向下的场景坐标）。
    pub fn angle_deg(&self) -> f64 {
        let dx = self.p2.x - self.p1.x;
        let dy = self.p2.y - self.p1.y;
        let deg = (-dy).atan2(dx).to_degrees();
        if deg < 0.0 { deg + 360.0 } else { deg }
    }

    /// 从 p1 出发沿方向走 `distance` 的点。零长线段返回 p1。
    pub fn point_at_distance(&self, distance: f64) -> Point {
        let len = self.length();
        if len == 0.0 {
            return self.p1;
        }
        let ratio = distance / len;
        Point {
            x: self.p1.x + (self.p2.x - self.p1.x) * ratio,
            y: self.p1.y + (self.p2.y - self.p1.y) * ratio,
        }
    }

    /// p1 不动，把长度缩放到 `length`。
    pub fn with_length(&self, length: f64) -> LineSeg {
        LineSeg {
            p1: self.p1,
            p2: self.point_at_distance(length),
        }
    }
}

/// 某一比特在 `t` 时刻的传播位置。
fn bit_position(speed: f64, t: AnimTime, bit_time: AnimTime, link_line: LineSeg) -> Point {
    let distance = (t.secs() - bit_time.secs()) * speed;
    link_line.point_at_distance(distance)
}

/// 解析一个激活数据包的渲染状态。返回 `None` 表示不可见。
/// 无线包可见且圈显示打开时，向 `circles` 追加三个同心圆环。
pub fn resolve_packet(
    packet: &AnimPacket,
    t: AnimTime,
    nodes: &NodeRegistry,
    filters: &FilterConfig,
    circles: &mut Vec<WirelessCircle>,
) -> Option<PacketRender> {
    if !filters.show_packets {
        return None;
    }
    if !packet.selected() {
        return None;
    }
    if packet.from_id() == packet.to_id() {
        return None;
    }
    if filters.unicast_match && packet.is_wireless() && !unicast_matches(packet, nodes) {
        return None;
    }

    let from_loc = nodes.center(packet.from_id());
    let to_loc = nodes.center(packet.to_id());
    let link_line = LineSeg::new(from_loc, to_loc);

    if packet.is_wireless() {
        if filters.show_wireless_circles {
            let radius = link_line.length();
            for r in [radius / 4.0, radius / 2.0, radius] {
                circles.push(WirelessCircle {
                    x: from_loc.x,
                    y: from_loc.y,
                    radius: r,
                });
            }
        }
        return Some(PacketRender {
            id: packet.anim_id().0,
            from: packet.from_id().0,
            to: packet.to_id().0,
            wireless: true,
            line: None,
            label: label_for(packet, filters, from_loc, 0.0),
        });
    }

    // 传播速度由链路长度与单次已知传播时延反推
    let first_bit_rx = packet.first_bit_rx().unwrap_or(AnimTime::ZERO);
    let speed = link_line.length() / (first_bit_rx.secs() - packet.first_bit_tx().secs());

    let mut segment = link_line;
    if speed.is_finite() && speed > 0.0 {
        segment.p1 = if packet.last_bit_tx() > t {
            from_loc
        } else {
            bit_position(speed, t, packet.last_bit_tx(), link_line)
        };
        segment.p2 = if first_bit_rx < t {
            to_loc
        } else {
            bit_position(speed, t, packet.first_bit_tx(), link_line)
        };
    }

    let angle = segment.angle_deg();
    let segment = segment.with_length(segment.length() * INTER_PACKET_GAP);

    let is_west = from_loc.x > to_loc.x;
    let (anchor, rotation) = if is_west {
        (segment.p2, 180.0 - angle)
    } else {
        (segment.p1, -angle)
    };

    Some(PacketRender {
        id: packet.anim_id().0,
        from: packet.from_id().0,
        to: packet.to_id().0,
        wireless: false,
        line: Some(segment),
        label: label_for(packet, filters, anchor, rotation),
    })
}

/// 单播匹配：目的节点的已知地址集合须覆盖包内寻址的 MAC
/// （DA 或 RA 任一角色）或 IPv4 目的地址；无已解析元数据即不可见。
fn unicast_matches(packet: &AnimPacket, nodes: &NodeRegistry) -> bool {
    if packet.short_meta().is_empty() {
        return false;
    }
    let Some(dest) = nodes.get(packet.to_id()) else {
        return false;
    };
    let Some(meta) = packet.meta() else {
        return false;
    };
    if let Some(wifi) = &meta.wifi {
        if let Some(da) = &wifi.da
            && dest.has_mac(da)
        {
            return true;
        }
        if let Some(ra) = &wifi.ra
            && dest.has_mac(ra)
        {
            return true;
        }
    }
    if let Some(ipv4) = &meta.ipv4
        && let Some(dst) = &ipv4.dst
        && dest.has_ipv4(dst)
    {
        return true;
    }
    false
}

fn label_for(
    packet: &AnimPacket,
    filters: &FilterConfig,
    anchor: Point,
    rotation: f64,
) -> Option<LabelRender> {
    if !filters.show_meta || packet.short_meta().is_empty() {
        return None;
    }
    Some(LabelRender {
        text: packet.short_meta().to_string(),
        rotation_deg: rotation,
        x: anchor.x,
        y: anchor.y,
    })
}
