use crate::anim::{AnimPacketId, NodeId, PacketRegistry};
use crate::engine::{AnimTime, PacketTimeline, TimeWindow};

fn t(s: f64) -> AnimTime {
    AnimTime::from_secs(s)
}

fn add_wired(registry: &mut PacketRegistry, fb_tx: f64, lb_rx: f64) -> AnimPacketId {
    registry
        .add(
            NodeId(0),
            NodeId(1),
            t(fb_tx),
            t(fb_tx),
            Some(t(lb_rx)),
            Some(t(lb_rx)),
            false,
            None,
        )
        .expect("wired packet")
}

fn add_wireless(registry: &mut PacketRegistry, fb_tx: f64) -> AnimPacketId {
    registry
        .add(
            NodeId(0),
            NodeId(1),
            t(fb_tx),
            t(fb_tx),
            Some(t(fb_tx)),
            Some(t(fb_tx)),
            true,
            None,
        )
        .expect("wireless packet")
}

fn add_tx_only(registry: &mut PacketRegistry, fb_tx: f64) -> AnimPacketId {
    registry
        .add(NodeId(0), NodeId(1), t(fb_tx), t(fb_tx), None, None, false, None)
        .expect("tx-only packet")
}

#[test]
fn wired_window_classification() {
    let mut registry = PacketRegistry::default();
    let id = add_wired(&mut registry, 1.0, 2.0);
    let timeline = PacketTimeline::new(0.1);
    let packet = registry.get(id).unwrap();
    assert_eq!(timeline.classify(packet, t(0.5)), TimeWindow::Future);
    assert_eq!(timeline.classify(packet, t(1.5)), TimeWindow::Current);
    assert_eq!(timeline.classify(packet, t(2.5)), TimeWindow::Past);
}

#[test]
fn wireless_single_tick_activation_window() {
    let mut registry = PacketRegistry::default();
    let id = add_wireless(&mut registry, 3.0);
    let timeline = PacketTimeline::new(0.1);
    let packet = registry.get(id).unwrap();
    assert_eq!(timeline.classify(packet, t(2.95)), TimeWindow::Future);
    assert_eq!(timeline.classify(packet, t(3.0)), TimeWindow::Current);
    assert_eq!(timeline.classify(packet, t(3.05)), TimeWindow::Current);
    assert_eq!(timeline.classify(packet, t(3.1)), TimeWindow::Past);
    assert_eq!(timeline.classify(packet, t(4.0)), TimeWindow::Past);
}

#[test]
fn transmit_without_receive_is_permanently_past() {
    let mut registry = PacketRegistry::default();
    let id = add_tx_only(&mut registry, 1.0);
    let mut timeline = PacketTimeline::new(0.1);
    assert_eq!(
        timeline.classify(registry.get(id).unwrap(), t(1.0)),
        TimeWindow::Past
    );
    timeline.advance(&registry, t(1.0));
    assert_eq!(timeline.active_count(), 0);
}

#[test]
fn advance_activates_and_purges() {
    let mut registry = PacketRegistry::default();
    let id = add_wired(&mut registry, 1.0, 2.0);
    let mut timeline = PacketTimeline::new(0.1);

    timeline.advance(&registry, t(0.5));
    assert!(!timeline.is_active(id));

    timeline.advance(&registry, t(1.5));
    assert!(timeline.is_active(id));

    // purge happens in the same tick as activation scanning
    timeline.advance(&registry, t(2.5));
    assert!(!timeline.is_active(id));
    assert_eq!(timeline.active_count(), 0);
}

#[test]
fn wireless_packet_expires_after_its_window() {
    let mut registry = PacketRegistry::default();
    let id = add_wireless(&mut registry, 3.0);
    let mut timeline = PacketTimeline::new(0.1);

    timeline.advance(&registry, t(3.05));
    assert!(timeline.is_active(id));

    timeline.advance(&registry, t(3.2));
    assert!(!timeline.is_active(id));
}

#[test]
fn forward_scan_cost_is_linear_in_registry_size() {
    let n = 100u32;
    let mut registry = PacketRegistry::default();
    for i in 0..n {
        add_wired(&mut registry, i as f64, i as f64 + 0.5);
    }
    let mut timeline = PacketTimeline::new(0.1);
    let mut ticks = 0u64;
    let mut s = 0.25;
    while s < n as f64 {
        timeline.advance(&registry, t(s));
        ticks += 1;
        s += 0.5;
    }
    // cursor advancement keeps the total scan cost O(registry), far below
    // the O(ticks x registry) a from-scratch scan per tick would cost
    assert!(ticks > 100);
    assert!(
        timeline.scanned_total() <= 8 * n as u64,
        "scanned {} entries over {} ticks",
        timeline.scanned_total(),
        ticks
    );
}

#[test]
fn backward_seek_matches_a_fresh_start() {
    let mut registry = PacketRegistry::default();
    for i in 0..10 {
        add_wired(&mut registry, i as f64, i as f64 + 1.5);
    }

    let mut seeked = PacketTimeline::new(0.1);
    seeked.advance(&registry, t(10.0));
    seeked.advance(&registry, t(2.0));

    let mut fresh = PacketTimeline::new(0.1);
    fresh.advance(&registry, t(2.0));

    let seeked_active: Vec<_> = seeked.active_ids().collect();
    let fresh_active: Vec<_> = fresh.active_ids().collect();
    assert_eq!(seeked_active, fresh_active);
    assert!(!seeked_active.is_empty());
}

#[test]
fn soft_reset_rewinds_without_losing_the_registry() {
    let mut registry = PacketRegistry::default();
    let id = add_wired(&mut registry, 1.0, 2.0);
    let mut timeline = PacketTimeline::new(0.1);

    timeline.advance(&registry, t(1.5));
    assert!(timeline.is_active(id));

    timeline.soft_reset();
    assert_eq!(timeline.active_count(), 0);
    assert_eq!(registry.len(), 1);

    timeline.advance(&registry, t(1.5));
    assert!(timeline.is_active(id));
}

#[test]
fn force_purge_empties_the_active_set() {
    let mut registry = PacketRegistry::default();
    add_wired(&mut registry, 1.0, 2.0);
    let mut timeline = PacketTimeline::new(0.1);
    timeline.advance(&registry, t(1.5));
    assert_eq!(timeline.active_count(), 1);
    timeline.force_purge();
    assert_eq!(timeline.active_count(), 0);
}
