use super::write_temp_trace;
use crate::anim::NodeId;
use crate::engine::{AnimTime, EngineContext, ParseStep, ResetKind};

fn t(s: f64) -> AnimTime {
    AnimTime::from_secs(s)
}

const ROUND_TRIP_TRACE: &str = concat!(
    "<anim ver=\"netanim-3.103\"/>\n",
    "<node id=\"0\" locX=\"10\" locY=\"20\" descr=\"A\"/>\n",
    "<node id=\"1\" locX=\"30\" locY=\"20\"/>\n",
    "<link fromId=\"0\" toId=\"1\" fd=\"ip~mac\" td=\"\" ld=\"L1\"/>\n",
    "<p fId=\"0\" fbTx=\"1.0\" lbTx=\"1.0\" tId=\"1\" fbRx=\"1.5\" lbRx=\"1.5\" meta-info=\"X\"/>\n",
);

fn loaded_context(prefix: &str) -> EngineContext {
    let path = write_temp_trace(prefix, ROUND_TRIP_TRACE);
    let mut ctx = EngineContext::new();
    ctx.load_trace(&path, |_, _| {}).expect("load trace");
    ctx
}

#[test]
fn round_trip_scenario_builds_the_expected_entities() {
    let ctx = loaded_context("roundtrip");
    assert_eq!(ctx.node_count(), 2);
    assert_eq!(ctx.link_count(), 1);
    assert_eq!(ctx.packet_count(), 1);
    assert_eq!(ctx.version(), 3.103);
    assert_eq!(ctx.max_simulation_time(), t(1.5));

    let node0 = ctx.nodes().get(NodeId(0)).expect("node 0");
    assert!(node0.ipv4_addresses().contains("ip"));
    assert!(node0.mac_addresses().contains("mac"));
    assert_eq!(node0.description(), "A");

    let link = ctx.links().find(NodeId(0), NodeId(1)).expect("link");
    assert_eq!(link.current_description(), "L1");
}

#[test]
fn round_trip_scenario_renders_the_packet_in_its_window() {
    let mut ctx = loaded_context("roundtrip-render");

    let frame = ctx.tick(t(1.2));
    assert_eq!(frame.packets.len(), 1);
    assert_eq!(frame.packets_shown, 1);
    let line = frame.packets[0].line.expect("wired segment");
    // endpoints (10,20)-(30,20): the segment lies on that horizontal line
    assert_eq!(line.p1.y, 20.0);
    assert!(line.p1.x >= 10.0 && line.p2.x <= 30.0);
    assert_eq!(frame.packets[0].label.as_ref().unwrap().text, "X");

    // link geometry comes from the node centers
    assert_eq!(frame.links.len(), 1);
    assert_eq!(frame.links[0].line.p1.x, 10.0);
    assert_eq!(frame.links[0].line.p2.x, 30.0);

    let frame = ctx.tick(t(2.0));
    assert!(frame.packets.is_empty());
    assert_eq!(frame.packets_shown, 0);
}

#[test]
fn backward_seek_through_tick_restores_the_active_set() {
    let mut ctx = loaded_context("roundtrip-seek");
    assert_eq!(ctx.tick(t(1.2)).packets.len(), 1);
    assert_eq!(ctx.tick(t(3.0)).packets.len(), 0);
    // seeking backward is first-class: no reparse needed
    assert_eq!(ctx.tick(t(1.2)).packets.len(), 1);
}

#[test]
fn soft_reset_rewinds_but_keeps_entities() {
    let mut ctx = loaded_context("soft-reset");
    ctx.tick(t(3.0));
    ctx.reset(ResetKind::Soft);
    assert_eq!(ctx.node_count(), 2);
    assert_eq!(ctx.packet_count(), 1);
    assert_eq!(ctx.tick(t(1.2)).packets.len(), 1);
}

#[test]
fn hard_reset_discards_everything() {
    let mut ctx = loaded_context("hard-reset");
    ctx.reset(ResetKind::Hard);
    assert_eq!(ctx.node_count(), 0);
    assert_eq!(ctx.packet_count(), 0);
    assert_eq!(ctx.max_simulation_time(), AnimTime::ZERO);
}

#[test]
fn active_packet_count_tracks_shown_and_pending() {
    let mut ctx = loaded_context("active-count");
    assert_eq!(ctx.active_packet_count(), 0);
    ctx.tick(t(1.2));
    assert_eq!(ctx.active_packet_count(), 2);
    ctx.tick(t(2.0));
    assert_eq!(ctx.active_packet_count(), 0);
}

#[test]
fn resumable_load_steps_until_complete() {
    let path = write_temp_trace("stepped-load", ROUND_TRIP_TRACE);
    let mut ctx = EngineContext::new();
    let mut session = ctx.begin_load(&path).expect("begin load");
    let mut steps = 0;
    let summary = loop {
        match session.step(&mut ctx, 1) {
            ParseStep::InProgress { .. } => steps += 1,
            ParseStep::Complete(summary) => break summary,
        }
    };
    // one element per step: the host controls the yield cadence
    assert!(steps >= 5);
    assert_eq!(summary.node_count, 2);
    assert_eq!(summary.packet_count, 1);
}

#[test]
fn progress_callback_reports_rx_totals() {
    let path = write_temp_trace("progress", ROUND_TRIP_TRACE);
    let mut ctx = EngineContext::new();
    let mut session = ctx.begin_load(&path).expect("begin load");
    let mut last = (0, 0);
    loop {
        match session.step(&mut ctx, 1) {
            ParseStep::InProgress {
                parsed_rx,
                total_rx,
            } => last = (parsed_rx, total_rx),
            ParseStep::Complete(_) => break,
        }
    }
    assert_eq!(last.1, 1);
    assert_eq!(last.0, 1);
}

#[test]
fn show_meta_refuses_without_metadata_in_the_trace() {
    let path = write_temp_trace(
        "no-meta",
        concat!(
            "<anim ver=\"netanim-3.103\"/>\n",
            "<node id=\"0\" locX=\"1\" locY=\"1\"/>\n",
            "<node id=\"1\" locX=\"2\" locY=\"2\"/>\n",
            "<p fId=\"0\" fbTx=\"1.0\" lbTx=\"1.0\" tId=\"1\" fbRx=\"1.5\" lbRx=\"1.5\"/>\n",
        ),
    );
    let mut ctx = EngineContext::new();
    ctx.load_trace(&path, |_, _| {}).expect("load trace");
    assert!(!ctx.set_show_meta(true));

    let mut ctx = loaded_context("with-meta");
    assert!(ctx.set_show_meta(true));
}

#[test]
fn node_updates_apply_at_their_timestamp() {
    let path = write_temp_trace(
        "node-update",
        concat!(
            "<anim ver=\"netanim-3.103\"/>\n",
            "<node id=\"0\" locX=\"1\" locY=\"1\" descr=\"before\"/>\n",
            "<nodeupdate id=\"0\" descr=\"after\" r=\"0\" g=\"255\" b=\"0\" visible=\"1\" t=\"5.0\"/>\n",
        ),
    );
    let mut ctx = EngineContext::new();
    ctx.load_trace(&path, |_, _| {}).expect("load trace");

    ctx.tick(t(1.0));
    assert_eq!(ctx.nodes().get(NodeId(0)).unwrap().description(), "before");

    ctx.tick(t(6.0));
    let node = ctx.nodes().get(NodeId(0)).unwrap();
    assert_eq!(node.description(), "after");
    assert_eq!(node.color(), Some((0, 255, 0)));

    // seeking back re-applies the earlier value
    ctx.tick(t(1.0));
    assert_eq!(ctx.nodes().get(NodeId(0)).unwrap().description(), "before");
}

#[test]
fn link_updates_apply_at_their_timestamp() {
    let path = write_temp_trace(
        "link-update",
        concat!(
            "<anim ver=\"netanim-3.103\"/>\n",
            "<node id=\"0\" locX=\"1\" locY=\"1\"/>\n",
            "<node id=\"1\" locX=\"2\" locY=\"2\"/>\n",
            "<link fromId=\"0\" toId=\"1\" fd=\"\" td=\"\" ld=\"old\"/>\n",
            "<linkupdate fromId=\"0\" toId=\"1\" ld=\"new\" t=\"3.0\"/>\n",
        ),
    );
    let mut ctx = EngineContext::new();
    ctx.load_trace(&path, |_, _| {}).expect("load trace");

    ctx.tick(t(1.0));
    assert_eq!(
        ctx.links().find(NodeId(0), NodeId(1)).unwrap().current_description(),
        "old"
    );
    ctx.tick(t(4.0));
    assert_eq!(
        ctx.links().find(NodeId(0), NodeId(1)).unwrap().current_description(),
        "new"
    );
}

#[test]
fn load_failure_reports_invalid_file() {
    let mut ctx = EngineContext::new();
    let missing = std::env::temp_dir().join("netanim-rs-missing-trace.xml");
    assert!(ctx.load_trace(&missing, |_, _| {}).is_err());
}
