use crate::anim::{NodeId, PacketMeta, PacketRegistry};
use crate::engine::AnimTime;

fn t(s: f64) -> AnimTime {
    AnimTime::from_secs(s)
}

fn add_simple(registry: &mut PacketRegistry, from: u32, to: u32) -> Option<u64> {
    registry
        .add(
            NodeId(from),
            NodeId(to),
            t(1.0),
            t(1.0),
            Some(t(2.0)),
            Some(t(2.0)),
            false,
            None,
        )
        .map(|id| id.0)
}

#[test]
fn packet_to_self_is_rejected_at_creation() {
    let mut registry = PacketRegistry::default();
    assert_eq!(add_simple(&mut registry, 3, 3), None);
    assert!(registry.is_empty());
}

#[test]
fn anim_ids_are_assigned_monotonically() {
    let mut registry = PacketRegistry::default();
    assert_eq!(add_simple(&mut registry, 0, 1), Some(0));
    assert_eq!(add_simple(&mut registry, 1, 0), Some(1));
    assert_eq!(add_simple(&mut registry, 0, 2), Some(2));
}

#[test]
fn meta_seen_tracks_any_parsed_metadata() {
    let mut registry = PacketRegistry::default();
    add_simple(&mut registry, 0, 1);
    assert!(!registry.meta_seen());
    registry.add(
        NodeId(0),
        NodeId(1),
        t(1.0),
        t(1.0),
        Some(t(2.0)),
        Some(t(2.0)),
        false,
        Some("ns3::UdpHeader (49153 > 9)"),
    );
    assert!(registry.meta_seen());
}

#[test]
fn meta_parses_protocol_chain_and_ipv4_endpoints() {
    let meta = PacketMeta::parse(
        "ns3::Ipv4Header (tos 0x0 ttl 64 protocol 17 10.1.3.1 > 10.1.2.2) ns3::UdpHeader (49153 > 9)",
    );
    assert_eq!(meta.protocols, vec!["Ipv4", "Udp"]);
    let ipv4 = meta.ipv4.expect("ipv4 info");
    assert_eq!(ipv4.src.as_deref(), Some("10.1.3.1"));
    assert_eq!(ipv4.dst.as_deref(), Some("10.1.2.2"));
    assert_eq!(meta.short, "Ipv4 Udp");
}

#[test]
fn meta_parses_wifi_mac_address_roles() {
    let meta = PacketMeta::parse(
        "ns3::WifiMacHeader (DATA ToDS=0, FromDS=1 Duration/ID=313us, \
         DA=00:00:00:00:00:07, SA=00:00:00:00:00:01)",
    );
    let wifi = meta.wifi.expect("wifi info");
    assert_eq!(wifi.da.as_deref(), Some("00:00:00:00:00:07"));
    assert_eq!(wifi.sa.as_deref(), Some("00:00:00:00:00:01"));
    assert_eq!(wifi.ra, None);
}

#[test]
fn unrecognized_sub_records_still_contribute_protocol_names() {
    let meta = PacketMeta::parse("ns3::ArpHeader (request)");
    assert_eq!(meta.protocols, vec!["Arp"]);
    assert!(meta.wifi.is_none());
    assert!(meta.ipv4.is_none());
}

#[test]
fn selection_flag_is_the_only_mutable_state() {
    let mut registry = PacketRegistry::default();
    let id = add_simple(&mut registry, 0, 1).unwrap();
    let packet = registry.get_mut(crate::anim::AnimPacketId(id)).unwrap();
    assert!(packet.selected());
    packet.set_selected(false);
    assert!(!registry.get(crate::anim::AnimPacketId(id)).unwrap().selected());
}

#[test]
fn reset_clears_packets_and_id_counter() {
    let mut registry = PacketRegistry::default();
    add_simple(&mut registry, 0, 1);
    registry.reset();
    assert!(registry.is_empty());
    assert_eq!(add_simple(&mut registry, 0, 1), Some(0));
}
