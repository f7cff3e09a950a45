use crate::anim::{LinkRegistry, NodeId, NodeRegistry, NodeShape};

fn nodes(ids: &[u32]) -> NodeRegistry {
    let mut registry = NodeRegistry::default();
    for id in ids {
        registry.add(NodeId(*id), NodeShape::Circle, 10.0, "", None);
    }
    registry
}

#[test]
fn add_rejects_unknown_endpoints() {
    let mut registry = nodes(&[0]);
    let mut links = LinkRegistry::default();
    assert!(!links.add(NodeId(0), NodeId(1), true, "", "", "", &mut registry));
    assert!(links.is_empty());
}

#[test]
fn links_of_the_same_pair_accumulate() {
    let mut registry = nodes(&[0, 1]);
    let mut links = LinkRegistry::default();
    assert!(links.add(NodeId(0), NodeId(1), true, "", "", "a", &mut registry));
    assert!(links.add(NodeId(0), NodeId(1), true, "", "", "b", &mut registry));
    assert_eq!(links.len(), 2);
}

#[test]
fn interface_descriptions_populate_endpoint_address_sets() {
    let mut registry = nodes(&[0, 1]);
    let mut links = LinkRegistry::default();
    links.add(
        NodeId(0),
        NodeId(1),
        true,
        "10.0.0.1~00:00:00:00:00:01",
        "10.0.0.2~00:00:00:00:00:02",
        "L1",
        &mut registry,
    );
    let a = registry.get(NodeId(0)).unwrap();
    assert!(a.has_ipv4("10.0.0.1"));
    assert!(a.has_mac("00:00:00:00:00:01"));
    let b = registry.get(NodeId(1)).unwrap();
    assert!(b.has_ipv4("10.0.0.2"));
    assert!(b.has_mac("00:00:00:00:00:02"));
}

#[test]
fn malformed_interface_description_adds_nothing() {
    let mut registry = nodes(&[0, 1]);
    let mut links = LinkRegistry::default();
    links.add(NodeId(0), NodeId(1), true, "no-tilde-here", "", "", &mut registry);
    assert!(registry.get(NodeId(0)).unwrap().ipv4_addresses().is_empty());
}

#[test]
fn find_matches_either_orientation() {
    let mut registry = nodes(&[0, 1]);
    let mut links = LinkRegistry::default();
    links.add(NodeId(0), NodeId(1), true, "", "", "L1", &mut registry);
    assert!(links.find(NodeId(0), NodeId(1)).is_some());
    assert!(links.find(NodeId(1), NodeId(0)).is_some());
    assert!(links.find(NodeId(1), NodeId(2)).is_none());
}

#[test]
fn update_description_keeps_the_original() {
    let mut registry = nodes(&[0, 1]);
    let mut links = LinkRegistry::default();
    links.add(NodeId(0), NodeId(1), true, "", "", "original", &mut registry);
    let link = links.find_mut(NodeId(0), NodeId(1)).unwrap();
    link.update_description("updated");
    assert_eq!(link.current_description(), "updated");
    assert_eq!(link.original_description(), "original");
}

#[test]
fn non_p2p_self_association_is_allowed() {
    let mut registry = nodes(&[4]);
    let mut links = LinkRegistry::default();
    assert!(links.add(
        NodeId(4),
        NodeId(4),
        false,
        "10.0.0.4~00:00:00:00:00:04",
        "",
        "",
        &mut registry
    ));
    let link = links.find(NodeId(4), NodeId(4)).unwrap();
    assert!(!link.is_p2p());
    assert!(registry.get(NodeId(4)).unwrap().has_ipv4("10.0.0.4"));
}
