//! Operation semantics exercised through the full request loop.

use crate::init_tracing;
use canopy_engine::{
    process_request, AcceptAllRevisions, CallOptions, Engine, Request, StatusCode,
};
use canopy_tree::{Element, Section, EPOCH_ATTR, NUM_UPDATES_ATTR};

fn create_request(section: &str, element: Element) -> Request {
    Request::new("create").with_section(section).with_fragment(element)
}

fn node(id: &str, uname: &str) -> Element {
    Element::new("node").with_attr("id", id).with_attr("uname", uname)
}

fn engine_with_three_nodes() -> Engine {
    let mut engine = Engine::new();
    for (id, uname) in [("n1", "alpha"), ("n2", "beta"), ("n3", "gamma")] {
        let reply = process_request(
            &mut engine,
            &AcceptAllRevisions,
            &create_request("nodes", node(id, uname)),
        );
        assert_eq!(reply.rc, StatusCode::Ok);
    }
    engine
}

#[test]
fn test_query_nodes_returns_subtree_unmodified() {
    init_tracing();
    let mut engine = engine_with_three_nodes();
    let committed = engine.document().clone();

    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("query").with_section("nodes"),
    );

    assert_eq!(reply.rc, StatusCode::Ok);
    assert!(!reply.config_changed);
    let nodes = reply.output.unwrap();
    assert_eq!(&nodes, committed.section(Section::Nodes).unwrap());
    assert_eq!(nodes.children.len(), 3);
    // The committed document is untouched by a read.
    assert_eq!(engine.document(), &committed);
}

#[test]
fn test_create_with_colliding_id_leaves_document_unchanged() {
    init_tracing();
    let mut engine = engine_with_three_nodes();
    let committed = engine.document().clone();

    // "n2" already identifies a node; a resource may not reuse it.
    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &create_request("resources", Element::new("primitive").with_attr("id", "n2")),
    );

    assert_eq!(reply.rc, StatusCode::IdCollision);
    assert_eq!(engine.document(), &committed);
}

#[test]
fn test_modify_shorthand_on_absent_value_resolves_to_one() {
    init_tracing();
    let mut engine = Engine::new();
    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("modify")
            .with_section("crm_config")
            .with_fragment(
                Element::new("cluster_property")
                    .with_attr("id", "bootstrap")
                    .with_attr("current", "current++"),
            ),
    );
    assert_eq!(reply.rc, StatusCode::Ok);

    let prop = engine
        .document()
        .section(Section::CrmConfig)
        .unwrap()
        .find_child("cluster_property", Some("bootstrap"))
        .unwrap();
    assert_eq!(prop.attr("current"), Some("1"));
}

#[test]
fn test_double_bump_advances_epoch_by_one_each() {
    init_tracing();
    let mut engine = Engine::new();

    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("bump"));
    assert_eq!(reply.rc, StatusCode::Ok);
    assert_eq!(engine.document().epoch(), 1);
    assert_eq!(reply.output.unwrap().attr(EPOCH_ATTR), Some("1"));

    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("bump"));
    assert_eq!(reply.rc, StatusCode::Ok);
    assert_eq!(engine.document().epoch(), 2);
    // Bump owns its sequence-counter contract: reset, not incremented.
    assert_eq!(engine.document().num_updates(), 0);
}

#[test]
fn test_replace_whole_document() {
    init_tracing();
    let mut engine = engine_with_three_nodes();

    let replacement = Element::new("cluster")
        .with_attr(EPOCH_ATTR, "5")
        .with_attr(NUM_UPDATES_ATTR, "0")
        .with_child(Element::new("nodes").with_child(node("n9", "omega")))
        .with_child(Element::new("resources"));

    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("replace").with_fragment(replacement),
    );

    assert_eq!(reply.rc, StatusCode::Ok);
    assert!(reply.config_changed);
    let nodes = engine.document().section(Section::Nodes).unwrap();
    assert!(nodes.find_child("node", Some("n9")).is_some());
    assert!(nodes.find_child("node", Some("n1")).is_none());
    assert_eq!(engine.document().epoch(), 5);
}

#[test]
fn test_delete_removes_matched_element() {
    init_tracing();
    let mut engine = engine_with_three_nodes();

    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("delete")
            .with_section("nodes")
            .with_fragment(Element::new("node").with_attr("id", "n2")),
    );
    assert_eq!(reply.rc, StatusCode::Ok);
    assert!(engine
        .document()
        .section(Section::Nodes)
        .unwrap()
        .find_child("node", Some("n2"))
        .is_none());

    // Deleting it again is NotFound; nothing changes.
    let committed = engine.document().clone();
    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("delete")
            .with_section("nodes")
            .with_fragment(Element::new("node").with_attr("id", "n2")),
    );
    assert_eq!(reply.rc, StatusCode::NotFound);
    assert_eq!(engine.document(), &committed);
}

#[test]
fn test_ping_echoes_document_version() {
    init_tracing();
    let mut engine = engine_with_three_nodes();
    let version = engine.document().version();

    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("ping"));
    assert_eq!(reply.rc, StatusCode::Ok);
    let pong = reply.output.unwrap();
    assert_eq!(pong.tag, "ping_response");
    assert_eq!(
        pong.attr(NUM_UPDATES_ATTR),
        Some(version.num_updates.to_string().as_str())
    );
}

#[test]
fn test_counter_monotonicity_over_mixed_operations() {
    init_tracing();
    let mut engine = Engine::new();
    let mut last = engine.document().num_updates();

    for round in 0..20 {
        let (request, expect_change) = if round % 3 == 0 {
            // Status churn: liveness updates are not configuration changes.
            (
                Request::new("modify").with_section("status").with_fragment(
                    Element::new("node_state")
                        .with_attr("id", "n1")
                        .with_attr("in_ccm", if round % 2 == 0 { "true" } else { "false" }),
                ),
                false,
            )
        } else {
            (
                create_request(
                    "resources",
                    Element::new("primitive").with_attr("id", format!("rsc{round}")),
                ),
                true,
            )
        };

        let reply = process_request(&mut engine, &AcceptAllRevisions, &request);
        assert_eq!(reply.rc, StatusCode::Ok, "round {round}");
        assert_eq!(reply.config_changed, expect_change, "round {round}");

        let now = engine.document().num_updates();
        if expect_change {
            assert_eq!(now, last + 1, "round {round}");
        } else {
            assert_eq!(now, last, "round {round}");
        }
        last = now;
        // The epoch only moves for bump.
        assert_eq!(engine.document().epoch(), 0);
    }
}

#[test]
fn test_update_options_force_diff_collision_still_fails() {
    init_tracing();
    let mut engine = engine_with_three_nodes();
    let committed = engine.document().clone();

    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &create_request("resources", Element::new("primitive").with_attr("id", "n1"))
            .with_options(CallOptions::FORCE_DIFF),
    );

    // Escalated in the logs, identical on the wire.
    assert_eq!(reply.rc, StatusCode::IdCollision);
    assert_eq!(engine.document(), &committed);
}
