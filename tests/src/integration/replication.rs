//! Versioning, deltas, roles, and the sync surface.

use crate::init_tracing;
use canopy_engine::{
    process_request, AcceptAllRevisions, Engine, Request, Role, StatusCode,
};
use canopy_tree::{Element, TreeDelta};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn create(engine: &mut Engine, section: &str, element: Element) {
    let reply = process_request(
        engine,
        &AcceptAllRevisions,
        &Request::new("create").with_section(section).with_fragment(element),
    );
    assert_eq!(reply.rc, StatusCode::Ok);
}

#[test]
fn test_sync_requires_primary_role() {
    init_tracing();
    let mut engine = Engine::new();
    assert_eq!(engine.role(), Role::Replica);

    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("sync"));
    assert_eq!(reply.rc, StatusCode::NotPrimary);

    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("primary"));
    assert_eq!(reply.rc, StatusCode::Ok);
    assert_eq!(engine.role(), Role::Primary);

    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("sync"));
    assert_eq!(reply.rc, StatusCode::Ok);
    // The sync handler produces no output; the replication layer reads the
    // committed document itself.
    assert!(reply.output.is_none());
}

#[test]
fn test_replica_all_demotes_a_primary() {
    init_tracing();
    let mut engine = Engine::new();
    process_request(&mut engine, &AcceptAllRevisions, &Request::new("primary"));
    assert_eq!(engine.role(), Role::Primary);

    process_request(&mut engine, &AcceptAllRevisions, &Request::new("replica_all"));
    assert_eq!(engine.role(), Role::Replica);
    let reply = process_request(&mut engine, &AcceptAllRevisions, &Request::new("is_primary"));
    assert_eq!(reply.rc, StatusCode::NotPrimary);
}

#[test]
fn test_global_update_replays_a_primary_change_on_a_replica() {
    init_tracing();
    let mut primary = Engine::new();
    let mut replica = Engine::new();
    let baseline = primary.document().clone();
    assert_eq!(replica.document(), &baseline);

    create(
        &mut primary,
        "resources",
        Element::new("primitive")
            .with_attr("id", "rsc1")
            .with_attr("class", "ocf"),
    );

    let diff = TreeDelta::between(&baseline, primary.document());
    let push = Request::new("apply_diff").as_global_update(diff);
    let reply = process_request(&mut replica, &AcceptAllRevisions, &push);

    assert_eq!(reply.rc, StatusCode::Ok);
    assert!(reply.config_changed);
    // Counters travel inside the diff; the replica converges exactly.
    assert_eq!(replica.document(), primary.document());
    assert_eq!(replica.document().num_updates(), 1);
}

#[test]
fn test_global_update_against_diverged_replica_does_not_apply() {
    init_tracing();
    let mut primary = Engine::new();
    let mut replica = Engine::new();
    let baseline = primary.document().clone();

    create(
        &mut primary,
        "resources",
        Element::new("primitive").with_attr("id", "rsc1"),
    );
    // The replica took a local write the primary never saw.
    create(
        &mut replica,
        "nodes",
        Element::new("node").with_attr("id", "n1"),
    );
    let diverged = replica.document().clone();

    let diff = TreeDelta::between(&baseline, primary.document());
    let reply = process_request(
        &mut replica,
        &AcceptAllRevisions,
        &Request::new("apply_diff").as_global_update(diff),
    );

    assert_eq!(reply.rc, StatusCode::DeltaMismatch);
    assert_eq!(replica.document(), &diverged);
}

#[test]
fn test_missing_diff_operand_is_rejected_at_execution() {
    init_tracing();
    let mut engine = Engine::new();
    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("apply_diff"),
    );
    assert_eq!(reply.rc, StatusCode::NoInput);
}

#[test]
fn test_forward_copy_carries_routing_but_not_payload() {
    init_tracing();
    let mut request = Request::new("modify")
        .with_section("resources")
        .with_fragment(Element::new("primitive").with_attr("id", "rsc1"));
    request.client_id = Some("crmd".to_string());
    request.call_id = Some(42);
    request.host = Some("node-1".to_string());

    let forwarded = request.forward_copy(false);
    assert_eq!(forwarded.client_id.as_deref(), Some("crmd"));
    assert_eq!(forwarded.call_id, Some(42));
    assert_eq!(forwarded.host.as_deref(), Some("node-1"));
    assert!(forwarded.call_data.is_none());

    // A delegated request that needs the operand keeps it.
    assert!(request.forward_copy(true).call_data.is_some());
}

#[test]
fn test_shutdown_request_sets_intent_without_touching_the_document() {
    init_tracing();
    let mut engine = Engine::new();
    let committed = engine.document().clone();

    let reply = process_request(
        &mut engine,
        &AcceptAllRevisions,
        &Request::new("shutdown_req"),
    );
    assert_eq!(reply.rc, StatusCode::Ok);
    assert!(engine.shutdown_requested());
    assert_eq!(engine.document(), &committed);
}

#[test]
fn test_request_survives_the_wire() {
    init_tracing();
    let request = Request::new("create")
        .with_section("resources")
        .with_fragment(Element::new("primitive").with_attr("id", "rsc1"));

    let json = serde_json::to_string(&request).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();

    assert_eq!(back.request_id, request.request_id);
    assert_eq!(back.operation, request.operation);
    assert_eq!(back.section, request.section);
    assert_eq!(back.call_data, request.call_data);
    assert_eq!(back.call_options, request.call_options);
}

#[test]
fn test_randomized_history_converges_through_deltas() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut primary = Engine::new();
    let mut replica = Engine::new();

    for round in 0..30 {
        let before = primary.document().clone();
        let score: u32 = rng.gen_range(0..1000);
        create(
            &mut primary,
            "resources",
            Element::new("primitive")
                .with_attr("id", format!("rsc{round}"))
                .with_attr("score", score.to_string()),
        );

        let diff = TreeDelta::between(&before, primary.document());
        let reply = process_request(
            &mut replica,
            &AcceptAllRevisions,
            &Request::new("apply_diff").as_global_update(diff),
        );
        assert_eq!(reply.rc, StatusCode::Ok, "round {round}");
    }

    assert_eq!(replica.document(), primary.document());
    assert_eq!(replica.document().num_updates(), 30);
}
