//! Integration tests for background sync against a mock HTTP service.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use procgather::editor::{Editor, StepPatch};
use procgather::store::LocalStore;
use procgather::sync::{HttpRemote, SyncClient, SyncQueue, SyncStatus};
use serde_json::json;

fn synced_editor(server: &MockServer) -> Editor {
    let store = Arc::new(LocalStore::in_memory());
    let remote = HttpRemote::new(&server.base_url(), Duration::from_secs(5)).unwrap();
    let queue = SyncQueue::start(Arc::clone(&store), SyncClient::new(Arc::new(remote)));
    Editor::new(store).with_sync(queue)
}

#[test]
fn first_save_creates_then_later_saves_update() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST).path("/processes");
        then.status(201).json_body(json!({ "processId": "cloud-7" }));
    });
    let update = server.mock(|when, then| {
        when.method(PUT).path("/processes/cloud-7");
        then.status(200);
    });
    let replace = server.mock(|when, then| {
        when.method(PUT).path("/processes/cloud-7/steps");
        then.status(200);
    });

    let mut editor = synced_editor(&server);
    let process = editor.create_process().unwrap();
    editor.add_step().unwrap();
    editor.save().unwrap();
    editor.wait_for_sync();

    create.assert_calls(1);
    replace.assert_calls(1);
    assert_eq!(
        editor.store().get_process(process.id).unwrap().cloud_id.as_deref(),
        Some("cloud-7")
    );

    editor
        .update_step(0, StepPatch::new().action("Reconcile"))
        .unwrap();
    editor.save().unwrap();
    editor.wait_for_sync();

    create.assert_calls(1);
    update.assert_calls(1);
    replace.assert_calls(2);
    assert_eq!(editor.sync_status(), Some(SyncStatus::Idle));
}

#[test]
fn unreachable_service_keeps_local_save() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/processes");
        then.status(503);
    });

    let mut editor = synced_editor(&server);
    let process = editor.create_process().unwrap();
    editor.add_step().unwrap();
    editor.save().unwrap();
    editor.wait_for_sync();

    assert!(editor.sync_status().unwrap().is_error());
    assert_eq!(editor.store().load_steps(process.id).unwrap().len(), 1);
    assert!(editor
        .store()
        .get_process(process.id)
        .unwrap()
        .cloud_id
        .is_none());
}
