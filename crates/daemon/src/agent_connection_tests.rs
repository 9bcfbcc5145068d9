use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use kpr_agent::ActiveUserProbe;
use kpr_repo::{Entry as RepoEntry, Filter, RepoError, Repository};
use kpr_wire::Packer;

use super::*;

#[derive(Clone, Default)]
struct FakeActiveUserProbe {
    user: Arc<Mutex<Option<String>>>,
}

impl FakeActiveUserProbe {
    fn new(user: impl Into<String>) -> Self {
        Self {
            user: Arc::new(Mutex::new(Some(user.into()))),
        }
    }

    fn set(&self, user: impl Into<String>) {
        *self.user.lock() = Some(user.into());
    }
}

impl ActiveUserProbe for FakeActiveUserProbe {
    fn current_user(&self) -> Option<String> {
        self.user.lock().clone()
    }
}

struct NullRepo;

impl Repository for NullRepo {
    fn add(&mut self, _entry: &RepoEntry) -> Result<(), RepoError> {
        Ok(())
    }
    fn query_users(&self) -> Vec<String> {
        Vec::new()
    }
    fn query_entries(&self, _filter: &Filter) -> Vec<RepoEntry> {
        Vec::new()
    }
}

fn framed(value: serde_json::Value) -> Vec<u8> {
    framed_raw(&serde_json::to_vec(&value).unwrap())
}

fn framed_raw(payload: &[u8]) -> Vec<u8> {
    let mut packer = Packer::new(payload);
    let mut out = Vec::new();
    loop {
        let mut chunk = Vec::new();
        if packer.get(&mut chunk, 4096) == 0 {
            break;
        }
        out.extend_from_slice(&chunk);
    }
    out
}

fn setup(
    token: Option<&str>,
    user_probe: FakeActiveUserProbe,
) -> (
    AgentConnection<FakeActiveUserProbe>,
    mpsc::Receiver<crate::connection::OutboundFrame>,
    Arc<AgentManager>,
) {
    let manager = Arc::new(AgentManager::new());
    let (conn, writes_rx) = setup_with_manager(1, token, user_probe, Arc::clone(&manager));
    (conn, writes_rx, manager)
}

/// Like [`setup`], but joins a manager shared with other connections — for
/// covering arbitration between multiple in-flight `AgentConnection`s.
fn setup_with_manager(
    id: u64,
    token: Option<&str>,
    user_probe: FakeActiveUserProbe,
    manager: Arc<AgentManager>,
) -> (
    AgentConnection<FakeActiveUserProbe>,
    mpsc::Receiver<crate::connection::OutboundFrame>,
) {
    let (writes_tx, writes_rx) = mpsc::channel(8);
    let communicator = Communicator::new(writes_tx);
    let shared_token = Arc::new(Mutex::new(token.map(str::to_string)));
    let auth_handler = AuthorizationHandler::new(shared_token);
    let data_handler = DataHandler::new(Arc::new(Mutex::new(NullRepo)));
    let conn = AgentConnection::new(
        ConnId::new(id),
        communicator,
        auth_handler,
        data_handler,
        manager,
        user_probe,
    );
    (conn, writes_rx)
}

#[tokio::test]
async fn successful_auth_transitions_and_notifies_manager() {
    let (conn, mut writes_rx, manager) = setup(Some("tok"), FakeActiveUserProbe::new("alice"));
    let (drive_tx, drive_rx) = mpsc::channel(8);
    let run = tokio::spawn(conn.run(drive_rx));

    drive_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "auth",
            "message": {"username": "alice", "token": "tok"}
        }))))
        .await
        .unwrap();

    let (payload, _ack) = writes_rx.recv().await.unwrap();
    let response: kpr_wire::Response = serde_json::from_slice(&payload).unwrap();
    assert_eq!(response.answer.unwrap()["authorized"], true);
    assert!(manager.has_authorized_agent());

    drop(drive_tx);
    run.await.unwrap();
    assert!(!manager.has_authorized_agent());
}

#[tokio::test]
async fn wrong_token_does_not_authorize() {
    let (conn, mut writes_rx, manager) = setup(Some("tok"), FakeActiveUserProbe::new("alice"));
    let (drive_tx, drive_rx) = mpsc::channel(8);
    let run = tokio::spawn(conn.run(drive_rx));

    drive_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "auth",
            "message": {"username": "alice", "token": "nope"}
        }))))
        .await
        .unwrap();

    let (payload, _ack) = writes_rx.recv().await.unwrap();
    let response: kpr_wire::Response = serde_json::from_slice(&payload).unwrap();
    assert_eq!(response.answer.unwrap()["authorized"], false);
    assert!(!manager.has_authorized_agent());

    drop(drive_tx);
    run.await.unwrap();
}

#[tokio::test]
async fn data_before_auth_closes_connection() {
    let (conn, _writes_rx, _manager) = setup(Some("tok"), FakeActiveUserProbe::new("alice"));
    let (drive_tx, drive_rx) = mpsc::channel(8);
    let run = tokio::spawn(conn.run(drive_rx));

    drive_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "data",
            "message": {"username": "alice", "entry": {
                "proc": {"path": "/bin/x"},
                "wnd": {"title": "t", "lt": [0, 0], "wh": [1, 1], "img": {"encoded": false}},
                "ts": {"when": 1, "dur": 0}
            }}
        }))))
        .await
        .unwrap();

    run.await.unwrap();
}

#[tokio::test]
async fn idle_timeout_disconnects_on_user_mismatch() {
    let user_probe = FakeActiveUserProbe::new("alice");
    let (conn, mut writes_rx, manager) = setup(Some("tok"), user_probe.clone());
    let (drive_tx, drive_rx) = mpsc::channel(8);
    let run = tokio::spawn(conn.run(drive_rx));

    drive_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "auth",
            "message": {"username": "alice", "token": "tok"}
        }))))
        .await
        .unwrap();
    let _ = writes_rx.recv().await.unwrap();
    assert!(manager.has_authorized_agent());

    user_probe.set("bob");
    drive_tx.send(ConnEvent::Timeout).await.unwrap();

    run.await.unwrap();
    assert!(!manager.has_authorized_agent());
}

#[tokio::test]
async fn idle_timeout_without_mismatch_stays_connected() {
    let user_probe = FakeActiveUserProbe::new("alice");
    let (conn, mut writes_rx, manager) = setup(Some("tok"), user_probe.clone());
    let (drive_tx, drive_rx) = mpsc::channel(8);
    let run = tokio::spawn(conn.run(drive_rx));

    drive_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "auth",
            "message": {"username": "alice", "token": "tok"}
        }))))
        .await
        .unwrap();
    let _ = writes_rx.recv().await.unwrap();

    drive_tx.send(ConnEvent::Timeout).await.unwrap();
    // Give the task a chance to process the timeout without closing.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(manager.has_authorized_agent());

    drop(drive_tx);
    run.await.unwrap();
}

#[tokio::test]
async fn only_one_of_two_concurrent_connections_is_authorized() {
    let manager = Arc::new(AgentManager::new());
    let (conn_a, mut writes_a) =
        setup_with_manager(1, Some("tok"), FakeActiveUserProbe::new("alice"), Arc::clone(&manager));
    let (conn_b, mut writes_b) =
        setup_with_manager(2, Some("tok"), FakeActiveUserProbe::new("bob"), Arc::clone(&manager));

    let (drive_a_tx, drive_a_rx) = mpsc::channel(8);
    let (drive_b_tx, drive_b_rx) = mpsc::channel(8);
    let run_a = tokio::spawn(conn_a.run(drive_a_rx));
    let run_b = tokio::spawn(conn_b.run(drive_b_rx));

    // Both connections present the same valid token before either is given
    // a chance to release the slot.
    drive_a_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "auth",
            "message": {"username": "alice", "token": "tok"}
        }))))
        .await
        .unwrap();
    drive_b_tx
        .send(ConnEvent::Data(framed(serde_json::json!({
            "name": "auth",
            "message": {"username": "bob", "token": "tok"}
        }))))
        .await
        .unwrap();

    let (payload_a, _) = writes_a.recv().await.unwrap();
    let (payload_b, _) = writes_b.recv().await.unwrap();
    let response_a: kpr_wire::Response = serde_json::from_slice(&payload_a).unwrap();
    let response_b: kpr_wire::Response = serde_json::from_slice(&payload_b).unwrap();
    let a_authorized = response_a.answer.unwrap()["authorized"].as_bool().unwrap();
    let b_authorized = response_b.answer.unwrap()["authorized"].as_bool().unwrap();

    assert!(a_authorized ^ b_authorized, "exactly one connection must be authorized");
    assert!(manager.has_authorized_agent());

    drop(drive_a_tx);
    drop(drive_b_tx);
    run_a.await.unwrap();
    run_b.await.unwrap();
    assert!(!manager.has_authorized_agent());
}

#[tokio::test]
async fn malformed_payload_closes_connection() {
    let (conn, _writes_rx, _manager) = setup(Some("tok"), FakeActiveUserProbe::new("alice"));
    let (drive_tx, drive_rx) = mpsc::channel(8);
    let run = tokio::spawn(conn.run(drive_rx));

    drive_tx.send(ConnEvent::Data(framed_raw(b"not json"))).await.unwrap();
    run.await.unwrap();
}
