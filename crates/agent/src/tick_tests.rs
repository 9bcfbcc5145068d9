use std::path::PathBuf;
use std::time::Duration;

use kpr_core::FakeClock;
use kpr_wire::WireMessage;

use super::*;
use crate::os::ForegroundWindow;

struct FakeWindowProbe {
    window: Option<ForegroundWindow>,
}

impl ForegroundWindowProbe for FakeWindowProbe {
    fn current(&self) -> Option<ForegroundWindow> {
        self.window.clone()
    }
}

struct FakeScreenCapture {
    bytes: Vec<u8>,
}

impl ScreenCapture for FakeScreenCapture {
    fn capture(&self, _rect: Rect) -> Result<Vec<u8>, AgentError> {
        Ok(self.bytes.clone())
    }
}

fn window_at(owner_path: PathBuf) -> ForegroundWindow {
    ForegroundWindow {
        title: "Untitled Document".to_string(),
        rect: Rect {
            x: 10,
            y: 20,
            w: 640,
            h: 480,
        },
        owner_pid: 1234,
        owner_path,
    }
}

async fn decode_one(buffer: &[u8]) -> WireMessage {
    let mut cursor = std::io::Cursor::new(buffer.to_vec());
    let payload = kpr_wire::read_message(&mut cursor).await.unwrap();
    serde_json::from_slice(&payload).unwrap()
}

#[tokio::test]
async fn tick_with_no_foreground_window_sends_nothing() {
    let clock = FakeClock::new();
    let mut probe = ProbeLoop::new(
        clock,
        FakeWindowProbe { window: None },
        FakeScreenCapture { bytes: vec![] },
        "alice",
        false,
        Duration::from_secs(60),
    );
    let mut buffer = Vec::new();
    probe.tick(&mut buffer).await;
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn tick_with_empty_owner_path_sends_nothing() {
    let clock = FakeClock::new();
    let mut probe = ProbeLoop::new(
        clock,
        FakeWindowProbe {
            window: Some(window_at(PathBuf::new())),
        },
        FakeScreenCapture { bytes: vec![] },
        "alice",
        false,
        Duration::from_secs(60),
    );
    let mut buffer = Vec::new();
    probe.tick(&mut buffer).await;
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn tick_sends_data_message_without_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("editor.exe");
    std::fs::write(&exe, b"binary").unwrap();

    let clock = FakeClock::new();
    let mut probe = ProbeLoop::new(
        clock,
        FakeWindowProbe {
            window: Some(window_at(exe.clone())),
        },
        FakeScreenCapture { bytes: vec![] },
        "alice",
        false,
        Duration::from_secs(60),
    );

    let mut buffer = Vec::new();
    probe.tick(&mut buffer).await;
    assert!(!buffer.is_empty());

    let message = decode_one(&buffer).await;
    let WireMessage::Data(req) = message else {
        panic!("expected a data message");
    };
    assert_eq!(req.username, "alice");
    assert_eq!(req.entry.proc.path, exe.display().to_string());
    assert_eq!(req.entry.wnd.title, "Untitled Document");
    assert_eq!(req.entry.wnd.lt, (10, 20));
    assert_eq!(req.entry.wnd.wh, (640, 480));
    assert!(req.entry.proc.sha256.is_some());
    assert_eq!(req.entry.wnd.img.decode_bytes().unwrap(), None);
}

#[tokio::test]
async fn tick_captures_snapshot_when_due() {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("editor.exe");
    std::fs::write(&exe, b"binary").unwrap();

    let clock = FakeClock::new();
    let mut probe = ProbeLoop::new(
        clock,
        FakeWindowProbe {
            window: Some(window_at(exe)),
        },
        FakeScreenCapture {
            bytes: b"jpegbytes".to_vec(),
        },
        "alice",
        true,
        Duration::from_secs(60),
    );

    let mut buffer = Vec::new();
    probe.tick(&mut buffer).await;
    let message = decode_one(&buffer).await;
    let WireMessage::Data(req) = message else {
        panic!("expected a data message");
    };
    let decoded = req.entry.wnd.img.decode_bytes().unwrap();
    assert_eq!(decoded, Some(b"jpegbytes".to_vec()));
    assert!(req.entry.wnd.img.name.as_ref().unwrap().starts_with("img-"));
}

#[tokio::test]
async fn tick_does_not_recapture_before_interval_elapses() {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("editor.exe");
    std::fs::write(&exe, b"binary").unwrap();

    let clock = FakeClock::new();
    let mut probe = ProbeLoop::new(
        clock.clone(),
        FakeWindowProbe {
            window: Some(window_at(exe)),
        },
        FakeScreenCapture {
            bytes: b"jpegbytes".to_vec(),
        },
        "alice",
        true,
        Duration::from_secs(60),
    );

    let mut first = Vec::new();
    probe.tick(&mut first).await;
    let first_msg = decode_one(&first).await;
    let WireMessage::Data(first_req) = first_msg else {
        panic!("expected a data message");
    };
    assert!(first_req.entry.wnd.img.decode_bytes().unwrap().is_some());

    clock.advance(Duration::from_secs(1));
    let mut second = Vec::new();
    probe.tick(&mut second).await;
    let second_msg = decode_one(&second).await;
    let WireMessage::Data(second_req) = second_msg else {
        panic!("expected a data message");
    };
    assert!(second_req.entry.wnd.img.decode_bytes().unwrap().is_none());
}
