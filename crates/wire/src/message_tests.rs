use super::*;

#[test]
fn auth_message_serializes_to_wire_shape() {
    let msg = WireMessage::Auth(AuthRequest {
        username: "alice".to_string(),
        token: "abc123".to_string(),
    });
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"name": "auth", "message": {"username": "alice", "token": "abc123"}})
    );
}

#[test]
fn data_message_round_trips_through_json() {
    let entry = Entry {
        proc: ProcessInfo {
            path: "/usr/bin/editor".to_string(),
            sha256: Some("deadbeef".to_string()),
        },
        wnd: WindowInfo {
            title: "untitled".to_string(),
            lt: (10, 20),
            wh: (640, 480),
            img: Image::none(),
        },
        ts: Timestamp {
            when: 1_700_000_000_000,
            dur: 15,
        },
    };
    let msg = WireMessage::Data(DataRequest {
        username: "bob".to_string(),
        entry,
    });

    let json = serde_json::to_string(&msg).unwrap();
    let round_tripped: WireMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(round_tripped, msg);
}

#[test]
fn response_omits_absent_optional_fields() {
    let response = Response::ok(None);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({"status": 0}));
}

#[test]
fn response_error_carries_message() {
    let response = Response::error(1, "bad token");
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({"status": 1, "error": "bad token"}));
}

#[test]
fn image_round_trips_base64() {
    let raw = b"\x00\x01not-a-jpeg\x00trailing-null";
    let image = Image::encode_bytes("img-0101-120000.jpg", raw);
    let decoded = image.decode_bytes().unwrap().unwrap();
    assert_eq!(decoded, raw);
}

#[test]
fn image_without_encoding_decodes_to_none() {
    let image = Image::none();
    assert_eq!(image.decode_bytes().unwrap(), None);
}

#[test]
fn entry_json_matches_wire_field_names() {
    let entry = Entry {
        proc: ProcessInfo {
            path: "/bin/sh".to_string(),
            sha256: None,
        },
        wnd: WindowInfo {
            title: "term".to_string(),
            lt: (0, 0),
            wh: (80, 24),
            img: Image::none(),
        },
        ts: Timestamp { when: 0, dur: 0 },
    };
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["proc"]["path"], "/bin/sh");
    assert_eq!(json["wnd"]["lt"], serde_json::json!([0, 0]));
    assert_eq!(json["wnd"]["wh"], serde_json::json!([80, 24]));
    assert_eq!(json["wnd"]["img"]["encoded"], false);
    assert_eq!(json["ts"]["when"], 0);
}
