//! End-to-end exercises against a scripted device.
//!
//! Each test scripts the device side of a full exchange into the mock
//! transport, then drives the public client surface the way a QA
//! harness would: unlock, query, transfer, inspect the UI snapshot.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use cdclink_client::api::developer_mode::{self, key_codes, KeyPress};
use cdclink_client::api::{device_info, security};
use cdclink_client::transfer::{self, TransferOptions};
use cdclink_client::Session;
use cdclink_protocol::frame;
use cdclink_transport::mock::MockTransport;

fn reply_frame(endpoint: u8, status: u16, body: Value) -> Vec<u8> {
    let payload = serde_json::to_vec(&json!({
        "endpoint": endpoint,
        "status": status,
        "uuid": 1,
        "body": body,
    }))
    .expect("valid JSON");
    frame::encode(&payload).expect("payload fits the length field")
}

fn chunk_payload(data: &[u8]) -> String {
    let mut text = BASE64.encode(data);
    text.push('\n');
    text
}

fn list_item(focus: bool, visible: bool, text: &str) -> Value {
    json!({"ListItem": {
        "Active": true, "Focus": focus, "ItemType": 1, "Visible": visible,
        "ChildrenCount": 1,
        "Children": [{"Label": {
            "Active": true, "Focus": focus, "ItemType": 0, "Visible": visible,
            "ChildrenCount": 0, "TextValue": text,
        }}],
    }})
}

#[test]
fn test_unlock_then_inspect_flow() {
    let mut mock = MockTransport::new();
    // Lock status: locked, then unlock accepted, then unlocked.
    mock.queue_bytes(&reply_frame(13, 403, json!({})));
    mock.queue_bytes(&reply_frame(13, 200, json!({})));
    mock.queue_bytes(&reply_frame(13, 200, json!({})));
    // Key press ack and device info.
    mock.queue_bytes(&reply_frame(11, 200, json!({})));
    mock.queue_bytes(&reply_frame(
        1,
        200,
        json!({"gitRevision": "77aa01b", "batteryLevel": "82"}),
    ));
    let mut session = Session::new(mock);

    assert!(security::is_phone_locked(&mut session).expect("lock query"));
    security::unlock_phone(&mut session, &security::DEFAULT_PASSCODE).expect("unlock");
    assert!(!security::is_phone_locked(&mut session).expect("lock query"));

    developer_mode::send_key(&mut session, key_codes::ENTER, KeyPress::Short).expect("key press");

    let info = device_info::get_device_info(&mut session).expect("device info");
    assert_eq!(info["batteryLevel"], "82");
}

#[test]
fn test_round_trip_file_through_device() {
    // Store a file, then fetch it back from a device that echoes the
    // same content in different chunking.
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 241) as u8).collect();
    let crc = format!("{:08x}", crc32fast::hash(&content));

    let mut mock = MockTransport::new();
    // Store: init + 3 chunk acks (chunk size 4096).
    mock.queue_bytes(&reply_frame(3, 200, json!({"txID": 11, "chunkSize": 4096})));
    for _ in 0..3 {
        mock.queue_bytes(&reply_frame(3, 200, json!({})));
    }
    // Fetch: init + 2 chunks (chunk size 8192).
    mock.queue_bytes(&reply_frame(
        3,
        200,
        json!({
            "rxID": 12,
            "chunkSize": 8192,
            "fileSize": content.len() as u64,
            "fileCrc32": crc,
        }),
    ));
    for slice in content.chunks(8192) {
        mock.queue_bytes(&reply_frame(3, 200, json!({"data": chunk_payload(slice)})));
    }
    let mut session = Session::new(mock);

    let sent = transfer::put(&mut session, "/sys/user/blob.bin", &content, None)
        .expect("store should succeed");
    assert_eq!(sent, content.len() as u64);

    let mut fetched = Vec::new();
    let received = transfer::get(
        &mut session,
        "/sys/user/blob.bin",
        &mut fetched,
        &TransferOptions::default(),
        None,
    )
    .expect("fetch should succeed");
    assert_eq!(received, content.len() as u64);
    assert_eq!(fetched, content);
}

#[test]
fn test_window_snapshot_drives_list_navigation() {
    let dom = json!({"Window": {
        "Active": true, "Focus": true, "ItemType": 0, "Visible": true,
        "ChildrenCount": 1,
        "Children": [{"ListView": {
            "Active": true, "Focus": true, "ItemType": 2, "Visible": true,
            "ChildrenCount": 3,
            "Children": [
                list_item(false, true, "Contacts"),
                list_item(true, true, "Messages"),
                list_item(false, false, "Settings"),
            ],
        }}],
    }});

    let mut mock = MockTransport::new();
    mock.queue_bytes(&reply_frame(11, 200, json!({"dom": dom})));
    let mut session = Session::new(mock);

    let root = developer_mode::get_window_snapshot(&mut session).expect("snapshot");
    let list = root
        .find_all(|node| node.type_name() == "ListView")
        .expect("within budget")
        .into_iter()
        .next()
        .expect("list present");

    // The focused, visible entry is the second one.
    let pairs = [("Visible", json!(true)), ("Focus", json!(true))];
    assert_eq!(list.index_of_child_that_contains_all(&pairs), Some(1));

    // Its label is reachable depth first.
    let focused = &list.children()[1];
    assert_eq!(
        focused.find_first_attribute_depth_first("TextValue"),
        Some(&json!("Messages"))
    );

    // The list's parent in the snapshot is the window.
    assert_eq!(
        root.find_parent_of("ListView").map(|node| node.type_name()),
        Some("Window")
    );
}
