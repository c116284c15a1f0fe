use super::*;

#[test]
fn appointments_filter_listens_to_every_operation() {
    let value = serde_json::to_value(ChangeFilter::appointments()).unwrap();
    assert_eq!(value, json!({ "event": "*", "schema": "public", "table": "appointments" }));
}

#[test]
fn user_profile_filter_targets_one_row_updates() {
    let value = serde_json::to_value(ChangeFilter::user_profile("u1")).unwrap();
    assert_eq!(value, json!({ "event": "UPDATE", "schema": "public", "table": "users", "filter": "id=eq.u1" }));
}

#[test]
fn join_message_embeds_filter_and_token() {
    let message = join_message("realtime:appointments_changes", &ChangeFilter::appointments(), Some("at-1"));
    assert_eq!(message["event"], "phx_join");
    assert_eq!(message["topic"], "realtime:appointments_changes");
    assert_eq!(message["ref"], JOIN_REF);
    assert_eq!(message["payload"]["access_token"], "at-1");
    assert_eq!(message["payload"]["config"]["postgres_changes"][0]["table"], "appointments");
}

#[test]
fn join_message_without_session_has_no_token() {
    let message = join_message("realtime:x", &ChangeFilter::appointments(), None);
    assert!(message["payload"].get("access_token").is_none());
}

#[test]
fn heartbeat_uses_phoenix_topic() {
    let message = heartbeat_message(7);
    assert_eq!(message["topic"], "phoenix");
    assert_eq!(message["event"], "heartbeat");
    assert_eq!(message["ref"], "7");
}

#[test]
fn decode_postgres_change() {
    let text = json!({
        "topic": "realtime:appointments_changes",
        "event": "postgres_changes",
        "ref": null,
        "payload": {
            "ids": [1],
            "data": {
                "schema": "public",
                "table": "appointments",
                "commit_timestamp": "2024-05-10T14:00:00Z",
                "type": "INSERT",
                "columns": [{ "name": "id", "type": "uuid" }, { "name": "status", "type": "text" }],
                "record": { "id": "a1", "status": "scheduled" },
                "old_record": null,
                "errors": null
            }
        }
    })
    .to_string();
    let Inbound::Change(change) = decode_inbound(&text) else {
        panic!("expected change");
    };
    assert_eq!(change.kind, ChangeKind::Insert);
    assert_eq!(change.table, "appointments");
    assert_eq!(change.record["id"], "a1");
    assert!(change.old_record.is_null());
}

#[test]
fn decode_postgres_delete_keeps_old_record() {
    let text = json!({
        "topic": "realtime:appointments_changes",
        "event": "postgres_changes",
        "ref": null,
        "payload": {
            "ids": [4],
            "data": {
                "schema": "public",
                "table": "appointments",
                "commit_timestamp": "2024-05-10T15:00:00Z",
                "type": "DELETE",
                "columns": [{ "name": "id", "type": "uuid" }],
                "old_record": { "id": "a1" },
                "errors": null
            }
        }
    })
    .to_string();
    let Inbound::Change(change) = decode_inbound(&text) else {
        panic!("expected change");
    };
    assert_eq!(change.kind, ChangeKind::Delete);
    assert!(change.record.is_null());
    assert_eq!(change.old_record["id"], "a1");
}

#[test]
fn decode_postgres_change_with_unknown_type_is_ignored() {
    let text = json!({
        "topic": "realtime:x",
        "event": "postgres_changes",
        "payload": { "data": { "schema": "public", "table": "t", "type": "TRUNCATE" } }
    })
    .to_string();
    assert_eq!(decode_inbound(&text), Inbound::Ignored);
}

#[test]
fn decode_join_ok_is_ignored() {
    let text = json!({
        "topic": "realtime:x", "event": "phx_reply", "ref": "1",
        "payload": { "status": "ok", "response": { "postgres_changes": [] } }
    })
    .to_string();
    assert_eq!(decode_inbound(&text), Inbound::Ignored);
}

#[test]
fn decode_join_error_reports_reason() {
    let text = json!({
        "topic": "realtime:x", "event": "phx_reply", "ref": "1",
        "payload": { "status": "error", "response": { "reason": "Invalid JWT" } }
    })
    .to_string();
    assert_eq!(decode_inbound(&text), Inbound::JoinRefused("Invalid JWT".to_owned()));
}

#[test]
fn decode_heartbeat_reply_is_ignored() {
    let text = json!({ "topic": "phoenix", "event": "phx_reply", "ref": "2", "payload": { "status": "ok" } }).to_string();
    assert_eq!(decode_inbound(&text), Inbound::Ignored);
}

#[test]
fn decode_garbage_is_ignored() {
    assert_eq!(decode_inbound("not json"), Inbound::Ignored);
}

#[test]
fn change_record_decodes_into_typed_row() {
    let change = ChangeEvent {
        kind: ChangeKind::Update,
        schema: "public".to_owned(),
        table: "users".to_owned(),
        commit_timestamp: None,
        record: json!({
            "id": "u1", "email": "a@x.com", "name": "Ana", "role": "patient",
            "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z"
        }),
        old_record: Value::Null,
    };
    let user: model::User = change.record_as().unwrap();
    assert_eq!(user.name, "Ana");
}
