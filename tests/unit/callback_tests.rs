//! Unit tests for the callback payload wire format.

use teledo::dispatch::callbacks::CallbackPayload;

#[test]
fn parse_splits_action_and_args() {
    let payload = CallbackPayload::parse("view_task|42").expect("valid payload");
    assert_eq!(payload.action, "view_task");
    assert_eq!(payload.args, vec!["42".to_owned()]);
}

#[test]
fn parse_handles_action_without_args() {
    let payload = CallbackPayload::parse("end_short_edit").expect("valid payload");
    assert_eq!(payload.action, "end_short_edit");
    assert!(payload.args.is_empty());
}

#[test]
fn parse_keeps_field_order() {
    let payload = CallbackPayload::parse("short_edit|name|New title|7").expect("valid payload");
    assert_eq!(payload.arg(0), Some("name"));
    assert_eq!(payload.arg(1), Some("New title"));
    assert_eq!(payload.id_arg(2), Some(7));
}

#[test]
fn parse_rejects_empty_payload() {
    assert!(CallbackPayload::parse("").is_none());
    assert!(CallbackPayload::parse("|42").is_none());
}

#[test]
fn id_arg_rejects_non_numeric() {
    let payload = CallbackPayload::parse("view_task|abc").expect("valid payload");
    assert_eq!(payload.id_arg(0), None);
    assert_eq!(payload.id_arg(5), None);
}

#[test]
fn encode_round_trips() {
    let raw = CallbackPayload::encode("change_status", &["42", "done"]);
    assert_eq!(raw, "change_status|42|done");
    let payload = CallbackPayload::parse(&raw).expect("round trip");
    assert_eq!(payload.action, "change_status");
    assert_eq!(payload.id_arg(0), Some(42));
    assert_eq!(payload.arg(1), Some("done"));
}

#[test]
fn empty_trailing_fields_are_preserved() {
    let payload = CallbackPayload::parse("select_user||3").expect("valid payload");
    assert_eq!(payload.arg(0), Some(""));
    assert_eq!(payload.id_arg(1), Some(3));
}
