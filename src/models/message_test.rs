use super::*;

#[test]
fn test_message_defaults() {
    let msg = Message::default();
    assert_eq!(msg.message_id(), None);
    assert_eq!(msg.text(), "");
    assert_eq!(msg.sender(), "");
    assert_eq!(msg.is_created_by_user(), false);
    assert_eq!(msg.is_error(), false);
    assert_eq!(msg.is_unfinished(), false);
    assert_eq!(msg.unfinished(), None);
}

#[test]
fn test_message_parent_id() {
    assert_eq!(Message::new("a").parent_id(), None);
    assert_eq!(Message::new("a").with_parent(NO_PARENT).parent_id(), None);
    assert_eq!(Message::new("a").with_parent("").parent_id(), None);
    assert_eq!(Message::new("b").with_parent("a").parent_id(), Some("a"));
}

#[test]
fn test_message_deserialize_keeps_unknown_fields() {
    let msg: Message = serde_json::from_str(
        r#"{
            "messageId": "m1",
            "parentMessageId": "00000000-0000-0000-0000-000000000000",
            "conversationId": "c1",
            "sender": "GPT-4",
            "text": "Hello",
            "isCreatedByUser": false,
            "model": "gpt-4",
            "tokenCount": 12
        }"#,
    )
    .expect("failed to parse message");

    assert_eq!(msg.message_id(), Some("m1"));
    assert_eq!(msg.parent_id(), None);
    assert_eq!(msg.conversation_id(), Some("c1"));
    assert_eq!(msg.sender(), "GPT-4");
    assert_eq!(msg.extra().get("model"), Some(&Value::from("gpt-4")));
    assert_eq!(msg.extra().get("tokenCount"), Some(&Value::from(12)));

    let value = serde_json::to_value(&msg).expect("failed to serialize message");
    assert_eq!(value["model"], "gpt-4");
    assert_eq!(value["messageId"], "m1");
    assert!(value.get("error").is_none());
}

#[test]
fn test_message_completed() {
    let msg = Message::default().with_parent("").with_extra("model", "gpt-4");
    let complete = msg.completed();
    assert_eq!(complete.message_id, "");
    assert_eq!(complete.conversation_id, None);
    assert_eq!(complete.parent_message_id, None);
    assert_eq!(complete.text, "");
    assert_eq!(complete.is_created_by_user, false);
    assert_eq!(complete.error, false);

    let value = complete.to_value();
    assert_eq!(value["messageId"], "");
    assert_eq!(value["conversationId"], Value::Null);
    assert_eq!(value["parentMessageId"], Value::Null);
    assert_eq!(value["text"], "");
    assert_eq!(value["isCreatedByUser"], false);
    assert_eq!(value["error"], false);
    assert_eq!(value["model"], "gpt-4");
    assert!(value.get("unfinished").is_none());
}

#[test]
fn test_message_completed_keeps_values() {
    let complete = Message::new_user("u1", "Hi")
        .with_parent("root")
        .with_conversation_id("c1")
        .with_error(true)
        .with_unfinished(true)
        .completed();
    assert_eq!(complete.message_id, "u1");
    assert_eq!(complete.parent_message_id.as_deref(), Some("root"));
    assert_eq!(complete.conversation_id.as_deref(), Some("c1"));
    assert_eq!(complete.is_created_by_user, true);
    assert_eq!(complete.error, true);
    assert_eq!(complete.is_unfinished(), true);
    assert_eq!(complete.sender(), "User");
    assert_eq!(complete.to_value()["unfinished"], true);
}
