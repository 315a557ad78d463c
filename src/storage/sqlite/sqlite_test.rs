use super::*;

const SELECT: &str =
    "SELECT id, title, endpoint, options, created_at, updated_at FROM conversations WHERE 1=1";

#[test]
fn test_filter_to_query() {
    let mut filter = FilterConversation::default().with_id("test_id");

    let (query, params) = filter_to_query(&filter);
    assert_eq!(query, format!("{SELECT} AND id = :id ORDER BY updated_at DESC"));
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].0, ":id");

    filter = filter.with_title("test");
    let (query, params) = filter_to_query(&filter);
    assert_eq!(
        query,
        format!("{SELECT} AND id = :id AND title LIKE :title ORDER BY updated_at DESC")
    );
    assert_eq!(params.len(), 2);
    assert_eq!(params[1].0, ":title");

    filter = filter.with_message_contains("test");
    let (query, params) = filter_to_query(&filter);
    assert_eq!(
        query,
        format!(
            "{SELECT} AND id = :id AND title LIKE :title AND EXISTS (SELECT 1 FROM messages WHERE conversation_id = conversations.id AND text LIKE :message_contains) ORDER BY updated_at DESC"
        )
    );
    assert_eq!(params.len(), 3);
    assert_eq!(params[2].0, ":message_contains");

    filter = filter
        .with_created_at_from(chrono::Utc::now())
        .with_updated_at_to(chrono::Utc::now());
    let (query, params) = filter_to_query(&filter);
    assert!(query.ends_with(
        " AND updated_at <= :updated_at_to AND created_at >= :created_at_from ORDER BY updated_at DESC"
    ));
    assert_eq!(params.len(), 5);
    assert_eq!(params[3].0, ":updated_at_to");
    assert_eq!(params[4].0, ":created_at_from");
}

#[tokio::test]
async fn test_upsert_conversation() {
    let db = Sqlite::new(None).await.unwrap();
    db.run_migration().await.unwrap();

    let created_at = chrono::DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
    let expected = Conversation::default()
        .with_id("test_id")
        .with_title("Test Conversation")
        .with_endpoint("openAI")
        .with_option("model", "gpt-4o")
        .with_option("temperature", 0.5)
        .with_created_at(created_at);

    db.upsert_conversation(expected.clone()).await.unwrap();

    let actual = db.get_conversation("test_id").await.unwrap().unwrap();
    assert_eq!(actual.id(), "test_id");
    assert_eq!(actual.title(), "Test Conversation");
    assert_eq!(actual.endpoint(), Some("openAI"));
    assert_eq!(actual.options(), expected.options());
    assert_eq!(actual.created_at(), created_at);
    assert_eq!(actual.updated_at(), created_at);
    assert!(actual.is_empty());

    let updated = expected.clone().with_title("Renamed");
    db.upsert_conversation(updated).await.unwrap();
    let actual = db.get_conversation("test_id").await.unwrap().unwrap();
    assert_eq!(actual.title(), "Renamed");

    assert!(db.get_conversation("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_conversations_with_filter() {
    let db = Sqlite::new(None).await.unwrap();

    let older = chrono::DateTime::from_timestamp_millis(1_000).unwrap();
    let newer = chrono::DateTime::from_timestamp_millis(2_000).unwrap();
    db.upsert_conversation(
        Conversation::default()
            .with_id("a")
            .with_title("Rust questions")
            .with_created_at(older),
    )
    .await
    .unwrap();
    db.upsert_conversation(
        Conversation::default()
            .with_id("b")
            .with_title("Cooking")
            .with_created_at(newer),
    )
    .await
    .unwrap();
    db.add_messages("b", &[Message::new_user("m1", "how long to boil an egg")])
        .await
        .unwrap();

    let all = db
        .get_conversations(FilterConversation::default())
        .await
        .unwrap();
    let ids: Vec<_> = all.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert_eq!(all[0].len(), 1);

    let by_title = db
        .get_conversations(FilterConversation::default().with_title("rust"))
        .await
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].id(), "a");

    let by_message = db
        .get_conversations(FilterConversation::default().with_message_contains("egg"))
        .await
        .unwrap();
    assert_eq!(by_message.len(), 1);
    assert_eq!(by_message[0].id(), "b");

    let by_time = db
        .get_conversations(FilterConversation::default().with_updated_at_to(older))
        .await
        .unwrap();
    assert_eq!(by_time.len(), 1);
    assert_eq!(by_time[0].id(), "a");
}

#[tokio::test]
async fn test_messages_keep_insertion_order_and_extra_fields() {
    let db = Sqlite::new(None).await.unwrap();
    db.upsert_conversation(Conversation::default().with_id("convo"))
        .await
        .unwrap();

    let messages = vec![
        Message::new_user("p", "question").with_conversation_id("convo"),
        Message::new_assistant("b", "second answer").with_parent("p"),
        Message::new_assistant("a", "first answer")
            .with_parent("p")
            .with_extra("model", "gpt-4o"),
    ];
    db.add_messages("convo", &messages).await.unwrap();

    let stored = db.get_messages("convo").await.unwrap();
    assert_eq!(stored, messages);

    // Replacing a message keeps its position.
    let edited = Message::new_assistant("b", "edited").with_parent("p");
    db.add_messages("convo", std::slice::from_ref(&edited))
        .await
        .unwrap();
    let stored = db.get_messages("convo").await.unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1], edited);
    assert_eq!(stored[2].extra().get("model"), Some(&serde_json::Value::from("gpt-4o")));
}

#[tokio::test]
async fn test_messages_without_id_are_all_kept() {
    let db = Sqlite::new(None).await.unwrap();
    db.upsert_conversation(Conversation::default().with_id("convo"))
        .await
        .unwrap();

    let messages = vec![
        Message::default().with_text("one"),
        Message::default().with_text("two"),
    ];
    db.add_messages("convo", &messages).await.unwrap();
    assert_eq!(db.get_messages("convo").await.unwrap(), messages);
}

#[tokio::test]
async fn test_delete_message() {
    let db = Sqlite::new(None).await.unwrap();
    db.upsert_conversation(Conversation::default().with_id("convo"))
        .await
        .unwrap();
    db.add_messages(
        "convo",
        &[
            Message::new_user("p", "question"),
            Message::new_assistant("a", "answer").with_parent("p"),
        ],
    )
    .await
    .unwrap();
    db.set_sibling_index("convo", Some("p".to_string()), 1)
        .await
        .unwrap();

    db.delete_message("convo", "p").await.unwrap();
    let stored = db.get_messages("convo").await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message_id(), Some("a"));
    assert!(db.get_sibling_index("convo").await.unwrap().is_empty());

    let err = db.delete_message("convo", "p").await.unwrap_err();
    assert_eq!(err.to_string(), "no message with id p");
}

#[tokio::test]
async fn test_sibling_index() {
    let db = Sqlite::new(None).await.unwrap();
    db.upsert_conversation(Conversation::default().with_id("convo"))
        .await
        .unwrap();

    let index = db.get_sibling_index("convo").await.unwrap();
    assert!(index.is_empty());
    assert_eq!(index.get(Some("p")), 0);

    db.set_sibling_index("convo", Some("p".to_string()), 2)
        .await
        .unwrap();
    db.set_sibling_index("convo", None, 1).await.unwrap();
    db.set_sibling_index("convo", Some("p".to_string()), 3)
        .await
        .unwrap();

    let index = db.get_sibling_index("convo").await.unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index.get(Some("p")), 3);
    assert_eq!(index.get(None), 1);
    assert_eq!(index.get(Some("other")), 0);

    db.reset_sibling_index("convo").await.unwrap();
    let index = db.get_sibling_index("convo").await.unwrap();
    assert!(index.is_empty());
    assert_eq!(index.get(Some("p")), 0);
}

#[tokio::test]
async fn test_set_sibling_index_rejects_empty_message_id() {
    let db = Sqlite::new(None).await.unwrap();
    db.upsert_conversation(Conversation::default().with_id("convo"))
        .await
        .unwrap();

    assert!(
        db.set_sibling_index("convo", Some(String::new()), 1)
            .await
            .is_err()
    );
    assert!(db.get_sibling_index("convo").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_conversation() {
    let db = Sqlite::new(None).await.unwrap();
    db.upsert_conversation(Conversation::default().with_id("convo"))
        .await
        .unwrap();
    db.add_messages("convo", &[Message::new_user("p", "question")])
        .await
        .unwrap();
    db.set_sibling_index("convo", None, 1).await.unwrap();

    db.delete_conversation("convo").await.unwrap();
    assert!(db.get_conversation("convo").await.unwrap().is_none());
    assert!(db.get_messages("convo").await.unwrap().is_empty());
    assert!(db.get_sibling_index("convo").await.unwrap().is_empty());
}
