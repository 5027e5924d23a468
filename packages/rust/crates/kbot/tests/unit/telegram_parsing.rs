use super::TelegramBot;

#[test]
fn parse_update_extracts_command_payload_and_sender() {
    let update = serde_json::json!({
        "update_id": 42,
        "message": {
            "message_id": 7,
            "text": "/get ping the app",
            "chat": {"id": -100123},
            "from": {"id": 888, "username": "alice", "first_name": "Alice"}
        }
    });

    let Some(command) = TelegramBot::parse_update_message(&update) else {
        panic!("text update should parse");
    };
    assert_eq!(command.id, "telegram_-100123_7");
    assert_eq!(command.recipient, "-100123");
    assert_eq!(command.text, "/get ping the app");
    assert_eq!(command.payload, "ping the app");
    assert_eq!(command.sender.id, "888");
    assert_eq!(command.sender.username.as_deref(), Some("alice"));
    assert_eq!(command.sender.first_name, "Alice");
}

#[test]
fn parse_update_falls_back_to_username_identity() {
    let update = serde_json::json!({
        "update_id": 43,
        "message": {
            "message_id": 8,
            "text": "ding",
            "chat": {"id": 5},
            "from": {"username": "bob"}
        }
    });

    let Some(command) = TelegramBot::parse_update_message(&update) else {
        panic!("text update should parse");
    };
    assert_eq!(command.sender.id, "bob");
    assert_eq!(command.sender.first_name, "");
    assert_eq!(command.payload, "");
}

#[test]
fn parse_update_skips_non_text_messages() {
    let update = serde_json::json!({
        "update_id": 44,
        "message": {
            "message_id": 9,
            "sticker": {"file_id": "abc"},
            "chat": {"id": 5}
        }
    });
    assert!(TelegramBot::parse_update_message(&update).is_none());
    assert!(TelegramBot::parse_update_message(&serde_json::json!({"update_id": 45})).is_none());
}
