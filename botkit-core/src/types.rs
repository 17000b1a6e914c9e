//! Domain model for inbound updates, with a lenient wire parser.
//!
//! Wire payloads arrive as arbitrary JSON. Every field is extracted with
//! default-absent semantics: a missing or mis-typed key becomes `None`,
//! never a parse error.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sender identity attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub is_bot: Option<bool>,
    pub first_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    /// Extracts a user from a raw `from` object.
    pub fn from_value(raw: &Value) -> Self {
        Self {
            id: raw.get("id").and_then(Value::as_i64),
            is_bot: raw.get("is_bot").and_then(Value::as_bool),
            first_name: get_string(raw, "first_name"),
            username: get_string(raw, "username"),
        }
    }

    /// Display form for logs: first name plus `@username` when known.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.username) {
            (Some(first), Some(username)) => format!("{first} (@{username})"),
            (Some(first), None) => first.clone(),
            (None, Some(username)) => format!("@{username}"),
            (None, None) => "<unknown>".to_string(),
        }
    }
}

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub chat_id: Option<i64>,
    pub sender: Option<User>,
    pub text: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// True iff the wire object's first entity span is tagged `bot_command`.
    pub is_command: bool,
}

impl Message {
    /// Extracts a message from a raw `message` object. A malformed or
    /// absent entity list means "not a command", not an error.
    pub fn from_value(raw: &Value) -> Self {
        let is_command = raw
            .get("entities")
            .and_then(Value::as_array)
            .and_then(|entities| entities.first())
            .and_then(|entity| entity.get("type"))
            .and_then(Value::as_str)
            .map(|kind| kind == "bot_command")
            .unwrap_or(false);

        Self {
            id: raw.get("message_id").and_then(Value::as_i64),
            chat_id: raw
                .get("chat")
                .and_then(|chat| chat.get("id"))
                .and_then(Value::as_i64),
            sender: get_object(raw, "from").map(User::from_value),
            text: get_string(raw, "text"),
            date: raw
                .get("date")
                .and_then(Value::as_i64)
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
            is_command,
        }
    }
}

/// An inline-keyboard button press attached to an earlier message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: Option<String>,
    pub sender: Option<User>,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl CallbackQuery {
    /// Extracts a callback query from a raw `callback_query` object.
    pub fn from_value(raw: &Value) -> Self {
        Self {
            id: get_string(raw, "id"),
            sender: get_object(raw, "from").map(User::from_value),
            message: get_object(raw, "message").map(Message::from_value),
            data: get_string(raw, "data"),
        }
    }
}

/// One unit of inbound activity. At most one of `message` and
/// `callback_query` is populated under normal operation, but both are
/// structurally optional and checked independently downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub update_id: Option<i64>,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Extracts an update from a raw payload.
    pub fn from_value(raw: &Value) -> Self {
        Self {
            update_id: raw.get("update_id").and_then(Value::as_i64),
            message: get_object(raw, "message").map(Message::from_value),
            callback_query: get_object(raw, "callback_query").map(CallbackQuery::from_value),
        }
    }
}

fn get_string(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn get_object<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get(key).filter(|value| value.is_object())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_update() {
        let raw = json!({
            "update_id": 42,
            "message": {
                "message_id": 7,
                "chat": {"id": 99, "type": "private"},
                "from": {"id": 1, "is_bot": false, "first_name": "Ann", "username": "ann"},
                "text": "/start",
                "date": 1700000000,
                "entities": [{"type": "bot_command", "offset": 0, "length": 6}]
            }
        });

        let update = Update::from_value(&raw);
        assert_eq!(update.update_id, Some(42));
        assert!(update.callback_query.is_none());

        let message = update.message.unwrap();
        assert_eq!(message.id, Some(7));
        assert_eq!(message.chat_id, Some(99));
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(message.is_command);
        assert_eq!(message.date.unwrap().timestamp(), 1700000000);

        let sender = message.sender.unwrap();
        assert_eq!(sender.id, Some(1));
        assert_eq!(sender.is_bot, Some(false));
        assert_eq!(sender.first_name.as_deref(), Some("Ann"));
        assert_eq!(sender.username.as_deref(), Some("ann"));
    }

    #[test]
    fn test_parse_empty_payload_yields_absent_fields() {
        let update = Update::from_value(&json!({}));
        assert_eq!(update.update_id, None);
        assert!(update.message.is_none());
        assert!(update.callback_query.is_none());

        let message = Message::from_value(&json!({}));
        assert_eq!(message.id, None);
        assert_eq!(message.chat_id, None);
        assert!(message.sender.is_none());
        assert!(message.text.is_none());
        assert!(message.date.is_none());
        assert!(!message.is_command);
    }

    #[test]
    fn test_parse_mistyped_fields_yield_absent_fields() {
        let raw = json!({
            "update_id": "not-a-number",
            "message": {
                "message_id": {},
                "chat": "not-an-object",
                "from": 5,
                "text": 12,
                "date": "yesterday"
            }
        });

        let update = Update::from_value(&raw);
        assert_eq!(update.update_id, None);

        let message = update.message.unwrap();
        assert_eq!(message.id, None);
        assert_eq!(message.chat_id, None);
        assert!(message.sender.is_none());
        assert!(message.text.is_none());
        assert!(message.date.is_none());
    }

    #[test]
    fn test_entity_shape_mismatch_is_not_a_command() {
        for entities in [
            json!(5),
            json!([]),
            json!([{"offset": 0}]),
            json!([{"type": "mention"}]),
            json!([{"type": 3}]),
        ] {
            let raw = json!({"text": "/start", "entities": entities.clone()});
            let message = Message::from_value(&raw);
            assert!(!message.is_command, "entities {entities} must not mark a command");
        }
    }

    #[test]
    fn test_parse_callback_query() {
        let raw = json!({
            "update_id": 5,
            "callback_query": {
                "id": "abc123",
                "from": {"id": 2, "first_name": "Bob"},
                "message": {"message_id": 3, "chat": {"id": 10}},
                "data": "picked:7"
            }
        });

        let update = Update::from_value(&raw);
        let query = update.callback_query.unwrap();
        assert_eq!(query.id.as_deref(), Some("abc123"));
        assert_eq!(query.data.as_deref(), Some("picked:7"));
        assert_eq!(query.sender.unwrap().first_name.as_deref(), Some("Bob"));
        assert_eq!(query.message.unwrap().chat_id, Some(10));
    }

    #[test]
    fn test_display_name_variants() {
        let full = User {
            id: Some(1),
            is_bot: None,
            first_name: Some("Ann".to_string()),
            username: Some("ann".to_string()),
        };
        assert_eq!(full.display_name(), "Ann (@ann)");

        let bare = User {
            id: None,
            is_bot: None,
            first_name: None,
            username: None,
        };
        assert_eq!(bare.display_name(), "<unknown>");
    }
}
