//! Captured request model

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::CallKind;

/// One outgoing Bot API call as seen by the mock transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    kind: CallKind,
    params: Map<String, Value>,
    sequence: u64,
    timestamp: DateTime<Utc>,
    response: Value,
}

impl RequestRecord {
    pub(crate) fn new(kind: CallKind, params: Map<String, Value>, sequence: u64, response: Value) -> Self {
        Self {
            kind,
            params,
            sequence,
            timestamp: Utc::now(),
            response,
        }
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    /// Parameters the bot sent, with absent optional fields omitted
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Position in the capture store, starting at 0 after every clear
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The `result` the transport answered with
    pub fn response(&self) -> &Value {
        &self.response
    }

    /// Numeric `chat_id` parameter; `@channel` targets yield `None`
    pub fn chat_id(&self) -> Option<i64> {
        self.params.get("chat_id").and_then(Value::as_i64)
    }

    pub fn text(&self) -> Option<&str> {
        self.params.get("text").and_then(Value::as_str)
    }

    pub fn caption(&self) -> Option<&str> {
        self.params.get("caption").and_then(Value::as_str)
    }

    pub fn message_id(&self) -> Option<i64> {
        self.params.get("message_id").and_then(Value::as_i64)
    }

    pub fn reply_markup(&self) -> Option<&Value> {
        self.params.get("reply_markup")
    }

    /// `(text, callback_data)` of every callback button in an inline keyboard
    pub fn inline_buttons(&self) -> Vec<(String, String)> {
        let Some(rows) = self
            .reply_markup()
            .and_then(|markup| markup.get("inline_keyboard"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|button| {
                let text = button.get("text")?.as_str()?;
                let data = button.get("callback_data")?.as_str()?;
                Some((text.to_string(), data.to_string()))
            })
            .collect()
    }

    /// Dice value carried by the fabricated `sendDice` response
    pub fn dice_value(&self) -> Option<u8> {
        self.response
            .get("dice")
            .and_then(|dice| dice.get("value"))
            .and_then(Value::as_u64)
            .and_then(|value| u8::try_from(value).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_accessors_read_params() {
        let record = RequestRecord::new(
            CallKind::SendMessage,
            params(json!({"chat_id": 100, "text": "Hello", "message_id": 7})),
            0,
            json!(true),
        );
        assert_eq!(record.chat_id(), Some(100));
        assert_eq!(record.text(), Some("Hello"));
        assert_eq!(record.message_id(), Some(7));
        assert_eq!(record.caption(), None);
    }

    #[test]
    fn test_channel_username_has_no_numeric_chat_id() {
        let record = RequestRecord::new(
            CallKind::SendMessage,
            params(json!({"chat_id": "@news", "text": "Hi"})),
            0,
            json!(true),
        );
        assert_eq!(record.chat_id(), None);
    }

    #[test]
    fn test_inline_buttons_flattened_in_order() {
        let record = RequestRecord::new(
            CallKind::SendMessage,
            params(json!({
                "chat_id": 1,
                "text": "Pick",
                "reply_markup": {"inline_keyboard": [
                    [{"text": "Yes", "callback_data": "yes"}, {"text": "Docs", "url": "https://example.com"}],
                    [{"text": "No", "callback_data": "no"}]
                ]}
            })),
            0,
            json!(true),
        );
        assert_eq!(
            record.inline_buttons(),
            vec![("Yes".to_string(), "yes".to_string()), ("No".to_string(), "no".to_string())]
        );
    }

    #[test]
    fn test_dice_value_from_response() {
        let record = RequestRecord::new(
            CallKind::SendDice,
            params(json!({"chat_id": 1})),
            3,
            json!({"message_id": 1, "dice": {"emoji": "🎲", "value": 4}}),
        );
        assert_eq!(record.dice_value(), Some(4));
        assert_eq!(record.sequence(), 3);
    }
}
