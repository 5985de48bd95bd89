//! Fixture factories
//!
//! This module builds teloxide users, chats, messages, callback queries and
//! updates with sensible defaults. Counters live in an explicit
//! [`FactoryContext`] owned by each test client, so ids restart per test.

pub mod keyboard;

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};
use teloxide::types::{CallbackQuery, Chat, Message, Update, User};

use crate::config::BotConfig;
use crate::mock::fabricator::bot_user_json;
use crate::models::{DiceEmoji, RequestRecord};
use crate::utils::errors::{Result, TestkitError};

pub use keyboard::inline_keyboard;

const FIRST_USER_ID: u64 = 100000;

/// Attributes of a fixture user; `None` fields are generated
#[derive(Debug, Clone)]
pub struct UserSpec {
    pub user_id: Option<u64>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: String,
    pub is_bot: bool,
    pub is_premium: bool,
}

impl Default for UserSpec {
    fn default() -> Self {
        Self {
            user_id: None,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: None,
            language_code: "en".to_string(),
            is_bot: false,
            is_premium: false,
        }
    }
}

impl UserSpec {
    pub fn with_id(mut self, user_id: u64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn with_last_name(mut self, last_name: Option<&str>) -> Self {
        self.last_name = last_name.map(str::to_string);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn premium(mut self) -> Self {
        self.is_premium = true;
        self
    }
}

/// Per-test counters for generated ids
#[derive(Debug, Clone)]
pub struct FactoryContext {
    bot: BotConfig,
    next_user_id: u64,
    next_message_id: i64,
    next_callback_id: u64,
    next_update_id: u64,
}

impl Default for FactoryContext {
    fn default() -> Self {
        Self::with_bot(BotConfig::default())
    }
}

impl FactoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose default callback messages appear to come from `bot`
    pub fn with_bot(bot: BotConfig) -> Self {
        Self {
            bot,
            next_user_id: FIRST_USER_ID,
            next_message_id: 1,
            next_callback_id: 1,
            next_update_id: 1,
        }
    }

    /// Restart every counter
    pub fn reset(&mut self) {
        self.next_user_id = FIRST_USER_ID;
        self.next_message_id = 1;
        self.next_callback_id = 1;
        self.next_update_id = 1;
    }

    pub fn user(&mut self, spec: &UserSpec) -> Result<User> {
        let user_id = match spec.user_id {
            Some(id) => id,
            None => {
                let id = self.next_user_id;
                self.next_user_id += 1;
                id
            }
        };
        let username = spec
            .username
            .clone()
            .unwrap_or_else(|| format!("test_user_{}", user_id));

        Ok(serde_json::from_value(json!({
            "id": user_id,
            "is_bot": spec.is_bot,
            "first_name": spec.first_name,
            "last_name": spec.last_name,
            "username": username,
            "language_code": spec.language_code,
            "is_premium": spec.is_premium,
        }))?)
    }

    pub fn private_chat(
        &self,
        chat_id: i64,
        first_name: &str,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<Chat> {
        Ok(serde_json::from_value(private_chat_json(chat_id, first_name, last_name, username))?)
    }

    pub fn private_chat_from_user(&self, user: &User) -> Result<Chat> {
        Ok(serde_json::from_value(chat_for_user(user)?)?)
    }

    pub fn group_chat(&self, chat_id: i64, title: &str) -> Result<Chat> {
        Ok(serde_json::from_value(json!({ "id": chat_id, "type": "group", "title": title }))?)
    }

    pub fn message(&mut self, text: &str, from: &User, chat: Option<&Chat>) -> Result<Message> {
        let message = self.text_message_json(text, from, chat, None)?;
        Ok(serde_json::from_value(message)?)
    }

    /// `/command args` message with a `bot_command` entity
    pub fn command(&mut self, command: &str, args: Option<&str>, from: &User, chat: Option<&Chat>) -> Result<Message> {
        let message = self.command_json(command, args, from, chat)?;
        Ok(serde_json::from_value(message)?)
    }

    /// Dice message sent by a user; `value` must lie in the emoji's range
    pub fn dice_message(
        &mut self,
        from: &User,
        value: Option<u8>,
        emoji: DiceEmoji,
        chat: Option<&Chat>,
    ) -> Result<Message> {
        let message = self.dice_json(from, value, emoji, chat)?;
        Ok(serde_json::from_value(message)?)
    }

    /// Callback query; without `message` a bot-authored "Button message" is attached
    pub fn callback_query(&mut self, data: &str, from: &User, message: Option<&Message>) -> Result<CallbackQuery> {
        let callback = self.callback_json(data, from, message)?;
        Ok(serde_json::from_value(callback)?)
    }

    pub fn update_from_message(&mut self, message: &Message) -> Result<Update> {
        let message = serde_json::to_value(message)?;
        self.wrap_update("message", message)
    }

    pub fn update_from_text(&mut self, text: &str, from: &User, chat: Option<&Chat>) -> Result<Update> {
        let message = self.text_message_json(text, from, chat, None)?;
        self.wrap_update("message", message)
    }

    pub fn update_from_command(
        &mut self,
        command: &str,
        args: Option<&str>,
        from: &User,
        chat: Option<&Chat>,
    ) -> Result<Update> {
        let message = self.command_json(command, args, from, chat)?;
        self.wrap_update("message", message)
    }

    pub fn update_from_callback(&mut self, data: &str, from: &User, message: Option<&Message>) -> Result<Update> {
        let callback = self.callback_json(data, from, message)?;
        self.wrap_update("callback_query", callback)
    }

    pub fn update_from_dice(
        &mut self,
        from: &User,
        value: Option<u8>,
        emoji: DiceEmoji,
        chat: Option<&Chat>,
    ) -> Result<Update> {
        let message = self.dice_json(from, value, emoji, chat)?;
        self.wrap_update("message", message)
    }

    fn next_message_id(&mut self) -> i64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    fn wrap_update(&mut self, field: &str, payload: Value) -> Result<Update> {
        let update_id = self.next_update_id;
        self.next_update_id += 1;

        let mut update = serde_json::Map::new();
        update.insert("update_id".to_string(), json!(update_id));
        update.insert(field.to_string(), payload);
        // `Update` flattens its kind; only a string deserializer routes it to a variant
        Ok(serde_json::from_str(&Value::Object(update).to_string())?)
    }

    fn base_message_json(&mut self, from: Value, chat: Value) -> Value {
        json!({
            "message_id": self.next_message_id(),
            "date": Utc::now().timestamp(),
            "chat": chat,
            "from": from,
        })
    }

    fn user_message_json(&mut self, from: &User, chat: Option<&Chat>) -> Result<Value> {
        let chat = match chat {
            Some(chat) => serde_json::to_value(chat)?,
            None => chat_for_user(from)?,
        };
        let from = serde_json::to_value(from)?;
        Ok(self.base_message_json(from, chat))
    }

    fn text_message_json(
        &mut self,
        text: &str,
        from: &User,
        chat: Option<&Chat>,
        entities: Option<Value>,
    ) -> Result<Value> {
        let mut message = self.user_message_json(from, chat)?;
        if let Some(fields) = message.as_object_mut() {
            fields.insert("text".to_string(), json!(text));
            if let Some(entities) = entities {
                fields.insert("entities".to_string(), entities);
            }
        }
        Ok(message)
    }

    fn command_json(&mut self, command: &str, args: Option<&str>, from: &User, chat: Option<&Chat>) -> Result<Value> {
        let mut text = format!("/{}", command);
        if let Some(args) = args.filter(|args| !args.is_empty()) {
            text = format!("{} {}", text, args);
        }
        let entities = json!([{
            "type": "bot_command",
            "offset": 0,
            "length": command.encode_utf16().count() + 1,
        }]);
        self.text_message_json(&text, from, chat, Some(entities))
    }

    fn dice_json(&mut self, from: &User, value: Option<u8>, emoji: DiceEmoji, chat: Option<&Chat>) -> Result<Value> {
        let value = match value {
            Some(value) => emoji.validate(value)?,
            None => rand::thread_rng().gen_range(emoji.range()),
        };
        let mut message = self.user_message_json(from, chat)?;
        if let Some(fields) = message.as_object_mut() {
            fields.insert("dice".to_string(), json!({ "emoji": emoji.emoji(), "value": value }));
        }
        Ok(message)
    }

    fn callback_json(&mut self, data: &str, from: &User, message: Option<&Message>) -> Result<Value> {
        let callback_id = self.next_callback_id;
        self.next_callback_id += 1;

        let message = match message {
            Some(message) => serde_json::to_value(message)?,
            None => {
                let chat = private_chat_json(private_chat_id(from)?, &from.first_name, None, None);
                let mut message = self.base_message_json(bot_user_json(&self.bot), chat);
                if let Some(fields) = message.as_object_mut() {
                    fields.insert("text".to_string(), json!("Button message"));
                }
                message
            }
        };

        Ok(json!({
            "id": callback_id.to_string(),
            "from": serde_json::to_value(from)?,
            "chat_instance": "test_instance",
            "message": message,
            "data": data,
        }))
    }
}

/// Message the bot sent, rebuilt from a captured `sendMessage`-like response
pub fn sent_message(record: &RequestRecord) -> Result<Message> {
    Ok(serde_json::from_value(record.response().clone())?)
}

fn private_chat_json(chat_id: i64, first_name: &str, last_name: Option<&str>, username: Option<&str>) -> Value {
    let username = username
        .map(str::to_string)
        .unwrap_or_else(|| format!("test_user_{}", chat_id));
    json!({
        "id": chat_id,
        "type": "private",
        "first_name": first_name,
        "last_name": last_name,
        "username": username,
    })
}

/// Private chats share the user's id
fn private_chat_id(user: &User) -> Result<i64> {
    i64::try_from(user.id.0).map_err(|_| {
        TestkitError::Fixture(serde::de::Error::custom(format!(
            "user id {} does not fit a chat id",
            user.id.0
        )))
    })
}

fn chat_for_user(user: &User) -> Result<Value> {
    Ok(private_chat_json(
        private_chat_id(user)?,
        &user.first_name,
        user.last_name.as_deref(),
        user.username.as_deref(),
    ))
}
