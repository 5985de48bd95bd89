//! Response fabricator
//!
//! Builds Bot API `result` payloads for the call kinds in [`CallKind`],
//! echoing the parameters a real response would echo and synthesizing
//! message ids and dates monotonically. Every generated response is recorded
//! in the capture store before it is returned.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::capture::CaptureStore;
use crate::config::BotConfig;
use crate::models::{CallKind, DiceEmoji, MessageContent, ResponseShape};
use crate::utils::errors::Result;
use super::overrides::DiceOverrides;

/// Chat ids at or below this value belong to supergroups and channels
const SUPERGROUP_ID_THRESHOLD: i64 = -1_000_000_000_000;

/// Synthetic id reported for chats addressed by `@username`
const CHANNEL_CHAT_ID: i64 = -1_001_000_000_000;

/// `User` object describing the mocked bot
pub fn bot_user_json(bot: &BotConfig) -> Value {
    json!({
        "id": bot.id,
        "is_bot": true,
        "first_name": bot.first_name,
        "username": bot.username,
    })
}

/// `getMe` result, including the capability flags teloxide's `Me` expects
pub fn me_json(bot: &BotConfig) -> Value {
    let mut me = bot_user_json(bot);
    if let Some(fields) = me.as_object_mut() {
        fields.insert("can_join_groups".to_string(), json!(true));
        fields.insert("can_read_all_group_messages".to_string(), json!(false));
        fields.insert("supports_inline_queries".to_string(), json!(false));
        fields.insert("can_connect_to_business".to_string(), json!(false));
        fields.insert("has_main_web_app".to_string(), json!(false));
    }
    me
}

/// Stand-in for the Bot API server's response logic
#[derive(Debug)]
pub struct ResponseFabricator {
    bot: BotConfig,
    capture: CaptureStore,
    overrides: DiceOverrides,
    next_message_id: i64,
    last_date: i64,
    commands: Value,
}

impl ResponseFabricator {
    pub fn new(bot: BotConfig, capture: CaptureStore, rng_seed: Option<u64>) -> Self {
        Self {
            bot,
            capture,
            overrides: DiceOverrides::new(rng_seed),
            next_message_id: 1,
            last_date: 0,
            commands: json!([]),
        }
    }

    pub fn capture(&self) -> &CaptureStore {
        &self.capture
    }

    /// Answer a call identified by its Bot API method name
    pub fn generate_for_method(&mut self, method: &str, params: Map<String, Value>) -> Result<Value> {
        let kind: CallKind = method.parse()?;
        Ok(self.generate(kind, params))
    }

    /// Build the response for `kind` and record the call
    pub fn generate(&mut self, kind: CallKind, params: Map<String, Value>) -> Value {
        let response = self.build_response(kind, &params);
        self.capture.record(kind, params, response.clone());
        response
    }

    /// Queue a deterministic value for the next roll of `category`
    pub fn push_override(&mut self, category: DiceEmoji, value: u8) -> Result<()> {
        self.overrides.push(category, value)
    }

    pub fn pending_overrides(&self, category: DiceEmoji) -> usize {
        self.overrides.pending(category)
    }

    pub fn reset_message_counter(&mut self) {
        self.next_message_id = 1;
    }

    /// Forget counters, queued overrides and registered commands
    pub fn reset(&mut self) {
        self.reset_message_counter();
        self.overrides.clear();
        self.commands = json!([]);
    }

    fn build_response(&mut self, kind: CallKind, params: &Map<String, Value>) -> Value {
        match kind.response_shape() {
            ResponseShape::Message(content) => self.message(content, params),
            ResponseShape::EditedMessage => self.edited_message(kind, params),
            ResponseShape::Boolean => {
                if kind == CallKind::SetMyCommands {
                    self.commands = params.get("commands").cloned().unwrap_or_else(|| json!([]));
                }
                Value::Bool(true)
            }
            ResponseShape::MessageId => json!({ "message_id": self.next_message_id() }),
            ResponseShape::MessageGroup => self.message_group(params),
            ResponseShape::BotUser => me_json(&self.bot),
            ResponseShape::ChatInfo => {
                let mut chat = chat_json(params.get("chat_id"));
                if let Some(fields) = chat.as_object_mut() {
                    fields.insert("accent_color_id".to_string(), json!(0));
                    fields.insert("max_reaction_count".to_string(), json!(11));
                }
                chat
            }
            ResponseShape::ChatMember => json!({
                "status": "member",
                "user": {
                    "id": params.get("user_id").and_then(Value::as_u64).unwrap_or(1),
                    "is_bot": false,
                    "first_name": "TestUser",
                },
            }),
            ResponseShape::CommandList => self.commands.clone(),
        }
    }

    fn next_message_id(&mut self) -> i64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id
    }

    fn next_date(&mut self) -> i64 {
        self.last_date = self.last_date.max(Utc::now().timestamp());
        self.last_date
    }

    fn base_message(&mut self, message_id: i64, params: &Map<String, Value>) -> Map<String, Value> {
        let mut message = Map::new();
        message.insert("message_id".to_string(), json!(message_id));
        message.insert("date".to_string(), json!(self.next_date()));
        message.insert("chat".to_string(), chat_json(params.get("chat_id")));
        message.insert("from".to_string(), bot_user_json(&self.bot));

        // Only inline keyboards are echoed back on messages
        if let Some(markup) = params.get("reply_markup").filter(|markup| markup.get("inline_keyboard").is_some()) {
            message.insert("reply_markup".to_string(), markup.clone());
        }
        message
    }

    fn message(&mut self, content: MessageContent, params: &Map<String, Value>) -> Value {
        let message_id = self.next_message_id();
        let mut message = self.base_message(message_id, params);

        match content {
            MessageContent::Text => {
                message.insert("text".to_string(), json!(str_param(params, "text").unwrap_or_default()));
            }
            MessageContent::Forwarded => {
                message.insert("text".to_string(), json!("Forwarded message"));
            }
            MessageContent::Dice => {
                let emoji = str_param(params, "emoji").unwrap_or(DiceEmoji::Dice.emoji());
                let category = DiceEmoji::from_emoji(emoji).unwrap_or_default();
                let value = self.overrides.pop_or_random(category);
                message.insert("dice".to_string(), json!({ "emoji": emoji, "value": value }));
            }
            MessageContent::Location => {
                message.insert(
                    "location".to_string(),
                    json!({
                        "latitude": params.get("latitude").and_then(Value::as_f64).unwrap_or(0.0),
                        "longitude": params.get("longitude").and_then(Value::as_f64).unwrap_or(0.0),
                    }),
                );
            }
            MessageContent::Contact => {
                let mut contact = json!({
                    "phone_number": str_param(params, "phone_number").unwrap_or_default(),
                    "first_name": str_param(params, "first_name").unwrap_or_default(),
                });
                if let (Some(fields), Some(last_name)) = (contact.as_object_mut(), str_param(params, "last_name")) {
                    fields.insert("last_name".to_string(), json!(last_name));
                }
                message.insert("contact".to_string(), contact);
            }
            MessageContent::Poll => {
                message.insert("poll".to_string(), poll_json(params));
            }
            media => insert_media(&mut message, media, params.get("caption")),
        }

        Value::Object(message)
    }

    fn edited_message(&mut self, kind: CallKind, params: &Map<String, Value>) -> Value {
        if params.contains_key("inline_message_id") {
            return Value::Bool(true);
        }

        let message_id = match params.get("message_id").and_then(Value::as_i64) {
            Some(id) => id,
            None => self.next_message_id(),
        };
        let mut message = self.base_message(message_id, params);
        let edit_date = message.get("date").cloned().unwrap_or(Value::Null);
        message.insert("edit_date".to_string(), edit_date);

        let text = match kind {
            CallKind::EditMessageText => str_param(params, "text").unwrap_or_default(),
            _ => "",
        };
        message.insert("text".to_string(), json!(text));
        Value::Object(message)
    }

    fn message_group(&mut self, params: &Map<String, Value>) -> Value {
        let media_group_id = uuid::Uuid::new_v4().simple().to_string();
        let items = params.get("media").and_then(Value::as_array).cloned().unwrap_or_default();

        let messages = items
            .iter()
            .map(|item| {
                let content = match item.get("type").and_then(Value::as_str) {
                    Some("video") => MessageContent::Video,
                    Some("audio") => MessageContent::Audio,
                    Some("document") => MessageContent::Document,
                    _ => MessageContent::Photo,
                };
                let message_id = self.next_message_id();
                let mut message = self.base_message(message_id, params);
                message.insert("media_group_id".to_string(), json!(media_group_id));
                insert_media(&mut message, content, item.get("caption"));
                Value::Object(message)
            })
            .collect();

        Value::Array(messages)
    }
}

fn str_param<'a>(params: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    params.get(name).and_then(Value::as_str)
}

/// `Chat` object for the target of a call
fn chat_json(chat_id: Option<&Value>) -> Value {
    match chat_id {
        Some(Value::String(username)) => json!({
            "id": CHANNEL_CHAT_ID,
            "type": "channel",
            "title": username.trim_start_matches('@'),
            "username": username.trim_start_matches('@'),
        }),
        Some(id) => match id.as_i64().unwrap_or(0) {
            id if id <= SUPERGROUP_ID_THRESHOLD => json!({ "id": id, "type": "supergroup", "title": "Test Supergroup" }),
            id if id < 0 => json!({ "id": id, "type": "group", "title": "Test Group" }),
            id => json!({ "id": id, "type": "private" }),
        },
        None => json!({ "id": 0, "type": "private" }),
    }
}

fn file_json() -> Map<String, Value> {
    let id = uuid::Uuid::new_v4().simple().to_string();
    let mut file = Map::new();
    file.insert("file_id".to_string(), json!(format!("file_{}", id)));
    file.insert("file_unique_id".to_string(), json!(id[..16].to_string()));
    file
}

fn with_fields(mut file: Map<String, Value>, fields: Value) -> Value {
    if let Value::Object(fields) = fields {
        file.extend(fields);
    }
    Value::Object(file)
}

fn insert_media(message: &mut Map<String, Value>, content: MessageContent, caption: Option<&Value>) {
    match content {
        MessageContent::Photo => {
            let size = with_fields(file_json(), json!({ "width": 100, "height": 100 }));
            message.insert("photo".to_string(), json!([size]));
        }
        MessageContent::Video => {
            let video = with_fields(file_json(), json!({ "width": 640, "height": 360, "duration": 1 }));
            message.insert("video".to_string(), video);
        }
        MessageContent::Audio => {
            message.insert("audio".to_string(), with_fields(file_json(), json!({ "duration": 1 })));
        }
        MessageContent::Document => {
            message.insert("document".to_string(), Value::Object(file_json()));
        }
        MessageContent::Sticker => {
            let sticker = with_fields(
                file_json(),
                json!({ "type": "regular", "width": 512, "height": 512, "is_animated": false, "is_video": false }),
            );
            message.insert("sticker".to_string(), sticker);
        }
        MessageContent::Animation => {
            let animation = with_fields(file_json(), json!({ "width": 320, "height": 240, "duration": 1 }));
            message.insert("document".to_string(), animation.clone());
            message.insert("animation".to_string(), animation);
        }
        MessageContent::Voice => {
            message.insert("voice".to_string(), with_fields(file_json(), json!({ "duration": 1 })));
        }
        MessageContent::VideoNote => {
            message.insert("video_note".to_string(), with_fields(file_json(), json!({ "length": 240, "duration": 1 })));
        }
        _ => {}
    }

    // Stickers and video notes carry no caption
    if !matches!(content, MessageContent::Sticker | MessageContent::VideoNote) {
        if let Some(caption) = caption.filter(|caption| caption.is_string()) {
            message.insert("caption".to_string(), caption.clone());
        }
    }
}

fn poll_json(params: &Map<String, Value>) -> Value {
    let options: Vec<Value> = params
        .get("options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| option.as_str().or_else(|| option.get("text").and_then(Value::as_str)))
                .map(|text| json!({ "text": text, "voter_count": 0 }))
                .collect()
        })
        .unwrap_or_default();

    json!({
        "id": uuid::Uuid::new_v4().simple().to_string(),
        "question": str_param(params, "question").unwrap_or_default(),
        "options": options,
        "total_voter_count": 0,
        "is_closed": false,
        "is_anonymous": params.get("is_anonymous").and_then(Value::as_bool).unwrap_or(true),
        "type": str_param(params, "type").unwrap_or("regular"),
        "allows_multiple_answers": params.get("allows_multiple_answers").and_then(Value::as_bool).unwrap_or(false),
    })
}
