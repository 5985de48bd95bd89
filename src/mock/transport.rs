//! Mock Telegram Bot API transport
//!
//! This module runs a wiremock server that stands in for api.telegram.org.
//! A `teloxide::Bot` pointed at it has every call decoded, answered by the
//! [`ResponseFabricator`] and recorded in the capture store.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use regex::Regex;
use serde_json::{json, Map, Value};
use teloxide::Bot;
use url::Url;
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

use crate::capture::CaptureStore;
use crate::config::BotConfig;
use crate::models::DiceEmoji;
use crate::utils::errors::{Result, TestkitError};
use crate::utils::logging::log_rejected_call;
use super::fabricator::ResponseFabricator;

#[derive(Debug)]
struct TransportState {
    fabricator: Mutex<ResponseFabricator>,
    rejected: Mutex<Vec<String>>,
}

impl TransportState {
    fn fabricator(&self) -> MutexGuard<'_, ResponseFabricator> {
        self.fabricator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rejected(&self) -> MutexGuard<'_, Vec<String>> {
        self.rejected.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process replacement for the Bot API server
pub struct MockTransport {
    server: MockServer,
    state: Arc<TransportState>,
    capture: CaptureStore,
    bot: BotConfig,
}

impl MockTransport {
    /// Start a mock server answering every `POST /bot<token>/<method>`
    pub async fn start(bot: BotConfig, capture: CaptureStore, rng_seed: Option<u64>) -> Self {
        let server = MockServer::start().await;
        let state = Arc::new(TransportState {
            fabricator: Mutex::new(ResponseFabricator::new(bot.clone(), capture.clone(), rng_seed)),
            rejected: Mutex::new(Vec::new()),
        });

        Mock::given(method("POST"))
            .and(path_regex(r"^/bot[^/]+/[A-Za-z]+$"))
            .respond_with(ApiResponder { state: Arc::clone(&state) })
            .mount(&server)
            .await;

        tracing::debug!(uri = %server.uri(), bot = %bot.username, "Mock Bot API transport started");

        Self {
            server,
            state,
            capture,
            bot,
        }
    }

    /// Base URL to hand to `Bot::set_api_url`
    pub fn api_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.server.uri())?)
    }

    /// A bot whose API calls all go through this transport
    pub fn bot(&self) -> Result<Bot> {
        Ok(Bot::new(&self.bot.token).set_api_url(self.api_url()?))
    }

    pub fn bot_config(&self) -> &BotConfig {
        &self.bot
    }

    pub fn capture(&self) -> &CaptureStore {
        &self.capture
    }

    /// Queue a deterministic outcome for the next `sendDice` of `category`
    pub fn set_next_value(&self, category: DiceEmoji, value: u8) -> Result<()> {
        self.state.fabricator().push_override(category, value)
    }

    pub fn pending_values(&self, category: DiceEmoji) -> usize {
        self.state.fabricator().pending_overrides(category)
    }

    pub fn reset_message_counter(&self) {
        self.state.fabricator().reset_message_counter();
    }

    /// Method names answered with "Not Found" since the last reset
    pub fn rejected_calls(&self) -> Vec<String> {
        self.state.rejected().clone()
    }

    pub(crate) fn rejected_count(&self) -> usize {
        self.state.rejected().len()
    }

    pub(crate) fn rejected_since(&self, mark: usize) -> Vec<String> {
        self.state.rejected().iter().skip(mark).cloned().collect()
    }

    /// Clear captured requests, counters, queued overrides and rejections
    pub fn reset(&self) {
        self.capture.clear();
        self.state.fabricator().reset();
        self.state.rejected().clear();
    }
}

struct ApiResponder {
    state: Arc<TransportState>,
}

impl Respond for ApiResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method_name = request
            .url
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string();

        let content_type = request
            .headers
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let params = decode_params(content_type, &request.body);

        let outcome = self.state.fabricator().generate_for_method(&method_name, params);
        match outcome {
            Ok(result) => ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result })),
            Err(TestkitError::UnsupportedCallKind { method }) => {
                log_rejected_call(&method);
                self.state.rejected().push(method);
                ResponseTemplate::new(404).set_body_json(json!({
                    "ok": false,
                    "error_code": 404,
                    "description": "Not Found",
                }))
            }
            Err(error) => ResponseTemplate::new(500).set_body_json(json!({
                "ok": false,
                "error_code": 500,
                "description": error.to_string(),
            })),
        }
    }
}

/// Decode a Bot API request body into its parameter object
fn decode_params(content_type: &str, body: &[u8]) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }

    if content_type.starts_with("multipart/form-data") {
        if let Some(boundary) = content_type.split("boundary=").nth(1) {
            return decode_multipart(boundary.trim_matches('"'), body);
        }
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(params)) => params,
        Ok(_) | Err(_) => {
            tracing::warn!(content_type = content_type, "Request body is not a JSON object, recording no params");
            Map::new()
        }
    }
}

/// Multipart fields whose text is a JSON document
const JSON_FIELDS: &[&str] = &[
    "reply_markup",
    "entities",
    "caption_entities",
    "media",
    "options",
    "reply_parameters",
    "link_preview_options",
];

/// Multipart fields sent as `true`/`false`
const FLAG_FIELDS: &[&str] = &[
    "disable_notification",
    "protect_content",
    "allow_paid_broadcast",
    "has_spoiler",
    "supports_streaming",
    "show_caption_above_media",
    "disable_content_type_detection",
    "is_anonymous",
    "allows_multiple_answers",
    "is_closed",
];

/// Multipart fields holding numbers
const NUMERIC_FIELDS: &[&str] = &["duration", "width", "height", "length", "latitude", "longitude"];

fn part_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\bname="([^"]*)""#).expect("part name pattern is valid"))
}

fn part_filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\bfilename="([^"]*)""#).expect("part filename pattern is valid"))
}

/// Text fields of a multipart body; file parts are recorded by file name
fn decode_multipart(boundary: &str, body: &[u8]) -> Map<String, Value> {
    let body = String::from_utf8_lossy(body);
    let delimiter = format!("--{}", boundary);
    let mut params = Map::new();

    for part in body.split(delimiter.as_str()) {
        let Some((headers, content)) = part.split_once("\r\n\r\n") else {
            continue;
        };
        let Some(name) = part_name_pattern()
            .captures(headers)
            .map(|captures| captures[1].to_string())
        else {
            continue;
        };
        let content = content.strip_suffix("\r\n").unwrap_or(content);

        let value = match part_filename_pattern().captures(headers) {
            Some(captures) => Value::String(format!("attach://{}", &captures[1])),
            None => multipart_value(&name, content),
        };
        params.insert(name, value);
    }

    params
}

/// Restore the JSON type of a multipart text field; free text stays a string
fn multipart_value(name: &str, content: &str) -> Value {
    let typed = JSON_FIELDS.contains(&name)
        || FLAG_FIELDS.contains(&name)
        || NUMERIC_FIELDS.contains(&name)
        || name.ends_with("_id");

    if typed {
        if let Ok(value) = serde_json::from_str(content) {
            return value;
        }
    }
    Value::String(content.to_string())
}
