//! Test client façade
//!
//! [`TestClient`] ties together the mock transport, the capture store, the
//! fixture factories and the dispatch pipeline under test. It is a cheap,
//! cloneable handle; every clone drives the same bot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use teloxide::types::{Chat, Me, Message, Update, User};
use teloxide::Bot;

use crate::capture::{CaptureStore, TextMatch};
use crate::config::{BotConfig, Settings};
use crate::factories::{FactoryContext, UserSpec};
use crate::mock::fabricator::me_json;
use crate::mock::MockTransport;
use crate::models::{DiceEmoji, RequestRecord};
use crate::utils::errors::{Result, TestkitError};
use crate::utils::logging::log_dispatch;
use super::pipeline::DispatchPipeline;
use super::user::TestUser;

/// High-level handle for driving a bot in tests
#[derive(Clone)]
pub struct TestClient {
    transport: Arc<MockTransport>,
    pipeline: Arc<dyn DispatchPipeline>,
    factories: Arc<Mutex<FactoryContext>>,
    bot: Bot,
    me: Me,
}

impl TestClient {
    /// Start a mock transport for `settings.bot` and wire `pipeline` to it
    pub async fn create<P>(settings: &Settings, pipeline: P) -> Result<Self>
    where
        P: DispatchPipeline + 'static,
    {
        Self::create_shared(settings, Arc::new(pipeline)).await
    }

    /// Like [`TestClient::create`], for a pipeline already behind an `Arc`
    pub async fn create_shared(settings: &Settings, pipeline: Arc<dyn DispatchPipeline>) -> Result<Self> {
        settings.validate()?;

        let capture = CaptureStore::with_text_match(TextMatch::from_case_sensitive(settings.capture.case_sensitive));
        let transport = MockTransport::start(settings.bot.clone(), capture, settings.fabricator.rng_seed).await;
        let bot = transport.bot()?;
        let me: Me = serde_json::from_value(me_json(&settings.bot))?;

        Ok(Self {
            transport: Arc::new(transport),
            pipeline,
            factories: Arc::new(Mutex::new(FactoryContext::with_bot(settings.bot.clone()))),
            bot,
            me,
        })
    }

    /// The bot handlers receive; its calls go to the mock transport
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    pub fn me(&self) -> &Me {
        &self.me
    }

    pub fn bot_config(&self) -> &BotConfig {
        self.transport.bot_config()
    }

    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }

    pub fn capture(&self) -> &CaptureStore {
        self.transport.capture()
    }

    pub fn pipeline(&self) -> &dyn DispatchPipeline {
        self.pipeline.as_ref()
    }

    fn factories(&self) -> MutexGuard<'_, FactoryContext> {
        self.factories.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `build` against this client's factory context
    pub fn with_factories<R>(&self, build: impl FnOnce(&mut FactoryContext) -> R) -> R {
        build(&mut self.factories())
    }

    /// Create a simulated user chatting with the bot in a private chat
    pub fn create_user(&self, spec: UserSpec) -> Result<TestUser> {
        let (user, chat) = self.with_factories(|factories| {
            let user = factories.user(&spec)?;
            let chat = factories.private_chat_from_user(&user)?;
            Ok::<_, TestkitError>((user, chat))
        })?;
        Ok(TestUser::new(self.clone(), user, chat))
    }

    /// Send a text message and return the calls the bot made in response
    pub async fn send_message(&self, text: &str, from: &User, chat: Option<&Chat>) -> Result<Vec<RequestRecord>> {
        let update = self.with_factories(|factories| factories.update_from_text(text, from, chat))?;
        self.feed_update(update).await
    }

    /// Send `/command args`
    pub async fn send_command(
        &self,
        command: &str,
        args: Option<&str>,
        from: &User,
        chat: Option<&Chat>,
    ) -> Result<Vec<RequestRecord>> {
        let update = self.with_factories(|factories| factories.update_from_command(command, args, from, chat))?;
        self.feed_update(update).await
    }

    /// Press an inline button carrying `data`
    pub async fn send_callback(&self, data: &str, from: &User, message: Option<&Message>) -> Result<Vec<RequestRecord>> {
        let update = self.with_factories(|factories| factories.update_from_callback(data, from, message))?;
        self.feed_update(update).await
    }

    /// Send a dice the user rolled; `None` rolls randomly
    pub async fn send_dice(
        &self,
        emoji: DiceEmoji,
        value: Option<u8>,
        from: &User,
        chat: Option<&Chat>,
    ) -> Result<Vec<RequestRecord>> {
        let update = self.with_factories(|factories| factories.update_from_dice(from, value, emoji, chat))?;
        self.feed_update(update).await
    }

    /// Dispatch an arbitrary update and return the records it produced
    pub async fn feed_update(&self, update: Update) -> Result<Vec<RequestRecord>> {
        let chat_id = update.chat().map(|chat| chat.id.0);
        let update_kind = update_kind_name(&update);

        let mark = self.capture().next_sequence();
        let rejected_mark = self.transport.rejected_count();

        let outcome = self
            .pipeline
            .feed_update(self.bot.clone(), self.me.clone(), update)
            .await;

        let produced = self.capture().since(mark);
        log_dispatch(update_kind, chat_id, produced.len(), outcome.is_ok());

        if let Some(method) = self.transport.rejected_since(rejected_mark).into_iter().next() {
            return Err(TestkitError::UnsupportedCallKind { method });
        }
        outcome.map_err(TestkitError::DispatchFailure)?;

        Ok(produced)
    }

    /// Queue the outcome of the bot's next `sendDice` with `category`
    pub fn set_next_value(&self, category: DiceEmoji, value: u8) -> Result<()> {
        self.transport.set_next_value(category, value)
    }

    pub fn set_next_dice_value(&self, value: u8) -> Result<()> {
        self.set_next_value(DiceEmoji::Dice, value)
    }

    pub fn set_next_darts_value(&self, value: u8) -> Result<()> {
        self.set_next_value(DiceEmoji::Darts, value)
    }

    pub fn set_next_bowling_value(&self, value: u8) -> Result<()> {
        self.set_next_value(DiceEmoji::Bowling, value)
    }

    pub fn set_next_basketball_value(&self, value: u8) -> Result<()> {
        self.set_next_value(DiceEmoji::Basketball, value)
    }

    pub fn set_next_football_value(&self, value: u8) -> Result<()> {
        self.set_next_value(DiceEmoji::Football, value)
    }

    pub fn set_next_slot_machine_value(&self, value: u8) -> Result<()> {
        self.set_next_value(DiceEmoji::SlotMachine, value)
    }

    /// Clear captured requests, counters, queued values and factory ids
    pub fn reset(&self) {
        self.transport.reset();
        self.factories().reset();
    }

    /// Run the pipeline's startup hook
    pub async fn start(&self) -> Result<()> {
        self.pipeline.startup().await.map_err(TestkitError::DispatchFailure)
    }

    /// Run the pipeline's shutdown hook
    pub async fn close(&self) -> Result<()> {
        self.pipeline.shutdown().await.map_err(TestkitError::DispatchFailure)
    }
}

impl std::fmt::Debug for TestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestClient")
            .field("bot", &self.bot_config().username)
            .field("captured", &self.capture().len())
            .finish()
    }
}

fn update_kind_name(update: &Update) -> &'static str {
    use teloxide::types::UpdateKind;

    match &update.kind {
        UpdateKind::Message(_) => "message",
        UpdateKind::EditedMessage(_) => "edited_message",
        UpdateKind::CallbackQuery(_) => "callback_query",
        UpdateKind::InlineQuery(_) => "inline_query",
        _ => "other",
    }
}
