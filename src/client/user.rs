//! Simulated user
//!
//! A [`TestUser`] owns one user identity and its private chat with the bot.
//! Each action returns only the calls the bot made while handling that
//! action, so several users sharing a client never see each other's replies.

use teloxide::types::{Chat, Message, User};

use crate::models::{DiceEmoji, RequestRecord};
use crate::utils::errors::Result;
use super::test_client::TestClient;

#[derive(Clone)]
pub struct TestUser {
    client: TestClient,
    user: User,
    chat: Chat,
}

impl TestUser {
    pub(crate) fn new(client: TestClient, user: User, chat: Chat) -> Self {
        Self { client, user, chat }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn user_id(&self) -> u64 {
        self.user.id.0
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn chat_id(&self) -> i64 {
        self.chat.id.0
    }

    pub fn client(&self) -> &TestClient {
        &self.client
    }

    /// Act through another client from now on
    pub fn change_client(&mut self, client: TestClient) {
        self.client = client;
    }

    pub async fn send_message(&self, text: &str) -> Result<Vec<RequestRecord>> {
        self.client.send_message(text, &self.user, Some(&self.chat)).await
    }

    /// Send `/command` with optional arguments
    pub async fn send_command(&self, command: &str, args: Option<&str>) -> Result<Vec<RequestRecord>> {
        self.client.send_command(command, args, &self.user, Some(&self.chat)).await
    }

    /// Press an inline button; `message` is the message carrying the keyboard
    pub async fn click_button(&self, data: &str, message: Option<&Message>) -> Result<Vec<RequestRecord>> {
        self.client.send_callback(data, &self.user, message).await
    }

    pub async fn send_dice(&self, emoji: DiceEmoji, value: Option<u8>) -> Result<Vec<RequestRecord>> {
        self.client.send_dice(emoji, value, &self.user, Some(&self.chat)).await
    }

    /// Every message the bot has sent to this user's chat
    pub fn get_sent_messages(&self) -> Vec<RequestRecord> {
        self.client.capture().sent_messages(Some(self.chat_id()))
    }

    pub fn get_last_message(&self) -> Option<RequestRecord> {
        self.client.capture().last_message(Some(self.chat_id()))
    }

    pub fn has_received_message_containing(&self, needle: &str) -> bool {
        self.client.capture().contains_text(needle, Some(self.chat_id()))
    }
}

impl std::fmt::Debug for TestUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestUser")
            .field("user_id", &self.user_id())
            .field("chat_id", &self.chat_id())
            .finish()
    }
}
