//! Outgoing Bot API call kinds
//!
//! The closed set of methods the mock transport answers, and the table mapping
//! each of them to the shape of its response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::errors::TestkitError;

/// Bot API methods understood by the mock transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    // Messages
    SendMessage,
    EditMessageText,
    EditMessageReplyMarkup,
    DeleteMessage,
    ForwardMessage,
    CopyMessage,

    // Media
    SendPhoto,
    SendVideo,
    SendAudio,
    SendDocument,
    SendSticker,
    SendAnimation,
    SendVoice,
    SendVideoNote,
    SendMediaGroup,

    // Special
    SendDice,
    SendLocation,
    SendContact,
    SendPoll,

    // Chat actions
    SendChatAction,

    // Callbacks
    AnswerCallbackQuery,
    AnswerInlineQuery,

    // Chat management
    GetChat,
    GetChatMember,
    BanChatMember,
    UnbanChatMember,
    RestrictChatMember,

    // Bot info
    GetMe,
    GetMyCommands,
    SetMyCommands,
}

/// Payload carried by a fabricated message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageContent {
    Text,
    Forwarded,
    Photo,
    Video,
    Audio,
    Document,
    Sticker,
    Animation,
    Voice,
    VideoNote,
    Dice,
    Location,
    Contact,
    Poll,
}

/// Shape of the `result` field returned for a call kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A new `Message` sent by the bot
    Message(MessageContent),
    /// The edited `Message`, or `true` for inline messages
    EditedMessage,
    /// `true`
    Boolean,
    /// `MessageId` object
    MessageId,
    /// Array of `Message`, one per media item
    MessageGroup,
    /// `User` describing the bot
    BotUser,
    /// `ChatFullInfo`
    ChatInfo,
    /// `ChatMember`
    ChatMember,
    /// Array of `BotCommand`
    CommandList,
}

impl CallKind {
    pub const ALL: [CallKind; 30] = [
        CallKind::SendMessage,
        CallKind::EditMessageText,
        CallKind::EditMessageReplyMarkup,
        CallKind::DeleteMessage,
        CallKind::ForwardMessage,
        CallKind::CopyMessage,
        CallKind::SendPhoto,
        CallKind::SendVideo,
        CallKind::SendAudio,
        CallKind::SendDocument,
        CallKind::SendSticker,
        CallKind::SendAnimation,
        CallKind::SendVoice,
        CallKind::SendVideoNote,
        CallKind::SendMediaGroup,
        CallKind::SendDice,
        CallKind::SendLocation,
        CallKind::SendContact,
        CallKind::SendPoll,
        CallKind::SendChatAction,
        CallKind::AnswerCallbackQuery,
        CallKind::AnswerInlineQuery,
        CallKind::GetChat,
        CallKind::GetChatMember,
        CallKind::BanChatMember,
        CallKind::UnbanChatMember,
        CallKind::RestrictChatMember,
        CallKind::GetMe,
        CallKind::GetMyCommands,
        CallKind::SetMyCommands,
    ];

    /// Method name as documented by the Bot API
    pub fn method_name(&self) -> &'static str {
        match self {
            CallKind::SendMessage => "sendMessage",
            CallKind::EditMessageText => "editMessageText",
            CallKind::EditMessageReplyMarkup => "editMessageReplyMarkup",
            CallKind::DeleteMessage => "deleteMessage",
            CallKind::ForwardMessage => "forwardMessage",
            CallKind::CopyMessage => "copyMessage",
            CallKind::SendPhoto => "sendPhoto",
            CallKind::SendVideo => "sendVideo",
            CallKind::SendAudio => "sendAudio",
            CallKind::SendDocument => "sendDocument",
            CallKind::SendSticker => "sendSticker",
            CallKind::SendAnimation => "sendAnimation",
            CallKind::SendVoice => "sendVoice",
            CallKind::SendVideoNote => "sendVideoNote",
            CallKind::SendMediaGroup => "sendMediaGroup",
            CallKind::SendDice => "sendDice",
            CallKind::SendLocation => "sendLocation",
            CallKind::SendContact => "sendContact",
            CallKind::SendPoll => "sendPoll",
            CallKind::SendChatAction => "sendChatAction",
            CallKind::AnswerCallbackQuery => "answerCallbackQuery",
            CallKind::AnswerInlineQuery => "answerInlineQuery",
            CallKind::GetChat => "getChat",
            CallKind::GetChatMember => "getChatMember",
            CallKind::BanChatMember => "banChatMember",
            CallKind::UnbanChatMember => "unbanChatMember",
            CallKind::RestrictChatMember => "restrictChatMember",
            CallKind::GetMe => "getMe",
            CallKind::GetMyCommands => "getMyCommands",
            CallKind::SetMyCommands => "setMyCommands",
        }
    }

    /// Parse a method name; the Bot API treats method names case-insensitively
    pub fn from_method_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.method_name().eq_ignore_ascii_case(name))
    }

    /// Shape of the response a real call of this kind returns
    pub fn response_shape(&self) -> ResponseShape {
        use MessageContent as C;

        match self {
            CallKind::SendMessage => ResponseShape::Message(C::Text),
            CallKind::EditMessageText | CallKind::EditMessageReplyMarkup => ResponseShape::EditedMessage,
            CallKind::ForwardMessage => ResponseShape::Message(C::Forwarded),
            CallKind::CopyMessage => ResponseShape::MessageId,
            CallKind::SendPhoto => ResponseShape::Message(C::Photo),
            CallKind::SendVideo => ResponseShape::Message(C::Video),
            CallKind::SendAudio => ResponseShape::Message(C::Audio),
            CallKind::SendDocument => ResponseShape::Message(C::Document),
            CallKind::SendSticker => ResponseShape::Message(C::Sticker),
            CallKind::SendAnimation => ResponseShape::Message(C::Animation),
            CallKind::SendVoice => ResponseShape::Message(C::Voice),
            CallKind::SendVideoNote => ResponseShape::Message(C::VideoNote),
            CallKind::SendMediaGroup => ResponseShape::MessageGroup,
            CallKind::SendDice => ResponseShape::Message(C::Dice),
            CallKind::SendLocation => ResponseShape::Message(C::Location),
            CallKind::SendContact => ResponseShape::Message(C::Contact),
            CallKind::SendPoll => ResponseShape::Message(C::Poll),
            CallKind::DeleteMessage
            | CallKind::SendChatAction
            | CallKind::AnswerCallbackQuery
            | CallKind::AnswerInlineQuery
            | CallKind::BanChatMember
            | CallKind::UnbanChatMember
            | CallKind::RestrictChatMember
            | CallKind::SetMyCommands => ResponseShape::Boolean,
            CallKind::GetChat => ResponseShape::ChatInfo,
            CallKind::GetChatMember => ResponseShape::ChatMember,
            CallKind::GetMe => ResponseShape::BotUser,
            CallKind::GetMyCommands => ResponseShape::CommandList,
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

impl FromStr for CallKind {
    type Err = TestkitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_method_name(s).ok_or_else(|| TestkitError::UnsupportedCallKind {
            method: s.to_string(),
        })
    }
}

impl Serialize for CallKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.method_name())
    }
}

impl<'de> Deserialize<'de> for CallKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
