//! Small bot exercised by the integration tests
//!
//! Built with the same dptree layout a production bot uses: commands first,
//! then plain text, then callback queries.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{DiceEmoji as TgDiceEmoji, InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Demo bot commands")]
pub enum Command {
    #[command(description = "Greet the user")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Roll a dice")]
    Roll,
    #[command(description = "Spin the slot machine")]
    Slots,
    #[command(description = "Pin the command message")]
    Pin,
    #[command(description = "Fail on purpose")]
    Fail,
}

pub fn schema() -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
                .branch(dptree::endpoint(handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback))
}

pub fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Roll", "roll"),
        InlineKeyboardButton::callback("Help", "help"),
    ]])
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> HandlerResult {
    match cmd {
        Command::Start => {
            let name = msg.from.as_ref().map(|user| user.first_name.clone()).unwrap_or_default();
            bot.send_message(msg.chat.id, format!("Welcome, {}!", name))
                .reply_markup(start_keyboard())
                .await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Roll => roll(&bot, msg.chat.id, TgDiceEmoji::Dice).await?,
        Command::Slots => roll(&bot, msg.chat.id, TgDiceEmoji::SlotMachine).await?,
        Command::Pin => {
            bot.pin_chat_message(msg.chat.id, msg.id).await?;
        }
        Command::Fail => return Err("command failed on purpose".into()),
    }
    Ok(())
}

async fn roll(bot: &Bot, chat_id: ChatId, emoji: TgDiceEmoji) -> HandlerResult {
    let sent = bot.send_dice(chat_id).emoji(emoji).await?;
    let value = sent.dice().map(|dice| dice.value).unwrap_or_default();
    bot.send_message(chat_id, format!("You rolled {}", value)).await?;
    Ok(())
}

async fn handle_text(bot: Bot, msg: Message) -> HandlerResult {
    if let Some(text) = msg.text() {
        bot.send_message(msg.chat.id, format!("Echo: {}", text)).await?;
    } else if let Some(dice) = msg.dice() {
        bot.send_message(msg.chat.id, format!("Nice throw: {}", dice.value)).await?;
    }
    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(message) = q.regular_message() else {
        return Ok(());
    };
    match q.data.as_deref() {
        Some("roll") => roll(&bot, message.chat.id, TgDiceEmoji::Dice).await?,
        Some("help") => {
            bot.edit_message_text(message.chat.id, message.id, "Use /roll to roll a dice")
                .await?;
        }
        _ => {}
    }
    Ok(())
}
