//! Inline keyboard fixtures

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Build an inline keyboard from rows of `(text, callback_data)` pairs
pub fn inline_keyboard<I, R, T, D>(rows: I) -> InlineKeyboardMarkup
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = (T, D)>,
    T: Into<String>,
    D: Into<String>,
{
    InlineKeyboardMarkup::new(rows.into_iter().map(|row| {
        row.into_iter()
            .map(|(text, data)| InlineKeyboardButton::callback(text, data))
            .collect::<Vec<_>>()
    }))
}
