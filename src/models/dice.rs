//! Dice categories accepted by `sendDice`
//!
//! Each emoji the Bot API animates has its own legal value range.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::utils::errors::{Result, TestkitError};

/// Animated dice emoji and their Bot API value ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceEmoji {
    /// 🎲, values 1-6
    #[default]
    Dice,
    /// 🎯, values 1-6
    Darts,
    /// 🎳, values 1-6
    Bowling,
    /// 🏀, values 1-5
    Basketball,
    /// ⚽, values 1-5
    Football,
    /// 🎰, values 1-64
    SlotMachine,
}

impl DiceEmoji {
    pub const ALL: [DiceEmoji; 6] = [
        DiceEmoji::Dice,
        DiceEmoji::Darts,
        DiceEmoji::Bowling,
        DiceEmoji::Basketball,
        DiceEmoji::Football,
        DiceEmoji::SlotMachine,
    ];

    /// Emoji string as sent in the `emoji` parameter
    pub fn emoji(&self) -> &'static str {
        match self {
            DiceEmoji::Dice => "🎲",
            DiceEmoji::Darts => "🎯",
            DiceEmoji::Bowling => "🎳",
            DiceEmoji::Basketball => "🏀",
            DiceEmoji::Football => "⚽",
            DiceEmoji::SlotMachine => "🎰",
        }
    }

    /// Look up a category by its emoji
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.emoji() == emoji)
    }

    /// Legal value range for this category
    pub fn range(&self) -> RangeInclusive<u8> {
        match self {
            DiceEmoji::Dice | DiceEmoji::Darts | DiceEmoji::Bowling => 1..=6,
            DiceEmoji::Basketball | DiceEmoji::Football => 1..=5,
            DiceEmoji::SlotMachine => 1..=64,
        }
    }

    /// Check that `value` is a legal outcome for this category
    pub fn validate(&self, value: u8) -> Result<u8> {
        let range = self.range();
        if range.contains(&value) {
            Ok(value)
        } else {
            Err(TestkitError::InvalidOverrideValue {
                category: *self,
                value,
                min: *range.start(),
                max: *range.end(),
            })
        }
    }
}

impl fmt::Display for DiceEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiceEmoji::Dice => "dice",
            DiceEmoji::Darts => "darts",
            DiceEmoji::Bowling => "bowling",
            DiceEmoji::Basketball => "basketball",
            DiceEmoji::Football => "football",
            DiceEmoji::SlotMachine => "slot machine",
        };
        write!(f, "{} {}", self.emoji(), name)
    }
}
