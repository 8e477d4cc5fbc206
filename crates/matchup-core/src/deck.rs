//! Per-screen configuration: which pairs a round is dealt from and how each
//! side is labelled.
//!
//! The engine only ever sees card keys. A [`Deck`] maps every key to the
//! label shown in the left column and the label shown in the right column,
//! so "3 x 4" can pair with "12" and "King" with "Queen" while the engine
//! still matches on plain value equality.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CustomScreenConfig, GameConfig};
use crate::engine::Column;
use crate::error::ErrorCode;
use crate::random::{RandomSource, shuffle};

/// Pairs on the number screen.
pub const NUMBER_PAIRS: u32 = 9;
/// Rows dealt from a multiplication table.
pub const TABLE_ROWS: u32 = 12;
/// Smallest and largest multiplication table on offer.
pub const TABLE_RANGE: std::ops::RangeInclusive<u32> = 1..=15;
/// Pairs dealt per round on the gender screen.
pub const GENDER_ROUND_PAIRS: usize = 5;

/// Masculine/feminine word pairs for the gender screen.
pub const GENDER_PAIRS: &[(&str, &str)] = &[
    ("Boy", "Girl"),
    ("Husband", "Wife"),
    ("Man", "Woman"),
    ("Father", "Mother"),
    ("King", "Queen"),
    ("Uncle", "Aunt"),
    ("Son", "Daughter"),
    ("Brother", "Sister"),
    ("Grandfather", "Grandmother"),
    ("Prince", "Princess"),
    ("Ox", "Cow"),
    ("Sir", "Madam"),
    ("Hero", "Heroine"),
    ("Master", "Mistress"),
    ("Hunter", "Huntress"),
    ("Actor", "Actress"),
    ("Peacock", "Peahen"),
    ("Waiter", "Waitress"),
    ("Bull", "Cow"),
    ("Drake", "Duck"),
    ("Gentleman", "Lady"),
    ("Grandson", "Granddaughter"),
    ("Wizard", "Witch"),
    ("Rooster", "Hen"),
    ("Lion", "Lioness"),
    ("Tiger", "Tigress"),
    ("Horse", "Mare"),
    ("Fox", "Vixen"),
    ("Ram", "Ewe"),
    ("Daddy", "Mommy"),
    ("Goat", "Nanny Goat"),
    ("Bear", "She-Bear"),
    ("Stallion", "Mare"),
    ("Gander", "Goose"),
];

/// Errors from deck construction and screen lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    #[error("deck has no cards")]
    Empty,
    #[error("card key {0} appears more than once")]
    DuplicateKey(u32),
    #[error("card {key} has an empty {column} label")]
    EmptyLabel { key: u32, column: Column },
    #[error("label {label:?} appears twice in the {column} column")]
    DuplicateLabel { label: String, column: Column },
    #[error("multiplication table {0} is outside 1..=15")]
    TableOutOfRange(u32),
    #[error("screen asks for {requested} pairs but only {available} are available")]
    NotEnoughPairs { requested: usize, available: usize },
    #[error("unknown screen: {0}")]
    UnknownScreen(String),
}

impl DeckError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownScreen(_) => ErrorCode::UnknownScreen,
            _ => ErrorCode::InvalidDeck,
        }
    }
}

/// One matching pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub key: u32,
    pub left: String,
    pub right: String,
}

impl Card {
    #[must_use]
    pub fn new(key: u32, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            key,
            left: left.into(),
            right: right.into(),
        }
    }

    /// Label for `column`.
    #[must_use]
    pub fn label(&self, column: Column) -> &str {
        match column {
            Column::Left => &self.left,
            Column::Right => &self.right,
        }
    }
}

/// Cards dealt for one round. Keys are unique, labels non-empty and unique
/// within each column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Validate and wrap `cards`.
    ///
    /// # Errors
    ///
    /// Returns a [`DeckError`] for an empty list, a repeated key, an empty
    /// label, or a label repeated within one column.
    pub fn new(cards: Vec<Card>) -> Result<Self, DeckError> {
        if cards.is_empty() {
            return Err(DeckError::Empty);
        }

        let mut keys = HashSet::with_capacity(cards.len());
        let mut left_labels = HashSet::with_capacity(cards.len());
        let mut right_labels = HashSet::with_capacity(cards.len());

        for card in &cards {
            if !keys.insert(card.key) {
                return Err(DeckError::DuplicateKey(card.key));
            }
            for (column, labels) in [
                (Column::Left, &mut left_labels),
                (Column::Right, &mut right_labels),
            ] {
                let label = card.label(column).trim();
                if label.is_empty() {
                    return Err(DeckError::EmptyLabel {
                        key: card.key,
                        column,
                    });
                }
                if !labels.insert(label.to_string()) {
                    return Err(DeckError::DuplicateLabel {
                        label: label.to_string(),
                        column,
                    });
                }
            }
        }

        Ok(Self { cards })
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The value set handed to the engine, in deck order.
    #[must_use]
    pub fn keys(&self) -> Vec<u32> {
        self.cards.iter().map(|card| card.key).collect()
    }

    #[must_use]
    pub fn card(&self, key: u32) -> Option<&Card> {
        self.cards.iter().find(|card| card.key == key)
    }

    /// Label for `key` in `column`.
    #[must_use]
    pub fn label(&self, column: Column, key: u32) -> Option<&str> {
        self.card(key).map(|card| card.label(column))
    }
}

/// Where a screen's pairs come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenKind {
    /// Digits 1..=9 on both sides.
    Numbers,
    /// `"{table} x {k}"` on the left, the product on the right.
    Tables { table: u32 },
    /// Masculine on the left, feminine on the right.
    Genders,
    /// Pairs taken from configuration.
    Custom { pairs: Vec<(String, String)> },
}

/// A playable screen: headings plus the rule for dealing a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub id: String,
    pub title: String,
    pub left_heading: String,
    pub right_heading: String,
    pub kind: ScreenKind,
    /// Pairs per round; `None` uses the screen's default.
    pub pair_count: Option<usize>,
}

impl Screen {
    /// "Match the Numbers!" with 1..=9.
    #[must_use]
    pub fn numbers() -> Self {
        Self {
            id: "numbers".to_string(),
            title: "Match the Numbers!".to_string(),
            left_heading: "Column A".to_string(),
            right_heading: "Column B".to_string(),
            kind: ScreenKind::Numbers,
            pair_count: None,
        }
    }

    /// Multiplication table `table`.
    #[must_use]
    pub fn tables(table: u32) -> Self {
        Self {
            id: "tables".to_string(),
            title: format!("Table of {table}"),
            left_heading: "Question".to_string(),
            right_heading: "Answer".to_string(),
            kind: ScreenKind::Tables { table },
            pair_count: None,
        }
    }

    /// Masculine and feminine word pairs.
    #[must_use]
    pub fn genders() -> Self {
        Self {
            id: "genders".to_string(),
            title: "Masculine and Feminine".to_string(),
            left_heading: "Masculine".to_string(),
            right_heading: "Feminine".to_string(),
            kind: ScreenKind::Genders,
            pair_count: None,
        }
    }

    /// Build a screen from a `[[screens]]` config entry.
    #[must_use]
    pub fn from_custom(custom: &CustomScreenConfig) -> Self {
        Self {
            id: custom.id.clone(),
            title: custom.title.clone().unwrap_or_else(|| custom.id.clone()),
            left_heading: custom
                .left_heading
                .clone()
                .unwrap_or_else(|| "Column A".to_string()),
            right_heading: custom
                .right_heading
                .clone()
                .unwrap_or_else(|| "Column B".to_string()),
            kind: ScreenKind::Custom {
                pairs: custom.pairs.clone(),
            },
            pair_count: custom.pair_count,
        }
    }

    /// Deal the cards for one round.
    ///
    /// Fixed screens (numbers, tables) ignore `rng`; the engine shuffles
    /// presentation order. Word screens draw a random subset when they hold
    /// more pairs than a round uses.
    ///
    /// # Errors
    ///
    /// Returns a [`DeckError`] if the screen cannot produce a valid deck.
    pub fn deal(&self, rng: &mut (impl RandomSource + ?Sized)) -> Result<Deck, DeckError> {
        let (cards, requested): (Vec<Card>, usize) = match &self.kind {
            ScreenKind::Numbers => {
                let count = self.count_within(NUMBER_PAIRS as usize, NUMBER_PAIRS as usize)?;
                let cards = (1..=NUMBER_PAIRS)
                    .take(count)
                    .map(|n| Card::new(n, n.to_string(), n.to_string()))
                    .collect();
                (cards, count)
            }
            ScreenKind::Tables { table } => {
                if !TABLE_RANGE.contains(table) {
                    return Err(DeckError::TableOutOfRange(*table));
                }
                let count = self.count_within(TABLE_ROWS as usize, TABLE_ROWS as usize)?;
                let cards = (1..=TABLE_ROWS)
                    .take(count)
                    .map(|k| Card::new(k, format!("{table} x {k}"), (table * k).to_string()))
                    .collect();
                (cards, count)
            }
            ScreenKind::Genders => {
                let count = self.count_within(GENDER_ROUND_PAIRS, GENDER_PAIRS.len())?;
                let cards = draw_pairs(
                    GENDER_PAIRS
                        .iter()
                        .map(|(masculine, feminine)| (*masculine, *feminine)),
                    count,
                    rng,
                );
                (cards, count)
            }
            ScreenKind::Custom { pairs } => {
                let count = self.count_within(pairs.len(), pairs.len())?;
                let cards = draw_pairs(
                    pairs.iter().map(|(left, right)| (left.as_str(), right.as_str())),
                    count,
                    rng,
                );
                (cards, count)
            }
        };

        // Twin labels are skipped while drawing, which can leave a word
        // screen short of the requested pairs.
        if cards.len() < requested {
            return Err(DeckError::NotEnoughPairs {
                requested,
                available: cards.len(),
            });
        }

        let deck = Deck::new(cards)?;
        debug!(screen = %self.id, pairs = deck.len(), "deck dealt");
        Ok(deck)
    }

    /// Pairs one round of this screen deals.
    #[must_use]
    pub fn pairs_per_round(&self) -> usize {
        self.pair_count.unwrap_or(match &self.kind {
            ScreenKind::Numbers => NUMBER_PAIRS as usize,
            ScreenKind::Tables { .. } => TABLE_ROWS as usize,
            ScreenKind::Genders => GENDER_ROUND_PAIRS,
            ScreenKind::Custom { pairs } => pairs.len(),
        })
    }

    fn count_within(&self, default: usize, available: usize) -> Result<usize, DeckError> {
        let requested = self.pair_count.unwrap_or(default);
        if requested == 0 {
            return Err(DeckError::Empty);
        }
        if requested > available {
            return Err(DeckError::NotEnoughPairs {
                requested,
                available,
            });
        }
        Ok(requested)
    }
}

/// Draw `count` pairs at random, skipping any pair whose left or right label
/// was already drawn so the two columns never show twin cells. Labels are
/// compared trimmed, the same way [`Deck::new`] compares them. Keys are the
/// pairs' positions in the source table.
fn draw_pairs<'a>(
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
    count: usize,
    rng: &mut (impl RandomSource + ?Sized),
) -> Vec<Card> {
    let mut indexed: Vec<(u32, &str, &str)> = pairs
        .enumerate()
        .filter_map(|(i, (l, r))| u32::try_from(i).ok().map(|key| (key, l, r)))
        .collect();
    shuffle(&mut indexed, rng);

    let mut seen_left = HashSet::new();
    let mut seen_right = HashSet::new();
    let mut cards = Vec::with_capacity(count);
    for (key, left, right) in indexed {
        if cards.len() == count {
            break;
        }
        let (trimmed_left, trimmed_right) = (left.trim(), right.trim());
        if seen_left.contains(trimmed_left) || seen_right.contains(trimmed_right) {
            continue;
        }
        seen_left.insert(trimmed_left);
        seen_right.insert(trimmed_right);
        cards.push(Card::new(key, left, right));
    }
    cards
}

/// Built-in screens followed by the configured custom screens.
#[must_use]
pub fn catalog(game: &GameConfig, custom: &[CustomScreenConfig]) -> Vec<Screen> {
    let mut screens = vec![
        Screen::numbers(),
        Screen::tables(game.default_table),
        Screen::genders(),
    ];
    screens.extend(custom.iter().map(Screen::from_custom));
    screens
}

/// Look a screen up by id.
///
/// # Errors
///
/// Returns [`DeckError::UnknownScreen`] if no screen has that id.
pub fn find_screen(screens: &[Screen], id: &str) -> Result<Screen, DeckError> {
    screens
        .iter()
        .find(|screen| screen.id == id)
        .cloned()
        .ok_or_else(|| DeckError::UnknownScreen(id.to_string()))
}
