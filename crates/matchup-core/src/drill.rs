//! Answer-entry drills and the word learning board.
//!
//! A [`Drill`] asks one arithmetic question at a time and deals the next one
//! after every answer, right or wrong. Ten correct answers clear the level.
//! The [`LearningBoard`] shows a handful of gender pairs. Revealing one reads
//! it aloud and swaps in a pair that is not on the board.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::deck::GENDER_PAIRS;
use crate::random::{RandomSource, shuffle};

/// Correct answers that clear a drill level.
pub const LEVEL_TARGET: u32 = 10;
/// Pairs shown on the learning board.
pub const LEARNING_BOARD_PAIRS: usize = 6;
/// Second operands for the tens-addition drill.
pub const TENS: [u32; 5] = [10, 20, 30, 40, 50];

/// Which drill to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillKind {
    /// Two digits 1..=9, larger minus smaller.
    Subtraction,
    /// 10..=30 plus a multiple of ten up to 50.
    TensAddition,
}

impl DrillKind {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subtraction => "subtraction",
            Self::TensAddition => "tens",
        }
    }

    /// Heading shown above the questions.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Subtraction => "Find The Missing Number!",
            Self::TensAddition => "Add the Tens!",
        }
    }

    /// Draw a fresh question.
    pub fn question(self, rng: &mut (impl RandomSource + ?Sized)) -> Question {
        match self {
            Self::Subtraction => {
                let a = draw(rng, 9) + 1;
                let b = draw(rng, 9) + 1;
                Question {
                    first: a.max(b),
                    second: a.min(b),
                    operator: Operator::Minus,
                }
            }
            Self::TensAddition => {
                let first = draw(rng, 21) + 10;
                let second = TENS[rng.index_below(TENS.len()).min(TENS.len() - 1)];
                Question {
                    first,
                    second,
                    operator: Operator::Plus,
                }
            }
        }
    }
}

fn draw(rng: &mut (impl RandomSource + ?Sized), bound: u32) -> u32 {
    u32::try_from(rng.index_below(bound as usize)).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Plus,
    Minus,
}

impl Operator {
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// One question. Subtraction questions always have `first >= second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub first: u32,
    pub second: u32,
    pub operator: Operator,
}

impl Question {
    #[must_use]
    pub const fn answer(self) -> u32 {
        match self.operator {
            Operator::Plus => self.first + self.second,
            Operator::Minus => self.first.saturating_sub(self.second),
        }
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.first, self.operator.symbol(), self.second)
    }
}

/// What one submitted answer produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub question: Question,
    /// The parsed answer; `None` when the input was not a number.
    pub given: Option<i64>,
    pub expected: u32,
    pub correct: bool,
    /// True only on the answer that brought the score to [`LEVEL_TARGET`].
    pub level_cleared: bool,
}

/// A running drill: current question plus score and attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drill {
    kind: DrillKind,
    question: Question,
    score: u32,
    attempts: u32,
}

impl Drill {
    pub fn new(kind: DrillKind, rng: &mut (impl RandomSource + ?Sized)) -> Self {
        let question = kind.question(rng);
        info!(drill = kind.as_str(), "drill started");
        Self {
            kind,
            question,
            score: 0,
            attempts: 0,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DrillKind {
        self.kind
    }

    #[must_use]
    pub const fn question(&self) -> Question {
        self.question
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.score >= LEVEL_TARGET
    }

    /// Check `input` against the current question, then deal the next one.
    ///
    /// Input that is not a whole number counts as a wrong attempt.
    pub fn submit(&mut self, input: &str, rng: &mut (impl RandomSource + ?Sized)) -> Attempt {
        let question = self.question;
        let expected = question.answer();
        let given = input.trim().parse::<i64>().ok();
        let correct = given == Some(i64::from(expected));

        self.attempts += 1;
        if correct {
            self.score += 1;
        }
        let level_cleared = correct && self.score == LEVEL_TARGET;
        debug!(
            question = %question,
            correct,
            score = self.score,
            attempts = self.attempts,
            "answer checked"
        );
        if level_cleared {
            info!(drill = self.kind.as_str(), attempts = self.attempts, "level cleared");
        }

        self.question = self.kind.question(rng);
        Attempt {
            question,
            given,
            expected,
            correct,
            level_cleared,
        }
    }
}

/// A masculine/feminine pair on the learning board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordPair {
    pub masculine: String,
    pub feminine: String,
}

impl WordPair {
    fn from_table(index: usize) -> Option<Self> {
        GENDER_PAIRS.get(index).map(|(masculine, feminine)| Self {
            masculine: (*masculine).to_string(),
            feminine: (*feminine).to_string(),
        })
    }
}

/// Result of revealing one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub slot: usize,
    pub pair: WordPair,
    /// Pair now shown in the slot.
    pub replacement: WordPair,
}

/// Gender pairs on show for learning. No pair appears twice on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningBoard {
    slots: Vec<usize>,
}

impl LearningBoard {
    pub fn new(rng: &mut (impl RandomSource + ?Sized)) -> Self {
        let mut order: Vec<usize> = (0..GENDER_PAIRS.len()).collect();
        shuffle(&mut order, rng);
        order.truncate(LEARNING_BOARD_PAIRS);
        Self { slots: order }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Pairs in slot order.
    #[must_use]
    pub fn pairs(&self) -> Vec<WordPair> {
        self.slots
            .iter()
            .filter_map(|&index| WordPair::from_table(index))
            .collect()
    }

    /// Reveal `slot` and replace it with a pair not currently on the board.
    /// Returns `None` for a slot past the end.
    pub fn reveal(
        &mut self,
        slot: usize,
        rng: &mut (impl RandomSource + ?Sized),
    ) -> Option<Reveal> {
        let shown = *self.slots.get(slot)?;
        let pair = WordPair::from_table(shown)?;

        let unused: Vec<usize> = (0..GENDER_PAIRS.len())
            .filter(|index| !self.slots.contains(index))
            .collect();
        if let Some(&next) = unused.get(rng.index_below(unused.len())) {
            self.slots[slot] = next;
        }
        let replacement = WordPair::from_table(self.slots[slot])?;
        debug!(slot, masculine = %pair.masculine, "pair revealed");

        Some(Reveal {
            slot,
            pair,
            replacement,
        })
    }
}
