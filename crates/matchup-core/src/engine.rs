//! Matching-session engine.
//!
//! One [`MatchSession`] is one round of the pairing puzzle: the value set is
//! shuffled into a `left` and a `right` column, the player picks one cell at
//! a time, and a pick in the column opposite a pending pick triggers an
//! evaluation.
//!
//! # State machine
//!
//! ```text
//! start_round ──► InProgress ──(N confirmed matches)──► Complete
//!                  │
//!                  ├─ none pending ──pick──► left|right pending
//!                  └─ left|right pending ──pick opposite──► evaluate ──► none pending
//! ```
//!
//! "Both pending" is never a stable state: the second pick of a column pair
//! is exactly when the evaluation fires. A second pick in the *same* column
//! replaces the pending index (last click wins).
//!
//! Matched cells are inert. Selecting one, or selecting an index past the end
//! of a column, returns [`SelectEvent::NoOp`] and leaves the session untouched.
//!
//! The engine performs no I/O. Observers (audio cues, feedback text, the
//! renderer) read the returned [`Selection`] and the session accessors.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ErrorCode;
use crate::random::{RandomSource, shuffle};

/// Errors raised while setting up a round.
///
/// These are precondition violations on the value set, reported at
/// construction so a session can never hold an ambiguous column.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// The value set has no members.
    #[error("a round needs at least one value")]
    EmptyValueSet,
    /// Two members of the value set compare equal.
    #[error("value set has a duplicate: positions {first} and {second} are equal")]
    DuplicateValue { first: usize, second: usize },
}

impl SetupError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyValueSet => ErrorCode::EmptyValueSet,
            Self::DuplicateValue { .. } => ErrorCode::DuplicateValue,
        }
    }
}

/// One of the two presentation columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Left,
    Right,
}

impl Column {
    /// The other column.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-round counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub correct: u32,
    pub wrong: u32,
}

impl RoundStats {
    /// Total evaluations fired this round.
    #[must_use]
    pub const fn evaluations(self) -> u32 {
        self.correct + self.wrong
    }
}

/// Round phase. A session that does not exist yet is the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InProgress,
    Complete,
}

/// What the presentation layer should show for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    /// Selectable and not currently picked.
    Open,
    /// The column's pending pick.
    Pending,
    /// Part of a confirmed pair; disabled.
    Matched,
}

/// Why a selection did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    AlreadyMatched,
    OutOfRange,
}

/// Direct result of one [`MatchSession::select`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SelectEvent<V> {
    /// The pick became the column's pending selection.
    Selected { column: Column, index: usize, value: V },
    /// The evaluation confirmed a pair.
    Matched { value: V, left: usize, right: usize },
    /// The evaluation rejected the two picked values.
    Mismatched { left_value: V, right_value: V },
    /// The pick was inert.
    NoOp { reason: NoOpReason },
}

impl<V> SelectEvent<V> {
    /// True for the two evaluation outcomes.
    #[must_use]
    pub const fn is_evaluation(&self) -> bool {
        matches!(self, Self::Matched { .. } | Self::Mismatched { .. })
    }

    /// True for [`SelectEvent::NoOp`].
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp { .. })
    }
}

/// Observer-facing events, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent<V> {
    Selected { column: Column, index: usize, value: V },
    Matched { value: V },
    Mismatched { left_value: V, right_value: V },
    RoundComplete { stats: RoundStats },
}

/// Everything one pick produced.
///
/// `completed` is `Some` only on the `Matched` evaluation that confirmed the
/// final pair, so a round signals completion exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection<V> {
    pub event: SelectEvent<V>,
    pub completed: Option<RoundStats>,
}

impl<V: Clone> Selection<V> {
    /// Flatten into the observer event stream. `NoOp` yields nothing.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent<V>> {
        let mut out = Vec::with_capacity(2);
        match &self.event {
            SelectEvent::Selected {
                column,
                index,
                value,
            } => out.push(SessionEvent::Selected {
                column: *column,
                index: *index,
                value: value.clone(),
            }),
            SelectEvent::Matched { value, .. } => out.push(SessionEvent::Matched {
                value: value.clone(),
            }),
            SelectEvent::Mismatched {
                left_value,
                right_value,
            } => out.push(SessionEvent::Mismatched {
                left_value: left_value.clone(),
                right_value: right_value.clone(),
            }),
            SelectEvent::NoOp { .. } => {}
        }
        if let Some(stats) = self.completed {
            out.push(SessionEvent::RoundComplete { stats });
        }
        out
    }
}

/// State of one matching round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSession<V> {
    left: Vec<V>,
    right: Vec<V>,
    pending_left: Option<usize>,
    pending_right: Option<usize>,
    matches: BTreeMap<usize, usize>,
    matched_right: BTreeSet<usize>,
    stats: RoundStats,
}

impl<V> MatchSession<V>
where
    V: Clone + Eq + Hash,
{
    /// Shuffle `values` into two independent columns and start a fresh round.
    ///
    /// `left` is shuffled first, then `right`, each from the caller's order,
    /// so a scripted source consumes `2 * (n - 1)` draws in that order.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptyValueSet`] for an empty set and
    /// [`SetupError::DuplicateValue`] if two members compare equal.
    pub fn start_round(
        values: Vec<V>,
        rng: &mut (impl RandomSource + ?Sized),
    ) -> Result<Self, SetupError> {
        validate_values(&values)?;

        let mut left = values.clone();
        let mut right = values;
        shuffle(&mut left, rng);
        shuffle(&mut right, rng);

        info!(pairs = left.len(), "round started");

        Ok(Self {
            left,
            right,
            pending_left: None,
            pending_right: None,
            matches: BTreeMap::new(),
            matched_right: BTreeSet::new(),
            stats: RoundStats::default(),
        })
    }

    /// Start over with a new shuffle. Equivalent to [`Self::start_round`]
    /// but reuses this session in place.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start_round`]; on error the current round is kept.
    pub fn restart(
        &mut self,
        values: Vec<V>,
        rng: &mut (impl RandomSource + ?Sized),
    ) -> Result<(), SetupError> {
        *self = Self::start_round(values, rng)?;
        Ok(())
    }

    /// Pick `index` in `column`.
    pub fn select(&mut self, column: Column, index: usize) -> Selection<V> {
        if index >= self.len() {
            debug!(%column, index, "selection out of range");
            return noop(NoOpReason::OutOfRange);
        }
        if self.is_matched(column, index) {
            debug!(%column, index, "selection on matched cell ignored");
            return noop(NoOpReason::AlreadyMatched);
        }

        let Some(other) = self.pending(column.opposite()) else {
            self.set_pending(column, Some(index));
            let value = self.column(column)[index].clone();
            debug!(%column, index, "pending selection recorded");
            return Selection {
                event: SelectEvent::Selected {
                    column,
                    index,
                    value,
                },
                completed: None,
            };
        };

        let (left_index, right_index) = match column {
            Column::Left => (index, other),
            Column::Right => (other, index),
        };
        self.pending_left = None;
        self.pending_right = None;

        if self.left[left_index] == self.right[right_index] {
            self.matches.insert(left_index, right_index);
            self.matched_right.insert(right_index);
            self.stats.correct += 1;
            debug!(
                left = left_index,
                right = right_index,
                correct = self.stats.correct,
                "pair matched"
            );

            let completed = self.is_complete().then_some(self.stats);
            if let Some(stats) = completed {
                info!(correct = stats.correct, wrong = stats.wrong, "round complete");
            }
            Selection {
                event: SelectEvent::Matched {
                    value: self.left[left_index].clone(),
                    left: left_index,
                    right: right_index,
                },
                completed,
            }
        } else {
            self.stats.wrong += 1;
            debug!(
                left = left_index,
                right = right_index,
                wrong = self.stats.wrong,
                "pair mismatched"
            );
            Selection {
                event: SelectEvent::Mismatched {
                    left_value: self.left[left_index].clone(),
                    right_value: self.right[right_index].clone(),
                },
                completed: None,
            }
        }
    }
}

impl<V> MatchSession<V> {
    /// Number of pairs in the round.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Always false for a constructed session; kept for the `len` pairing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Left column in presentation order.
    #[must_use]
    pub fn left(&self) -> &[V] {
        &self.left
    }

    /// Right column in presentation order.
    #[must_use]
    pub fn right(&self) -> &[V] {
        &self.right
    }

    /// Cells of one column.
    #[must_use]
    pub fn column(&self, column: Column) -> &[V] {
        match column {
            Column::Left => &self.left,
            Column::Right => &self.right,
        }
    }

    /// Value shown at `index` in `column`, if in range.
    #[must_use]
    pub fn value(&self, column: Column, index: usize) -> Option<&V> {
        self.column(column).get(index)
    }

    /// Pending index for `column`.
    #[must_use]
    pub const fn pending(&self, column: Column) -> Option<usize> {
        match column {
            Column::Left => self.pending_left,
            Column::Right => self.pending_right,
        }
    }

    /// Confirmed pairs, left index to right index.
    #[must_use]
    pub const fn matches(&self) -> &BTreeMap<usize, usize> {
        &self.matches
    }

    /// Counters for this round.
    #[must_use]
    pub const fn stats(&self) -> RoundStats {
        self.stats
    }

    /// `|matches| = N`.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matches.len() == self.left.len()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.is_complete() {
            Phase::Complete
        } else {
            Phase::InProgress
        }
    }

    /// Whether the cell belongs to a confirmed pair.
    #[must_use]
    pub fn is_matched(&self, column: Column, index: usize) -> bool {
        match column {
            Column::Left => self.matches.contains_key(&index),
            Column::Right => self.matched_right.contains(&index),
        }
    }

    /// Display state of one cell.
    #[must_use]
    pub fn cell(&self, column: Column, index: usize) -> CellState {
        if self.is_matched(column, index) {
            CellState::Matched
        } else if self.pending(column) == Some(index) {
            CellState::Pending
        } else {
            CellState::Open
        }
    }

    const fn set_pending(&mut self, column: Column, index: Option<usize>) {
        match column {
            Column::Left => self.pending_left = index,
            Column::Right => self.pending_right = index,
        }
    }
}

const fn noop<V>(reason: NoOpReason) -> Selection<V> {
    Selection {
        event: SelectEvent::NoOp { reason },
        completed: None,
    }
}

fn validate_values<V: Eq + Hash>(values: &[V]) -> Result<(), SetupError> {
    if values.is_empty() {
        return Err(SetupError::EmptyValueSet);
    }
    let mut seen: HashMap<&V, usize> = HashMap::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        if let Some(&first) = seen.get(value) {
            return Err(SetupError::DuplicateValue {
                first,
                second: position,
            });
        }
        seen.insert(value, position);
    }
    Ok(())
}
