use std::collections::BTreeSet;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use matchup_core::{Column, MatchSession, SelectEvent, Selection};

// ── Core result types ─────────────────────────────────────────────────────────

/// Oracle result for a play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

// ── Invariant violation diagnostics ──────────────────────────────────────────

/// One broken session invariant, located by click number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum InvariantViolation {
    /// A column is not a permutation of the dealt value set.
    NotAPermutation { column: Column },
    /// A confirmed pair joins cells with different values.
    PairValuesDiffer { step: usize, left: usize, right: usize },
    /// Two confirmed pairs share a right cell.
    RightCellReused { step: usize, right: usize },
    /// A pending pick survived an evaluation.
    PendingAfterEvaluation { step: usize },
    /// `correct + wrong` drifted from the number of evaluations observed.
    StatsDrift {
        step: usize,
        correct: u32,
        wrong: u32,
        evaluations: u32,
    },
    /// `correct` disagrees with the number of confirmed pairs.
    CorrectCountDrift {
        step: usize,
        correct: u32,
        matches: usize,
    },
    /// Completion was signalled a second time.
    CompletionRefired { step: usize },
    /// Completion was signalled before every pair was matched.
    CompletionEarly { step: usize },
    /// Every pair is matched but completion was never signalled.
    CompletionMissing,
    /// A `NoOp` selection changed session state.
    NoOpMutated { step: usize },
    /// A player who should finish ran out of clicks.
    Stalled { clicks: usize, matched: usize, pairs: usize },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAPermutation { column } => {
                write!(f, "Permutation: {column} column is not a shuffle of the value set")
            }
            Self::PairValuesDiffer { step, left, right } => write!(
                f,
                "PairValues: step {step} paired left {left} with right {right} but values differ"
            ),
            Self::RightCellReused { step, right } => {
                write!(f, "RightReuse: step {step} right cell {right} is in two pairs")
            }
            Self::PendingAfterEvaluation { step } => {
                write!(f, "Pending: step {step} evaluated but a pick is still pending")
            }
            Self::StatsDrift {
                step,
                correct,
                wrong,
                evaluations,
            } => write!(
                f,
                "Stats: step {step} has correct={correct} wrong={wrong} \
                 after {evaluations} evaluations"
            ),
            Self::CorrectCountDrift {
                step,
                correct,
                matches,
            } => write!(
                f,
                "Correct: step {step} has correct={correct} but {matches} pairs"
            ),
            Self::CompletionRefired { step } => {
                write!(f, "Completion: step {step} signalled completion again")
            }
            Self::CompletionEarly { step } => {
                write!(f, "Completion: step {step} signalled with pairs still open")
            }
            Self::CompletionMissing => {
                write!(f, "Completion: all pairs matched but completion never signalled")
            }
            Self::NoOpMutated { step } => write!(f, "NoOp: step {step} changed session state"),
            Self::Stalled {
                clicks,
                matched,
                pairs,
            } => write!(f, "Stalled: {matched}/{pairs} pairs after {clicks} clicks"),
        }
    }
}

// ── Oracle ────────────────────────────────────────────────────────────────────

/// Watches one round click by click and records every broken invariant.
///
/// Feed it the deal with [`SessionOracle::check_deal`], then each step with
/// [`SessionOracle::observe`], then call [`SessionOracle::finish`].
#[derive(Debug, Clone)]
pub struct SessionOracle<V> {
    values: Vec<V>,
    evaluations: u32,
    completions: u32,
    step: usize,
    violations: Vec<InvariantViolation>,
}

impl<V> SessionOracle<V>
where
    V: Clone + Ord + Debug,
{
    /// Start watching a round dealt from `values`.
    #[must_use]
    pub fn new(values: &[V]) -> Self {
        let mut values = values.to_vec();
        values.sort();
        Self {
            values,
            evaluations: 0,
            completions: 0,
            step: 0,
            violations: Vec::new(),
        }
    }

    /// Both columns are permutations of the value set.
    pub fn check_deal(&mut self, session: &MatchSession<V>) {
        for column in [Column::Left, Column::Right] {
            let mut shown = session.column(column).to_vec();
            shown.sort();
            if shown != self.values {
                self.violations
                    .push(InvariantViolation::NotAPermutation { column });
            }
        }
    }

    /// Check one selection given the session before and after it.
    pub fn observe(
        &mut self,
        before: &MatchSession<V>,
        outcome: &Selection<V>,
        after: &MatchSession<V>,
    ) {
        self.step += 1;
        let step = self.step;

        match outcome.event {
            SelectEvent::NoOp { .. } => {
                if before != after {
                    self.violations.push(InvariantViolation::NoOpMutated { step });
                }
            }
            SelectEvent::Matched { .. } | SelectEvent::Mismatched { .. } => {
                self.evaluations += 1;
                if after.pending(Column::Left).is_some() || after.pending(Column::Right).is_some()
                {
                    self.violations
                        .push(InvariantViolation::PendingAfterEvaluation { step });
                }
            }
            SelectEvent::Selected { .. } => {}
        }

        if outcome.completed.is_some() {
            self.completions += 1;
            if self.completions > 1 {
                self.violations
                    .push(InvariantViolation::CompletionRefired { step });
            }
            if !after.is_complete() {
                self.violations.push(InvariantViolation::CompletionEarly { step });
            }
        }

        let mut rights = BTreeSet::new();
        for (&left, &right) in after.matches() {
            if !rights.insert(right) {
                self.violations
                    .push(InvariantViolation::RightCellReused { step, right });
            }
            if after.value(Column::Left, left) != after.value(Column::Right, right) {
                self.violations
                    .push(InvariantViolation::PairValuesDiffer { step, left, right });
            }
        }

        let stats = after.stats();
        if stats.evaluations() != self.evaluations {
            self.violations.push(InvariantViolation::StatsDrift {
                step,
                correct: stats.correct,
                wrong: stats.wrong,
                evaluations: self.evaluations,
            });
        }
        if usize::try_from(stats.correct).ok() != Some(after.matches().len()) {
            self.violations.push(InvariantViolation::CorrectCountDrift {
                step,
                correct: stats.correct,
                matches: after.matches().len(),
            });
        }
    }

    /// Number of selections observed so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.step
    }

    /// Close the round and report.
    #[must_use]
    pub fn finish(mut self, session: &MatchSession<V>) -> OracleResult {
        if session.is_complete() && self.completions == 0 {
            self.violations.push(InvariantViolation::CompletionMissing);
        }
        OracleResult::from_violations(self.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchup_core::ScriptedSource;

    fn round() -> MatchSession<u32> {
        MatchSession::start_round(vec![1, 2, 3], &mut ScriptedSource::new([2, 0, 1, 1]))
            .expect("valid values")
    }

    fn play(
        session: &mut MatchSession<u32>,
        oracle: &mut SessionOracle<u32>,
        clicks: &[(Column, usize)],
    ) {
        for &(column, index) in clicks {
            let before = session.clone();
            let outcome = session.select(column, index);
            oracle.observe(&before, &outcome, session);
        }
    }

    #[test]
    fn clean_round_passes() {
        let mut session = round();
        let mut oracle = SessionOracle::new(&[1, 2, 3]);
        oracle.check_deal(&session);
        play(
            &mut session,
            &mut oracle,
            &[
                (Column::Left, 0),
                (Column::Right, 0),
                (Column::Left, 0),
                (Column::Left, 0),
                (Column::Right, 2),
                (Column::Right, 2),
                (Column::Left, 1),
                (Column::Right, 0),
                (Column::Right, 1),
                (Column::Left, 2),
                (Column::Left, 9),
            ],
        );
        assert_eq!(oracle.steps(), 11);
        let result = oracle.finish(&session);
        assert!(result.passed, "{:?}", result.violations);
    }

    #[test]
    fn wrong_value_set_is_flagged() {
        let session = round();
        let mut oracle = SessionOracle::new(&[1, 2, 4]);
        oracle.check_deal(&session);
        let result = oracle.finish(&session);
        assert!(!result.passed);
        assert_eq!(result.violations.len(), 2);
    }

    #[test]
    fn forged_completion_is_flagged() {
        let session = round();
        let mut oracle = SessionOracle::new(&[1, 2, 3]);
        let forged = Selection {
            event: SelectEvent::NoOp {
                reason: matchup_core::NoOpReason::OutOfRange,
            },
            completed: Some(session.stats()),
        };
        oracle.observe(&session, &forged, &session);
        let result = oracle.finish(&session);
        assert_eq!(
            result.violations,
            vec![InvariantViolation::CompletionEarly { step: 1 }]
        );
    }

    #[test]
    fn merge_accumulates_failures() {
        let failed = OracleResult::from_violations(vec![InvariantViolation::CompletionMissing]);
        let merged = OracleResult::pass().merge(failed).merge(OracleResult::pass());
        assert!(!merged.passed);
        assert_eq!(merged.violations.len(), 1);
    }

    #[test]
    fn violations_render_readably() {
        let text = InvariantViolation::Stalled {
            clicks: 40,
            matched: 2,
            pairs: 9,
        }
        .to_string();
        assert!(text.contains("2/9"));
    }
}
