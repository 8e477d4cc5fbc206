use serde::{Deserialize, Serialize};

use matchup_core::{Column, MatchSession};

use crate::rng::DeterministicRng;

/// How a simulated player picks cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    /// Always completes a pending pick with its partner.
    Perfect,
    /// Like `Perfect`, but misses the partner `miss_percent` of the time.
    Guessing { miss_percent: u8 },
    /// Clicks anywhere: matched cells, the same column twice, past the end.
    Clicky,
}

impl Strategy {
    /// Whether a player with this strategy is expected to finish a round.
    #[must_use]
    pub const fn finishes(self) -> bool {
        !matches!(self, Self::Clicky)
    }
}

/// One pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
    pub column: Column,
    pub index: usize,
}

/// A seeded player that looks at the session and decides its next click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedPlayer {
    id: usize,
    strategy: Strategy,
    rng: DeterministicRng,
}

impl SimulatedPlayer {
    #[must_use]
    pub const fn new(id: usize, strategy: Strategy, rng: DeterministicRng) -> Self {
        Self { id, strategy, rng }
    }

    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Decide the next click for `session`.
    pub fn next_click<V: Eq>(&mut self, session: &MatchSession<V>) -> Click {
        match self.strategy {
            Strategy::Perfect => self.directed_click(session, 0),
            Strategy::Guessing { miss_percent } => self.directed_click(session, miss_percent),
            Strategy::Clicky => self.wild_click(session),
        }
    }

    /// Open a random unmatched left cell, then answer it on the right.
    fn directed_click<V: Eq>(&mut self, session: &MatchSession<V>, miss_percent: u8) -> Click {
        let Some(left) = session.pending(Column::Left) else {
            let open = open_cells(session, Column::Left);
            let index = open.get(self.rng.pick(open.len())).copied().unwrap_or(0);
            return Click {
                column: Column::Left,
                index,
            };
        };

        let partner = session
            .value(Column::Left, left)
            .and_then(|target| session.right().iter().position(|value| value == target));
        let index = match partner {
            Some(index) if !self.rng.hit_rate_percent(miss_percent) => index,
            _ => {
                let open = open_cells(session, Column::Right);
                open.get(self.rng.pick(open.len())).copied().unwrap_or(0)
            }
        };
        Click {
            column: Column::Right,
            index,
        }
    }

    fn wild_click<V>(&mut self, session: &MatchSession<V>) -> Click {
        let column = if self.rng.hit_rate_percent(50) {
            Column::Left
        } else {
            Column::Right
        };
        // One slot past the end so out-of-range picks get exercised too.
        let index = self.rng.pick(session.len() + 1);
        Click { column, index }
    }
}

fn open_cells<V>(session: &MatchSession<V>, column: Column) -> Vec<usize> {
    (0..session.len())
        .filter(|&index| !session.is_matched(column, index))
        .collect()
}
