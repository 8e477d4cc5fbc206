//! Capability ports for the collaborators around the engine.
//!
//! The engine never touches storage or sound. Front ends supply a
//! [`KeyValueStore`] for the profile and an [`Announcer`] that turns
//! [`Cue`]s into whatever feedback the platform has.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::engine::{Column, SessionEvent, Selection};

/// Text shown after a wrong pair.
pub const WRONG_MATCH_FEEDBACK: &str = "Wrong match! Try again.";

/// String key/value storage, the shape of browser local storage.
pub trait KeyValueStore {
    /// Read `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A feedback cue for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", content = "text", rename_all = "snake_case")]
pub enum Cue {
    /// Read a label aloud.
    Say(String),
    /// Wrong-pair sound.
    Wrong,
    /// Right-answer sound.
    Correct,
    /// Round-complete applause.
    Clap,
}

/// Fire-and-forget consumer of cues.
pub trait Announcer {
    fn announce(&mut self, cue: &Cue);
}

/// Announcer that keeps every cue, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingAnnouncer {
    pub cues: Vec<Cue>,
}

impl Announcer for RecordingAnnouncer {
    fn announce(&mut self, cue: &Cue) {
        self.cues.push(cue.clone());
    }
}

/// Announcer that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce(&mut self, _cue: &Cue) {}
}

/// Map a selection to cues, using `deck` for labels.
///
/// A pick reads its own side's label, a confirmed pair reads the left label,
/// a wrong pair plays the wrong sound, and completion claps after the final
/// pair is read.
#[must_use]
pub fn cues_for(deck: &Deck, selection: &Selection<u32>) -> Vec<Cue> {
    selection
        .events()
        .into_iter()
        .filter_map(|event| match event {
            SessionEvent::Selected { column, value, .. } => {
                deck.label(column, value).map(|label| Cue::Say(label.to_string()))
            }
            SessionEvent::Matched { value } => deck
                .label(Column::Left, value)
                .map(|label| Cue::Say(label.to_string())),
            SessionEvent::Mismatched { .. } => Some(Cue::Wrong),
            SessionEvent::RoundComplete { .. } => Some(Cue::Clap),
        })
        .collect()
}

/// Send every cue for `selection` to `announcer`.
pub fn announce_selection(
    announcer: &mut (impl Announcer + ?Sized),
    deck: &Deck,
    selection: &Selection<u32>,
) {
    for cue in cues_for(deck, selection) {
        announcer.announce(&cue);
    }
}

/// Feedback line for a selection, if it warrants one.
#[must_use]
pub fn feedback_text<V>(selection: &Selection<V>) -> Option<&'static str> {
    use crate::engine::SelectEvent;
    match selection.event {
        SelectEvent::Mismatched { .. } => Some(WRONG_MATCH_FEEDBACK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::Card;
    use crate::engine::{MatchSession, SelectEvent};
    use crate::random::ScriptedSource;

    fn word_deck() -> Deck {
        Deck::new(vec![
            Card::new(0, "King", "Queen"),
            Card::new(1, "Boy", "Girl"),
        ])
        .expect("valid deck")
    }

    /// Left = [0, 1], right = [1, 0].
    fn word_session(deck: &Deck) -> MatchSession<u32> {
        let mut rng = ScriptedSource::new([1, 0]);
        MatchSession::start_round(deck.keys(), &mut rng).expect("valid keys")
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("userName").expect("get"), None);
        store.set("userName", "Ayesha").expect("set");
        assert_eq!(store.get("userName").expect("get").as_deref(), Some("Ayesha"));
        store.remove("userName").expect("remove");
        store.remove("userName").expect("second remove is fine");
        assert_eq!(store.get("userName").expect("get"), None);
    }

    #[test]
    fn picks_read_their_own_side() {
        let deck = word_deck();
        let mut session = word_session(&deck);
        assert_eq!(session.left(), &[0, 1]);
        assert_eq!(session.right(), &[1, 0]);

        let pick = session.select(Column::Right, 1);
        assert_eq!(cues_for(&deck, &pick), vec![Cue::Say("Queen".to_string())]);
    }

    #[test]
    fn wrong_pair_plays_wrong_and_sets_feedback() {
        let deck = word_deck();
        let mut session = word_session(&deck);
        session.select(Column::Left, 0);
        let miss = session.select(Column::Right, 0);
        assert!(matches!(miss.event, SelectEvent::Mismatched { .. }));
        assert_eq!(cues_for(&deck, &miss), vec![Cue::Wrong]);
        assert_eq!(feedback_text(&miss), Some(WRONG_MATCH_FEEDBACK));
    }

    #[test]
    fn final_pair_claps_after_reading() {
        let deck = word_deck();
        let mut session = word_session(&deck);
        session.select(Column::Left, 0);
        session.select(Column::Right, 1);
        session.select(Column::Left, 1);
        let last = session.select(Column::Right, 0);

        let mut announcer = RecordingAnnouncer::default();
        announce_selection(&mut announcer, &deck, &last);
        assert_eq!(
            announcer.cues,
            vec![Cue::Say("Boy".to_string()), Cue::Clap]
        );
        assert_eq!(feedback_text(&last), None);
    }

    #[test]
    fn noop_is_silent() {
        let deck = word_deck();
        let mut session = word_session(&deck);
        let noop = session.select(Column::Left, 9);
        assert!(cues_for(&deck, &noop).is_empty());
        SilentAnnouncer.announce(&Cue::Clap);
    }
}
