//! Player profile: the sign-in gate and a couple of speech preferences.
//!
//! Only these keys ever reach the store. Round state is never persisted.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::ports::KeyValueStore;

pub const USER_NAME_KEY: &str = "userName";
pub const NAME_ENTERED_KEY: &str = "isNameEntered";
pub const SPEECH_RATE_KEY: &str = "speechRate";
pub const VOLUME_KEY: &str = "volume";

/// Minimum length of a trimmed player name.
pub const MIN_NAME_LEN: usize = 3;

pub const DEFAULT_SPEECH_RATE: f32 = 0.75;
pub const DEFAULT_VOLUME: f32 = 1.0;
pub const SPEECH_RATE_RANGE: (f32, f32) = (0.5, 2.0);
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("player name must have at least 3 characters, got {0:?}")]
    NameTooShort(String),
    #[error("no player is signed in")]
    NotSignedIn,
}

impl ProfileError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NameTooShort(_) => ErrorCode::NameTooShort,
            Self::NotSignedIn => ErrorCode::NotSignedIn,
        }
    }
}

/// Store `name` (trimmed) as the signed-in player.
///
/// # Errors
///
/// Fails with [`ProfileError::NameTooShort`] for names under three
/// characters after trimming, or if the store cannot be written.
pub fn sign_in(store: &mut (impl KeyValueStore + ?Sized), name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_LEN {
        return Err(ProfileError::NameTooShort(trimmed.to_string()).into());
    }
    store.set(USER_NAME_KEY, trimmed)?;
    store.set(NAME_ENTERED_KEY, "true")?;
    info!(player = trimmed, "player signed in");
    Ok(trimmed.to_string())
}

/// Forget the signed-in player.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn sign_out(store: &mut (impl KeyValueStore + ?Sized)) -> Result<()> {
    store.remove(USER_NAME_KEY)?;
    store.remove(NAME_ENTERED_KEY)?;
    info!("player signed out");
    Ok(())
}

/// The signed-in player, if any. Blank stored names count as signed out.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn current_user(store: &(impl KeyValueStore + ?Sized)) -> Result<Option<String>> {
    Ok(store
        .get(USER_NAME_KEY)?
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty()))
}

/// The signed-in player, or [`ProfileError::NotSignedIn`].
///
/// # Errors
///
/// Fails when nobody is signed in or the store cannot be read.
pub fn require_user(store: &(impl KeyValueStore + ?Sized)) -> Result<String> {
    current_user(store)?.ok_or_else(|| ProfileError::NotSignedIn.into())
}

/// Speech settings for announcers that read labels aloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub speech_rate: f32,
    pub volume: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            speech_rate: DEFAULT_SPEECH_RATE,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl Preferences {
    /// Load from `store`; missing or unreadable values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself cannot be read.
    pub fn load(store: &(impl KeyValueStore + ?Sized)) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            speech_rate: read_f32(
                store,
                SPEECH_RATE_KEY,
                defaults.speech_rate,
                SPEECH_RATE_RANGE,
            )?,
            volume: read_f32(store, VOLUME_KEY, defaults.volume, VOLUME_RANGE)?,
        })
    }

    /// Clamp both values into their ranges.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            speech_rate: clamp(self.speech_rate, SPEECH_RATE_RANGE, DEFAULT_SPEECH_RATE),
            volume: clamp(self.volume, VOLUME_RANGE, DEFAULT_VOLUME),
        }
    }

    /// Clamp and write both values.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(self, store: &mut (impl KeyValueStore + ?Sized)) -> Result<Self> {
        let clamped = self.clamped();
        store.set(SPEECH_RATE_KEY, &clamped.speech_rate.to_string())?;
        store.set(VOLUME_KEY, &clamped.volume.to_string())?;
        Ok(clamped)
    }
}

fn read_f32(
    store: &(impl KeyValueStore + ?Sized),
    key: &str,
    default: f32,
    range: (f32, f32),
) -> Result<f32> {
    let Some(raw) = store.get(key)? else {
        return Ok(default);
    };
    match raw.trim().parse::<f32>() {
        Ok(value) => Ok(clamp(value, range, default)),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable preference");
            Ok(default)
        }
    }
}

fn clamp(value: f32, (lo, hi): (f32, f32), fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(lo, hi)
    }
}
