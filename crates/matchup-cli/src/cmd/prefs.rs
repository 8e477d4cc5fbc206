use std::io::Write;

use anyhow::Result;
use clap::Args;
use tracing::info;

use matchup_core::profile::{Preferences, SPEECH_RATE_RANGE, VOLUME_RANGE};

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `matchup prefs`. With no flags, shows the current values.
#[derive(Args, Debug)]
pub struct PrefsArgs {
    /// Speech rate for read-aloud labels (0.5 to 2.0).
    #[arg(long)]
    pub speech_rate: Option<f32>,

    /// Read-aloud volume (0.0 to 1.0).
    #[arg(long)]
    pub volume: Option<f32>,
}

pub fn run_prefs(args: &PrefsArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.store()?;
    let mut prefs = Preferences::load(&store)?;

    if args.speech_rate.is_some() || args.volume.is_some() {
        if let Some(rate) = args.speech_rate {
            prefs.speech_rate = rate;
        }
        if let Some(volume) = args.volume {
            prefs.volume = volume;
        }
        prefs = prefs.save(&mut store)?;
        info!(
            speech_rate = prefs.speech_rate,
            volume = prefs.volume,
            "preferences saved"
        );
    }

    render_mode(
        ctx.output,
        &prefs,
        |prefs, w| {
            writeln!(
                w,
                "prefs speech_rate={} volume={}",
                prefs.speech_rate, prefs.volume
            )
        },
        |prefs, w| {
            pretty_section(w, "Preferences")?;
            pretty_kv(
                w,
                "Speech rate",
                format!(
                    "{:.2} (range {}-{})",
                    prefs.speech_rate, SPEECH_RATE_RANGE.0, SPEECH_RATE_RANGE.1
                ),
            )?;
            pretty_kv(
                w,
                "Volume",
                format!(
                    "{:.2} (range {}-{})",
                    prefs.volume, VOLUME_RANGE.0, VOLUME_RANGE.1
                ),
            )
        },
    )
}
