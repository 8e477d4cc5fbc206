#![forbid(unsafe_code)]

use anyhow::{Context, Result, bail};
use matchup_sim::{CampaignConfig, run_campaign};

/// `matchup-sim [SEEDS] [SCREEN]`: run a campaign and print the JSON report.
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut config = CampaignConfig::default();
    if let Some(seeds) = args.next() {
        let count: u64 = seeds
            .parse()
            .with_context(|| format!("invalid seed count: {seeds}"))?;
        config.seed_range = 0..count;
    }
    if let Some(screen) = args.next() {
        config.screen = screen;
    }

    let report = run_campaign(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.all_passed() {
        bail!(
            "{} of {} seeds failed, first at {:?}",
            report.failures.len(),
            report.seeds_run,
            report.first_failure
        );
    }
    Ok(())
}
