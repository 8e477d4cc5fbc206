//! `matchup sim`: deterministic play-through campaigns.
//!
//! Runs seeded players against real rounds and reports any broken session
//! invariant. `--replay <seed>` prints the click-by-click trace of one seed.

use std::ops::Range;
use std::process;

use anyhow::{Result, anyhow};
use clap::Args;
use serde::Serialize;

use matchup_sim::{CampaignConfig, replay_seed, run_campaign};

use super::Context;
use crate::output::{OutputMode, pretty_kv, pretty_section};

/// Arguments for `matchup sim`.
#[derive(Args, Debug)]
pub struct SimArgs {
    /// Seed range, `start..end` (end exclusive) or a plain count.
    #[arg(long, default_value = "0..100", value_parser = parse_seed_range)]
    pub seeds: Range<u64>,

    /// Simulated players per seed.
    #[arg(long, default_value = "3")]
    pub players: usize,

    /// Screen to deal from.
    #[arg(long, default_value = "numbers")]
    pub screen: String,

    /// Miss rate for guessing players, in percent.
    #[arg(long, default_value = "30")]
    pub miss_percent: u8,

    /// Replay one seed with its full click trace instead of a campaign.
    #[arg(long)]
    pub replay: Option<u64>,
}

/// Parse `a..b` or `n` (meaning `0..n`).
pub fn parse_seed_range(raw: &str) -> Result<Range<u64>, String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<u64>()
            .map_err(|err| format!("invalid seed {part:?}: {err}"))
    };
    let range = match raw.split_once("..") {
        Some((start, end)) => parse(start)?..parse(end)?,
        None => 0..parse(raw)?,
    };
    if range.is_empty() {
        return Err(format!("seed range {raw:?} is empty"));
    }
    Ok(range)
}

#[derive(Debug, Serialize)]
struct RunOutput {
    screen: String,
    seeds_run: usize,
    seeds_passed: usize,
    seeds_failed: usize,
    first_failure: Option<u64>,
    rounds_completed: usize,
    total_clicks: usize,
    all_passed: bool,
    failures: Vec<matchup_sim::SeedFailure>,
}

pub fn run_sim(args: &SimArgs, ctx: &Context) -> Result<()> {
    let config = CampaignConfig {
        seed_range: args.seeds.clone(),
        players: args.players,
        screen: args.screen.clone(),
        table: ctx.config.game.default_table,
        miss_percent: args.miss_percent,
        ..CampaignConfig::default()
    };

    if let Some(seed) = args.replay {
        return run_replay(seed, &config, ctx.output);
    }

    let report = run_campaign(&config)?;
    let out = RunOutput {
        screen: config.screen.clone(),
        seeds_run: report.seeds_run,
        seeds_passed: report.seeds_passed,
        seeds_failed: report.failures.len(),
        first_failure: report.first_failure,
        rounds_completed: report.rounds_completed,
        total_clicks: report.total_clicks,
        all_passed: report.all_passed(),
        failures: report.failures.clone(),
    };

    match ctx.output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&out)?),
        OutputMode::Text => {
            println!(
                "campaign screen={} seeds_run={} players={}",
                out.screen, out.seeds_run, args.players
            );
            println!(
                "results passed={} failed={} rounds_completed={} clicks={} all_passed={}",
                out.seeds_passed,
                out.seeds_failed,
                out.rounds_completed,
                out.total_clicks,
                out.all_passed
            );
            for failure in out.failures.iter().take(5) {
                println!(
                    "failure seed={} violations={}",
                    failure.seed,
                    failure.violations.len()
                );
            }
        }
        OutputMode::Pretty => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            pretty_section(&mut w, "Simulation Campaign")?;
            pretty_kv(&mut w, "Screen", &out.screen)?;
            pretty_kv(&mut w, "Seeds", out.seeds_run.to_string())?;
            pretty_kv(&mut w, "Players", args.players.to_string())?;
            pretty_kv(
                &mut w,
                "Results",
                format!(
                    "{} passed / {} failed ({} rounds completed)",
                    out.seeds_passed, out.seeds_failed, out.rounds_completed
                ),
            )?;
            if out.all_passed {
                pretty_kv(&mut w, "Status", "all seeds passed")?;
            } else {
                for failure in out.failures.iter().take(5) {
                    println!("seed {:<8}", failure.seed);
                    for violation in &failure.violations {
                        println!("  - {violation}");
                    }
                }
                pretty_kv(
                    &mut w,
                    "Replay",
                    format!(
                        "matchup sim --replay {} --screen {}",
                        out.first_failure.unwrap_or(0),
                        out.screen
                    ),
                )?;
            }
        }
    }

    // Exit code 1 on any failure for CI integration
    if !report.all_passed() {
        process::exit(1);
    }
    Ok(())
}

fn run_replay(seed: u64, config: &CampaignConfig, output: OutputMode) -> Result<()> {
    let trace = replay_seed(seed, config)?;

    match output {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&trace)?),
        OutputMode::Text => {
            println!(
                "replay seed={} screen={} oracle_passed={}",
                trace.seed, trace.screen, trace.oracle.passed
            );
            for player in &trace.players {
                println!(
                    "player id={} strategy={:?} clicks={} correct={} wrong={} completed={}",
                    player.player,
                    player.strategy,
                    player.steps.len(),
                    player.stats.correct,
                    player.stats.wrong,
                    player.completed
                );
            }
            for violation in &trace.oracle.violations {
                println!("violation={violation}");
            }
        }
        OutputMode::Pretty => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            pretty_section(&mut w, &format!("Replay Seed {}", trace.seed))?;
            pretty_kv(&mut w, "Screen", &trace.screen)?;
            let first = trace
                .players
                .first()
                .ok_or_else(|| anyhow!("replay produced no players"))?;
            pretty_kv(&mut w, "Left", format!("{:?}", first.left))?;
            pretty_kv(&mut w, "Right", format!("{:?}", first.right))?;
            for player in &trace.players {
                pretty_kv(
                    &mut w,
                    &format!("Player {}", player.player),
                    format!(
                        "{:?}: {} clicks, {} correct, {} wrong{}",
                        player.strategy,
                        player.steps.len(),
                        player.stats.correct,
                        player.stats.wrong,
                        if player.completed { ", finished" } else { "" }
                    ),
                )?;
            }
            pretty_kv(&mut w, "Oracle", trace.oracle.passed.to_string())?;
            for violation in &trace.oracle.violations {
                println!("  - {violation}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_range_forms() {
        assert_eq!(parse_seed_range("5..9"), Ok(5..9));
        assert_eq!(parse_seed_range("20"), Ok(0..20));
    }

    #[test]
    fn bad_seed_ranges_rejected() {
        assert!(parse_seed_range("9..5").is_err());
        assert!(parse_seed_range("0").is_err());
        assert!(parse_seed_range("x..3").is_err());
    }
}
