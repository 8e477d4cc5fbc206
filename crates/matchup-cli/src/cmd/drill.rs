//! `matchup drill`: answer-entry drills and the gender learning board.
//!
//! `subtraction` and `tens` read one whole-number answer per line and stop
//! once ten answers are right. `learn` reads a slot number, speaks that pair,
//! and swaps a new pair into the slot. `quit` leaves any of them.

use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use crossterm::style::Stylize;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::info;

use matchup_core::drill::{Attempt, LEVEL_TARGET, Reveal, WordPair};
use matchup_core::ports::{Announcer, Cue, SilentAnnouncer};
use matchup_core::profile::{Preferences, require_user};
use matchup_core::{Drill, DrillKind, LearningBoard};

use super::Context;
use super::play::TerminalAnnouncer;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section};

/// Arguments for `matchup drill`.
#[derive(Args, Debug)]
pub struct DrillArgs {
    /// Which drill to run.
    #[arg(value_enum)]
    pub mode: DrillMode,

    /// Seed for reproducible questions.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillMode {
    /// Larger minus smaller, digits 1 to 9.
    Subtraction,
    /// 10 to 30 plus a multiple of ten.
    Tens,
    /// Read gender pairs aloud.
    Learn,
}

#[derive(Debug, Serialize)]
struct DrillOutput {
    player: String,
    mode: &'static str,
    seed: Option<u64>,
    score: u32,
    attempts: u32,
    cleared: bool,
    answers: Vec<Attempt>,
}

#[derive(Debug, Serialize)]
struct LearnOutput {
    player: String,
    seed: Option<u64>,
    reveals: Vec<Reveal>,
    board: Vec<WordPair>,
}

pub fn run_drill(args: &DrillArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let player = require_user(&store).context("sign in first with `matchup login <name>`")?;
    let prefs = Preferences::load(&store)?;

    let mut rng = args
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut terminal = TerminalAnnouncer::new(ctx.output.is_pretty(), prefs);
    let mut silent = SilentAnnouncer;
    let announcer: &mut dyn Announcer = if ctx.output.is_json() {
        &mut silent
    } else {
        &mut terminal
    };

    match args.mode {
        DrillMode::Subtraction => run_answers(
            DrillKind::Subtraction,
            &player,
            args.seed,
            &mut rng,
            announcer,
            ctx.output,
        ),
        DrillMode::Tens => run_answers(
            DrillKind::TensAddition,
            &player,
            args.seed,
            &mut rng,
            announcer,
            ctx.output,
        ),
        DrillMode::Learn => run_learning(&player, args.seed, &mut rng, announcer, ctx.output),
    }
}

fn is_quit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "quit" | "q" | "exit")
}

fn run_answers(
    kind: DrillKind,
    player: &str,
    seed: Option<u64>,
    rng: &mut StdRng,
    announcer: &mut dyn Announcer,
    output: OutputMode,
) -> Result<()> {
    let mut drill = Drill::new(kind, rng);
    info!(player = %player, drill = kind.as_str(), "drill started");

    let stdout = io::stdout();
    if !output.is_json() {
        let mut w = stdout.lock();
        if output.is_pretty() {
            pretty_section(&mut w, kind.title())?;
            pretty_kv(&mut w, "Player", player)?;
        } else {
            writeln!(
                w,
                "drill player={player} mode={} target={LEVEL_TARGET}",
                kind.as_str()
            )?;
        }
        render_question(&mut w, &drill, output)?;
    }

    let mut answers = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_quit(input) {
            break;
        }

        let attempt = drill.submit(input, rng);
        announcer.announce(if attempt.correct {
            &Cue::Correct
        } else {
            &Cue::Wrong
        });
        if attempt.level_cleared {
            announcer.announce(&Cue::Clap);
        }
        if !output.is_json() {
            render_attempt(&mut stdout.lock(), &attempt, &drill, output)?;
        }

        let cleared = attempt.level_cleared;
        answers.push(attempt);
        if cleared {
            break;
        }
        if !output.is_json() {
            render_question(&mut stdout.lock(), &drill, output)?;
        }
    }

    let out = DrillOutput {
        player: player.to_string(),
        mode: kind.as_str(),
        seed,
        score: drill.score(),
        attempts: drill.attempts(),
        cleared: drill.is_cleared(),
        answers,
    };
    let mut w = stdout.lock();
    match output {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut w, &out)?;
            writeln!(w)?;
        }
        OutputMode::Text => writeln!(
            w,
            "result score={} attempts={} cleared={}",
            out.score, out.attempts, out.cleared
        )?,
        OutputMode::Pretty => {
            if out.cleared {
                writeln!(w, "{}", format!("Level cleared, {}!", out.player).green().bold())?;
            }
            pretty_kv(&mut w, "Score", format!("{} / {}", out.score, out.attempts))?;
        }
    }
    Ok(())
}

fn render_question(w: &mut dyn Write, drill: &Drill, mode: OutputMode) -> io::Result<()> {
    let question = drill.question();
    if mode.is_pretty() {
        pretty_kv(w, "Question", format!("{question} = ?"))
    } else {
        writeln!(w, "question text={:?}", question.to_string())
    }
}

fn render_attempt(
    w: &mut dyn Write,
    attempt: &Attempt,
    drill: &Drill,
    mode: OutputMode,
) -> io::Result<()> {
    if mode.is_pretty() {
        if attempt.correct {
            writeln!(w, "{}", "Correct!".green().bold())?;
        } else {
            let line = format!("Wrong! {} = {}", attempt.question, attempt.expected);
            writeln!(w, "{}", line.red())?;
        }
        return pretty_kv(
            w,
            "Score",
            format!("{} of {LEVEL_TARGET}", drill.score()),
        );
    }

    let given = attempt
        .given
        .map_or_else(|| "none".to_string(), |value| value.to_string());
    writeln!(
        w,
        "answer question={:?} given={given} expected={} correct={} score={} attempts={}",
        attempt.question.to_string(),
        attempt.expected,
        attempt.correct,
        drill.score(),
        drill.attempts()
    )
}

fn run_learning(
    player: &str,
    seed: Option<u64>,
    rng: &mut StdRng,
    announcer: &mut dyn Announcer,
    output: OutputMode,
) -> Result<()> {
    let mut board = LearningBoard::new(rng);
    info!(player = %player, pairs = board.len(), "learning board dealt");

    let stdout = io::stdout();
    if !output.is_json() {
        let mut w = stdout.lock();
        if output.is_pretty() {
            pretty_section(&mut w, "Learning Mode")?;
            pretty_kv(&mut w, "Player", player)?;
        } else {
            writeln!(w, "learn player={player} pairs={}", board.len())?;
        }
        render_board(&mut w, &board, output)?;
    }

    let mut reveals = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_quit(input) {
            break;
        }

        let reveal = input
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|slot| board.reveal(slot, rng));
        let Some(reveal) = reveal else {
            if !output.is_json() {
                println!(
                    "unrecognised input {input:?}; pick 1 to {} or quit",
                    board.len()
                );
            }
            continue;
        };

        announcer.announce(&Cue::Say(reveal.pair.masculine.clone()));
        announcer.announce(&Cue::Say(reveal.pair.feminine.clone()));
        reveals.push(reveal);
        if !output.is_json() {
            render_board(&mut stdout.lock(), &board, output)?;
        }
    }

    let out = LearnOutput {
        player: player.to_string(),
        seed,
        reveals,
        board: board.pairs(),
    };
    let mut w = stdout.lock();
    match output {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut w, &out)?;
            writeln!(w)?;
        }
        OutputMode::Text => writeln!(w, "result reveals={}", out.reveals.len())?,
        OutputMode::Pretty => pretty_kv(&mut w, "Revealed", out.reveals.len().to_string())?,
    }
    Ok(())
}

fn render_board(w: &mut dyn Write, board: &LearningBoard, mode: OutputMode) -> io::Result<()> {
    let pairs = board.pairs();
    if mode.is_pretty() {
        for (slot, pair) in pairs.iter().enumerate() {
            writeln!(
                w,
                "{:>3}  {:<14} {}",
                slot + 1,
                pair.masculine.as_str().cyan(),
                pair.feminine.as_str().magenta()
            )?;
        }
        return pretty_rule(w);
    }

    let cells: Vec<String> = pairs
        .iter()
        .enumerate()
        .map(|(slot, pair)| format!("{}={}/{}", slot + 1, pair.masculine, pair.feminine))
        .collect();
    writeln!(w, "board {}", cells.join(" "))
}
