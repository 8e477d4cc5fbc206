//! `matchup play`: one interactive round on stdin/stdout.
//!
//! Picks are read one per line: `a3` selects the third cell of column A
//! (left), `b7` the seventh of column B (right). `restart` deals a new round
//! and `quit` leaves. The round ends on its own once every pair is matched.

use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result};
use clap::Args;
use crossterm::style::Stylize;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, info};

use matchup_core::config::GameConfig;
use matchup_core::deck::{catalog, find_screen};
use matchup_core::ports::{Announcer, Cue, SilentAnnouncer, announce_selection, feedback_text};
use matchup_core::profile::{Preferences, require_user};
use matchup_core::{
    CellState, Column, Deck, MatchSession, RandomSource, RoundStats, Screen, SessionEvent,
};

use super::Context;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section};

/// Arguments for `matchup play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Screen id (see `matchup screens`). Defaults to `game.default_screen`.
    #[arg(long)]
    pub screen: Option<String>,

    /// Seed for a reproducible deal.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Table for the `tables` screen (1 to 15).
    #[arg(long)]
    pub table: Option<u32>,
}

/// A parsed line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pick { column: Column, index: usize },
    Restart,
    Quit,
}

/// Parse `a3`, `B10`, `restart`, or `quit`. Cell numbers are 1-based.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "restart" | "r" => return Some(Command::Restart),
        "quit" | "q" | "exit" => return Some(Command::Quit),
        _ => {}
    }

    let mut chars = line.chars();
    let column = match chars.next()? {
        'a' | 'l' => Column::Left,
        'b' | 'r' => Column::Right,
        _ => return None,
    };
    let number: usize = chars.as_str().trim().parse().ok()?;
    let index = number.checked_sub(1)?;
    Some(Command::Pick { column, index })
}

/// Deal a deck for `screen` and shuffle it into a fresh round.
///
/// # Errors
///
/// Fails if the screen cannot be dealt.
pub fn deal_round(
    screen: &Screen,
    rng: &mut (impl RandomSource + ?Sized),
) -> Result<(Deck, MatchSession<u32>)> {
    let deck = screen
        .deal(rng)
        .with_context(|| format!("failed to deal screen {}", screen.id))?;
    let session = MatchSession::start_round(deck.keys(), rng)?;
    Ok((deck, session))
}

#[derive(Debug, Serialize)]
struct RoundOutput {
    player: String,
    screen: String,
    seed: Option<u64>,
    completed: bool,
    stats: RoundStats,
    events: Vec<SessionEvent<u32>>,
}

/// Prints cues as lines. Speech is shown, not spoken, along with the rate
/// and volume a speaker would use.
pub struct TerminalAnnouncer {
    styled: bool,
    prefs: Preferences,
}

impl TerminalAnnouncer {
    pub const fn new(styled: bool, prefs: Preferences) -> Self {
        Self { styled, prefs }
    }

    fn line(&self, cue: &Cue) -> String {
        let Preferences { speech_rate, volume } = self.prefs;
        match (cue, self.styled) {
            (Cue::Say(text), true) => format!(
                "  » {} {}",
                text.clone().cyan(),
                format!("(rate {speech_rate}, volume {volume})").dim()
            ),
            (Cue::Say(text), false) => {
                format!("say text={text:?} rate={speech_rate} volume={volume}")
            }
            (Cue::Wrong, true) => format!("  {}", "✗ buzz".red()),
            (Cue::Wrong, false) => "cue wrong".to_string(),
            (Cue::Correct, true) => format!("  {}", "✓ ding".green()),
            (Cue::Correct, false) => "cue correct".to_string(),
            (Cue::Clap, true) => format!("  {}", "* clap clap *".green().bold()),
            (Cue::Clap, false) => "cue clap".to_string(),
        }
    }
}

impl Announcer for TerminalAnnouncer {
    fn announce(&mut self, cue: &Cue) {
        println!("{}", self.line(cue));
    }
}

pub fn run_play(args: &PlayArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let player = require_user(&store).context("sign in first with `matchup login <name>`")?;
    let prefs = Preferences::load(&store)?;

    let game = GameConfig {
        default_table: args.table.unwrap_or(ctx.config.game.default_table),
        ..ctx.config.game.clone()
    };
    let screen_id = args.screen.as_deref().unwrap_or(&game.default_screen);
    let screen = find_screen(&catalog(&game, &ctx.config.screens), screen_id)?;

    let mut rng = args
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let (mut deck, mut session) = deal_round(&screen, &mut rng)?;
    info!(player = %player, screen = %screen.id, pairs = deck.len(), "round dealt");

    let styled = ctx.output.is_pretty();
    let mut terminal = TerminalAnnouncer::new(styled, prefs);
    let mut silent = SilentAnnouncer;
    let announcer: &mut dyn Announcer = if ctx.output.is_json() {
        &mut silent
    } else {
        &mut terminal
    };

    let stdout = io::stdout();
    if !ctx.output.is_json() {
        let mut w = stdout.lock();
        if styled {
            pretty_section(&mut w, &screen.title)?;
            pretty_kv(&mut w, "Player", &player)?;
        } else {
            writeln!(w, "round player={player} screen={} pairs={}", screen.id, deck.len())?;
        }
        render_board(&mut w, &screen, &deck, &session, ctx.output)?;
    }

    let mut events = Vec::new();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(command) = parse_command(&line) else {
            if !ctx.output.is_json() {
                println!("unrecognised input {:?}; try a3, b7, restart or quit", line.trim());
            }
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Restart => {
                let new_deck = screen.deal(&mut rng)?;
                session.restart(new_deck.keys(), &mut rng)?;
                deck = new_deck;
                events.clear();
                debug!("round restarted");
            }
            Command::Pick { column, index } => {
                let selection = session.select(column, index);
                announce_selection(&mut *announcer, &deck, &selection);
                if let Some(text) = feedback_text(&selection).filter(|_| !ctx.output.is_json()) {
                    println!("{text}");
                }
                events.extend(selection.events());
            }
        }

        if !ctx.output.is_json() {
            render_board(&mut stdout.lock(), &screen, &deck, &session, ctx.output)?;
        }
        if session.is_complete() {
            break;
        }
    }

    let out = RoundOutput {
        player,
        screen: screen.id.clone(),
        seed: args.seed,
        completed: session.is_complete(),
        stats: session.stats(),
        events,
    };
    let mut w = stdout.lock();
    match ctx.output {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut w, &out)?;
            writeln!(w)?;
        }
        OutputMode::Text => writeln!(
            w,
            "result completed={} correct={} wrong={}",
            out.completed, out.stats.correct, out.stats.wrong
        )?,
        OutputMode::Pretty => {
            if out.completed {
                writeln!(w, "{}", format!("Well done, {}!", out.player).green().bold())?;
            }
            pretty_kv(&mut w, "Correct", out.stats.correct.to_string())?;
            pretty_kv(&mut w, "Wrong", out.stats.wrong.to_string())?;
        }
    }
    Ok(())
}

fn render_board(
    w: &mut dyn Write,
    screen: &Screen,
    deck: &Deck,
    session: &MatchSession<u32>,
    mode: OutputMode,
) -> io::Result<()> {
    let cell = |column: Column, index: usize| -> String {
        let label = session
            .value(column, index)
            .and_then(|key| deck.label(column, *key))
            .unwrap_or("?");
        let state = session.cell(column, index);
        if mode.is_pretty() {
            let text = format!("{label:<10}");
            match state {
                CellState::Open => text,
                CellState::Pending => text.yellow().bold().to_string(),
                CellState::Matched => text.green().dim().to_string(),
            }
        } else {
            let mark = match state {
                CellState::Open => "",
                CellState::Pending => "*",
                CellState::Matched => "=",
            };
            format!("{label}{mark}")
        }
    };

    if mode.is_pretty() {
        writeln!(
            w,
            "     {:<14} {}",
            format!("A: {}", screen.left_heading),
            format!("B: {}", screen.right_heading)
        )?;
        for index in 0..session.len() {
            writeln!(
                w,
                "{:>3}  {}     {}",
                index + 1,
                cell(Column::Left, index),
                cell(Column::Right, index)
            )?;
        }
        pretty_rule(w)?;
    } else {
        let left: Vec<String> = (0..session.len()).map(|i| cell(Column::Left, i)).collect();
        let right: Vec<String> = (0..session.len()).map(|i| cell(Column::Right, i)).collect();
        writeln!(w, "board a=[{}] b=[{}]", left.join(","), right.join(","))?;
    }
    Ok(())
}
