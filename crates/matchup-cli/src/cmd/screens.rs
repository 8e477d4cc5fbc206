use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use matchup_core::deck::catalog;

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};

#[derive(Debug, Serialize)]
struct ScreenRow {
    id: String,
    title: String,
    left_heading: String,
    right_heading: String,
    pairs: usize,
}

/// List the built-in and configured screens.
pub fn run_screens(ctx: &Context) -> Result<()> {
    let rows: Vec<ScreenRow> = catalog(&ctx.config.game, &ctx.config.screens)
        .into_iter()
        .map(|screen| ScreenRow {
            pairs: screen.pairs_per_round(),
            id: screen.id,
            title: screen.title,
            left_heading: screen.left_heading,
            right_heading: screen.right_heading,
        })
        .collect();

    render_mode(
        ctx.output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "screen id={} pairs={} title={:?}", row.id, row.pairs, row.title)?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, "Screens")?;
            for row in rows {
                pretty_kv(
                    w,
                    &row.id,
                    format!(
                        "{} ({} vs {}, {} pairs)",
                        row.title, row.left_heading, row.right_heading, row.pairs
                    ),
                )?;
            }
            Ok(())
        },
    )
}
