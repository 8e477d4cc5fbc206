//! `matchup login`, `matchup logout`, `matchup whoami`.

use std::io::Write;

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;

use matchup_core::profile::{current_user, sign_in, sign_out};

use super::Context;
use crate::output::{pretty_kv, render_mode};

/// Arguments for `matchup login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Player name (at least three characters once trimmed).
    pub name: String,
}

#[derive(Debug, Serialize)]
struct ProfileOutput {
    user: Option<String>,
    signed_in: bool,
}

impl ProfileOutput {
    fn new(user: Option<String>) -> Self {
        Self {
            signed_in: user.is_some(),
            user,
        }
    }
}

pub fn run_login(args: &LoginArgs, ctx: &Context) -> Result<()> {
    let mut store = ctx.store()?;
    let user = sign_in(&mut store, &args.name)
        .with_context(|| format!("could not sign in {:?}", args.name.trim()))?;
    render_mode(
        ctx.output,
        &ProfileOutput::new(Some(user)),
        |out, w| writeln!(w, "signed_in user={}", out.user.as_deref().unwrap_or_default()),
        |out, w| writeln!(w, "Welcome, {}!", out.user.as_deref().unwrap_or_default()),
    )
}

pub fn run_logout(ctx: &Context) -> Result<()> {
    let mut store = ctx.store()?;
    sign_out(&mut store)?;
    render_mode(
        ctx.output,
        &ProfileOutput::new(None),
        |_, w| writeln!(w, "signed_out"),
        |_, w| writeln!(w, "Signed out."),
    )
}

pub fn run_whoami(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let user = current_user(&store)?;
    render_mode(
        ctx.output,
        &ProfileOutput::new(user),
        |out, w| match &out.user {
            Some(name) => writeln!(w, "user={name}"),
            None => writeln!(w, "user=none"),
        },
        |out, w| {
            pretty_kv(
                w,
                "Player",
                out.user.as_deref().unwrap_or("(not signed in)"),
            )
        },
    )
}
