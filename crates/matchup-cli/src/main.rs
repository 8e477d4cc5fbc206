#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use matchup_core::config::resolve_config;
use matchup_core::error::ErrorCode;
use matchup_core::profile::ProfileError;
use matchup_core::store::StoreLockError;
use matchup_core::{DeckError, SetupError};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "matchup: pair-matching drills in the terminal",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress log output below warnings.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of `<config_dir>/matchup/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Profile",
        about = "Sign in a player",
        long_about = "Store the player's name. Names need at least three characters.",
        after_help = "EXAMPLES:\n    # Sign in\n    matchup login Zara\n\n    # Emit machine-readable output\n    matchup login Zara --json"
    )]
    Login(cmd::login::LoginArgs),

    #[command(
        next_help_heading = "Profile",
        about = "Sign out the current player",
        after_help = "EXAMPLES:\n    matchup logout"
    )]
    Logout,

    #[command(
        next_help_heading = "Profile",
        about = "Show the signed-in player",
        after_help = "EXAMPLES:\n    matchup whoami\n    matchup whoami --json"
    )]
    Whoami,

    #[command(
        next_help_heading = "Play",
        about = "List playable screens",
        long_about = "List the built-in screens and any [[screens]] from the config file.",
        after_help = "EXAMPLES:\n    matchup screens\n    matchup screens --json"
    )]
    Screens,

    #[command(
        next_help_heading = "Play",
        about = "Play one round",
        long_about = "Deal a round and read picks from stdin: a3 picks the third cell of\n\
                      column A, b7 the seventh of column B. `restart` deals again and\n\
                      `quit` stops. Requires a signed-in player.",
        after_help = "EXAMPLES:\n    # Numbers round\n    matchup play\n\n    # Table of 7 with a fixed deal\n    matchup play --screen tables --table 7 --seed 42\n\n    # Scripted round\n    printf 'a1\\nb3\\n' | matchup play --seed 1 --json"
    )]
    Play(cmd::play::PlayArgs),

    #[command(
        next_help_heading = "Play",
        about = "Run an arithmetic drill or the gender learning board",
        long_about = "Answer-entry drills read one number per line and stop after ten\n\
                      right answers. `learn` reads a slot number and speaks that pair.\n\
                      Requires a signed-in player.",
        after_help = "EXAMPLES:\n    # Larger minus smaller\n    matchup drill subtraction\n\n    # Tens addition with a fixed seed\n    matchup drill tens --seed 7\n\n    # Learning board\n    matchup drill learn"
    )]
    Drill(cmd::drill::DrillArgs),

    #[command(
        next_help_heading = "Profile",
        about = "Show or change speech preferences",
        after_help = "EXAMPLES:\n    # Show\n    matchup prefs\n\n    # Slower speech, quieter\n    matchup prefs --speech-rate 0.6 --volume 0.5"
    )]
    Prefs(cmd::prefs::PrefsArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Run a deterministic play-through campaign",
        long_about = "Let seeded players click through real rounds and check the session\n\
                      invariants after every click. Exits 1 if any seed fails.",
        after_help = "EXAMPLES:\n    # 100 seeds on the numbers screen\n    matchup sim\n\n    # Genders, seeds 200..300, five players\n    matchup sim --screen genders --seeds 200..300 --players 5\n\n    # Replay one seed\n    matchup sim --replay 42 --json"
    )]
    Sim(cmd::sim::SimArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    matchup completions bash\n\n    # Generate zsh completions\n    matchup completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("MATCHUP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if quiet {
            "warn"
        } else if verbose || env::var("DEBUG").is_ok() {
            "matchup=debug,info"
        } else {
            "matchup=info,warn"
        })
    });

    let format = env::var("MATCHUP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let ctx = cmd::Context {
        config: resolve_config(cli.config.as_deref())?,
        output: cli.output_mode(),
    };
    debug!(output = ?ctx.output, "config resolved");

    let result = match cli.command {
        Commands::Login(ref args) => cmd::login::run_login(args, &ctx),
        Commands::Logout => cmd::login::run_logout(&ctx),
        Commands::Whoami => cmd::login::run_whoami(&ctx),
        Commands::Screens => cmd::screens::run_screens(&ctx),
        Commands::Play(ref args) => cmd::play::run_play(args, &ctx),
        Commands::Drill(ref args) => cmd::drill::run_drill(args, &ctx),
        Commands::Prefs(ref args) => cmd::prefs::run_prefs(args, &ctx),
        Commands::Sim(ref args) => cmd::sim::run_sim(args, &ctx),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if let Err(err) = &result
        && let Some(code) = error_code(err)
    {
        debug!(code = code.code(), "command failed");
        if let Some(hint) = code.hint() {
            eprintln!("hint: {hint}");
        }
    }
    result
}

/// First machine-readable code found in the error chain.
fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<ProfileError>()
            .map(ProfileError::code)
            .or_else(|| cause.downcast_ref::<DeckError>().map(DeckError::code))
            .or_else(|| cause.downcast_ref::<SetupError>().map(SetupError::code))
            .or_else(|| cause.downcast_ref::<StoreLockError>().map(StoreLockError::code))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["matchup", "whoami", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["matchup", "screens", "--config", "/tmp/m.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.toml")));
    }

    #[test]
    fn login_takes_a_name() {
        let cli = Cli::parse_from(["matchup", "login", "Zara"]);
        assert!(matches!(cli.command, Commands::Login(ref args) if args.name == "Zara"));
    }

    #[test]
    fn play_flags_parse() {
        let cli = Cli::parse_from([
            "matchup", "play", "--screen", "tables", "--table", "7", "--seed", "42",
        ]);
        let Commands::Play(args) = cli.command else {
            panic!("expected play");
        };
        assert_eq!(args.screen.as_deref(), Some("tables"));
        assert_eq!(args.table, Some(7));
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn drill_modes_parse() {
        let cli = Cli::parse_from(["matchup", "drill", "tens", "--seed", "7"]);
        let Commands::Drill(args) = cli.command else {
            panic!("expected drill");
        };
        assert_eq!(args.mode, cmd::drill::DrillMode::Tens);
        assert_eq!(args.seed, Some(7));
        assert!(Cli::try_parse_from(["matchup", "drill", "division"]).is_err());
    }

    #[test]
    fn sim_seed_range_parses() {
        let cli = Cli::parse_from(["matchup", "sim", "--seeds", "10..20", "--players", "5"]);
        let Commands::Sim(args) = cli.command else {
            panic!("expected sim");
        };
        assert_eq!(args.seeds, 10..20);
        assert_eq!(args.players, 5);
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["matchup", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["matchup", "login", "Zara"],
            vec!["matchup", "logout"],
            vec!["matchup", "whoami"],
            vec!["matchup", "screens"],
            vec!["matchup", "play"],
            vec!["matchup", "drill", "learn"],
            vec!["matchup", "prefs", "--volume", "0.5"],
            vec!["matchup", "sim"],
            vec!["matchup", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} error: {:?}",
                args,
                result.err()
            );
        }
    }

    #[test]
    fn error_code_found_through_context() {
        use anyhow::Context as _;
        let err = Err::<(), _>(ProfileError::NotSignedIn)
            .context("sign in first")
            .expect_err("error");
        assert_eq!(error_code(&err), Some(ErrorCode::NotSignedIn));
        assert_eq!(error_code(&anyhow::anyhow!("plain")), None);
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
