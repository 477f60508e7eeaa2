//! Command-line front end for guidgen.
//!
//! Identifiers are written to stdout, one per line (or as JSON with `--json`). Logs go to
//! stderr so output can be piped straight into other tools.
//!
//! # Environment Variables
//! - `GUIDGEN_DEFAULT_KIND`: kind used when `--kind` is absent (default: "standard")
//! - `GUIDGEN_RANDOMNESS`: "thread" or "os" (default: "thread")
//! - `RUST_LOG`: log filter (default directive: "guidgen=info")
//!
//! A `.env` file in the working directory is loaded first if present.

use anyhow::Context;
use clap::{Parser, Subcommand};
use guidgen_uuid::{GeneratorConfig, Identifier, IdentifierKind};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "guidgen")]
#[command(about = "UUID v4 and Microsoft GUID generator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new identifiers
    Generate {
        /// Identifier kind: standard (uuid-v4) or braced-uppercase (microsoft-guid)
        #[arg(long, short)]
        kind: Option<IdentifierKind>,
        /// Number of identifiers to generate
        #[arg(long, short = 'n', default_value_t = 1)]
        count: usize,
        /// Print a JSON array instead of one identifier per line
        #[arg(long)]
        json: bool,
    },
    /// Check whether text is a well-formed identifier
    Validate {
        /// Identifier text, for example 550e8400-e29b-41d4-a716-446655440000
        text: String,
    },
    /// List accepted identifier kinds
    Kinds,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Success,
    Invalid,
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("guidgen=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let cfg = GeneratorConfig::from_env_values(
        std::env::var("GUIDGEN_DEFAULT_KIND").ok(),
        std::env::var("GUIDGEN_RANDOMNESS").ok(),
    )
    .context("invalid guidgen configuration")?;

    tracing::debug!(
        default_kind = %cfg.default_kind(),
        randomness = %cfg.randomness(),
        "resolved configuration"
    );

    let stdout = std::io::stdout();
    let outcome = run(cli.command, &cfg, &mut stdout.lock())?;

    Ok(match outcome {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Invalid => ExitCode::FAILURE,
    })
}

fn run(
    command: Option<Commands>,
    cfg: &GeneratorConfig,
    out: &mut dyn Write,
) -> anyhow::Result<Outcome> {
    match command {
        Some(Commands::Generate { kind, count, json }) => {
            let kind = kind.unwrap_or(cfg.default_kind());
            let ids = cfg
                .generator()
                .generate_many(kind, count)
                .with_context(|| format!("failed to generate {count} {kind} identifier(s)"))?;

            if json {
                let entries: Vec<_> = ids
                    .iter()
                    .map(|id| serde_json::json!({ "kind": id.kind(), "text": id }))
                    .collect();
                serde_json::to_writer_pretty(&mut *out, &entries)?;
                writeln!(out)?;
            } else {
                for id in &ids {
                    writeln!(out, "{}", id)?;
                }
            }
        }
        Some(Commands::Validate { text }) => match Identifier::parse(text.trim()) {
            Ok(id) => writeln!(out, "valid {}", id.kind())?,
            Err(e) => {
                tracing::warn!("rejected identifier: {}", e);
                writeln!(out, "invalid: {}", e)?;
                return Ok(Outcome::Invalid);
            }
        },
        Some(Commands::Kinds) => {
            for kind in IdentifierKind::ALL {
                let marker = if kind == cfg.default_kind() { " (default)" } else { "" };
                writeln!(out, "{}{}", kind, marker)?;
            }
        }
        None => {
            let id = cfg
                .generator()
                .generate(cfg.default_kind())
                .context("failed to generate identifier")?;
            writeln!(out, "{}", id)?;
        }
    }

    Ok(Outcome::Success)
}
