//! Venture Studio license tool
//!
//! Issues and inspects the HMAC-signed license tokens the app accepts.
//!
//! Usage:
//!   venture-license sign --plan pro --expires-in 2592000 --field email=a@b.c
//!   venture-license verify <TOKEN>
//!   venture-license limits agency
//!
//! The secret comes from --secret or LICENSE_SIGNING_SECRET.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use venture_cli::{issue_token, parse_field, resolve_expiry, verify_report};
use venture_license::{resolve, SigningSecret, SECRET_ENV_VAR};

#[derive(Parser, Debug)]
#[command(name = "venture-license")]
#[command(about = "Issue and inspect Venture Studio license tokens")]
struct Args {
    /// Signing secret (falls back to the development secret)
    #[arg(long, env = SECRET_ENV_VAR, hide_env_values = true, global = true)]
    secret: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign a new license token
    Sign {
        /// Plan name (free, pro, agency)
        #[arg(short, long)]
        plan: String,

        /// Absolute expiry (seconds since epoch)
        #[arg(long)]
        exp: Option<i64>,

        /// Expiry relative to now, in seconds
        #[arg(long)]
        expires_in: Option<i64>,

        /// Extra payload member as key=value (repeatable)
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },
    /// Verify a token and print the resulting entitlement
    Verify {
        /// The license token
        token: String,

        /// Evaluate at this time instead of now (seconds since epoch)
        #[arg(long)]
        now: Option<i64>,
    },
    /// Print the limits of a plan
    Limits {
        /// Plan name
        plan: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let secret = match args.secret {
        Some(secret) => SigningSecret::from(secret),
        None => SigningSecret::from_env_or_default(),
    };
    let now = chrono::Utc::now().timestamp();

    match args.command {
        Command::Sign {
            plan,
            exp,
            expires_in,
            fields,
        } => {
            let exp = resolve_expiry(exp, expires_in, now)?;
            let token = issue_token(&plan, exp, fields, &secret)?;
            info!(%plan, ?exp, "issued license token");
            println!("{token}");
        }
        Command::Verify { token, now: at } => {
            let report = verify_report(&token, &secret, at.unwrap_or(now));
            info!(status = %report.status, plan = %report.plan, "verified license token");
            let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
            println!("{json}");
        }
        Command::Limits { plan } => {
            let json =
                serde_json::to_string_pretty(&resolve(&plan)).context("Failed to encode limits")?;
            println!("{json}");
        }
    }

    Ok(())
}
