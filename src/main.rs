//! aclregex
//!
//! Command line front end for evaluating and linting ACL rule files.

use aclregex::{
    AclChecker, AppError,
    acl::{Outcome, Resolution, RuleSet, compile, load_rules},
    config::{AppConfig, LogFormat, load_config, loader::rules_path},
};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Evaluate regex-capable wiki ACL rules
#[derive(Parser, Debug)]
#[command(name = "aclregex")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "ACLREGEX_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ACLREGEX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Rule file, overrides acl.rules_file
    #[arg(short, long, env = "ACLREGEX_RULES")]
    rules: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the permission a user has on a page
    Check {
        /// Page id, e.g. wiki:start
        #[arg(long)]
        id: String,

        /// User name (empty for anonymous)
        #[arg(long, default_value = "")]
        user: String,

        /// Group membership, may be repeated
        #[arg(long = "group")]
        groups: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report rule lines that cannot be compiled
    Lint,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn describe(resolution: &Resolution) -> String {
    match &resolution.outcome {
        Outcome::AclDisabled => "ACL disabled".to_string(),
        Outcome::NoAuth => "no authentication backend".to_string(),
        Outcome::NoRules => "no ACL rules configured".to_string(),
        Outcome::Admin => "superuser".to_string(),
        Outcome::Direct { lines } => format!("page rule, line(s) {lines:?}"),
        Outcome::Namespace { scope, lines } => {
            format!("namespace {scope}, line(s) {lines:?}")
        }
        Outcome::NoMatch => "no matching rule".to_string(),
    }
}

/// Print the diagnostics of a rule set; fails if any line is malformed
fn lint(path: &str, set: &RuleSet) -> Result<(), AppError> {
    for diag in set.diagnostics() {
        println!("{}:{}: {}\t{}", path, diag.line, diag.error, diag.text.trim());
    }
    println!(
        "{} rule(s), {} malformed line(s)",
        set.len(),
        set.diagnostics().len()
    );

    match set.diagnostics().first() {
        Some(first) => Err(AppError::Rule(first.error.clone())),
        None => Ok(()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logging settings come from the config file, so a broken config is
    // reported with the defaults
    let config = load_config(args.config.as_deref());
    let fallback = AppConfig::default();
    init_logging(config.as_ref().unwrap_or(&fallback), args.log_level.as_deref());
    let config = config.inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting aclregex");

    let path = rules_path(&config, args.rules.as_deref())
        .inspect_err(|e| error!(error = %e, "No rule file"))?;
    let lines = load_rules(path).inspect_err(|e| error!(error = %e, "Failed to read rules"))?;

    match args.command {
        Command::Check {
            id,
            user,
            groups,
            json,
        } => {
            let checker = AclChecker::new(&config);
            let resolution = checker.check(&lines, &id, &user, &groups);

            if json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                println!("{}\t{}", resolution.permission, describe(&resolution));
            }
        }
        Command::Lint => lint(path, &compile(&lines))?,
    }

    Ok(())
}
