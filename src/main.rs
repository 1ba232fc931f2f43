// SPDX-License-Identifier: PMPL-1.0-or-later
//! Lockbot CLI - content locking and legibility safeguards
//!
//! Part of the gitbot-fleet ecosystem.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lockbot::batch::validate_directory;
use lockbot::config::{default_config_path, load_config, write_default_config};
use lockbot::fixer::generate_destructive_safeguards;
use lockbot::inputs::{read_locked_markup, read_record};
use lockbot::locker::{validate_integrity, ContentLocker, ContentRequirements, MediaKind};
use lockbot::report::{
    generate_batch_report, generate_integrity_report, generate_report, OutputFormat,
};
use lockbot::{Validator, WcagLevel};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Content locking and legibility safeguards for gitbot-fleet
#[derive(Parser)]
#[command(name = "lockbot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lock content values into a media template
    Lock {
        /// Content values (placeholder -> text), JSON or YAML
        #[arg(long)]
        values: PathBuf,

        /// Required elements and priorities, JSON or YAML
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// Media kind (lp, poster, logo, package, ui)
        #[arg(long, default_value = "lp")]
        media: String,

        /// Output file for the lock record (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a stylesheet against locked markup
    Validate {
        /// Markup file, or a lock record (.json)
        markup: PathBuf,

        /// Stylesheet to validate
        css: PathBuf,

        /// Write the corrected stylesheet
        #[arg(long)]
        fix: bool,

        /// Where to write the corrected stylesheet (defaults to <css>.fixed.css)
        #[arg(long, requires = "fix")]
        fixed_output: Option<PathBuf>,

        /// Style source identifier
        #[arg(long)]
        source: Option<String>,

        /// WCAG conformance level (overrides the configuration)
        #[arg(long)]
        level: Option<WcagLevelArg>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check candidate markup against a lock record
    Verify {
        /// Lock record produced by `lockbot lock`
        lock: PathBuf,

        /// Candidate markup
        candidate: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate every stylesheet in a directory against one markup
    Batch {
        /// Directory to scan for .css files
        dir: PathBuf,

        /// Markup file, or a lock record (.json)
        #[arg(long)]
        markup: PathBuf,

        /// Style source identifier
        #[arg(long)]
        source: Option<String>,

        /// Include corrected stylesheets in the results
        #[arg(long)]
        fix: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: FormatArg,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Target path (defaults to the user config directory)
        path: Option<PathBuf>,
    },

    /// Print built-in data
    Show {
        #[arg(value_enum)]
        what: ShowArg,

        /// Media kind for `template`
        #[arg(long, default_value = "lp")]
        media: String,
    },
}

/// WCAG conformance level CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum WcagLevelArg {
    /// Level AA - standard
    Aa,
    /// Level AAA - enhanced
    Aaa,
}

impl From<WcagLevelArg> for WcagLevel {
    fn from(arg: WcagLevelArg) -> Self {
        match arg {
            WcagLevelArg::Aa => WcagLevel::AA,
            WcagLevelArg::Aaa => WcagLevel::AAA,
        }
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

/// Built-in data that `show` can print
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ShowArg {
    /// Effective configuration
    Config,
    /// Markup template for a media kind
    Template,
    /// Safeguard stylesheet block
    Safeguards,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lockbot=debug")
    } else {
        EnvFilter::new("lockbot=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Lock {
            values: values_path,
            requirements,
            media,
            output,
        } => {
            let config = load_config(&config_path)?;
            let values: BTreeMap<String, String> = read_record(&values_path).with_context(|| {
                format!("Failed to read content values from {}", values_path.display())
            })?;
            let requirements: ContentRequirements = match requirements {
                Some(path) => read_record(&path)
                    .with_context(|| format!("Failed to read requirements from {}", path.display()))?,
                None => ContentRequirements::default(),
            };
            let media = MediaKind::parse_or(&media, config.locker.fallback_media);

            let locked = ContentLocker::from_config(&config.locker).lock(&requirements, media, &values);
            write_output(&serde_json::to_string_pretty(&locked)?, output.as_deref())?;
        }

        Commands::Validate {
            markup,
            css,
            fix,
            fixed_output,
            source,
            level,
            format,
            output,
        } => {
            let mut config = load_config(&config_path)?;
            if let Some(level) = level {
                config.validator.wcag_level = level.into();
            }
            let markup = read_markup(&markup)?;
            let stylesheet = std::fs::read_to_string(&css)
                .with_context(|| format!("Failed to read stylesheet {}", css.display()))?;

            let validator = Validator::new(config.validator);
            let result = if fix {
                validator.validate_and_fix(&markup, &stylesheet, source.as_deref())
            } else {
                validator.validate(&markup, &stylesheet, source.as_deref())
            };

            if let Some(fixed) = &result.fixed_css {
                let target = fixed_output.unwrap_or_else(|| css.with_extension("fixed.css"));
                std::fs::write(&target, fixed)?;
                eprintln!("Corrected stylesheet written to {}", target.display());
            }

            let artifact = css.display().to_string();
            let report = generate_report(&result, format.into(), Some(&artifact));
            write_output(&report, output.as_deref())?;

            if !result.passed {
                std::process::exit(1);
            }
        }

        Commands::Verify {
            lock,
            candidate,
            format,
            output,
        } => {
            let locked = read_locked_markup(&lock)?;
            let markup = std::fs::read_to_string(&candidate)
                .with_context(|| format!("Failed to read candidate {}", candidate.display()))?;

            let integrity = validate_integrity(&locked, &markup);
            let artifact = candidate.display().to_string();
            let report = generate_integrity_report(&integrity, format.into(), Some(&artifact));
            write_output(&report, output.as_deref())?;

            if !integrity.valid {
                std::process::exit(1);
            }
        }

        Commands::Batch {
            dir,
            markup,
            source,
            fix,
            format,
            output,
        } => {
            let config = load_config(&config_path)?;
            let markup = read_markup(&markup)?;
            let validator = Validator::new(config.validator);

            let entries = validate_directory(&dir, &markup, &validator, source.as_deref(), fix)?;
            let report = generate_batch_report(&entries, format.into());
            write_output(&report, output.as_deref())?;

            if entries.iter().any(|e| !e.result.passed) {
                std::process::exit(1);
            }
        }

        Commands::Init { path } => {
            let path = path.unwrap_or(config_path);
            if path.exists() {
                anyhow::bail!("Refusing to overwrite existing config at {}", path.display());
            }
            write_default_config(&path)?;
            eprintln!("Default configuration written to {}", path.display());
        }

        Commands::Show { what, media } => {
            let config = load_config(&config_path)?;
            match what {
                ShowArg::Config => print!("{}", serde_yaml::to_string(&config)?),
                ShowArg::Template => {
                    let kind = MediaKind::parse_or(&media, config.locker.fallback_media);
                    let locker = ContentLocker::from_config(&config.locker);
                    println!("{}", locker.catalog().template(kind).trim());
                }
                ShowArg::Safeguards => println!("{}", generate_destructive_safeguards()),
            }
        }
    }

    Ok(())
}

/// Markup from a plain markup file or from a lock record
fn read_markup(path: &Path) -> anyhow::Result<String> {
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        let locked = read_locked_markup(path)?;
        return Ok(locked.markup().to_string());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read markup {}", path.display()))
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
