//! Composer CLI
//!
//! Command-line front end for the post composer: check, post and draft
//! threads without a browser.

#![allow(clippy::print_stdout)]

mod compose;

use std::path::PathBuf;

use application::ports::SelectedFile;
use clap::{Parser, Subcommand};
use compose::{ComposeRequest, ComposerRuntime, DraftPostReport, parse_draft_id, parse_media};
use domain::{DraftId, ReplyPolicy, Sentiment};
use infrastructure::{AppConfig, ConfigValidator, TelemetryConfig, init_telemetry};

/// Composer CLI
#[derive(Parser)]
#[command(name = "composer-cli")]
#[command(author, version, about = "Multi-block post composer", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (without extension)
    #[arg(short, long, default_value = "composer")]
    config: String,

    /// Override the draft storage file
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Override the outbox file
    #[arg(long)]
    outbox: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Content options shared by commands that build a post
#[derive(clap::Args, Debug, Clone)]
struct PostArgs {
    /// Block text; repeat for a thread
    #[arg(short, long = "block", required = true)]
    blocks: Vec<String>,

    /// Media for the last block as NAME:MIME[:SIZE]
    #[arg(short, long, value_parser = parse_media)]
    media: Vec<SelectedFile>,

    /// Who may reply
    #[arg(short, long, default_value = "everyone")]
    reply_policy: ReplyPolicy,

    /// Market sentiment
    #[arg(short, long)]
    sentiment: Option<Sentiment>,
}

impl From<PostArgs> for ComposeRequest {
    fn from(args: PostArgs) -> Self {
        Self {
            blocks: args.blocks,
            media: args.media,
            reply_policy: args.reply_policy,
            sentiment: args.sentiment,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the character budget of each block
    Check(PostArgs),

    /// Publish a post to the outbox
    Post(PostArgs),

    /// Write interactively from stdin with autosave
    ///
    /// Lines go into the focused block. `/new` starts a block, `/post`
    /// publishes, `/save` stores a draft and `/quit` stops.
    Write,

    /// Manage the draft history
    Drafts {
        #[command(subcommand)]
        command: DraftCommands,
    },

    /// Validate the configuration and print the effective limits
    Config,
}

#[derive(Subcommand)]
enum DraftCommands {
    /// List drafts, newest first
    List,

    /// Show one draft
    Show {
        #[arg(value_parser = parse_draft_id)]
        id: DraftId,
    },

    /// Save a draft without posting
    Save(PostArgs),

    /// Restore a draft and publish it
    Post {
        #[arg(value_parser = parse_draft_id)]
        id: DraftId,

        /// Accept that attached media cannot be restored
        #[arg(long)]
        confirm_media_loss: bool,
    },

    /// Delete a draft
    Delete {
        #[arg(value_parser = parse_draft_id)]
        id: DraftId,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Logging settings; `-v` overrides the configured filter
fn telemetry_for(config: &AppConfig, verbose: u8) -> TelemetryConfig {
    let telemetry = config.telemetry.clone();
    if verbose > 0 {
        telemetry.with_log_filter(log_filter_from_verbosity(verbose))
    } else {
        telemetry
    }
}

/// Apply path overrides from the command line
fn apply_overrides(mut config: AppConfig, cli: &Cli) -> AppConfig {
    if let Some(storage) = &cli.storage {
        config.drafts.storage_path.clone_from(storage);
    }
    if let Some(outbox) = &cli.outbox {
        config.submission.outbox_path.clone_from(outbox);
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = apply_overrides(AppConfig::load_from(&cli.config)?, &cli);
    init_telemetry(&telemetry_for(&config, cli.verbose))?;

    let warnings = config.validate();
    ConfigValidator::log_warnings(&warnings);
    if ConfigValidator::should_block_startup(&warnings) {
        anyhow::bail!("configuration has critical issues, run `composer-cli config` for details");
    }

    let runtime = ComposerRuntime::from_config(config)?;

    match cli.command {
        Commands::Check(args) => {
            for check in runtime.check(&args.into())? {
                let budget = check.budget;
                let marker = if budget.is_over_limit {
                    "❌"
                } else if budget.is_near_limit {
                    "⚠️ "
                } else {
                    "✅"
                };
                println!(
                    "{marker} Block {}: {}/{} ({} left)",
                    check.index + 1,
                    budget.length,
                    budget.max,
                    budget.remaining
                );
            }
        },

        Commands::Post(args) => {
            let report = runtime.post(&args.into()).await?;
            println!(
                "✅ Posted {} block(s) with {} media item(s)",
                report.blocks, report.media
            );
            println!("   Outbox: {}", runtime.gateway().path().display());
        },

        Commands::Write => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let summary = runtime.write(stdin).await?;
            println!("📝 Posted {} time(s)", summary.posted);
            if let Some(id) = summary.saved_draft {
                println!("💾 Draft saved: {id}");
            }
        },

        Commands::Drafts { command } => match command {
            DraftCommands::List => {
                let drafts = runtime.list_drafts().await?;
                if drafts.is_empty() {
                    println!("No drafts");
                }
                for draft in drafts {
                    println!(
                        "{}  {}  {} block(s)  {}",
                        draft.id,
                        draft.updated_at.format("%Y-%m-%d %H:%M"),
                        draft.blocks.len(),
                        draft.preview()
                    );
                }
            },

            DraftCommands::Show { id } => {
                let draft = runtime.show_draft(id).await?;
                println!("{}", serde_json::to_string_pretty(&draft)?);
            },

            DraftCommands::Save(args) => match runtime.save_draft(&args.into()).await? {
                Some(id) => println!("💾 Draft saved: {id}"),
                None => println!("Nothing to save"),
            },

            DraftCommands::Post {
                id,
                confirm_media_loss,
            } => match runtime.post_draft(id, confirm_media_loss).await? {
                DraftPostReport::NeedsConfirmation { media_count } => {
                    println!(
                        "⚠️  Draft has {media_count} media item(s) that cannot be restored. \
                         Re-run with --confirm-media-loss to post without them."
                    );
                },
                DraftPostReport::Posted {
                    report,
                    dropped_media,
                } => {
                    println!("✅ Posted {} block(s)", report.blocks);
                    if dropped_media > 0 {
                        println!("   {dropped_media} media item(s) dropped");
                    }
                },
            },

            DraftCommands::Delete { id } => runtime.delete_draft(id).await?,
        },

        Commands::Config => {
            let config = runtime.config();
            let limits = config.composer.to_limits();
            println!("Environment:       {}", config.environment);
            println!("Chars per block:   {}", limits.max_chars_per_block);
            println!("Near-limit at:     {}", limits.near_limit_threshold);
            println!("Blocks per post:   {}", limits.max_blocks);
            println!("Media per block:   {}", limits.max_media_per_block);
            println!("Draft history:     {}", config.drafts.max_drafts);
            println!("Draft storage:     {}", config.drafts.storage_path.display());
            println!("Outbox:            {}", config.submission.outbox_path.display());
            if warnings.is_empty() {
                println!("✅ No issues");
            }
            for warning in &warnings {
                println!("[{}] {}: {}", warning.code, warning.severity, warning.message);
                println!("   {}", warning.recommendation);
            }
        },
    }

    Ok(())
}
