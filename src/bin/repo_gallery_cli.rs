use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use repo_gallery::formatter::{
    DisplayTimezone, gallery_json, gallery_markdown, languages_markdown,
};
use repo_gallery::github::client::DEFAULT_BASE_URI;
use repo_gallery::services::config::{DEFAULT_ACCOUNT, DEFAULT_REFRESH_INTERVAL};
use repo_gallery::services::{DeployUrlResolver, GalleryConfig, GallerySnapshot};
use repo_gallery::types::{LanguageFilter, SortKey, ViewSelection};

/// Parse timezone if provided, otherwise use local timezone
fn parse_timezone_or_default(timezone: Option<String>) -> DisplayTimezone {
    let Some(timezone) = timezone else {
        return DisplayTimezone::Local;
    };
    DisplayTimezone::parse(&timezone).unwrap_or_else(|| {
        warn!(
            "Unrecognized timezone {:?}, showing dates in local time",
            timezone
        );
        DisplayTimezone::Local
    })
}

#[derive(Parser)]
#[command(name = "repo-gallery-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Repo Gallery CLI - browse a GitHub account's public repositories grouped by language, with search, sort and auto-refresh"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Output format for results - markdown for reading, json for programmatic use
    #[arg(long, global = true, default_value = "markdown")]
    format: OutputFormat,
    /// GitHub account whose public repositories are listed
    #[arg(long, global = true, default_value = DEFAULT_ACCOUNT)]
    account: String,
    /// Base URI of the GitHub REST API
    #[arg(long, global = true, default_value = DEFAULT_BASE_URI)]
    base_uri: String,
    /// Timezone for dates in output (e.g., "JST", "+09:00", "UTC", "local"); local timezone when omitted
    #[arg(long, global = true)]
    timezone: Option<String>,
    /// Request timeout in seconds; transport defaults when omitted
    #[arg(long, global = true)]
    request_timeout: Option<u64>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Args, Clone)]
struct SelectionArgs {
    /// Case-insensitive text matched against repository names and descriptions
    #[arg(short, long, default_value = "")]
    search: String,
    /// Sort order: updated, created_new, created_old, stars or name (anything else keeps API order)
    #[arg(long, default_value = "updated")]
    sort: SortKey,
    /// Exact language to show, or "All"
    #[arg(short, long, default_value = "All")]
    language: LanguageFilter,
}

impl From<SelectionArgs> for ViewSelection {
    fn from(args: SelectionArgs) -> Self {
        ViewSelection::new(args.search, args.sort, args.language)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the repositories once and print them grouped by language
    List {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Fetch the repositories once and print the languages available for filtering
    Languages,
    /// Keep refreshing and re-render whenever the listing changes; reads selection commands from stdin
    Watch {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Seconds between refreshes (default: 60)
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// Selection change typed on stdin while watching
#[derive(Debug, Clone, PartialEq)]
enum InputCommand {
    Search(String),
    Sort(SortKey),
    Language(LanguageFilter),
    Clear,
    Languages,
    Quit,
}

const INPUT_HELP: &str =
    "commands: search <text> | sort <key> | lang <language|All> | languages | clear | quit";

fn parse_input_command(line: &str) -> Option<InputCommand> {
    let line = line.trim();
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));
    let argument = argument.trim();

    match command {
        "search" | "s" => Some(InputCommand::Search(argument.to_string())),
        "sort" if !argument.is_empty() => Some(InputCommand::Sort(SortKey::parse(argument))),
        "lang" | "language" if !argument.is_empty() => {
            Some(InputCommand::Language(LanguageFilter::new(argument)))
        }
        "languages" => Some(InputCommand::Languages),
        "clear" => Some(InputCommand::Clear),
        "quit" | "q" | "exit" => Some(InputCommand::Quit),
        _ => None,
    }
}

struct RenderContext {
    format: OutputFormat,
    resolver: DeployUrlResolver,
    timezone: DisplayTimezone,
}

impl RenderContext {
    fn render(&self, snapshot: &GallerySnapshot, selection: &ViewSelection) -> Result<()> {
        let view = snapshot.grouped(selection);
        let initial_loading = snapshot.is_initial_loading();
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    gallery_json(initial_loading, &view, &self.resolver, self.timezone)?
                );
            }
            OutputFormat::Markdown => {
                print!(
                    "{}",
                    gallery_markdown(initial_loading, &view, &self.resolver, self.timezone)
                        .0
                );
            }
        }
        Ok(())
    }

    fn render_languages(&self, snapshot: &GallerySnapshot) -> Result<()> {
        let languages = snapshot.languages();
        match self.format {
            OutputFormat::Json => {
                let names: Vec<&str> = languages.iter().map(LanguageFilter::as_str).collect();
                println!("{}", serde_json::to_string_pretty(&names)?);
            }
            OutputFormat::Markdown => print!("{}", languages_markdown(&languages).0),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider early to prevent "no process-level CryptoProvider available" panics
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("repo_gallery=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = GalleryConfig::default()
        .with_account(cli.account)
        .with_base_uri(&cli.base_uri)?
        .with_request_timeout(cli.request_timeout.map(Duration::from_secs));

    let context = RenderContext {
        format: cli.format,
        resolver: config.deploy_resolver(),
        timezone: parse_timezone_or_default(cli.timezone),
    };

    match cli.command {
        Commands::List { selection } => {
            let fetcher = config.fetcher()?;
            fetcher.refresh().await;
            context.render(&fetcher.snapshot(), &selection.into())?;
        }
        Commands::Languages => {
            let fetcher = config.fetcher()?;
            fetcher.refresh().await;
            context.render_languages(&fetcher.snapshot())?;
        }
        Commands::Watch {
            selection,
            interval,
        } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL);
            handle_watch_command(
                config.with_refresh_interval(interval),
                selection.into(),
                &context,
            )
            .await?;
        }
    }

    Ok(())
}

async fn handle_watch_command(
    config: GalleryConfig,
    mut selection: ViewSelection,
    context: &RenderContext,
) -> Result<()> {
    let fetcher = config.fetcher()?;
    let mut receiver = fetcher.subscribe();
    // Dropping the handle on any early return also stops the timer
    let poller = fetcher.start(config.refresh_interval)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("{}", INPUT_HELP);
    let snapshot = receiver.borrow_and_update().clone();
    context.render(&snapshot, &selection)?;

    loop {
        tokio::select! {
            changed = receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = receiver.borrow_and_update().clone();
                context.render(&snapshot, &selection)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input_command(&line) {
                    Some(InputCommand::Quit) => break,
                    Some(InputCommand::Languages) => {
                        context.render_languages(&fetcher.snapshot())?;
                    }
                    Some(InputCommand::Search(term)) => {
                        selection.search_term = term;
                        context.render(&fetcher.snapshot(), &selection)?;
                    }
                    Some(InputCommand::Sort(key)) => {
                        selection.sort_key = key;
                        context.render(&fetcher.snapshot(), &selection)?;
                    }
                    Some(InputCommand::Language(language)) => {
                        selection.language_filter = language;
                        context.render(&fetcher.snapshot(), &selection)?;
                    }
                    Some(InputCommand::Clear) => {
                        selection = ViewSelection::default();
                        context.render(&fetcher.snapshot(), &selection)?;
                    }
                    None => {
                        warn!("Unknown command: {}", line.trim());
                        eprintln!("{}", INPUT_HELP);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C pressed, stopping");
                break;
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}
