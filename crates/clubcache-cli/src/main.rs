//! clubcache - walk the club's paginated lists from the command line.
//!
//! Opens one list screen (join requests, behaviour rules, event guests or
//! referrals), loads it through the paged cache, and prints the records.
//! The screen's state is saved to the session directory on exit, so running
//! the same command again within the cache TTL is served without a request.
//! `clubcache init` writes a starter config file.
//!
//! Configuration via environment:
//! - CLUBCACHE_URL: API base URL (overrides the config file)
//! - CLUBCACHE_TOKEN: bearer token supplied by the host platform
//! - RUST_LOG: log filter (default: warn)

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clubcache_core::api::endpoints::{self, Endpoint};
use clubcache_core::models::{BehaviorRule, EventGuest, JoinRequest, ListRecord, Referral};
use clubcache_core::screen::{
    event_guest_tabs, join_request_tabs, referral_tabs, CategoryTabs, NoticeLevel,
};
use clubcache_core::utils::truncate_string;
use clubcache_core::{
    ApiClient, Config, HttpPageFetcher, Intent, JsonFileSessionStore, ListScreen, PagedCache,
    ScreenState,
};

// ============================================================================
// Constants
// ============================================================================

/// Longest record summary printed per line
const SUMMARY_WIDTH: usize = 100;

/// Club list browser
#[derive(Parser)]
#[command(name = "clubcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ~/.config/clubcache/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long, env = "CLUBCACHE_URL", global = true)]
    base_url: Option<String>,

    /// Records per page request
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Extra pages to load after the first
    #[arg(long, default_value_t = 0, global = true)]
    pages: u32,

    /// Only print records whose summary contains this text
    #[arg(long, global = true)]
    search: Option<String>,

    /// Do not read or write the saved screen state
    #[arg(long, global = true)]
    no_session: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with defaults (and --base-url, if given)
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Group join request history
    JoinRequests {
        /// all, pending, approved or rejected
        #[arg(long)]
        status: Option<String>,
    },

    /// Club code of conduct
    Rules,

    /// Guest list of an event
    Guests {
        #[arg(long)]
        event_id: i64,

        /// all, registered, confirmed or cancelled
        #[arg(long)]
        status: Option<String>,

        /// all, true or false (confirmed guests only)
        #[arg(long)]
        checked_in: Option<String>,
    },

    /// Referrals given or received
    Refs {
        /// given or received
        #[arg(long)]
        direction: Option<String>,

        /// all, new, in_progress or closed
        #[arg(long)]
        status: Option<String>,
    },
}

/// Tabs for a screen plus the names picked on the command line.
struct TabSelection {
    tabs: CategoryTabs,
    primary: Option<String>,
    child: Option<String>,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_deref())?;
    info!("clubcache starting");

    match &cli.command {
        Commands::Init { force } => init_config(&cli, *force),
        Commands::JoinRequests { status } => {
            let tabs = TabSelection {
                tabs: join_request_tabs(),
                primary: status.clone(),
                child: None,
            };
            run::<JoinRequest>(&cli, &load_config(&cli)?, endpoints::group_join_requests(), Some(tabs)).await
        }
        Commands::Rules => {
            run::<BehaviorRule>(&cli, &load_config(&cli)?, endpoints::behavior_rules(), None).await
        }
        Commands::Guests {
            event_id,
            status,
            checked_in,
        } => {
            let tabs = TabSelection {
                tabs: event_guest_tabs(),
                primary: status.clone(),
                child: checked_in.clone(),
            };
            run::<EventGuest>(&cli, &load_config(&cli)?, endpoints::event_guests(*event_id), Some(tabs)).await
        }
        Commands::Refs { direction, status } => {
            let tabs = TabSelection {
                tabs: referral_tabs(),
                primary: direction.clone(),
                child: status.clone(),
            };
            run::<Referral>(&cli, &load_config(&cli)?, endpoints::referrals(), Some(tabs)).await
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to replace it", path.display());
    }

    let mut config = Config::default();
    config.base_url = cli.base_url.clone();
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size.max(1);
    }

    match &cli.config {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    info!(path = %path.display(), "Wrote config");
    println!("Wrote {}", path.display());
    Ok(())
}

/// Mount the list screen for `endpoint`, walk pages, print, unmount.
async fn run<T: ListRecord>(
    cli: &Cli,
    config: &Config,
    endpoint: Endpoint,
    selection: Option<TabSelection>,
) -> Result<()> {
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| config.base_url.clone())
        .context("No API base URL configured; set base_url in the config file or pass --base-url")?;

    let mut client = ApiClient::new(&base_url, config.request_timeout())?;
    if let Some(token) = Config::token() {
        client.set_token(token);
    }

    let mut policy = config.cache_policy();
    if let Some(page_size) = cli.page_size {
        policy.page_size = page_size.max(1);
    }

    let storage_key = format!("screen:{}", endpoint.path);
    let label = endpoint.name;
    let fetcher = HttpPageFetcher::<T>::new(client, endpoint);
    let cache = PagedCache::new(label, fetcher, policy);

    let mut screen = ListScreen::new(storage_key, cache);
    if !cli.no_session {
        let store = JsonFileSessionStore::new(config.session_dir()?)?;
        screen = screen.with_store(Arc::new(store));
    }

    if let Some(selection) = selection {
        let picked = selection.primary.is_some() || selection.child.is_some();
        let tabs = select_tabs(selection)?;
        // An explicit pick wins over the saved tab; otherwise resume where we left off
        screen = if picked {
            screen.with_pinned_tabs(tabs)
        } else {
            screen.with_tabs(tabs)
        };
    }

    screen.dispatch(Intent::Mount).await;

    for _ in 0..cli.pages {
        if *screen.state() != ScreenState::Loaded || !screen.snapshot().has_more() {
            break;
        }
        screen.dispatch(Intent::NextPage).await;
    }

    print_screen(&mut screen, label, cli.search.as_deref().unwrap_or(""));

    let failed = match screen.state() {
        ScreenState::Error(message) => Some(message.clone()),
        _ => None,
    };
    screen.dispatch(Intent::Unmount).await;

    match failed {
        Some(message) => anyhow::bail!(message),
        None => Ok(()),
    }
}

/// Apply the command-line picks to the tabs before the screen mounts.
fn select_tabs(selection: TabSelection) -> Result<CategoryTabs> {
    let mut tabs = selection.tabs;
    if let Some(name) = selection.primary.as_deref() {
        let index = tabs
            .find(name)
            .with_context(|| format!("Unknown tab: {}", name))?;
        tabs.select(index);
    }
    if let Some(name) = selection.child.as_deref() {
        let index = tabs
            .find_child(name)
            .with_context(|| format!("Unknown sub-tab for this tab: {}", name))?;
        tabs.select_child(index);
    }
    Ok(tabs)
}

fn print_screen<T: ListRecord>(screen: &mut ListScreen<HttpPageFetcher<T>>, label: &str, search: &str) {
    let snapshot = screen.snapshot();
    let tab = screen
        .tabs()
        .map(|t| format!(" [{}]", t.selected_label()))
        .unwrap_or_default();
    let total = snapshot
        .total_pages
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());

    println!(
        "{}{}: {} items, page {}/{}, updated {}",
        label,
        tab,
        snapshot.items.len(),
        snapshot.page,
        total,
        snapshot.age
    );
    for item in screen.visible_items(search) {
        println!("  {}", truncate_string(&item.summary(), SUMMARY_WIDTH));
    }

    for notice in screen.take_notices() {
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Error => eprintln!("Error: {}", notice.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("clubcache").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_init_writes_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path_arg = path.to_str().unwrap();

        let args = [
            "--config",
            path_arg,
            "--base-url",
            "https://club.test/api",
            "--page-size",
            "25",
            "init",
        ];
        init_config(&cli(&args), false).unwrap();
        let written = Config::load_from(&path).unwrap();
        assert_eq!(written.base_url.as_deref(), Some("https://club.test/api"));
        assert_eq!(written.page_size, 25);

        // Existing file is kept unless forced
        let err = init_config(&cli(&["--config", path_arg, "init"]), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(Config::load_from(&path).unwrap(), written);

        init_config(&cli(&["--config", path_arg, "init", "--force"]), true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().page_size, Config::default().page_size);
    }

    #[test]
    fn test_select_tabs_applies_picks_before_mount() {
        let tabs = select_tabs(TabSelection {
            tabs: referral_tabs(),
            primary: Some("received".to_string()),
            child: Some("closed".to_string()),
        })
        .unwrap();
        assert_eq!((tabs.selected(), tabs.selected_child()), (1, 3));

        let unknown = select_tabs(TabSelection {
            tabs: join_request_tabs(),
            primary: Some("sideways".to_string()),
            child: None,
        });
        assert!(unknown.is_err());
    }
}
