// SPDX-License-Identifier: MPL-2.0

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use giglink::api::{GigLinkClient, MentionRecord, UserDirectory, UserSummary};
use giglink::config::APP_NAME;
use giglink::mentions::{DisplayMode, MentionView, Segment, rank_candidates, to_markup};
use giglink::runtime;
use giglink::state::AppSettings;

#[derive(Parser, Debug)]
#[command(name = "giglink")]
#[command(about = "Render and resolve GigLink @mentions")]
struct Args {
    /// API base URL (overrides settings and GIGLINK_API_URL)
    #[arg(long, global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render stored content into segments
    Render {
        content: String,

        /// Mention records as a JSON array of {userId, username, avatar?}
        #[arg(long)]
        mentions: Option<String>,

        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Include avatars on chips
        #[arg(long)]
        show_avatar: bool,

        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,

        /// Look bare @Names up against the user directory
        #[arg(long)]
        resolve: bool,
    },
    /// Search users the way the mention picker does
    Search {
        query: String,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank names against a query without touching the network
    Rank { query: String, names: Vec<String> },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Link,
    Chip,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Json,
    Markup,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("giglink=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn client(settings: &AppSettings) -> Result<GigLinkClient> {
    let client = GigLinkClient::with_api_base(&settings.api_base)
        .with_context(|| format!("bad API base {}", settings.api_base))?
        .with_token(settings.auth_token.clone());
    Ok(client)
}

fn print_segments(segments: &[Segment], format: FormatArg) -> Result<()> {
    match format {
        FormatArg::Json => println!("{}", serde_json::to_string_pretty(segments)?),
        FormatArg::Markup => println!("{}", to_markup(segments)),
    }
    Ok(())
}

fn print_users(users: &[UserSummary]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(users)?);
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut settings = AppSettings::load();
    if let Some(api) = args.api {
        settings.api_base = api;
    }
    debug!(api = %settings.api_base, "{APP_NAME} settings loaded");

    match args.command {
        Command::Render {
            content,
            mentions,
            mode,
            show_avatar,
            format,
            resolve,
        } => {
            let mentions: Vec<MentionRecord> = match mentions {
                Some(json) => serde_json::from_str(&json).context("invalid --mentions JSON")?,
                None => Vec::new(),
            };
            let mut options = settings.render_options();
            if let Some(mode) = mode {
                options.display_mode = match mode {
                    ModeArg::Link => DisplayMode::Link,
                    ModeArg::Chip => DisplayMode::Chip,
                };
            }
            options.show_avatar |= show_avatar;

            let mut view = MentionView::new(content, mentions, options);
            if resolve {
                let client = client(&settings)?;
                if !client.is_authenticated() {
                    info!("no auth token configured; skipping name resolution");
                }
                let applied = runtime::block_on(view.resolve(&client));
                debug!(applied, resolved = view.resolved().len(), "name resolution finished");
            }
            print_segments(&view.segments(), format)
        }
        Command::Search { query, limit } => {
            let client = client(&settings)?;
            let limit = limit.unwrap_or(settings.search_limit);
            let users = runtime::block_on(client.search_users(&query, limit))
                .with_context(|| format!("searching for {query:?}"))?;
            print_users(&rank_candidates(&query, users))
        }
        Command::Rank { query, names } => {
            let users = names
                .into_iter()
                .enumerate()
                .map(|(i, name)| UserSummary::new(i.to_string(), name))
                .collect();
            print_users(&rank_candidates(&query, users))
        }
    }
}
