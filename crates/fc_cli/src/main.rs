use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use fc_cache::CacheManager;
use fc_core::logging::{init_logging, level_for};
use fc_core::{FeedItem, SourceFetcher, SourceKind};
use fc_sources::{ArxivFetcher, BooksFetcher};
use fc_web::{create_app, AppState};
use tracing::info;

mod config;

use config::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about = "Personalized book and research feed cache", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "FEEDCACHE_ADDR", default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
        /// Preference store backend
        #[arg(long, default_value = "memory")]
        store: String,
    },
    /// Fetch one feed and print it
    Fetch {
        #[arg(long, default_value = "cli")]
        user: String,
        /// Comma-separated book subject codes (e.g. fiction,history)
        #[arg(long, value_delimiter = ',')]
        books: Vec<String>,
        /// Comma-separated arXiv category codes (e.g. cs.AI,cs.LG)
        #[arg(long, value_delimiter = ',')]
        research: Vec<String>,
        /// Print the feed as JSON
        #[arg(long)]
        json: bool,
    },
}

fn build_manager(settings: &Settings) -> anyhow::Result<Arc<CacheManager>> {
    let sources = settings.source_config();
    sources.validate()?;

    let books: Arc<dyn SourceFetcher> = Arc::new(BooksFetcher::new(&sources)?);
    let research: Arc<dyn SourceFetcher> = Arc::new(ArxivFetcher::new(&sources)?);
    info!(
        "🦗 Sources initialized: {} ({}), {} ({})",
        books.name(),
        sources.books_url,
        research.name(),
        sources.arxiv_url
    );

    Ok(Arc::new(CacheManager::new(books, research, settings.cache_config())))
}

fn print_item(item: &FeedItem) {
    let emoji = match item.kind {
        SourceKind::Book => "📚",
        SourceKind::Research => "🔬",
    };
    let published = if item.published.is_empty() { "----" } else { item.published.as_str() };
    println!("{} {} [{}] {}", emoji, published, item.category, item.title);
    if !item.authors.is_empty() {
        println!("     {}", item.authors);
    }
    println!("     {}", item.link);
}

async fn serve(manager: Arc<CacheManager>, addr: SocketAddr, store: &str) -> anyhow::Result<()> {
    let preferences = fc_storage::create_store(store).await?;
    info!("💾 Preference store initialized (using {})", store);

    let app = create_app(AppState::new(manager, preferences)).await;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("✨ Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(level_for(cli.verbose));

    let manager = build_manager(&cli.settings)?;
    info!(
        "🗄️ Feed cache ready (ttl {}s, {} per category)",
        manager.config().ttl.as_secs(),
        manager.config().default_max_results
    );

    match cli.command {
        Commands::Serve { addr, store } => serve(manager, addr, &store).await?,
        Commands::Fetch {
            user,
            books,
            research,
            json,
        } => {
            if books.is_empty() && research.is_empty() {
                anyhow::bail!("pass at least one of --books or --research");
            }
            let items = manager.get_feeds_default(&user, &books, &research).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&*items)?);
            } else {
                println!("Found {} items", items.len());
                for item in items.iter() {
                    print_item(item);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_fetch_command() {
        let cli = Cli::try_parse_from([
            "feedcache",
            "--ttl",
            "5m",
            "fetch",
            "--books",
            "fiction,history",
            "--research",
            "cs.AI",
        ])
        .unwrap();

        assert_eq!(cli.settings.ttl.0, Duration::from_secs(300));
        assert_eq!(cli.settings.cache_config().ttl, Duration::from_secs(300));
        match cli.command {
            Commands::Fetch { books, research, user, json } => {
                assert_eq!(books, vec!["fiction", "history"]);
                assert_eq!(research, vec!["cs.AI"]);
                assert_eq!(user, "cli");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_build_a_manager() {
        let cli = Cli::try_parse_from(["feedcache", "serve"]).unwrap();
        let config = cli.settings.cache_config();
        assert_eq!(config.default_max_results, 10);
        assert!(config.serve_stale_on_failure);
        assert!(build_manager(&cli.settings).is_ok());
    }

    #[test]
    fn test_rejects_bad_ttl() {
        assert!(Cli::try_parse_from(["feedcache", "--ttl", "soon", "serve"]).is_err());
    }
}
