use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use nh_core::config::{Config, Routing, StorageKind};
use nh_core::logging::init_logging;
use nh_core::{category_param, HeadlineQuery, NewsProvider, TOP_STORIES};
use nh_feed::{DisplayMode, FeedController};
use nh_inference::models::{create_model, AVAILABLE_MODELS};
use nh_news::{NewsApiClient, SearchQuery};
use nh_storage::create_storage;
use nh_web::AppState;

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "NewsHub: headlines with summaries and sentiment", long_about = None)]
pub struct Cli {
    /// Route provider calls through a NewsHub server instead of calling them directly
    #[arg(long, global = true)]
    proxy: Option<String>,
    #[arg(
        long,
        global = true,
        default_value = "openrouter",
        help = "Model used for summaries and sentiment. Available models: openrouter (default), dummy"
    )]
    model: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server with the proxy, saved-article and preference routes
    Serve {
        #[arg(long)]
        bind: Option<String>,
        /// memory or sqlite
        #[arg(long)]
        storage: Option<StorageKind>,
        #[arg(long)]
        database_url: Option<String>,
    },
    /// Load a category, enrich it and print the accumulated list
    Feed {
        #[arg(long, default_value = TOP_STORIES)]
        category: String,
        /// Initial page plus this many minus one "load more" cycles
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        summarized: bool,
    },
    /// Print one raw page of top headlines
    Headlines {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        country: Option<String>,
    },
    /// Keyword search across all articles
    Search {
        query: String,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to read configuration")?;
    if let Some(base_url) = &cli.proxy {
        config.routing = Routing::Proxy {
            base_url: base_url.trim_end_matches('/').to_string(),
        };
    }

    match cli.command {
        Commands::Serve {
            bind,
            storage,
            database_url,
        } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(storage) = storage {
                config.storage = storage;
            }
            if let Some(database_url) = database_url {
                config.database_url = database_url;
            }
            if config.news_api_key.is_none() {
                warn!("NEWS_API_KEY not set, /api/news will answer with an error");
            }
            if config.openrouter_api_key.is_none() {
                warn!("OPENROUTER_API_KEY not set, /api/openrouter will answer with an error");
            }

            let storage = create_storage(config.storage, &config.database_url).await?;
            info!("💾 Storage initialized successfully (using {})", config.storage);
            let bind = config.bind.clone();
            let state = AppState::new(config, storage)?;
            nh_web::serve(state, &bind).await?;
        }
        Commands::Feed {
            category,
            pages,
            page_size,
            summarized,
        } => {
            let news = Arc::new(NewsApiClient::new(&config)?);
            let inference = create_model(&config, &cli.model).with_context(|| {
                format!(
                    "Failed to initialise the {} model (available: {}; set OPENROUTER_API_KEY or use --model dummy)",
                    cli.model,
                    AVAILABLE_MODELS.join(", ")
                )
            })?;
            info!("🧠 Inference model initialized successfully (using {})", inference.name());

            let mut feed = FeedController::new(news, inference, page_size.unwrap_or(config.page_size))
                .with_country(config.country.clone());
            if summarized {
                feed.toggle_display_mode();
            }

            feed.select_category(&category).await;
            for _ in 1..pages {
                if !feed.has_more() {
                    info!("No more articles for {}", category);
                    break;
                }
                feed.load_more().await?;
            }

            if let Some(error) = feed.error() {
                eprintln!("⚠️ {}", error);
            }
            for article in feed.articles() {
                println!("{}\n", render::enriched(article, feed.display_mode()));
            }
            if feed.display_mode() == DisplayMode::Summarized {
                println!("{} articles", feed.articles().len());
            }
        }
        Commands::Headlines {
            category,
            page,
            page_size,
            country,
        } => {
            let news = NewsApiClient::new(&config)?;
            let query = HeadlineQuery::new(
                category.as_deref().and_then(category_param),
                page,
                page_size.unwrap_or(config.page_size),
                country.unwrap_or_else(|| config.country.clone()),
            )?;
            info!("📰 Fetching headlines from {}", news.name());
            let response = news.fetch_headlines(&query).await?;
            println!("{}", render::headlines(&response));
        }
        Commands::Search {
            query,
            from,
            to,
            page_size,
        } => {
            let news = NewsApiClient::new(&config)?;
            let search = SearchQuery::new(query, page_size)?.between(from, to);
            info!("🔎 Searching for {:?}", search.query);
            let response = news.search(&search).await?;
            println!("{}", render::headlines(&response));
        }
    }

    Ok(())
}
