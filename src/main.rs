use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use storerank::{
    config, generate_stopwords, Config, Recommender, RestApi, SegmentingTokenizer, Tokenizer,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Recommends stores for a free-text query
#[derive(Parser, Debug)]
#[command(name = "storerank")]
#[command(about = "Rank stores against a natural-language query", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog CSV, overrides `catalog.path`
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Result cache directory, overrides `cache.dir`
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the top stores for one query as JSON
    Recommend {
        query: String,

        /// Show which tokens matched for every store (bypasses the cache read)
        #[arg(long)]
        explain: bool,
    },
    /// Run the HTTP API
    Serve {
        /// Overrides `service.http_bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Derive a stopword list from a corpus, one document per line
    Stopwords {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    if let Some(catalog) = &args.catalog {
        cfg.catalog.path = catalog.clone();
    }
    if let Some(dir) = &args.cache_dir {
        cfg.cache.dir = dir.clone();
    }
    config::validate(&cfg)?;
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &args.command {
        Command::Recommend { query, explain } => {
            let cfg = load_config(&args)?;
            let recommender = Recommender::from_config(&cfg)?;
            let recommendation = if *explain {
                recommender.recommend_explained(query)
            } else {
                recommender.recommend(query)
            };
            match recommendation {
                Ok(recommendation) => {
                    println!("{}", serde_json::to_string_pretty(&recommendation)?);
                }
                Err(e @ storerank::Error::InvalidQuery) => {
                    anyhow::bail!("invalid query: {}", e);
                }
                Err(e @ storerank::Error::CatalogUnavailable { .. }) => {
                    anyhow::bail!("catalog unavailable ({}): {}", cfg.catalog.path.display(), e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Serve { bind } => {
            let cfg = load_config(&args)?;
            let bind = bind.clone().unwrap_or_else(|| cfg.service.http_bind.clone());

            info!("Starting storerank v{}", env!("CARGO_PKG_VERSION"));
            info!("Catalog: {:?}", cfg.catalog.path);
            info!("Cache: {:?} ({:?})", cfg.cache.dir, cfg.cache.backend);

            let recommender = Arc::new(Recommender::from_config(&cfg)?);
            let sys = actix_web::rt::System::new();
            sys.block_on(RestApi::start(recommender.clone(), &bind))
                .with_context(|| format!("HTTP server on {}", bind))?;
            info!("HTTP server stopped");
            // the recommender may own a blocking HTTP client; release it
            // outside the async runtime
            drop(recommender);
        }
        Command::Stopwords { input } => {
            let raw = fs::read_to_string(input)
                .with_context(|| format!("reading corpus {}", input.display()))?;
            let tokenizer = SegmentingTokenizer::default();
            let documents = raw.lines().map(|line| tokenizer.nouns(line));
            for word in generate_stopwords(documents) {
                println!("{}", word);
            }
        }
    }

    Ok(())
}
