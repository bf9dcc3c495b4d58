use anyhow::{Context, Result};
use clap::Parser;
use feed2nostr::config::{Cli, Config};
use feed2nostr::feed::{http::HttpFeed, FeedSource};
use feed2nostr::nostr::{NotePublisher, RelayPublisher, WsRelay};
use feed2nostr::pipeline::{ItemOutcome, Pipeline};
use feed2nostr::store::{PgStore, SeenStore};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Real env vars take precedence over .env
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.show_version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed2nostr=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli)?;

    let store = PgStore::connect(config.dsn.as_deref())
        .await
        .context("failed to open database")?;
    store
        .ensure_schema()
        .await
        .context("failed to create table")?;

    let items = HttpFeed::new()?
        .fetch(&config.feed_url)
        .await
        .with_context(|| format!("failed to fetch {}", config.feed_url))?;
    tracing::debug!(feed = %config.feed_url, count = items.len(), "fetched feed");

    let publisher = match (&config.keys, config.dry_run) {
        (Some(keys), false) => Some(RelayPublisher::new(
            keys.clone(),
            config.relays.clone(),
            WsRelay::default(),
        )),
        _ => None,
    };

    let pipeline = Pipeline::new(
        &config,
        &store,
        publisher.as_ref().map(|p| p as &dyn NotePublisher),
    );
    let report = pipeline.run(&items).await;

    tracing::debug!(
        published = report.count(ItemOutcome::Published),
        failed = report.count(ItemOutcome::PublishFailed),
        seen = report.count(ItemOutcome::AlreadySeen),
        "run finished"
    );
    Ok(())
}
