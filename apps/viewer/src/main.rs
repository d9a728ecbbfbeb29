use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use url::Url;
use viewer_core::{
    http::{HttpFactSource, HttpImageSource},
    CatViewer, LogMonitor,
};

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the cat-fact API.
    #[arg(long)]
    fact_url: Option<String>,
    /// Base URL of the cat-image API.
    #[arg(long)]
    image_url: Option<String>,
    /// Re-fetch every N seconds until interrupted.
    #[arg(long)]
    refresh_secs: Option<u64>,
}

fn apply_args(settings: &mut Settings, args: &Args) {
    if let Some(v) = &args.fact_url {
        settings.fact_api_url = v.clone();
    }
    if let Some(v) = &args.image_url {
        settings.image_api_url = v.clone();
    }
    if let Some(v) = args.refresh_secs {
        settings.refresh_interval_secs = Some(v);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let mut settings = load_settings();
    apply_args(&mut settings, &args);
    tracing::info!(
        fact_api = %settings.fact_api_url,
        image_api = %settings.image_api_url,
        "starting cat viewer"
    );

    let fact_base = Url::parse(&settings.fact_api_url)
        .with_context(|| format!("invalid fact API url: {}", settings.fact_api_url))?;
    let image_base = Url::parse(&settings.image_api_url)
        .with_context(|| format!("invalid image API url: {}", settings.image_api_url))?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .context("failed to build http client")?;

    let viewer = CatViewer::new(
        Arc::new(HttpFactSource::new(http.clone(), fact_base)),
        Arc::new(HttpImageSource::new(http, image_base)),
        Arc::new(LogMonitor),
    );

    spawn_observers(&viewer).await;

    viewer.start_fetch().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    match settings.refresh_interval_secs {
        Some(secs) => {
            let mut ticker = tokio::time::interval(Duration::from_secs(secs.max(1)));
            // The first tick fires immediately; the initial fetch above
            // already covers it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    result = &mut shutdown => {
                        result.context("failed to listen for ctrl-c")?;
                        break;
                    }
                    _ = ticker.tick() => viewer.start_fetch().await,
                }
            }
        }
        None => {
            shutdown.await.context("failed to listen for ctrl-c")?;
        }
    }

    viewer.shutdown().await;
    Ok(())
}

async fn spawn_observers(viewer: &Arc<CatViewer>) {
    let mut states = WatchStream::new(viewer.subscribe_state());
    tokio::spawn(async move {
        while let Some(snapshot) = states.next().await {
            println!(
                "fact: {} | image: {}",
                snapshot.fact.as_deref().unwrap_or("<none>"),
                snapshot.image_url.as_deref().unwrap_or("<none>")
            );
        }
    });

    let mut connectivity = viewer.subscribe_connectivity_errors().await;
    tokio::spawn(async move {
        while connectivity.recv().await.is_some() {
            println!("error: failed to connect to server");
        }
    });

    let mut messages = viewer.subscribe_error_messages().await;
    tokio::spawn(async move {
        while let Some(message) = messages.recv().await {
            println!("error: {message}");
        }
    });
}
