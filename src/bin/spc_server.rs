//! `spc-server`: boots the Server Proxy & Cache over HTTP (§4.4, §6).
//!
//! Bind a listener, build a `Router`, register routes, hand both to `serve`.
//! Model and blob credentials are read directly from the environment rather
//! than folded into `Config`, so they never flow through the general
//! config-loading path or show up in its `Debug`/tracing output.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;

use facecache::config::Config;
use facecache::spc::blob_tier::FsBlobStore;
use facecache::spc::kv_tier::KvTier;
use facecache::spc::model_client::ReplicateLikeClient;
use facecache::spc::{handler, Spc};

#[tokio::main]
async fn main() -> Result<()> {
    facecache::tracing::init_tracing();

    let config = Config::from_env().context("loading configuration")?;

    let model_base_url = std::env::var("MODEL_BASE_URL")
        .unwrap_or_else(|_| "https://api.replicate.com/v1".to_string());
    let model_api_token = std::env::var("MODEL_API_TOKEN").context("MODEL_API_TOKEN must be set")?;

    let kv = KvTier::new(100_000, std::time::Duration::from_secs(3600));
    let blob = Box::new(FsBlobStore::new(
        std::path::PathBuf::from(&config.blob_root),
        config.blob_public_base_url.clone(),
    ));
    let model = Box::new(ReplicateLikeClient::new(model_base_url, model_api_token));

    let spc = Spc::new(config.clone(), kv, blob, model);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = TcpListener::bind(&bind_addr).await.with_context(|| format!("binding {bind_addr}"))?;

    let mut router = facecache::router::Router::new();
    handler::register(&mut router, spc);

    facecache::serve(listener, router).await;

    Ok(())
}
