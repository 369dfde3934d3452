//! `ccd-bench`: a standalone harness driving the Client Cache & Dispatcher
//! against a running (or embedded) SPC, standing in for the mobile client
//! (out of scope for this crate; see the UI collaborator contract in §6).
//!
//! Exercises, in order: a cold dispatch, a warm tier-1 hit, concurrent
//! coalescing on a cold key, a cancelled-then-superseding dispatch pair, and
//! a bounded full prefetch sweep — printing timings and tier-hit outcomes
//! rather than asserting on them, since this is a human-facing bench rather
//! than a test.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use facecache::ccd::client::SpcClient;
use facecache::ccd::memory_tier::MemoryTier;
use facecache::ccd::persistent_tier::PersistentTier;
use facecache::ccd::{Ccd, PrefetchPlanner, RunEditorOptions};
use facecache::config::Config;
use facecache::contracts::ReplicateRequest;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    facecache::tracing::init_tracing();

    let config = Config::from_env().context("loading configuration")?;
    let spc_base_url = std::env::var("SPC_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
    let image_url = std::env::var("BENCH_IMAGE_URL").unwrap_or_else(|_| "https://example.com/face.jpg".to_string());

    let persistent_path = std::env::temp_dir().join(format!("ccd-bench-{}", std::process::id()));
    let ccd = Arc::new(Ccd::new(
        MemoryTier::new(),
        PersistentTier::open(&persistent_path)?,
        SpcClient::new(spc_base_url),
        config.clone(),
    ));

    let mut base = ReplicateRequest::new(image_url);
    base.smile = Some(0.2);

    cold_then_warm_dispatch(&ccd, base.clone()).await;
    concurrent_coalescing(&ccd, base.clone()).await;
    cancellation_race(&ccd, base.clone()).await;
    bounded_full_sweep(&ccd, &config, base).await;

    Ok(())
}

async fn cold_then_warm_dispatch(ccd: &Arc<Ccd>, params: ReplicateRequest) {
    let options = RunEditorOptions::default();

    let start = Instant::now();
    let cold = ccd.run_editor(params.clone(), options).await;
    println!("cold dispatch: {:?} in {:?}", cold.map(|o| o.url), start.elapsed());

    let start = Instant::now();
    let warm = ccd.run_editor(params, options).await;
    println!("warm dispatch (tier-1 expected): {:?} in {:?}", warm.map(|o| o.url), start.elapsed());
}

async fn concurrent_coalescing(ccd: &Arc<Ccd>, mut params: ReplicateRequest) {
    params.smile = Some(-0.1);
    let options = RunEditorOptions { cancel_previous: false, skip_cache: true };

    let mut handles = Vec::new();
    for _ in 0..4 {
        let ccd = ccd.clone();
        let params = params.clone();
        handles.push(tokio::spawn(async move { ccd.run_editor(params, options).await }));
    }

    let mut urls = Vec::new();
    for handle in handles {
        if let Ok(Ok(outcome)) = handle.await {
            urls.push(outcome.url);
        }
    }
    println!("4 concurrent callers on a cold key resolved to: {urls:?}");
}

async fn cancellation_race(ccd: &Arc<Ccd>, mut params: ReplicateRequest) {
    params.smile = Some(0.9);
    let first = {
        let ccd = ccd.clone();
        let mut p1 = params.clone();
        p1.rotate_yaw = Some(3.0);
        tokio::spawn(async move {
            ccd.run_editor(p1, RunEditorOptions { cancel_previous: true, skip_cache: true }).await
        })
    };

    tokio::time::sleep(Duration::from_millis(5)).await;

    let mut p2 = params;
    p2.rotate_yaw = Some(-3.0);
    let second = ccd.run_editor(p2, RunEditorOptions { cancel_previous: true, skip_cache: true }).await;

    println!("superseding dispatch resolved to: {:?}", second.map(|o| o.url));
    match first.await {
        Ok(Ok(outcome)) => println!("superseded dispatch still completed, applied={}", outcome.applied),
        Ok(Err(err)) => println!("superseded dispatch observed: {err}"),
        Err(err) => println!("superseded dispatch task join error: {err}"),
    }
}

async fn bounded_full_sweep(ccd: &Arc<Ccd>, config: &Arc<Config>, base: ReplicateRequest) {
    let planner = PrefetchPlanner::new(ccd.clone(), config.max_concurrent_requests, None);
    let start = Instant::now();
    planner.full_sweep(base, config.num_buckets, &["smile", "blink"]).await;
    println!("full sweep completed in {:?}", start.elapsed());
}
