//! Prefetch sweep planning and dispatch (§4.3.3).
//!
//! A full sweep is the Cartesian product of the three rotation axes'
//! quantized endpoints, plus a 1-D sweep of the current control group's
//! axes at their endpoints with everything else held at `base`. A focused
//! sweep is just the latter, re-issued as the user changes controls. Both
//! share one `is_in_progress` flag: a second sweep started while one is
//! running is a no-op, and both share the CCD's `InflightRegistry` with the
//! interactive path so duplicate payloads coalesce instead of double-firing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::contracts::ReplicateRequest;
use crate::params::{Axis, ALL_AXES, ROTATION_AXES};

use super::dispatch::{Ccd, RunEditorOptions};
use super::image_prefetch::ImagePrefetchWorker;

pub struct PrefetchPlanner {
    ccd: Arc<Ccd>,
    in_progress: AtomicBool,
    max_concurrent: usize,
    image_prefetch: Option<ImagePrefetchWorker>,
}

impl PrefetchPlanner {
    pub fn new(ccd: Arc<Ccd>, max_concurrent: usize, image_prefetch: Option<ImagePrefetchWorker>) -> Self {
        Self { ccd, in_progress: AtomicBool::new(false), max_concurrent, image_prefetch }
    }

    /// Runs the full sweep. No-op (logged, not an error) if a sweep is
    /// already running. Every URL returned by the sweep is additionally
    /// enqueued onto the image prefetch worker (§4.3.3, §6).
    pub async fn full_sweep(&self, base: ReplicateRequest, num_buckets: u32, control_axes: &[&'static str]) {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            tracing::debug!("caching in progress; full sweep skipped");
            return;
        }

        let payloads = plan_full_sweep(&base, num_buckets, control_axes);
        tracing::debug!(count = payloads.len(), "starting full prefetch sweep");
        self.dispatch_all(payloads, true).await;

        self.in_progress.store(false, Ordering::SeqCst);
    }

    /// Runs a focused, 1-D sweep along `control_axes` with everything else
    /// frozen at `base`'s values. No-op if a sweep is already running.
    pub async fn focused_sweep(&self, base: ReplicateRequest, num_buckets: u32, control_axes: &[&'static str]) {
        if self.in_progress.swap(true, Ordering::SeqCst) {
            tracing::debug!("caching in progress; focused sweep skipped");
            return;
        }

        let payloads = plan_axis_sweep(&base, num_buckets, control_axes);
        tracing::debug!(count = payloads.len(), "starting focused prefetch sweep");
        self.dispatch_all(payloads, false).await;

        self.in_progress.store(false, Ordering::SeqCst);
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    async fn dispatch_all(&self, payloads: Vec<ReplicateRequest>, enqueue_images: bool) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent.max(1)));
        let mut tasks = Vec::with_capacity(payloads.len());

        for payload in payloads {
            let semaphore = semaphore.clone();
            let ccd = self.ccd.clone();
            let image_prefetch = if enqueue_images { self.image_prefetch.clone() } else { None };
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closes");
                // `cancel_previous: false` keeps every sweep payload off the
                // interactive path's shared cancellation slot entirely (see
                // `Generation`'s module docs), so a sweep can never be cut
                // short by an unrelated ad-hoc edit, and vice versa.
                let options = RunEditorOptions { cancel_previous: false, skip_cache: false };
                match ccd.run_editor(payload, options).await {
                    Ok(outcome) => {
                        if let Some(worker) = &image_prefetch {
                            worker.enqueue(outcome.url);
                        }
                    }
                    Err(err) => tracing::debug!(%err, "prefetch payload failed"),
                }
            }));
        }

        for task in tasks {
            let _ = task.await;
        }
    }
}

fn plan_full_sweep(base: &ReplicateRequest, num_buckets: u32, control_axes: &[&'static str]) -> Vec<ReplicateRequest> {
    let mut payloads = Vec::new();

    let endpoints: Vec<Vec<f64>> = ROTATION_AXES.iter().map(|axis| axis.endpoints(num_buckets)).collect();
    for pitch in &endpoints[0] {
        for yaw in &endpoints[1] {
            for roll in &endpoints[2] {
                let mut payload = base.clone();
                ROTATION_AXES[0].set(&mut payload, Some(*pitch));
                ROTATION_AXES[1].set(&mut payload, Some(*yaw));
                ROTATION_AXES[2].set(&mut payload, Some(*roll));
                payloads.push(payload);
            }
        }
    }

    payloads.extend(plan_axis_sweep(base, num_buckets, control_axes));
    payloads
}

fn plan_axis_sweep(base: &ReplicateRequest, num_buckets: u32, axes: &[&'static str]) -> Vec<ReplicateRequest> {
    let selected: Vec<&Axis> = ALL_AXES.iter().filter(|axis| axes.contains(&axis.name)).collect();

    let mut payloads = Vec::new();
    for axis in selected {
        for endpoint in axis.endpoints(num_buckets) {
            let mut payload = base.clone();
            axis.set(&mut payload, Some(endpoint));
            payloads.push(payload);
        }
    }
    payloads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sweep_size_matches_cartesian_product_plus_control_group() {
        let base = ReplicateRequest::new("https://x/a.jpg".to_string());
        let num_buckets = 6;
        let payloads = plan_full_sweep(&base, num_buckets, &["smile", "blink"]);

        let cartesian = (num_buckets as usize + 1).pow(3);
        let control = 2 * (num_buckets as usize + 1);
        assert_eq!(payloads.len(), cartesian + control);
    }

    #[test]
    fn axis_sweep_covers_every_endpoint_of_the_selected_axes() {
        let base = ReplicateRequest::new("https://x/a.jpg".to_string());
        let payloads = plan_axis_sweep(&base, 6, &["smile"]);
        assert_eq!(payloads.len(), 7);
        for payload in &payloads {
            assert!(payload.smile.is_some());
            assert!(payload.blink.is_none());
        }
    }

    #[test]
    fn empty_control_group_sweeps_only_the_rotation_cartesian_product() {
        let base = ReplicateRequest::new("https://x/a.jpg".to_string());
        let payloads = plan_full_sweep(&base, 6, &[]);
        assert_eq!(payloads.len(), 7_usize.pow(3));
    }
}
