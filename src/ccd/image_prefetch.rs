//! On-device image prefetch worker (§4.3.3, §6 "image prefetch subsystem
//! accepting a URL and a cache policy").
//!
//! Full-sweep hits enqueue their artifact URL here instead of downloading
//! inline: a bounded channel plus a small fixed pool of downloader tasks
//! caps how much sweep traffic hammers the network at once, independent of
//! the sweep's own `MAX_CONCURRENT_REQUESTS` limiter. The queue is
//! best-effort — a full channel drops the newest URL rather than blocking
//! the caller, since a later `runEditor` hit will just re-populate it.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

#[derive(Clone)]
pub struct ImagePrefetchWorker {
    sender: mpsc::Sender<String>,
}

impl ImagePrefetchWorker {
    /// Spawns `workers` downloader tasks sharing one bounded queue of
    /// `queue_capacity` pending URLs, writing fetched bytes under `root`.
    pub fn spawn(root: PathBuf, workers: usize, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let client = reqwest::Client::new();

        for _ in 0..workers.max(1) {
            let receiver = receiver.clone();
            let client = client.clone();
            let root = root.clone();
            tokio::spawn(async move {
                loop {
                    let url = {
                        let mut guard = receiver.lock().await;
                        guard.recv().await
                    };
                    match url {
                        Some(url) => download_one(&client, &root, &url).await,
                        None => break,
                    }
                }
            });
        }

        Self { sender }
    }

    /// Enqueues `url` for background download. Drops silently if the queue
    /// is full; prefetching is never allowed to apply backpressure to the
    /// interactive path.
    pub fn enqueue(&self, url: String) {
        if self.sender.try_send(url).is_err() {
            tracing::debug!("image prefetch queue full, dropping enqueue");
        }
    }
}

async fn download_one(client: &reqwest::Client, root: &std::path::Path, url: &str) {
    let bytes = match client.get(url).send().await {
        Ok(response) => match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(%err, url, "image prefetch body read failed");
                return;
            }
        },
        Err(err) => {
            tracing::debug!(%err, url, "image prefetch download failed");
            return;
        }
    };

    let file_name = url.rsplit('/').next().unwrap_or("artifact");
    let path = root.join(sanitize_file_name(file_name));

    if let Err(err) = tokio::fs::create_dir_all(root).await {
        tracing::debug!(%err, "image prefetch disk cache dir creation failed");
        return;
    }

    if let Err(err) = tokio::fs::write(&path, &bytes).await {
        tracing::debug!(%err, path = %path.display(), "image prefetch disk write failed");
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap().as_nanos();
        dir.push(format!("facecache-image-prefetch-{name}-{nanos}"));
        dir
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("a b/c.webp"), "a_b_c.webp");
    }

    #[tokio::test]
    async fn enqueue_on_a_full_queue_does_not_panic_or_block() {
        let worker = ImagePrefetchWorker::spawn(tmp_dir("full-queue"), 1, 1);
        for i in 0..10 {
            worker.enqueue(format!("https://example.invalid/{i}.webp"));
        }
    }
}
