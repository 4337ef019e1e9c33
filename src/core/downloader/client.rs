use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{SwitcherError, SwitcherResult};

/// Receives download progress as a fraction in `0.0..=1.0`.
pub type ProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

/// A single file to download with optional SHA-1 for validation.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
}

/// Outcome of a batch. Failed items do not stop the batch; cancellation does.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<PathBuf>,
    pub failed: Vec<(DownloadEntry, SwitcherError)>,
    pub cancelled: bool,
}

/// Streaming, SHA-1 validated downloader.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    // ── Single file download ────────────────────────────

    /// Download `url` to `dest`, optionally validating SHA-1.
    ///
    /// Bytes go to a uniquely named `.part` file next to `dest`, which
    /// replaces `dest` only once everything checked out. The part file is
    /// removed on any failure, including cancellation.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
        on_progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> SwitcherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SwitcherError::io(parent, e))?;
        }

        let part = part_path(dest);
        let result = self
            .stream_to_file(url, &part, sha1_expected, on_progress, cancel)
            .await;

        if let Err(e) = result {
            if let Err(rm) = tokio::fs::remove_file(&part).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial download {:?}: {}", part, rm);
                }
            }
            return Err(match e {
                SwitcherError::HashMismatch {
                    expected, actual, ..
                } => SwitcherError::HashMismatch {
                    path: dest.to_path_buf(),
                    expected,
                    actual,
                },
                other => other,
            });
        }

        tokio::fs::rename(&part, dest)
            .await
            .map_err(|e| SwitcherError::io(dest, e))?;

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    async fn stream_to_file(
        &self,
        url: &str,
        part: &Path,
        sha1_expected: Option<&str>,
        on_progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> SwitcherResult<()> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SwitcherError::Cancelled(url.to_string())),
            response = self.client.get(url).send() => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(SwitcherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total_bytes = response.content_length().filter(|t| *t > 0);
        let mut stream = response.bytes_stream();
        let mut hasher = Sha1::new();
        let mut read: u64 = 0;

        // Scoped so the handle is closed before the rename.
        {
            let mut file = tokio::fs::File::create(part)
                .await
                .map_err(|e| SwitcherError::io(part, e))?;

            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(SwitcherError::Cancelled(url.to_string())),
                    next = stream.next() => next,
                };
                let Some(chunk) = next else { break };
                let chunk = chunk?;

                file.write_all(&chunk)
                    .await
                    .map_err(|e| SwitcherError::io(part, e))?;
                hasher.update(&chunk);
                read += chunk.len() as u64;

                if let Some(total) = total_bytes {
                    on_progress((read as f64 / total as f64).min(1.0));
                }
            }

            file.flush().await.map_err(|e| SwitcherError::io(part, e))?;
        }

        if let Some(expected) = sha1_expected {
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(SwitcherError::HashMismatch {
                    path: part.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        on_progress(1.0);
        Ok(())
    }

    // ── Batch downloads ─────────────────────────────────

    /// Downloads `entries` one after another. Progress is cumulative over
    /// the whole batch: `(completed + current) / total`.
    pub async fn download_batch(
        &self,
        entries: &[DownloadEntry],
        on_progress: ProgressFn<'_>,
        cancel: &CancellationToken,
    ) -> BatchReport {
        info!("Starting batch download: {} files", entries.len());

        let total = entries.len().max(1) as f64;
        let mut report = BatchReport::default();

        for (index, entry) in entries.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let done = index as f64;
            let item_progress = move |p: f64| on_progress((done + p) / total);
            let result = self
                .download_file(
                    &entry.url,
                    &entry.dest,
                    entry.sha1.as_deref(),
                    &item_progress,
                    cancel,
                )
                .await;

            match result {
                Ok(()) => report.completed.push(entry.dest.clone()),
                Err(SwitcherError::Cancelled(_)) => {
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    warn!("Failed to download {}: {}", entry.url, e);
                    report.failed.push((entry.clone(), e));
                }
            }
            on_progress((done + 1.0) / total);
        }

        info!(
            "Batch finished: {} ok, {} failed{}",
            report.completed.len(),
            report.failed.len(),
            if report.cancelled { ", cancelled" } else { "" }
        );
        report
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    dest.with_file_name(format!("{name}.{}.part", Uuid::new_v4()))
}
