use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, instrument, warn};
use url::Url;

use super::retry::with_retry;
use crate::{config::RetryPolicy, error::SyncError};

/// Stream `url` into `dest`, replacing whatever is there.
///
/// The body lands in `<dest>.part` first and is renamed over `dest` only once
/// it has been fully written and synced, so a failed download never replaces
/// the last committed file. Returns the number of bytes written.
#[instrument(level = "info", skip_all, fields(url = %url, dest = %dest.display()))]
pub async fn download_to(
    client: &Client,
    url: &Url,
    dest: &Path,
    policy: RetryPolicy,
) -> Result<u64, SyncError> {
    let bytes = with_retry(policy, url.as_str(), || stream_to_file(client, url, dest))
        .await
        .map_err(|e| SyncError::DownloadFailed {
            url: url.to_string(),
            reason: format!("{e:#}"),
        })?;

    info!(bytes, "downloaded timetable");
    Ok(bytes)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

async fn stream_to_file(client: &Client, url: &Url, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let part = part_path(dest);
    match write_body(client, url, &part).await {
        Ok(written) => {
            fs::rename(&part, dest).await.with_context(|| {
                format!("renaming {} to {}", part.display(), dest.display())
            })?;
            Ok(written)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %part.display(), error = %rm, "could not remove partial download");
                }
            }
            Err(e)
        }
    }
}

async fn write_body(client: &Client, url: &Url, part: &Path) -> Result<u64> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?;

    let mut file = fs::File::create(part)
        .await
        .with_context(|| format!("creating {}", part.display()))?;

    let mut written = 0u64;
    let mut body = resp.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.with_context(|| format!("reading body from {}", url))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    // the stream is only done once the data is on disk
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
