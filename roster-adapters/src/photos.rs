//! HTTP photo uploader with a content-addressed asset directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use roster_core::AssetRef;
use roster_sync::{CollaboratorError, PhotoUploader};

use crate::error::{http_err, io_err, AdapterError};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Default download size cap: 10 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Downloads a photo and stores it as `image-<sha256>.<ext>` under the asset
/// directory. The returned reference is `image-<sha256>-<ext>`.
#[derive(Debug, Clone)]
pub struct HttpPhotoUploader {
    assets_dir: PathBuf,
    max_bytes: u64,
}

/// File extension for an image content type, e.g. `image/jpeg` -> `jpg`.
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "img",
    }
}

impl HttpPhotoUploader {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    fn download(&self, url: &str) -> Result<(Vec<u8>, &'static str), AdapterError> {
        let agent = ureq::AgentBuilder::new().timeout(DOWNLOAD_TIMEOUT).build();
        let response = agent.get(url).call().map_err(|e| http_err(url, e))?;

        let content_type = response.content_type().to_string();
        if !content_type.to_ascii_lowercase().starts_with("image/") {
            return Err(AdapterError::NotAnImage {
                url: url.to_string(),
                content_type,
            });
        }

        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| AdapterError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(AdapterError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }
        Ok((bytes, extension_for(&content_type)))
    }

    fn store(&self, bytes: &[u8], ext: &str) -> Result<AssetRef, AdapterError> {
        let digest = {
            let mut h = Sha256::new();
            h.update(bytes);
            hex::encode(h.finalize())
        };
        std::fs::create_dir_all(&self.assets_dir).map_err(|e| io_err(&self.assets_dir, e))?;

        let path = self.assets_dir.join(format!("image-{digest}.{ext}"));
        // Same bytes, same name: nothing to rewrite.
        if !path.exists() {
            let tmp = path.with_extension(format!("{ext}.tmp"));
            std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
            std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        }
        Ok(AssetRef::from(format!("image-{digest}-{ext}")))
    }

    fn upload_blocking(&self, url: &str) -> Result<AssetRef, AdapterError> {
        let (bytes, ext) = self.download(url)?;
        self.store(&bytes, ext)
    }
}

#[async_trait]
impl PhotoUploader for HttpPhotoUploader {
    async fn upload(&self, url: &str) -> Result<AssetRef, CollaboratorError> {
        let this = self.clone();
        let url = url.to_string();
        let asset = tokio::task::spawn_blocking(move || this.upload_blocking(&url))
            .await
            .map_err(|e| AdapterError::Task(e.to_string()))??;
        Ok(asset)
    }
}
