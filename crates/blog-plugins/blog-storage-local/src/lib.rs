//! # blog-storage-local
//!
//! Local filesystem implementation of `MediaStore`.
//! Uploads are content-addressed: the file name is the SHA-256 of the bytes,
//! so re-uploading the same picture reuses the stored file. Every original
//! gets a 250px WebP thumbnail next to it.

use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blog_core::error::MediaError;
use blog_core::traits::MediaStore;
use image::{DynamicImage, ImageFormat, ImageReader};
use sha2::{Digest, Sha256};
use tokio::fs;

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

const UPLOAD_DIR: &str = "posts";
const THUMBNAIL_SIZE: u32 = 250;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./media")
    root_path: PathBuf,
    /// Public URL prefix the root is served under (e.g., "/media")
    url_prefix: String,
}

struct Processed {
    extension: &'static str,
    thumbnail: Vec<u8>,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Resolves a media id below the root, refusing ids that would escape it.
    fn path_for(&self, media_id: &str) -> anyhow::Result<PathBuf> {
        if media_id.starts_with('/') || media_id.split('/').any(|part| part == "..") {
            anyhow::bail!("refusing media id outside the media root: {media_id}");
        }
        Ok(self.root_path.join(media_id))
    }
}

/// "posts/<hash>.png" -> "posts/thumb_<hash>.webp"
fn thumbnail_id(media_id: &str) -> String {
    let (dir, file) = match media_id.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, media_id),
    };
    let stem = file.split_once('.').map_or(file, |(stem, _)| stem);
    match dir {
        Some(dir) => format!("{dir}/thumb_{stem}.webp"),
        None => format!("thumb_{stem}.webp"),
    }
}

/// Decodes the upload and renders its thumbnail. CPU bound.
fn process(data: &[u8]) -> Result<Processed, MediaError> {
    let invalid = || MediaError::InvalidImage(INVALID_IMAGE.to_string());

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| invalid())?;
    let format = reader.format().ok_or_else(invalid)?;
    let img = reader.decode().map_err(|_| invalid())?;
    let extension = format.extensions_str().first().copied().unwrap_or("img");

    // The WebP encoder only takes 8-bit buffers.
    let thumb = DynamicImage::ImageRgba8(img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgba8());
    let mut thumbnail = Vec::new();
    thumb
        .write_to(&mut Cursor::new(&mut thumbnail), ImageFormat::WebP)
        .map_err(|e| MediaError::Storage(e.into()))?;

    Ok(Processed {
        extension,
        thumbnail,
    })
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> Result<String, MediaError> {
        let hash = hex::encode(Sha256::digest(&data));

        let (data, processed) = tokio::task::spawn_blocking(move || {
            let processed = process(&data);
            (data, processed)
        })
        .await
        .map_err(|e| MediaError::Storage(e.into()))?;
        let processed = processed?;

        let media_id = format!("{UPLOAD_DIR}/{hash}.{}", processed.extension);
        let target_path = self.path_for(&media_id)?;
        let thumb_path = self.path_for(&thumbnail_id(&media_id))?;

        fs::create_dir_all(self.root_path.join(UPLOAD_DIR))
            .await
            .map_err(anyhow::Error::from)?;
        if fs::try_exists(&target_path).await.unwrap_or(false) {
            log::debug!("upload {media_id} already stored");
        } else {
            fs::write(&target_path, &data)
                .await
                .map_err(anyhow::Error::from)?;
            fs::write(&thumb_path, &processed.thumbnail)
                .await
                .map_err(anyhow::Error::from)?;
            log::info!("stored {content_type} upload as {media_id}");
        }

        Ok(media_id)
    }

    fn get_url(&self, media_id: &str) -> String {
        format!("{}/{}", self.url_prefix, media_id)
    }

    fn get_thumbnail_url(&self, media_id: &str) -> String {
        format!("{}/{}", self.url_prefix, thumbnail_id(media_id))
    }

    /// Missing files are not an error.
    async fn delete(&self, media_id: &str) -> anyhow::Result<()> {
        for path in [self.path_for(media_id)?, self.path_for(&thumbnail_id(media_id))?] {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
