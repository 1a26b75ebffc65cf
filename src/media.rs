use std::{
    io::ErrorKind,
    path::{Component, Path},
};

use rand::{distributions::Alphanumeric, Rng};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{data_formats::UploadedImage, errors::RequestError};

const ARTICLE_IMAGE_DIR: &str = "articles";
const FILE_STEM_LENGTH: usize = 16;

fn random_file_stem() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FILE_STEM_LENGTH)
        .map(char::from)
        .collect()
}

fn is_contained(relative: &str) -> bool {
    let path = Path::new(relative);
    !relative.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Writes the upload under the media root and returns its path relative to
/// that root, which is what the `articles.image` column stores.
pub async fn save_image(media_root: &Path, image: &UploadedImage) -> Result<String, RequestError> {
    let extension = image
        .extension()
        .ok_or(RequestError::BadRequest("Unsupported image type"))?;
    let relative = format!("{ARTICLE_IMAGE_DIR}/{}.{extension}", random_file_stem());
    let destination = media_root.join(&relative);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&destination, &image.bytes).await?;
    debug!("Stored {} ({} bytes)", relative, image.bytes.len());
    Ok(relative)
}

/// Removes a stored media file. Missing files and paths leaving the media
/// root are logged and skipped.
pub async fn clean_up_files(media_root: &Path, relative: &str) {
    if !is_contained(relative) {
        warn!("Refusing to remove {:?} outside the media root", relative);
        return;
    }
    match fs::remove_file(media_root.join(relative)).await {
        Ok(()) => info!("Removed {}", relative),
        Err(e) if e.kind() == ErrorKind::NotFound => debug!("{} was already gone", relative),
        Err(e) => warn!("Failed to remove {}: {}", relative, e),
    }
}

/// Removes a just saved upload when the write that should reference it
/// failed, then hands the result back.
pub async fn discard_on_error<T>(
    media_root: &Path,
    saved: Option<&str>,
    result: Result<T, RequestError>,
) -> Result<T, RequestError> {
    if let (Err(e), Some(relative)) = (&result, saved) {
        warn!("Discarding {} after a failed save: {}", relative, e);
        clean_up_files(media_root, relative).await;
    }
    result
}
