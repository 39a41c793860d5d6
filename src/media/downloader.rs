use std::path::{Path, PathBuf};

use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, info};
use url::Url;

use super::IdGenerator;
use crate::crawler::FetchError;

/// Downloads product images into a local directory
pub struct ImageDownloader {
    client: Client,
    directory: PathBuf,
    names: IdGenerator,
}

impl ImageDownloader {
    pub fn new(client: Client, directory: impl Into<PathBuf>) -> Self {
        Self {
            client,
            directory: directory.into(),
            names: IdGenerator::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Fetches `image_url` and writes it under the download directory
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the image was written
    /// * `Err(FetchError)` - Non-2xx status, network failure or write failure
    pub async fn download(&mut self, image_url: &str) -> Result<PathBuf, FetchError> {
        let parsed =
            Url::parse(image_url).map_err(|e| FetchError::InvalidUrl(format!("{image_url}: {e}")))?;

        let response = self.client.get(parsed.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: image_url.to_string(),
                status: status.as_u16(),
            });
        }

        let extension = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(extension_for_content_type)
            .unwrap_or("img");
        let bytes = response.bytes().await?;

        let file_name = file_name_for(&parsed, extension, &mut self.names);
        tokio::fs::create_dir_all(&self.directory).await?;
        let path = self.free_path(&file_name).await?;
        tokio::fs::write(&path, &bytes).await?;

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        info!("Downloaded image {}", image_url);
        Ok(path)
    }

    /// First path under the download directory not taken yet: `file_name`, then
    /// `stem-2.ext`, `stem-3.ext` and so on
    async fn free_path(&mut self, file_name: &str) -> Result<PathBuf, FetchError> {
        let path = self.directory.join(file_name);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(path);
        }

        loop {
            let n = self.names.next(file_name) + 1;
            let path = self.directory.join(numbered_name(file_name, n));
            if !tokio::fs::try_exists(&path).await? {
                return Ok(path);
            }
        }
    }
}

fn numbered_name(file_name: &str, n: u64) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{n}.{ext}"),
        _ => format!("{file_name}-{n}"),
    }
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime.to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        _ => "img",
    }
}

/// Derives a local file name for an image URL
///
/// The last path segment is used when it looks like a file name. Otherwise
/// the name is `<host>-<n>.<extension>`, numbered per host.
pub fn file_name_for(url: &Url, extension: &str, names: &mut IdGenerator) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .map(sanitize)
        .filter(|name| name.contains('.') && !name.starts_with('.'));

    match segment {
        Some(name) => name,
        None => {
            let host = url.host_str().map(sanitize).unwrap_or_else(|| "image".to_string());
            let n = names.next(&host);
            format!("{host}-{n}.{extension}")
        }
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect()
}
