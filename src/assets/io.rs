use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{MannyError, Result};

/// Asset reader trait: asynchronous byte access for local files and
/// network resources.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Local file reader, resolving relative URIs against `root_path`.
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_path: path.as_ref().to_path_buf(),
        }
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(MannyError::AssetNotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// HTTP reader.
#[cfg(feature = "http")]
#[derive(Default)]
pub struct HttpAssetReader;

#[cfg(feature = "http")]
impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = url::Url::parse(uri)?;
        let response = ehttp::fetch_async(ehttp::Request::get(url.as_str()))
            .await
            .map_err(MannyError::HttpError)?;
        if !response.ok {
            return Err(MannyError::HttpResponseError {
                status: response.status,
            });
        }
        Ok(response.bytes)
    }
}

/// Reader variants, chosen per URI.
#[derive(Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    #[cfg(feature = "http")]
    Http(Arc<HttpAssetReader>),
}

impl AssetReaderVariant {
    /// Picks the HTTP reader for `http(s)://` URIs and the file reader
    /// (rooted at the working directory) for everything else.
    pub fn for_uri(uri: &str) -> Result<Self> {
        if is_remote(uri) {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(Arc::new(HttpAssetReader)))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(MannyError::FeatureNotEnabled(format!(
                    "http (needed for {uri})"
                )))
            }
        } else {
            Ok(Self::File(Arc::new(FileAssetReader::new("."))))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            #[cfg(feature = "http")]
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }
}

#[must_use]
pub fn is_remote(uri: &str) -> bool {
    uri.starts_with("http://") || uri.starts_with("https://")
}

/// Lower-cased extension of the path part of `uri`, ignoring any query
/// string or fragment.
#[must_use]
pub fn extension_of(uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let file = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
