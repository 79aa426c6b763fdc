//! Generated filing documents.

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use bytes::Bytes;
use filing_core::constants::DEFAULT_DOWNLOAD_FILENAME;
use reqwest::Method;
use std::path::{Path, PathBuf};

pub struct FilesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> FilesApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The Word document rendered for an application. The body is the raw file, not an
    /// envelope.
    pub async fn download_filing_document(&self, id: &str) -> ClientResult<Bytes> {
        self.client
            .send_raw(
                self.client
                    .request(Method::GET, "/api/file/downloadword")
                    .query(&[("id", id)]),
            )
            .await
    }

    /// Download the document for `id` and write it to `target`.
    ///
    /// A directory target receives a file named [`DEFAULT_DOWNLOAD_FILENAME`]. Returns the path
    /// written.
    pub async fn save_download(&self, id: &str, target: &Path) -> ClientResult<PathBuf> {
        let bytes = self.download_filing_document(id).await?;
        let path = if tokio::fs::metadata(target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            target.join(DEFAULT_DOWNLOAD_FILENAME)
        } else {
            target.to_path_buf()
        };

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(ClientError::DownloadWrite)?;
        tracing::info!("saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
