// Dump download
//
// One GET per run, no retries. The body is streamed chunk by chunk into a
// scratch writer; the file only appears under its final name once the whole
// body has been written.

use pageviews2parquet_writer::{ScratchFile, ScratchWriter, Storage, WriterError};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("GET {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Storage(#[from] WriterError),
}

impl FetchError {
    /// HTTP status of the failed response, if the server answered
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Connection { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// HTTP client for the dump archive
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Download `url` into the scratch directory as `name`.
    ///
    /// On any failure after the scratch writer is opened, the writer is
    /// aborted and no file is left under `name`.
    pub async fn fetch_to_scratch(
        &self,
        url: &str,
        storage: &Storage,
        name: &str,
    ) -> Result<ScratchFile, FetchError> {
        let connection = |source| FetchError::Connection {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(connection)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        debug!(%status, content_length = ?response.content_length(), "Dump response received");

        let mut writer = ScratchWriter::open(storage, name).await?;
        match stream_body(response, &mut writer, url).await {
            Ok(()) => Ok(writer.close().await?),
            Err(err) => {
                if let Err(abort_err) = writer.abort().await {
                    warn!(error = %abort_err, "Failed to discard partial download");
                }
                Err(err)
            }
        }
    }
}

async fn stream_body(
    mut response: reqwest::Response,
    writer: &mut ScratchWriter,
    url: &str,
) -> Result<(), FetchError> {
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| FetchError::Connection {
            url: url.to_string(),
            source,
        })?
    {
        writer.write(chunk).await?;
    }
    Ok(())
}
