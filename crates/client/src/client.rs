use std::path::Path;

use futures_util::StreamExt;
use reqwest::multipart;
use tokio_util::io::ReaderStream;

use ipfsx_api::{AddResponse, ApiConfig, ApiError, VersionResponse};
use ipfsx_transfer::{CountingStream, ProgressSender, TransferError, UploadReceipt};

/// Read-side chunk size for streamed request bodies.
const BODY_CHUNK_SIZE: usize = 64 * 1024;

/// Client for the node's `/api/v0/*` RPC endpoints.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct IpfsClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl IpfsClient {
    /// Builds a client for the configured endpoint.
    ///
    /// The configured timeout bounds every request end to end, including
    /// body streaming.
    pub fn new(config: ApiConfig) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransferError::Failed(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// The endpoint this client talks to.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetches the node's version.
    ///
    /// Also serves as the pre-upload connectivity probe: a node that
    /// answers this is ready to accept adds.
    pub async fn version(&self) -> Result<VersionResponse, TransferError> {
        let url = self.config.endpoint_url("/api/v0/version");
        let res = self.http.post(&url).send().await.map_err(map_reqwest)?;
        let status = res.status();
        let body = res.text().await.map_err(map_reqwest)?;
        if !status.is_success() {
            return Err(TransferError::Failed(ApiError::message_from_body(&body)));
        }
        serde_json::from_str(&body)
            .map_err(|e| TransferError::InvalidResponse(format!("version: {e}")))
    }

    /// Adds a file to the node and returns the receipt.
    ///
    /// Streams the file as one multipart part to
    /// `POST /api/v0/add?pin=true&cid-version=1`, feeding byte counts
    /// into `progress`. Exactly one terminal event is emitted on
    /// `progress` before this returns.
    pub async fn add_file(
        &self,
        path: &Path,
        progress: &ProgressSender,
    ) -> Result<UploadReceipt, TransferError> {
        match self.add_file_inner(path, progress).await {
            Ok(receipt) => {
                progress.complete(receipt.clone()).await;
                Ok(receipt)
            }
            Err(e) => {
                progress.fail(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn add_file_inner(
        &self,
        path: &Path,
        progress: &ProgressSender,
    ) -> Result<UploadReceipt, TransferError> {
        let meta = tokio::fs::metadata(path).await?;
        let size = meta.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());

        let file = tokio::fs::File::open(path).await?;
        let stream = ReaderStream::with_capacity(file, BODY_CHUNK_SIZE);
        let counting = CountingStream::new(stream, size, progress.clone());
        let body = reqwest::Body::wrap_stream(counting);

        tracing::info!(file = %path.display(), size, "adding file to node");
        let response = self
            .send_add(multipart::Part::stream_with_length(body, size), &name)
            .await?;
        Ok(UploadReceipt {
            cid: response.hash,
            name,
            size,
        })
    }

    /// Adds an in-memory blob to the node and returns the receipt.
    pub async fn add_bytes(
        &self,
        data: Vec<u8>,
        name: &str,
        progress: &ProgressSender,
    ) -> Result<UploadReceipt, TransferError> {
        let size = data.len() as u64;
        let chunk: Result<bytes::Bytes, std::io::Error> = Ok(bytes::Bytes::from(data));
        let counting =
            CountingStream::new(futures_util::stream::iter([chunk]), size, progress.clone());
        let body = reqwest::Body::wrap_stream(counting);

        let result = self
            .send_add(multipart::Part::stream_with_length(body, size), name)
            .await;
        match result {
            Ok(response) => {
                let receipt = UploadReceipt {
                    cid: response.hash,
                    name: name.to_string(),
                    size,
                };
                progress.complete(receipt.clone()).await;
                Ok(receipt)
            }
            Err(e) => {
                progress.fail(e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn send_add(
        &self,
        part: multipart::Part,
        name: &str,
    ) -> Result<AddResponse, TransferError> {
        let part = part
            .file_name(name.to_string())
            .mime_str("application/octet-stream")
            .map_err(map_reqwest)?;
        let form = multipart::Form::new().part("file", part);

        let url = self.config.endpoint_url("/api/v0/add");
        let res = self
            .http
            .post(&url)
            .query(&[("pin", "true"), ("cid-version", "1")])
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = res.status();
        let body = res.text().await.map_err(map_reqwest)?;
        if !status.is_success() {
            return Err(TransferError::Failed(ApiError::message_from_body(&body)));
        }

        // One JSON object per line; a single-file add yields one line.
        let line = body
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| TransferError::InvalidResponse("empty add response".into()))?;
        serde_json::from_str(line)
            .map_err(|e| TransferError::InvalidResponse(format!("add: {e}")))
    }

    /// Returns the raw bytes behind a CID via `POST /api/v0/cat`.
    pub async fn cat(&self, cid: &str) -> Result<Vec<u8>, TransferError> {
        let url = self.config.endpoint_url("/api/v0/cat");
        let res = self
            .http
            .post(&url)
            .query(&[("arg", cid)])
            .send()
            .await
            .map_err(map_reqwest)?;

        if !res.status().is_success() {
            let body = res.text().await.map_err(map_reqwest)?;
            return Err(TransferError::Failed(ApiError::message_from_body(&body)));
        }
        Ok(res.bytes().await.map_err(map_reqwest)?.to_vec())
    }

    /// Downloads a CID's bytes to `output`, creating parent directories.
    ///
    /// Returns the number of bytes written.
    pub async fn download(&self, cid: &str, output: &Path) -> Result<u64, TransferError> {
        if let Some(parent) = output.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let url = self.config.endpoint_url("/api/v0/cat");
        let res = self
            .http
            .post(&url)
            .query(&[("arg", cid)])
            .send()
            .await
            .map_err(map_reqwest)?;

        if !res.status().is_success() {
            let body = res.text().await.map_err(map_reqwest)?;
            return Err(TransferError::Failed(ApiError::message_from_body(&body)));
        }

        let mut file = tokio::fs::File::create(output).await?;
        let mut written = 0u64;
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest)?;
            tokio::io::AsyncWriteExt::write_all(&mut file, &chunk).await?;
            written += chunk.len() as u64;
        }
        tokio::io::AsyncWriteExt::flush(&mut file).await?;
        tracing::info!(cid, output = %output.display(), written, "download complete");
        Ok(written)
    }
}

/// Collapses transport errors into the transfer taxonomy.
fn map_reqwest(e: reqwest::Error) -> TransferError {
    if e.is_timeout() {
        TransferError::Timeout
    } else {
        TransferError::Failed(e.to_string())
    }
}
