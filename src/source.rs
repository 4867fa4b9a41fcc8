use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::time::Duration;

use flate2::read::MultiGzDecoder;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::StatsError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub type FeedReader = Box<dyn BufRead + Send>;

pub trait FeedClient: Send + Sync {
    fn open_url(&self, url: &str) -> Result<Box<dyn Read + Send>, StatsError>;
}

#[derive(Clone)]
pub struct FeedHttpClient {
    client: Client,
}

impl FeedHttpClient {
    pub fn new() -> Result<Self, StatsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("assembly-stats/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| StatsError::Http(err.to_string()))?,
        );
        // assembly_summary_refseq.txt is several hundred MB; the timeout covers the whole body
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|err| StatsError::Http(err.to_string()))?;
        Ok(Self { client })
    }

    fn normalize_url(url: &str) -> String {
        if let Some(rest) = url.strip_prefix("ftp://ftp.ncbi.nlm.nih.gov/") {
            return format!("https://ftp.ncbi.nlm.nih.gov/{}", rest);
        }
        url.to_string()
    }
}

impl FeedClient for FeedHttpClient {
    fn open_url(&self, url: &str) -> Result<Box<dyn Read + Send>, StatsError> {
        let url = Self::normalize_url(url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| StatsError::Http(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "feed request failed".to_string());
            return Err(StatsError::HttpStatus { status, message });
        }
        Ok(Box::new(response))
    }
}

pub fn is_remote(location: &str) -> bool {
    ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| location.starts_with(scheme))
}

/// Opens a local path or URL as a line reader, gunzipping when the stream
/// starts with the gzip magic bytes.
pub fn open_source(location: &str, client: &dyn FeedClient) -> Result<FeedReader, StatsError> {
    let raw: Box<dyn Read + Send> = if is_remote(location) {
        tracing::info!(url = location, "streaming assembly summary");
        client.open_url(location)?
    } else {
        let path = PathBuf::from(location);
        if !path.exists() {
            return Err(StatsError::InputNotFound(path));
        }
        tracing::info!(path = location, "reading assembly summary");
        let file = File::open(&path).map_err(|err| StatsError::Read(format!("{location}: {err}")))?;
        Box::new(file)
    };
    decompress_if_needed(raw)
}

pub fn decompress_if_needed(raw: Box<dyn Read + Send>) -> Result<FeedReader, StatsError> {
    let mut buffered = BufReader::new(raw);
    let head = buffered
        .fill_buf()
        .map_err(|err| StatsError::Read(err.to_string()))?;
    if head.starts_with(&GZIP_MAGIC) {
        tracing::debug!("input is gzip-compressed");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(buffered))))
    } else {
        Ok(Box::new(buffered))
    }
}
