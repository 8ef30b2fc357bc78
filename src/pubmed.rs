//! PubMed E-utilities client.
//!
//! Two calls make up the fetch stage:
//!
//! - `esearch.fcgi` (JSON) turns a query into a list of PMIDs
//! - `efetch.fcgi` (XML) returns full records for those PMIDs
//!
//! API Details (per NCBI docs):
//! - 3 requests/second without an API key, 10 with one
//! - `tool` and `email` identify the caller
//! - esearch returns at most 10 000 ids per request

use crate::error::{PapersError, RequireField, Result};
use crate::paper::RawPaper;
use crate::xml::parse_efetch_xml;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// E-utilities base URL
pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Tool name reported to NCBI with every request
const TOOL_NAME: &str = "get-papers-list";

/// esearch hard cap on `retmax`
pub const ESEARCH_MAX_RETMAX: usize = 10_000;

/// How much of each response body to log in debug mode
const DEBUG_PREVIEW_CHARS: usize = 500;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// E-utilities base URL (no trailing endpoint)
    pub base_url: String,
    /// NCBI API key, raises the rate limit to 10 req/s
    pub api_key: Option<String>,
    /// Contact email sent with requests
    pub email: Option<String>,
    /// Maximum number of PMIDs to request from esearch
    pub max_results: usize,
    /// PMIDs per efetch request
    pub batch_size: usize,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retries for 429/5xx/transport failures
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EUTILS_URL.to_string(),
            api_key: None,
            email: None,
            max_results: 100,
            batch_size: 200,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// PubMed E-utilities client with retry and rate limiting
pub struct PubMedClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a new PubMedClient
    ///
    /// Fails if the base URL does not parse or the batch size is zero.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            PapersError::Config(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if config.batch_size == 0 {
            return Err(PapersError::Config("batch size must be at least 1".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", TOOL_NAME, env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PapersError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run an esearch query and return matching PMIDs (most relevant first)
    pub async fn search_ids(&self, query: &str) -> Result<Vec<String>> {
        let url = self.build_esearch_url(query)?;
        info!(query = query, max_results = self.config.max_results, "Searching PubMed");

        let body = self.get_text(&url).await?;
        let ids = parse_esearch_response(&body)?;

        info!(count = ids.len(), "esearch complete");
        Ok(ids)
    }

    /// Fetch full records for the given PMIDs.
    ///
    /// Ids are sent in batches of `batch_size`, with a pause between batches to
    /// stay under the NCBI rate limit. An empty id list makes no request.
    pub async fn fetch_papers(&self, ids: &[String]) -> Result<Vec<RawPaper>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let batches = ids.len().div_ceil(self.config.batch_size);
        let mut papers = Vec::with_capacity(ids.len());

        for (batch_idx, chunk) in ids.chunks(self.config.batch_size).enumerate() {
            info!(
                batch = batch_idx + 1,
                total_batches = batches,
                ids = chunk.len(),
                "Fetching PubMed records"
            );

            let url = self.build_efetch_url(chunk)?;
            let body = self.get_text(&url).await?;
            let parsed = parse_efetch_xml(&body)?;

            if parsed.len() < chunk.len() {
                warn!(
                    requested = chunk.len(),
                    parsed = parsed.len(),
                    "Some records were missing from efetch response"
                );
            }
            papers.extend(parsed);

            if batch_idx + 1 < batches {
                tokio::time::sleep(self.request_interval()).await;
            }
        }

        info!(total = papers.len(), "efetch complete");
        Ok(papers)
    }

    fn retmax(&self) -> usize {
        if self.config.max_results > ESEARCH_MAX_RETMAX {
            warn!(
                requested = self.config.max_results,
                cap = ESEARCH_MAX_RETMAX,
                "max_results above esearch cap, clamping"
            );
        }
        self.config.max_results.min(ESEARCH_MAX_RETMAX)
    }

    /// Pause between consecutive requests
    fn request_interval(&self) -> Duration {
        if self.config.api_key.is_some() {
            Duration::from_millis(110)
        } else {
            Duration::from_millis(350)
        }
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, name))
            .map_err(|e| PapersError::Config(format!("Invalid base URL: {}", e)))
    }

    fn build_esearch_url(&self, query: &str) -> Result<Url> {
        let mut url = self.endpoint("esearch.fcgi")?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("db", "pubmed");
            params.append_pair("term", query);
            params.append_pair("retmax", &self.retmax().to_string());
            params.append_pair("retmode", "json");
        }
        self.append_identity(&mut url);
        Ok(url)
    }

    fn build_efetch_url(&self, ids: &[String]) -> Result<Url> {
        let mut url = self.endpoint("efetch.fcgi")?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("db", "pubmed");
            params.append_pair("id", &ids.join(","));
            params.append_pair("retmode", "xml");
        }
        self.append_identity(&mut url);
        Ok(url)
    }

    /// Add tool/email/api_key parameters
    fn append_identity(&self, url: &mut Url) {
        let mut params = url.query_pairs_mut();
        params.append_pair("tool", TOOL_NAME);
        if let Some(email) = &self.config.email {
            params.append_pair("email", email);
        }
        if let Some(key) = &self.config.api_key {
            params.append_pair("api_key", key);
        }
    }

    /// GET with exponential backoff on retryable failures
    async fn get_text(&self, url: &Url) -> Result<String> {
        let mut attempt = 0;

        loop {
            debug!(url = %redact_key(url), attempt = attempt + 1, "Request");

            match self.send(url).await {
                Ok(body) => {
                    debug!(
                        preview = %body.chars().take(DEBUG_PREVIEW_CHARS).collect::<String>(),
                        "Response"
                    );
                    return Ok(body);
                }
                Err(e) if attempt < self.config.max_retries && is_retryable(&e) => {
                    let wait = backoff_delay(attempt, &e);
                    warn!(
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Request failed, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PapersError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PapersError::Api {
                code: status.as_u16() as i32,
                message: format!(
                    "E-utilities error: {} - {}",
                    status,
                    error_text.chars().take(DEBUG_PREVIEW_CHARS).collect::<String>()
                ),
            });
        }

        Ok(response.text().await?)
    }
}

// === esearch Response Types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

/// Extract the PMID list from an esearch JSON body
fn parse_esearch_response(body: &str) -> Result<Vec<String>> {
    let response: ESearchResponse = serde_json::from_str(body)?;

    if let Some(message) = response.error {
        return Err(PapersError::Api { code: 0, message });
    }

    let result = response.esearchresult.require("esearchresult")?;

    if let Some(message) = result.error {
        return Err(PapersError::Api { code: 0, message });
    }

    debug!(count = ?result.count, returned = result.idlist.len(), "esearch result");
    Ok(result.idlist)
}

/// Whether a failed request is worth retrying
fn is_retryable(err: &PapersError) -> bool {
    match err {
        PapersError::RateLimited(_) => true,
        PapersError::Api { code, .. } => *code >= 500,
        PapersError::Network(e) => e.is_timeout() || e.is_connect(),
        _ => false,
    }
}

/// 500ms * 2^attempt plus up to 250ms of jitter, never shorter than a Retry-After hint
fn backoff_delay(attempt: u32, err: &PapersError) -> Duration {
    let base = Duration::from_millis(500 * 2u64.pow(attempt.min(6)));
    let jitter = Duration::from_millis(rand::random::<u64>() % 250);
    let delay = base + jitter;

    match err {
        PapersError::RateLimited(secs) => delay.max(Duration::from_secs(*secs)),
        _ => delay,
    }
}

/// URL for logging with the api_key value masked
fn redact_key(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
