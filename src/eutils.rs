//! NCBI E-utilities client for PubMed retrieval.
//!
//! Two-stage protocol against the NLM history server: an ESearch probe
//! stores the matching record set server-side and returns an opaque handle
//! (`WebEnv` + `query_key`), then a single EFetch downloads the whole set
//! as MEDLINE-format plain text.
//!
//! API details (per NCBI docs):
//! - Unauthenticated callers are limited to 3 req/s; an API key raises this
//! - `usehistory=y` keeps results on the history server between calls
//! - `retmax=1` on the probe, since only the count and handle are needed

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{OptionExt, PubmedError, Result};

/// E-utilities base URL
const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Affiliation clause appended to every search term. Restricting results to
/// records with a commercial-entity marker in the affiliation field keeps
/// the fetched set small; the match is substring-level, so the client-side
/// filter in [`crate::medline`] still applies.
const COMPANY_AFFIL_CLAUSE: &str =
    r#" AND (Inc[affil] OR Ltd[affil] OR Corporation[affil] OR "Private Practice"[affil])"#;

/// Result ordering requested from ESearch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Best-match ordering (server default)
    #[default]
    Relevance,
    /// Most recent publication date first
    PubDate,
}

impl SortOrder {
    fn as_param(self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::PubDate => "pub_date",
        }
    }
}

/// Query options for an ESearch/EFetch round trip
///
/// Optional fields are sent to the server only when set; leaving them unset
/// reproduces the server defaults (unbounded date range, relevance order).
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Result ordering
    pub sort: SortOrder,
    /// Only records published within the last N days
    pub reldate: Option<u32>,
    /// Lower publication-date bound (`YYYY`, `YYYY/MM`, or `YYYY/MM/DD`)
    pub mindate: Option<String>,
    /// Upper publication-date bound (same formats)
    pub maxdate: Option<String>,
    /// NCBI API key (raises the per-second request allowance)
    pub api_key: Option<String>,
    /// Contact email registered with NCBI
    pub email: Option<String>,
}

/// Opaque history-server reference to a stored result set.
///
/// Valid only within the provider session that produced it; consumed by a
/// single EFetch and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHandle {
    /// History-server session token
    pub web_env: String,
    /// Key of the stored result set within that session
    pub query_key: String,
}

/// E-utilities API client
pub struct EntrezClient {
    http: reqwest::Client,
    base_url: String,
}

impl EntrezClient {
    /// Create a client against the production E-utilities endpoint
    pub fn new() -> Result<Self> {
        Self::with_base_url(EUTILS_BASE_URL)
    }

    /// Create a client against a custom base URL (mirrors, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("rustpubmed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Search PubMed and store the matching records on the history server.
    ///
    /// Returns the handle referencing the stored set. Zero matches is the
    /// distinct [`PubmedError::NoResults`] outcome, not a success with an
    /// empty handle.
    pub async fn esearch(&self, terms: &[String], options: &SearchOptions) -> Result<SearchHandle> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let term = build_term(terms);
        let params = search_params(&term, options);

        info!(term = %term, "starting ESearch request");
        let response = self.http.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "ESearch failure response");
            return Err(PubmedError::Api {
                code: i32::from(status.as_u16()),
                message: format!("ESearch error: {}", status),
            });
        }

        let body = response.text().await?;
        let (count, handle) = parse_search_response(&body)?;
        info!(count = count, "ESearch complete");
        Ok(handle)
    }

    /// Download the record set behind `handle` as MEDLINE-format text.
    pub async fn efetch(&self, handle: &SearchHandle, options: &SearchOptions) -> Result<String> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let params = fetch_params(handle, options);

        info!("starting EFetch request");
        let response = self.http.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "EFetch failure response");
            return Err(PubmedError::Api {
                code: i32::from(status.as_u16()),
                message: format!("EFetch error: {}", status),
            });
        }

        let text = response.text().await?;
        info!(bytes = text.len(), "EFetch complete");
        Ok(text)
    }

    /// Run the search/fetch pair.
    ///
    /// EFetch depends on the handle ESearch returns, so the calls are
    /// strictly sequential; if either fails the whole operation aborts.
    pub async fn retrieve(&self, terms: &[String], options: &SearchOptions) -> Result<String> {
        let handle = self.esearch(terms, options).await?;
        self.efetch(&handle, options).await
    }
}

/// Join query terms with `+` and append the commercial-affiliation clause
fn build_term(terms: &[String]) -> String {
    let mut term = terms.join("+");
    term.push_str(COMPANY_AFFIL_CLAUSE);
    term
}

/// ESearch query parameters, optional ones only when set
fn search_params(term: &str, options: &SearchOptions) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("db", "pubmed".to_string()),
        ("term", term.to_string()),
        ("sort", options.sort.as_param().to_string()),
        ("usehistory", "true".to_string()),
        ("retmax", "1".to_string()),
        ("retmode", "json".to_string()),
    ];

    if let Some(key) = &options.api_key {
        params.push(("api_key", key.clone()));
    }
    if let Some(email) = &options.email {
        params.push(("email", email.clone()));
    }
    if let Some(reldate) = options.reldate {
        params.push(("reldate", reldate.to_string()));
    }
    if let Some(mindate) = &options.mindate {
        params.push(("mindate", mindate.clone()));
    }
    if let Some(maxdate) = &options.maxdate {
        params.push(("maxdate", maxdate.clone()));
    }

    params
}

/// EFetch query parameters for a stored result set
fn fetch_params(handle: &SearchHandle, options: &SearchOptions) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("db", "pubmed".to_string()),
        ("WebEnv", handle.web_env.clone()),
        ("query_key", handle.query_key.clone()),
        ("retmode", "text".to_string()),
        ("rettype", "medline".to_string()),
    ];

    if let Some(key) = &options.api_key {
        params.push(("api_key", key.clone()));
    }
    if let Some(email) = &options.email {
        params.push(("email", email.clone()));
    }

    params
}

// === ESearch API Response Types ===

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    count: Option<String>,
    webenv: Option<String>,
    querykey: Option<String>,
}

/// Parse an ESearch JSON body into the match count and history handle.
///
/// The endpoint reports `count` as a decimal string.
fn parse_search_response(json: &str) -> Result<(u64, SearchHandle)> {
    let response: ESearchResponse = serde_json::from_str(json)?;
    let result = response.esearchresult;

    let count = result
        .count
        .ok_or_malformed("ESearch response missing count")?;
    let count: u64 = count
        .parse()
        .map_err(|_| PubmedError::Malformed(format!("unparsable ESearch count: {:?}", count)))?;

    if count == 0 {
        return Err(PubmedError::NoResults);
    }

    let web_env = result
        .webenv
        .ok_or_malformed("ESearch response missing webenv")?;
    let query_key = result
        .querykey
        .ok_or_malformed("ESearch response missing querykey")?;

    Ok((count, SearchHandle { web_env, query_key }))
}
