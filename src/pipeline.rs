//! End-to-end search → parse → export pipeline.
//!
//! One parameterized entry point wires the retriever to the record
//! pipeline. Everything runs strictly in sequence and fails closed: any
//! stage error aborts the run before the output file is created.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::eutils::{EntrezClient, SearchOptions};
use crate::{export, medline};

/// Search PubMed for `query`, keep industry-affiliated authors, and write
/// the flattened CSV.
///
/// The query is split on whitespace into search terms. Returns the path
/// actually written (collision probing may rename the default).
pub async fn run(
    client: &EntrezClient,
    query: &str,
    output: &Path,
    options: &SearchOptions,
) -> Result<PathBuf> {
    let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();

    let medline_text = client.retrieve(&terms, options).await?;
    let articles = medline::parse(&medline_text)?;
    info!(articles = articles.len(), "record set parsed");

    let rows = export::flatten(&articles);
    export::write_csv(output, &rows)
}
