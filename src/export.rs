//! Row flattening and CSV export.
//!
//! Articles flatten to one row per surviving author, grouped by article:
//! the first author row carries the shared id/date/title fields and any
//! further authors ride on continuation rows with those fields empty. The
//! whole table is serialized in memory before anything touches the
//! filesystem, so a failed write never leaves a partial file.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::{PubmedError, Result};
use crate::medline::Article;

/// Output file name that triggers collision probing
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// One output table row. Fields are optional because continuation rows
/// leave the article columns empty, and authorless articles leave the
/// author columns empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    /// PubMed identifier (lead rows only)
    #[serde(rename = "PubMedID")]
    pub pubmed_id: Option<String>,
    /// Date of publication (lead rows only)
    #[serde(rename = "DOP")]
    pub dop: Option<String>,
    /// Article title (lead rows only)
    #[serde(rename = "Title")]
    pub title: Option<String>,
    /// Author name
    #[serde(rename = "Author")]
    pub author: Option<String>,
    /// Author affiliation
    #[serde(rename = "Affiliation")]
    pub affiliation: Option<String>,
}

/// Flatten articles into table rows, in source order.
///
/// An article with N authors yields exactly N rows, only the first carrying
/// the article fields; an authorless article yields a single row with the
/// author columns empty.
pub fn flatten(articles: &[Article]) -> Vec<Row> {
    let mut rows = Vec::new();

    for article in articles {
        match article.authors.split_first() {
            None => rows.push(Row {
                pubmed_id: Some(article.pmid.clone()),
                dop: Some(article.date.clone()),
                title: Some(article.title.clone()),
                ..Row::default()
            }),
            Some((first, rest)) => {
                rows.push(Row {
                    pubmed_id: Some(article.pmid.clone()),
                    dop: Some(article.date.clone()),
                    title: Some(article.title.clone()),
                    author: Some(first.name.clone()),
                    affiliation: first.affiliation.clone(),
                });
                for author in rest {
                    rows.push(Row {
                        author: Some(author.name.clone()),
                        affiliation: author.affiliation.clone(),
                        ..Row::default()
                    });
                }
            }
        }
    }

    rows
}

/// Pick a destination that does not clobber an existing file.
///
/// Probing applies only when the path ends in the fixed default name;
/// an explicitly chosen path is honored as-is.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if path.file_name() != Some(OsStr::new(DEFAULT_OUTPUT)) {
        return path.to_path_buf();
    }

    let mut candidate = path.to_path_buf();
    let mut count = 1;
    while candidate.is_file() {
        candidate = path.with_file_name(format!("output({}).csv", count));
        count += 1;
    }
    candidate
}

/// Write the table as a fully quoted CSV with the fixed header row.
///
/// Returns the path actually written, which differs from `path` when
/// collision probing kicked in.
pub fn write_csv(path: &Path, rows: &[Row]) -> Result<PathBuf> {
    let target = resolve_output_path(path);

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(|e| PubmedError::Persist {
            path: target.clone(),
            message: e.to_string(),
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| PubmedError::Persist {
        path: target.clone(),
        message: e.to_string(),
    })?;

    std::fs::write(&target, bytes).map_err(|e| PubmedError::Persist {
        path: target.clone(),
        message: e.to_string(),
    })?;

    info!(path = %target.display(), rows = rows.len(), "report written");
    Ok(target)
}
