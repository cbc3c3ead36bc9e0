//! MEDLINE flat-format parsing and industry-author filtering.
//!
//! EFetch returns one article per paragraph of tagged lines, with long
//! field values wrapped onto continuation lines indented by six spaces.
//! Parsing runs in two stages: [`rectify`] folds the continuation lines
//! back into logical lines, then [`scan_articles`] walks the logical lines
//! with a single article accumulator, keeping only authors whose address
//! does not look academic.

use tracing::debug;

use crate::error::{PubmedError, Result};

/// A continuation line starts with this run of spaces
const CONTINUATION_PREFIX: &str = "      ";

/// Leading characters stripped from a continuation line before it is
/// appended to its logical line
const CONTINUATION_STRIP: usize = 4;

/// Address substrings that mark an author as academically affiliated.
/// Matching is case-sensitive and substring-level; precision over recall.
const ACADEMIC_MARKERS: &[&str] = &["University", "Hospital"];

/// One author of an article
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    /// Full author name as given by the `FAU` field
    pub name: String,
    /// First non-academic address line, if any survived the filter
    pub affiliation: Option<String>,
}

/// One parsed article record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Article {
    /// PubMed identifier
    pub pmid: String,
    /// Date of publication as printed in the record
    pub date: String,
    /// Article title
    pub title: String,
    /// Authors in source order, already filtered
    pub authors: Vec<Author>,
}

impl Article {
    fn is_empty(&self) -> bool {
        *self == Article::default()
    }
}

/// Fold wrapped continuation lines back into logical lines.
///
/// Any line starting with six spaces continues the previous logical line;
/// its content after the fixed strip prefix is appended in place. A
/// continuation line with nothing before it is structurally invalid.
pub fn rectify(raw: &str) -> Result<Vec<String>> {
    let mut lines: Vec<String> = Vec::new();

    for line in raw.lines() {
        if line.starts_with(CONTINUATION_PREFIX) {
            match lines.last_mut() {
                Some(previous) => previous.push_str(&line[CONTINUATION_STRIP..]),
                None => {
                    return Err(PubmedError::Parse(
                        "continuation line with no preceding logical line".to_string(),
                    ))
                }
            }
        } else {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

/// Parse rectified logical lines into article records.
///
/// Paragraphs are separated by a blank (empty or single-space) line; the
/// current article lives in a local accumulator so the whole scan is a pure
/// function of its input. Unrecognized tags are skipped.
pub fn scan_articles(lines: &[String]) -> Vec<Article> {
    let mut articles: Vec<Article> = Vec::new();
    let mut current = Article::default();

    for line in lines {
        if line.is_empty() || line == " " {
            if !current.is_empty() {
                articles.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("PMID- ") {
            current.pmid = rest.trim_end().to_string();
        } else if let Some(rest) = line.strip_prefix("DP  - ") {
            current.date = rest.trim_end().to_string();
        } else if let Some(rest) = line.strip_prefix("TI  - ") {
            current.title = rest.trim_end().to_string();
        } else if let Some(rest) = line.strip_prefix("FAU - ") {
            current.authors.push(Author {
                name: rest.trim_end().to_string(),
                affiliation: None,
            });
        } else if let Some(rest) = line.strip_prefix("AD  - ") {
            apply_address(&mut current.authors, rest.trim_end());
        }
    }

    if !current.is_empty() {
        articles.push(current);
    }

    articles
}

/// Attach an address line to the most recent author.
///
/// Only the first address per author counts; later ones are ignored. An
/// academically-marked address removes the author outright instead of
/// recording the affiliation.
fn apply_address(authors: &mut Vec<Author>, address: &str) {
    let awaiting_address = authors.last().is_some_and(|a| a.affiliation.is_none());
    if !awaiting_address {
        return;
    }

    if ACADEMIC_MARKERS.iter().any(|m| address.contains(m)) {
        authors.pop();
    } else if let Some(author) = authors.last_mut() {
        author.affiliation = Some(address.to_string());
    }
}

/// Rectify and scan a raw MEDLINE blob in one call.
pub fn parse(raw: &str) -> Result<Vec<Article>> {
    let lines = rectify(raw)?;
    let articles = scan_articles(&lines);
    debug!(
        lines = lines.len(),
        articles = articles.len(),
        "parsed MEDLINE records"
    );
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_rectify_folds_continuation_lines() {
        let raw = "TI  - A very long title that\n      wraps onto two more\n      physical lines\nPMID- 1\n";
        let lines = rectify(raw).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "TI  - A very long title that  wraps onto two more  physical lines"
        );
        assert_eq!(lines[1], "PMID- 1");
    }

    #[test]
    fn test_rectify_line_count_invariant() {
        let raw = "PMID- 1\nAD  - Somewhere\n      continued\n\nPMID- 2\n      tail\n";
        let physical = raw.lines().count();
        let continuations = raw
            .lines()
            .filter(|l| l.starts_with(CONTINUATION_PREFIX))
            .count();
        let lines = rectify(raw).unwrap();

        assert_eq!(lines.len(), physical - continuations);
    }

    #[test]
    fn test_rectify_orphan_continuation_fails() {
        let raw = "      dangling continuation\nPMID- 1\n";
        assert!(matches!(rectify(raw), Err(PubmedError::Parse(_))));
    }

    #[test]
    fn test_scan_single_article_with_filtering() {
        // The academic co-author disappears entirely.
        let lines = logical(&[
            "PMID- 100",
            "DP  - 2020",
            "TI  - Drug X Trial",
            "FAU - Smith J",
            "AD  - Acme Inc, NY",
            "FAU - Doe A",
            "AD  - State University",
        ]);
        let articles = scan_articles(&lines);

        assert_eq!(articles.len(), 1);
        let article = &articles[0];
        assert_eq!(article.pmid, "100");
        assert_eq!(article.date, "2020");
        assert_eq!(article.title, "Drug X Trial");
        assert_eq!(
            article.authors,
            vec![Author {
                name: "Smith J".to_string(),
                affiliation: Some("Acme Inc, NY".to_string()),
            }]
        );
    }

    #[test]
    fn test_scan_paragraph_boundaries() {
        let lines = logical(&[
            "PMID- 1",
            "TI  - First",
            "",
            "PMID- 2",
            "TI  - Second",
            " ",
            "PMID- 3",
            "TI  - Third",
        ]);
        let articles = scan_articles(&lines);

        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].pmid, "1");
        assert_eq!(articles[1].pmid, "2");
        // Trailing paragraph without a closing blank line still flushes.
        assert_eq!(articles[2].pmid, "3");
    }

    #[test]
    fn test_scan_trailing_blank_lines_add_no_article() {
        let lines = logical(&["PMID- 1", "", "", " "]);
        let articles = scan_articles(&lines);

        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn test_first_address_wins() {
        let lines = logical(&[
            "PMID- 1",
            "FAU - Smith J",
            "AD  - Acme Inc",
            "AD  - Globex Corporation",
        ]);
        let articles = scan_articles(&lines);

        assert_eq!(
            articles[0].authors[0].affiliation.as_deref(),
            Some("Acme Inc")
        );
    }

    #[test]
    fn test_academic_markers_discard_author() {
        for address in ["State University", "General Hospital", "Acme Inc, near University Ave"] {
            let lines = logical(&[
                "PMID- 1",
                "FAU - Doe A",
                &format!("AD  - {}", address),
            ]);
            let articles = scan_articles(&lines);

            assert!(
                articles[0].authors.is_empty(),
                "{:?} should discard the author",
                address
            );
        }
    }

    #[test]
    fn test_address_after_discard_applies_to_previous_author() {
        // Doe is dropped, so the next address belongs to Smith, who has
        // none yet.
        let lines = logical(&[
            "PMID- 1",
            "FAU - Smith J",
            "FAU - Doe A",
            "AD  - State University",
            "AD  - Acme Inc",
        ]);
        let articles = scan_articles(&lines);

        assert_eq!(
            articles[0].authors,
            vec![Author {
                name: "Smith J".to_string(),
                affiliation: Some("Acme Inc".to_string()),
            }]
        );
    }

    #[test]
    fn test_address_without_author_ignored() {
        let lines = logical(&["PMID- 1", "AD  - Acme Inc"]);
        let articles = scan_articles(&lines);

        assert!(articles[0].authors.is_empty());
    }

    #[test]
    fn test_unrecognized_tags_skipped() {
        let lines = logical(&[
            "PMID- 1",
            "LR  - 20240101",
            "AB  - Long abstract text",
            "TI  - Kept",
        ]);
        let articles = scan_articles(&lines);

        assert_eq!(articles[0].title, "Kept");
    }

    #[test]
    fn test_scan_is_pure() {
        let lines = logical(&[
            "PMID- 1",
            "FAU - Smith J",
            "AD  - Acme Inc",
            "",
            "PMID- 2",
        ]);

        assert_eq!(scan_articles(&lines), scan_articles(&lines));
    }

    #[test]
    fn test_parse_composes_rectify_and_scan() {
        let raw = "PMID- 100\nDP  - 2020\nTI  - Drug X\nFAU - Smith J\nAD  - Acme Inc,\n      NY\n";
        let articles = parse(raw).unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(
            articles[0].authors[0].affiliation.as_deref(),
            Some("Acme Inc,  NY")
        );
    }
}
