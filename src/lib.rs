//! # rustpubmed
//!
//! PubMed Industry-Author Extraction Pipeline - Rust CLI
//!
//! ## Modules
//!
//! - [`eutils`] - NCBI E-utilities client (ESearch/EFetch via the history server)
//! - [`medline`] - MEDLINE flat-format parsing and industry-author filtering
//! - [`export`] - Row flattening and CSV export
//! - [`pipeline`] - End-to-end orchestration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::eutils::{EntrezClient, SearchOptions};
//! use rustpubmed::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> rustpubmed::Result<()> {
//!     let client = EntrezClient::new()?;
//!     let written = pipeline::run(
//!         &client,
//!         "cancer immunotherapy",
//!         "output.csv".as_ref(),
//!         &SearchOptions::default(),
//!     )
//!     .await?;
//!     println!("Results written to {}", written.display());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod eutils;
pub mod export;
pub mod medline;
pub mod pipeline;

pub use error::{PubmedError, Result};
