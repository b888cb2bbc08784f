//! # cifold_fragment
//!
//! Fragment tree model and reader for cifold.
//!
//! A fragment is a single YAML file describing part of a CI document: a
//! workflow, a job or a list of steps. This crate turns fragment text into a
//! [`Node`] tree and recognizes the two tagged node kinds the resolver
//! consumes:
//!
//! - `!reference path` / `!reference { path, params }` - replaced by the
//!   resolved content of another fragment (alias `!ref`)
//! - `!include path` / `!include { path, merge }` - splices another fragment
//!   into the current container
//!
//! ## Example
//!
//! ```rust,no_run
//! use cifold_fragment::{FragmentReader, FsFragmentReader};
//! use std::path::Path;
//!
//! # async fn run() -> cifold_fragment::FragmentResult<()> {
//! let reader = FsFragmentReader::new();
//! let parsed = reader.parse(Path::new("templates/workflows/ci.yml")).await?;
//! for dep in &parsed.dependencies {
//!     println!("depends on {}", dep);
//! }
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod error;
pub mod memory;
pub mod node;
pub mod placeholder;
pub mod reader;

pub use convert::{node_from_yaml, parse_fragment};
pub use error::{FragmentError, FragmentResult};
pub use memory::MemoryFragmentReader;
pub use node::{Inclusion, Mapping, Node, Reference, Scalar};
pub use placeholder::{placeholder_pattern, placeholders};
pub use reader::{FragmentReader, FsFragmentReader, ParsedFragment};
