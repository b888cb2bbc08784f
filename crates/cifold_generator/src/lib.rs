//! # cifold_generator
//!
//! Turns resolved fragment trees into CI documents.
//!
//! A resolved tree is checked against per-kind structural rules (a workflow
//! needs `jobs`, a job needs `steps`, a step sequence must be a non-empty
//! list), then serialized to YAML or JSON. YAML output carries a short
//! provenance header naming the root fragment it was built from.

pub mod error;
pub mod generator;
pub mod kind;
pub mod validator;
pub mod writer;

pub use error::{GeneratorError, GeneratorResult};
pub use generator::{DocumentGenerator, GenerateOptions, OutputFormat};
pub use kind::DocumentKind;
pub use validator::{DocumentValidator, ValidationResult, ValidationRules};
pub use writer::DocumentWriter;
