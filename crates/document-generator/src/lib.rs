//! Synthetic document generator for bulk ingestion.
//!
//! [`DocumentGenerator`] produces batches of independent random records with a
//! fixed attribute schema per [`DocumentType`]. Identifiers, sizes and
//! timestamps are random; timestamps are drawn uniformly from a fixed window
//! starting at the Unix epoch. A large free-text `content` attribute can be
//! added from a [`TextGenerator`].
//!
//! # Example
//!
//! ```rust
//! use document_generator::{CachedTextGenerator, ContentOptions, DocumentGenerator, DocumentType};
//!
//! let mut text = CachedTextGenerator::with_seed(7, ContentOptions::small());
//! let mut generator = DocumentGenerator::with_seed(7).with_content_options(ContentOptions::small());
//! let docs = generator
//!     .generate(DocumentType::File, 10, true, Some(&mut text), None)
//!     .unwrap();
//! assert_eq!(docs.len(), 10);
//! assert!(docs[0].get("content").is_some());
//! ```

pub mod document;
pub mod fields;
pub mod generator;
pub mod text;

pub use document::{Document, DocumentType};
pub use generator::{DocumentGenerator, GeneratorError, FILE_EXTENSIONS};
pub use text::{CachedTextGenerator, ContentOptions, TextGenerator};
