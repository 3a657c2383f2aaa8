//! # faqmatch Catalog (`catalog`)
//!
//! The catalog is the fixed set of known answers, each stored with the
//! embedding of the question it answers. It is loaded once at startup from a
//! JSON document:
//!
//! ```json
//! [
//!   { "question": "How long does shipping take?",
//!     "answer": "Ship in 3 days",
//!     "embedding": [0.0123, -0.0456, ...] }
//! ]
//! ```
//!
//! `question` is optional and only used in logs. Loading validates every
//! entry up front (non-empty answer, non-empty finite embedding, one shared
//! dimension) and fails on the first problem; a server must not start with a
//! half-usable catalog.
//!
//! After construction a [`Catalog`] is read-only. Share it behind an `Arc`.
//!
//! ```
//! use catalog::Catalog;
//!
//! let catalog = Catalog::from_json_str(
//!     r#"[{ "answer": "Ship in 3 days", "embedding": [1.0, 0.0] }]"#,
//! ).unwrap();
//!
//! assert_eq!(catalog.len(), 1);
//! assert_eq!(catalog.dimension(), Some(2));
//! ```

mod catalog;
mod error;

pub use crate::catalog::{Catalog, CatalogEntry};
pub use crate::error::CatalogError;
