//! Inline image search: a Google custom search client plus the small
//! `name:value` command language used inside inline queries.

pub mod api;
pub mod config;
pub mod cse;
pub mod data_models;
pub mod error;
pub mod inline;
pub mod query_parser;
pub mod texts;

pub use cse::{SearchClient, SearchParams};
pub use data_models::{ImageMeta, ResultItem, SearchResult, Spelling};
pub use error::{ConfigError, SearchError};
pub use query_parser::{Directive, ParsedQuery, parse};
