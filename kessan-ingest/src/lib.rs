//! kessan-ingest: reads marketplace sales exports into canonical transactions.
//!
//! [`parser::read_rows`] handles bytes, encodings and headers;
//! [`normalize::normalize`] maps a row through its [`SchemaDescriptor`].

pub mod encoding;
pub mod normalize;
pub mod parser;
pub mod parsers;
pub mod schema;
pub mod types;

pub use normalize::normalize;
pub use parser::{RowFailure, RowReader, read_rows};
pub use schema::SchemaDescriptor;
pub use types::{RawRow, SourceFile, TextEncoding};
