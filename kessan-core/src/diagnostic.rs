//! Error taxonomy and the diagnostics that carry rejected files and rows
//! into the report.
//!
//! Structural errors ([`ParseError`]) reject a whole file, row errors
//! ([`RowError`]) reject a single record, and [`BatchError`] is the only
//! failure `compute` returns to its caller.

use serde::Serialize;
use thiserror::Error;

use crate::account::AccountId;
use crate::money::AmountError;

/// Whole-file failure raised by the format parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("file is empty")]
    EmptyFile,
    #[error("missing required column '{column}'")]
    MissingRequiredColumn { column: String },
    #[error("header is not valid {tried}")]
    MalformedEncoding { tried: String },
    #[error("unreadable header: {message}")]
    UnreadableHeader { message: String },
    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: usize, limit: usize },
    /// Not structural: rows before `line` were kept.
    #[error("row limit of {limit} reached, stopped before line {line}")]
    RowLimitExceeded { limit: usize, line: u64 },
}

impl ParseError {
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::EmptyFile => "empty_file",
            ParseError::MissingRequiredColumn { .. } => "missing_required_column",
            ParseError::MalformedEncoding { .. } => "malformed_encoding",
            ParseError::UnreadableHeader { .. } => "unreadable_header",
            ParseError::FileTooLarge { .. } => "file_too_large",
            ParseError::RowLimitExceeded { .. } => "row_limit_exceeded",
        }
    }

    /// Whether the file was rejected as a whole.
    pub fn is_structural(&self) -> bool {
        !matches!(self, ParseError::RowLimitExceeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("invalid date in '{column}': '{value}'")]
    InvalidDate { column: String, value: String },
    #[error("invalid amount in '{column}': '{value}' ({reason})")]
    InvalidAmount {
        column: String,
        value: String,
        reason: AmountError,
    },
    #[error("missing identifier in '{column}'")]
    MissingIdentifier { column: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unknown account tag '{tag}'")]
    UnknownAccountTag { tag: String },
    #[error("row marker {marker} disagrees with upload slot {slot}")]
    AccountMarkerMismatch { marker: AccountId, slot: AccountId },
}

/// Everything that can reject a single row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("bytes are not valid {encoding}")]
    MalformedEncoding { encoding: String },
    #[error("expected {expected} fields, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("unreadable record: {message}")]
    Unreadable { message: String },
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("duplicate of {file} line {line}")]
    Duplicate { file: String, line: u64 },
}

impl RowError {
    pub fn code(&self) -> &'static str {
        match self {
            RowError::MalformedEncoding { .. } => "malformed_encoding",
            RowError::ColumnCount { .. } => "column_count",
            RowError::Unreadable { .. } => "unreadable_record",
            RowError::Normalization(NormalizationError::InvalidDate { .. }) => "invalid_date",
            RowError::Normalization(NormalizationError::InvalidAmount { .. }) => "invalid_amount",
            RowError::Normalization(NormalizationError::MissingIdentifier { .. }) => {
                "missing_identifier"
            }
            RowError::Resolution(ResolutionError::UnknownAccountTag { .. }) => {
                "unknown_account_tag"
            }
            RowError::Resolution(ResolutionError::AccountMarkerMismatch { .. }) => {
                "account_marker_mismatch"
            }
            RowError::Duplicate { .. } => "duplicate_transaction",
        }
    }
}

/// Batch-level failure of `compute`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("no valid data: all {files} file(s) failed structural validation")]
    NoValidData {
        files: usize,
        diagnostics: Vec<Diagnostic>,
    },
    /// A transaction reached aggregation without an account or a profit.
    #[error("transaction {identifier} reached aggregation unresolved")]
    Unaggregated { identifier: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    File,
    Row,
}

/// A rejected file or row, with the reason it was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub scope: Scope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn for_file(file: impl Into<String>, err: &ParseError) -> Self {
        let line = match err {
            ParseError::RowLimitExceeded { line, .. } => Some(*line),
            _ => None,
        };
        Self {
            file: file.into(),
            scope: Scope::File,
            line,
            identifier: None,
            code: err.code(),
            message: err.to_string(),
        }
    }

    pub fn for_row(
        file: impl Into<String>,
        line: u64,
        identifier: Option<String>,
        err: &RowError,
    ) -> Self {
        Self {
            file: file.into(),
            scope: Scope::Row,
            line: Some(line),
            identifier,
            code: err.code(),
            message: err.to_string(),
        }
    }
}
