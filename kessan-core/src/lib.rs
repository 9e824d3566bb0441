//! kessan-core: shared types for the monthly profit reconciliation engine

pub mod account;
pub mod config;
pub mod diagnostic;
pub mod money;
pub mod report;
pub mod transaction;

pub use account::AccountId;
pub use config::{ConfigError, EngineConfig, Limits};
pub use diagnostic::{
    BatchError, Diagnostic, NormalizationError, ParseError, ResolutionError, RowError, Scope,
};
pub use money::AmountError;
pub use report::{
    BucketKey, ChannelRevenue, FileSummary, MonthOverMonth, MonthlyBucket, Report, Summary, Totals,
};
pub use transaction::{
    CanonicalTransaction, FeeBreakdown, FeeCategory, RowOrigin, SalesChannel, SourceSchema,
};
