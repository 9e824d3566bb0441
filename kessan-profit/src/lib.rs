//! kessan-profit: account resolution, profit, monthly aggregation and the
//! report, behind the `compute` / `validate` entry points.

pub mod aggregator;
pub mod engine;
pub mod profit;
pub mod report_builder;
pub mod resolver;

pub use aggregator::{AggregateError, MonthlyAggregator, aggregate};
pub use engine::{Engine, compute, validate};
pub use resolver::AccountResolver;
