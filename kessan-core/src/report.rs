//! Monthly buckets and the assembled profit report.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::account::AccountId;
use crate::diagnostic::Diagnostic;
use crate::transaction::{FeeBreakdown, SalesChannel, SourceSchema};

/// (account, year, month). Field order gives the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BucketKey {
    pub account_id: AccountId,
    pub year: i32,
    pub month: u32,
}

impl BucketKey {
    pub fn new(account_id: AccountId, date: NaiveDate) -> Self {
        Self {
            account_id,
            year: date.year(),
            month: date.month(),
        }
    }

    /// `YYYY-MM`
    pub fn period(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Revenue split by sales channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelRevenue {
    pub amazon: i64,
    pub mercari: i64,
    pub other: i64,
}

impl ChannelRevenue {
    pub fn add(&mut self, channel: SalesChannel, amount: i64) {
        match channel {
            SalesChannel::Amazon => self.amazon += amount,
            SalesChannel::Mercari => self.mercari += amount,
            SalesChannel::Other => self.other += amount,
        }
    }

    pub fn merge(&mut self, other: &ChannelRevenue) {
        self.amazon += other.amazon;
        self.mercari += other.mercari;
        self.other += other.other;
    }
}

/// Running totals. Purely additive, so merge order never matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub transaction_count: u64,
    pub revenue_sum: i64,
    pub fee_sum: i64,
    pub profit_sum: i64,
    pub fees: FeeBreakdown,
    pub revenue_by_channel: ChannelRevenue,
}

impl Totals {
    pub fn merge(&mut self, other: &Totals) {
        self.transaction_count += other.transaction_count;
        self.revenue_sum += other.revenue_sum;
        self.fee_sum += other.fee_sum;
        self.profit_sum += other.profit_sum;
        self.fees.merge(&other.fees);
        self.revenue_by_channel.merge(&other.revenue_by_channel);
    }

    /// Profit over revenue in basis points; `None` unless revenue is positive.
    pub fn profit_margin_bp(&self) -> Option<i64> {
        if self.revenue_sum <= 0 {
            return None;
        }
        let bp = i128::from(self.profit_sum) * 10_000 / i128::from(self.revenue_sum);
        i64::try_from(bp).ok()
    }
}

/// Change versus the previous bucket of the same account, in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthOverMonth {
    pub revenue_change_bp: Option<i64>,
    pub profit_change_bp: Option<i64>,
}

impl MonthOverMonth {
    pub fn between(previous: &Totals, current: &Totals) -> Self {
        Self {
            revenue_change_bp: change_bp(previous.revenue_sum, current.revenue_sum),
            profit_change_bp: change_bp(previous.profit_sum, current.profit_sum),
        }
    }
}

/// `(current - previous) / |previous|` in basis points, truncated toward zero.
pub fn change_bp(previous: i64, current: i64) -> Option<i64> {
    if previous == 0 {
        return None;
    }
    let delta = i128::from(current) - i128::from(previous);
    i64::try_from(delta * 10_000 / i128::from(previous).abs()).ok()
}

/// One account's totals for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    #[serde(flatten)]
    pub key: BucketKey,
    pub period: String,
    #[serde(flatten)]
    pub totals: Totals,
    pub change: MonthOverMonth,
}

/// Grand totals across every bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub totals: Totals,
    pub by_account: BTreeMap<AccountId, Totals>,
    /// Distinct `YYYY-MM` periods present, ascending.
    pub months: Vec<String>,
    pub profit_margin_bp: Option<i64>,
}

/// What happened to one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub file: String,
    pub schema: SourceSchema,
    pub account_slot: String,
    /// Detected text encoding; `None` when the file failed before detection.
    pub encoding: Option<String>,
    pub rows_read: u64,
    pub rows_accepted: u64,
    pub rows_rejected: u64,
    /// The file was rejected as a whole.
    pub failed: bool,
}

impl FileSummary {
    pub fn new(file: impl Into<String>, schema: SourceSchema, account_slot: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            schema,
            account_slot: account_slot.into(),
            encoding: None,
            rows_read: 0,
            rows_accepted: 0,
            rows_rejected: 0,
            failed: false,
        }
    }
}

/// Final report handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Ordered by account (A_M, O_AA) then by (year, month).
    pub buckets: Vec<MonthlyBucket>,
    pub summary: Summary,
    pub files: Vec<FileSummary>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn bucket(&self, account_id: AccountId, year: i32, month: u32) -> Option<&MonthlyBucket> {
        self.buckets.iter().find(|b| {
            b.key.account_id == account_id && b.key.year == year && b.key.month == month
        })
    }
}
