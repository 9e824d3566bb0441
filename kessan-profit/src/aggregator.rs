//! Monthly Aggregator: (account, year, month) buckets of running totals.

use kessan_core::{BucketKey, CanonicalTransaction, Totals};
use std::collections::BTreeMap;
use thiserror::Error;

/// A transaction that skipped resolution or profit calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("transaction {identifier} has no account")]
    Unresolved { identifier: String },
    #[error("transaction {identifier} has no profit")]
    MissingProfit { identifier: String },
}

impl AggregateError {
    pub fn identifier(&self) -> &str {
        match self {
            AggregateError::Unresolved { identifier }
            | AggregateError::MissingProfit { identifier } => identifier,
        }
    }
}

/// Months without transactions simply have no bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyAggregator {
    buckets: BTreeMap<BucketKey, Totals>,
}

impl MonthlyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, txn: &CanonicalTransaction) -> Result<(), AggregateError> {
        let account = txn.account_id.ok_or_else(|| AggregateError::Unresolved {
            identifier: txn.raw_identifier.clone(),
        })?;
        let profit = txn
            .profit_amount
            .ok_or_else(|| AggregateError::MissingProfit {
                identifier: txn.raw_identifier.clone(),
            })?;

        let totals = self
            .buckets
            .entry(BucketKey::new(account, txn.order_date))
            .or_default();
        totals.transaction_count += 1;
        totals.revenue_sum += txn.revenue_amount;
        totals.fee_sum += txn.fee_amount;
        totals.profit_sum += profit;
        totals.fees.merge(&txn.fees);
        totals.revenue_by_channel.add(txn.channel, txn.revenue_amount);
        Ok(())
    }

    /// Fold another aggregator in, e.g. one built from a different file.
    pub fn merge(&mut self, other: MonthlyAggregator) {
        for (key, totals) in other.buckets {
            self.buckets.entry(key).or_default().merge(&totals);
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn finish(self) -> BTreeMap<BucketKey, Totals> {
        self.buckets
    }
}

pub fn aggregate<'a>(
    txns: impl IntoIterator<Item = &'a CanonicalTransaction>,
) -> Result<BTreeMap<BucketKey, Totals>, AggregateError> {
    let mut aggregator = MonthlyAggregator::new();
    for txn in txns {
        aggregator.add(txn)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profit::calculate;
    use chrono::NaiveDate;
    use kessan_core::{
        AccountId, FeeBreakdown, FeeCategory, RowOrigin, SalesChannel, SourceSchema,
    };

    fn txn(
        id: &str,
        account: AccountId,
        date: (i32, u32, u32),
        revenue: i64,
        fee: i64,
    ) -> CanonicalTransaction {
        let mut fees = FeeBreakdown::default();
        fees.add(FeeCategory::Commission, fee);
        let mut t = CanonicalTransaction::new(
            SourceSchema::Makado,
            id,
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            revenue,
            fees,
            SalesChannel::Amazon,
            RowOrigin {
                file: "makado.csv".to_string(),
                line: 2,
            },
        );
        t.account_id = Some(account);
        calculate(t)
    }

    fn sample() -> Vec<CanonicalTransaction> {
        vec![
            txn("1", AccountId::Am, (2024, 6, 1), 10_000, 1_000),
            txn("2", AccountId::Am, (2024, 6, 15), 5_000, 800),
            txn("3", AccountId::Oaa, (2024, 6, 20), 2_000, 200),
            txn("4", AccountId::Am, (2024, 7, 2), 1_000, 100),
        ]
    }

    #[test]
    fn test_groups_by_account_and_month() {
        let buckets = aggregate(&sample()).unwrap();
        assert_eq!(buckets.len(), 3);

        let june = &buckets[&BucketKey::new(
            AccountId::Am,
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )];
        assert_eq!(june.transaction_count, 2);
        assert_eq!(june.revenue_sum, 15_000);
        assert_eq!(june.fee_sum, 1_800);
        assert_eq!(june.profit_sum, 13_200);
        assert_eq!(june.fees.commission, 1_800);
        assert_eq!(june.revenue_by_channel.amazon, 15_000);
    }

    #[test]
    fn test_order_independent() {
        let forward = aggregate(&sample()).unwrap();
        let mut reversed = sample();
        reversed.reverse();
        assert_eq!(aggregate(&reversed).unwrap(), forward);

        let mut rotated = sample();
        rotated.rotate_left(2);
        assert_eq!(aggregate(&rotated).unwrap(), forward);
    }

    #[test]
    fn test_merge_matches_single_pass() {
        let all = sample();
        let mut left = MonthlyAggregator::new();
        let mut right = MonthlyAggregator::new();
        for (i, t) in all.iter().enumerate() {
            if i % 2 == 0 {
                left.add(t).unwrap();
            } else {
                right.add(t).unwrap();
            }
        }
        left.merge(right);
        assert_eq!(left.finish(), aggregate(&all).unwrap());
    }

    #[test]
    fn test_empty_input_has_no_buckets() {
        let buckets = aggregate(std::iter::empty::<&CanonicalTransaction>()).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_refuses_unresolved() {
        let mut t = txn("9", AccountId::Am, (2024, 6, 1), 1, 0);
        t.account_id = None;
        assert_eq!(
            aggregate([&t]),
            Err(AggregateError::Unresolved {
                identifier: "9".to_string()
            })
        );

        let mut t = txn("10", AccountId::Am, (2024, 6, 1), 1, 0);
        t.profit_amount = None;
        assert_eq!(aggregate([&t]).unwrap_err().identifier(), "10");
    }
}
