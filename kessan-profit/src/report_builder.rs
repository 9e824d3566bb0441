//! Report Builder: orders buckets and assembles the final [`Report`].

use kessan_core::{
    AccountId, BucketKey, Diagnostic, FileSummary, MonthOverMonth, MonthlyBucket, Report, Summary,
    Totals,
};
use std::collections::{BTreeMap, BTreeSet};

pub fn build(
    buckets: BTreeMap<BucketKey, Totals>,
    files: Vec<FileSummary>,
    mut diagnostics: Vec<Diagnostic>,
) -> Report {
    // BucketKey orders by account, then year and month.
    let mut ordered = Vec::with_capacity(buckets.len());
    let mut previous: Option<(AccountId, Totals)> = None;
    let mut grand = Totals::default();
    let mut by_account: BTreeMap<AccountId, Totals> = BTreeMap::new();
    let mut months = BTreeSet::new();

    for (key, totals) in buckets {
        let change = match previous {
            Some((account, prev)) if account == key.account_id => {
                MonthOverMonth::between(&prev, &totals)
            }
            _ => MonthOverMonth::default(),
        };
        previous = Some((key.account_id, totals));

        grand.merge(&totals);
        by_account.entry(key.account_id).or_default().merge(&totals);
        months.insert(key.period());

        ordered.push(MonthlyBucket {
            key,
            period: key.period(),
            totals,
            change,
        });
    }

    // Input file order, then line; file-level entries without a line first.
    let position = |name: &str| files.iter().position(|f| f.file == name);
    diagnostics.sort_by_key(|d| (position(&d.file), d.line));

    Report {
        buckets: ordered,
        summary: Summary {
            totals: grand,
            by_account,
            months: months.into_iter().collect(),
            profit_margin_bp: grand.profit_margin_bp(),
        },
        files,
        diagnostics,
    }
}
