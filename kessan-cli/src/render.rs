//! Plain-text rendering of reports and diagnostics for the terminal.

use kessan_core::{Diagnostic, FileSummary, MonthlyBucket, Report};
use std::fmt::Write;

/// `1234567` -> `¥1,234,567`
pub fn yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-¥{grouped}")
    } else {
        format!("¥{grouped}")
    }
}

/// Basis points as a signed percentage with two decimals.
pub fn percent(bp: Option<i64>) -> String {
    match bp {
        Some(bp) => {
            let sign = if bp < 0 { "-" } else { "" };
            let abs = bp.unsigned_abs();
            format!("{sign}{}.{:02}%", abs / 100, abs % 100)
        }
        None => "-".to_string(),
    }
}

fn bucket_line(b: &MonthlyBucket) -> String {
    format!(
        "{:<5} {}  n={:<4} revenue={:>14} fees={:>12} profit={:>14} mom={}",
        b.key.account_id.as_str(),
        b.period,
        b.totals.transaction_count,
        yen(b.totals.revenue_sum),
        yen(b.totals.fee_sum),
        yen(b.totals.profit_sum),
        percent(b.change.revenue_change_bp),
    )
}

fn file_line(f: &FileSummary) -> String {
    let status = if f.failed { "FAILED" } else { "ok" };
    format!(
        "{} [{} -> {}] {} encoding={} read={} accepted={} rejected={}",
        f.file,
        f.schema,
        f.account_slot,
        status,
        f.encoding.as_deref().unwrap_or("-"),
        f.rows_read,
        f.rows_accepted,
        f.rows_rejected,
    )
}

pub fn diagnostic_line(d: &Diagnostic) -> String {
    let mut s = d.file.clone();
    if let Some(line) = d.line {
        let _ = write!(s, ":{line}");
    }
    if let Some(id) = &d.identifier {
        let _ = write!(s, " ({id})");
    }
    let _ = write!(s, " {}: {}", d.code, d.message);
    s
}

pub fn report(r: &Report) -> String {
    let mut out = String::new();

    out.push_str("Files\n");
    for f in &r.files {
        let _ = writeln!(out, "  {}", file_line(f));
    }

    out.push_str("\nMonthly buckets\n");
    if r.buckets.is_empty() {
        out.push_str("  (none)\n");
    }
    for b in &r.buckets {
        let _ = writeln!(out, "  {}", bucket_line(b));
    }

    let s = &r.summary;
    out.push_str("\nSummary\n");
    for (account, t) in &s.by_account {
        let _ = writeln!(
            out,
            "  {:<5} n={:<4} revenue={:>14} fees={:>12} profit={:>14}",
            account.as_str(),
            t.transaction_count,
            yen(t.revenue_sum),
            yen(t.fee_sum),
            yen(t.profit_sum),
        );
    }
    let _ = writeln!(
        out,
        "  total n={} revenue={} fees={} profit={} margin={}",
        s.totals.transaction_count,
        yen(s.totals.revenue_sum),
        yen(s.totals.fee_sum),
        yen(s.totals.profit_sum),
        percent(s.profit_margin_bp),
    );

    if !r.diagnostics.is_empty() {
        let _ = writeln!(out, "\nExcluded ({})", r.diagnostics.len());
        for d in &r.diagnostics {
            let _ = writeln!(out, "  {}", diagnostic_line(d));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kessan_core::{ParseError, RowError};

    #[test]
    fn test_yen_grouping() {
        assert_eq!(yen(0), "¥0");
        assert_eq!(yen(999), "¥999");
        assert_eq!(yen(1_000), "¥1,000");
        assert_eq!(yen(1_234_567), "¥1,234,567");
        assert_eq!(yen(-13_200), "-¥13,200");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(Some(8_800)), "88.00%");
        assert_eq!(percent(Some(-3_333)), "-33.33%");
        assert_eq!(percent(Some(5)), "0.05%");
        assert_eq!(percent(None), "-");
    }

    #[test]
    fn test_diagnostic_line() {
        let row = Diagnostic::for_row(
            "makado.csv",
            3,
            Some("250-1".to_string()),
            &RowError::ColumnCount {
                expected: 8,
                found: 7,
            },
        );
        assert_eq!(
            diagnostic_line(&row),
            "makado.csv:3 (250-1) column_count: expected 8 fields, found 7"
        );

        let file = Diagnostic::for_file("empty.csv", &ParseError::EmptyFile);
        assert_eq!(diagnostic_line(&file), "empty.csv empty_file: file is empty");
    }
}
