//! Raw row to [`CanonicalTransaction`], driven by the schema descriptor.

use kessan_core::money::{apply_rate, parse_rate_bp, parse_yen};
use kessan_core::{
    AmountError, CanonicalTransaction, FeeBreakdown, NormalizationError, RowOrigin,
};

use crate::schema::{Column, SchemaDescriptor, Sign};
use crate::types::RawRow;

fn invalid_amount(column: &Column, value: &str, reason: AmountError) -> NormalizationError {
    NormalizationError::InvalidAmount {
        column: column.name.to_string(),
        value: value.to_string(),
        reason,
    }
}

/// Parse a yen cell. Blank optional cells read as zero.
fn amount(row: &RawRow, column: &Column) -> Result<i64, NormalizationError> {
    match column.value(row) {
        Some(v) if !v.is_empty() => parse_yen(v).map_err(|e| invalid_amount(column, v, e)),
        _ if column.required => Err(invalid_amount(column, "", AmountError::Empty)),
        _ => Ok(0),
    }
}

fn is_blank(row: &RawRow, column: &Column) -> bool {
    column.value(row).is_none_or(str::is_empty)
}

pub fn normalize(
    row: &RawRow,
    descriptor: &SchemaDescriptor,
    file: &str,
) -> Result<CanonicalTransaction, NormalizationError> {
    let identifier = match descriptor.identifier.value(row) {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(NormalizationError::MissingIdentifier {
                column: descriptor.identifier.name.to_string(),
            });
        }
    };

    let raw_date = descriptor.date.value(row).unwrap_or_default();
    let order_date =
        descriptor
            .parse_date(raw_date)
            .ok_or_else(|| NormalizationError::InvalidDate {
                column: descriptor.date.name.to_string(),
                value: raw_date.to_string(),
            })?;

    let mut revenue: i64 = 0;
    for component in descriptor.revenue {
        let value = amount(row, &component.column)?;
        let next = match component.sign {
            Sign::Add => revenue.checked_add(value),
            Sign::Subtract => revenue.checked_sub(value),
        };
        revenue = next.ok_or_else(|| {
            invalid_amount(
                &component.column,
                component.column.value(row).unwrap_or_default(),
                AmountError::OutOfRange,
            )
        })?;
    }

    let mut fees = FeeBreakdown::default();
    for component in descriptor.fees {
        // Exports disagree on the sign of deductions; fees are magnitudes.
        fees.add(component.category, amount(row, &component.column)?.abs());
    }

    if let Some(rate) = &descriptor.fee_rate {
        if is_blank(row, &rate.replaces) && !is_blank(row, &rate.column) {
            let raw = rate.column.value(row).unwrap_or_default();
            let fee = parse_rate_bp(raw)
                .and_then(|bp| apply_rate(revenue, bp))
                .map_err(|e| invalid_amount(&rate.column, raw, e))?;
            fees.add(rate.category, fee.abs());
        }
    }

    let txn = CanonicalTransaction::new(
        descriptor.schema,
        identifier,
        order_date,
        revenue,
        fees,
        descriptor.channel.resolve(row),
        RowOrigin {
            file: file.to_string(),
            line: row.line,
        },
    );

    Ok(match &descriptor.account_marker {
        Some(col) => match col.value(row) {
            Some(marker) if !marker.is_empty() => txn.with_account_marker(marker),
            _ => txn,
        },
        None => txn,
    })
}
