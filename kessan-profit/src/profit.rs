//! Profit Calculator.

use kessan_core::CanonicalTransaction;

/// Fill `profit_amount` with `revenue_amount - fee_amount`.
pub fn calculate(mut txn: CanonicalTransaction) -> CanonicalTransaction {
    txn.profit_amount = Some(txn.revenue_amount - txn.fee_amount);
    txn
}
