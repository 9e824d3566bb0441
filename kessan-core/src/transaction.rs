//! Canonical transaction model shared by every export schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::account::AccountId;

/// The three supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceSchema {
    /// マカド (Amazon sales management tool)
    Makado,
    /// メルカリShops order export
    MercariShop,
    /// 販路プラス multi-channel order export
    HanroPlus,
}

impl SourceSchema {
    pub const ALL: [SourceSchema; 3] = [
        SourceSchema::Makado,
        SourceSchema::MercariShop,
        SourceSchema::HanroPlus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSchema::Makado => "MAKADO",
            SourceSchema::MercariShop => "MERCARI_SHOP",
            SourceSchema::HanroPlus => "HANRO_PLUS",
        }
    }
}

impl fmt::Display for SourceSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSchema {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "makado" | "makad" => Ok(SourceSchema::Makado),
            "mercari_shop" | "mercari_shops" | "mercari" => Ok(SourceSchema::MercariShop),
            "hanro_plus" | "hanro" => Ok(SourceSchema::HanroPlus),
            other => Err(format!("unknown schema: {other}")),
        }
    }
}

/// Marketplace a sale went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesChannel {
    Amazon,
    Mercari,
    Other,
}

impl SalesChannel {
    /// Map a free-text mall label (`amazon`, `Mercari`, ...) to a channel.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.contains("amazon") || label.contains("アマゾン") {
            SalesChannel::Amazon
        } else if label.contains("mercari") || label.contains("メルカリ") {
            SalesChannel::Mercari
        } else {
            SalesChannel::Other
        }
    }
}

/// Fee categories a schema's fee columns decompose into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeCategory {
    /// Platform selling / referral fee
    Commission,
    /// Fulfilment-service fee (FBA and the like)
    Fulfillment,
    Shipping,
    Other,
}

/// Per-category fee amounts, all non-negative yen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub commission: i64,
    pub fulfillment: i64,
    pub shipping: i64,
    pub other: i64,
}

impl FeeBreakdown {
    pub fn get(&self, category: FeeCategory) -> i64 {
        match category {
            FeeCategory::Commission => self.commission,
            FeeCategory::Fulfillment => self.fulfillment,
            FeeCategory::Shipping => self.shipping,
            FeeCategory::Other => self.other,
        }
    }

    pub fn add(&mut self, category: FeeCategory, amount: i64) {
        match category {
            FeeCategory::Commission => self.commission += amount,
            FeeCategory::Fulfillment => self.fulfillment += amount,
            FeeCategory::Shipping => self.shipping += amount,
            FeeCategory::Other => self.other += amount,
        }
    }

    pub fn merge(&mut self, other: &FeeBreakdown) {
        self.commission += other.commission;
        self.fulfillment += other.fulfillment;
        self.shipping += other.shipping;
        self.other += other.other;
    }

    pub fn total(&self) -> i64 {
        self.commission + self.fulfillment + self.shipping + self.other
    }
}

/// Where a row came from, for diagnostics and traceability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowOrigin {
    pub file: String,
    /// 1-based line of the record in the source file (header is line 1).
    pub line: u64,
}

/// One sale event after normalisation.
///
/// `account_id` is filled by the account resolver and `profit_amount` by the
/// profit calculator; aggregation refuses transactions missing either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub source_schema: SourceSchema,
    pub account_id: Option<AccountId>,
    pub order_date: NaiveDate,
    /// Signed yen.
    pub revenue_amount: i64,
    /// Non-negative yen, always equal to `fees.total()`.
    pub fee_amount: i64,
    pub fees: FeeBreakdown,
    pub profit_amount: Option<i64>,
    pub channel: SalesChannel,
    /// Order id from the export.
    pub raw_identifier: String,
    /// Account marker embedded in the row, if the schema carries one.
    pub account_marker: Option<String>,
    pub origin: RowOrigin,
}

impl CanonicalTransaction {
    /// Create an unresolved transaction; `fee_amount` is derived from `fees`.
    pub fn new(
        source_schema: SourceSchema,
        raw_identifier: impl Into<String>,
        order_date: NaiveDate,
        revenue_amount: i64,
        fees: FeeBreakdown,
        channel: SalesChannel,
        origin: RowOrigin,
    ) -> Self {
        Self {
            source_schema,
            account_id: None,
            order_date,
            revenue_amount,
            fee_amount: fees.total(),
            fees,
            profit_amount: None,
            channel,
            raw_identifier: raw_identifier.into(),
            account_marker: None,
            origin,
        }
    }

    pub fn with_account_marker(mut self, marker: impl Into<String>) -> Self {
        self.account_marker = Some(marker.into());
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.account_id.is_some()
    }
}
