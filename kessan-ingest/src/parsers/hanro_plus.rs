//! 販路プラス multi-channel export (UTF-8 only)
//!
//!   orderId,orderedAt,mall,account,netPrice,commission,shippingFee,otherFee
//!   HP-1,2024-06-01T10:00:00+09:00,amazon,A_M,8000,800,0,0
//!
//! `account` names the store the order belongs to and is checked against the
//! upload slot.

use kessan_core::{FeeCategory, SalesChannel, SourceSchema};

use crate::schema::{
    ChannelRule, Column, DateFormat, FeeComponent, RevenueComponent, SchemaDescriptor, Sign,
};
use crate::types::TextEncoding;

pub static DESCRIPTOR: SchemaDescriptor = SchemaDescriptor {
    schema: SourceSchema::HanroPlus,
    encodings: &[TextEncoding::Utf8],
    identifier: Column::required("orderId", &["order_id"]),
    date: Column::required("orderedAt", &["ordered_at", "orderDate"]),
    date_formats: &[
        DateFormat::Rfc3339,
        DateFormat::DateTime("%Y-%m-%d %H:%M:%S"),
        DateFormat::DateTime("%Y-%m-%dT%H:%M:%S"),
        DateFormat::Date("%Y-%m-%d"),
    ],
    revenue: &[RevenueComponent {
        column: Column::required("netPrice", &["net_price"]),
        sign: Sign::Add,
    }],
    fees: &[
        FeeComponent {
            column: Column::required("commission", &[]),
            category: FeeCategory::Commission,
        },
        FeeComponent {
            column: Column::optional("shippingFee", &["shipping_fee"]),
            category: FeeCategory::Shipping,
        },
        FeeComponent {
            column: Column::optional("otherFee", &["other_fee"]),
            category: FeeCategory::Other,
        },
    ],
    fee_rate: None,
    channel: ChannelRule::FromColumn {
        column: Column::optional("mall", &["channel"]),
        default: SalesChannel::Amazon,
    },
    account_marker: Some(Column::optional("account", &["accountId"])),
};
