//! メルカリShops order export
//!
//!   注文ID,注文日時,売上金額(税込),販売手数料(税込),販売手数料率,送料
//!   m-0001,2024-06-10 12:00:00,3300,330,10%,210
//!
//! Older exports leave the fee cell empty and only carry the rate.

use kessan_core::{FeeCategory, SalesChannel, SourceSchema};

use crate::schema::{
    ChannelRule, Column, DateFormat, FeeComponent, FeeRate, RevenueComponent, SchemaDescriptor,
    Sign,
};
use crate::types::TextEncoding;

const COMMISSION: Column = Column::optional("販売手数料(税込)", &["販売手数料"]);

pub static DESCRIPTOR: SchemaDescriptor = SchemaDescriptor {
    schema: SourceSchema::MercariShop,
    encodings: &[TextEncoding::Utf8, TextEncoding::ShiftJis],
    identifier: Column::required("注文ID", &["取引ID"]),
    date: Column::required("注文日時", &["購入日時"]),
    date_formats: &[
        DateFormat::DateTime("%Y-%m-%d %H:%M:%S"),
        DateFormat::DateTime("%Y/%m/%d %H:%M"),
        DateFormat::DateTime("%Y/%m/%d %H:%M:%S"),
        DateFormat::Date("%Y-%m-%d"),
    ],
    revenue: &[RevenueComponent {
        column: Column::required("売上金額(税込)", &["商品価格(税込)", "販売価格"]),
        sign: Sign::Add,
    }],
    fees: &[
        FeeComponent {
            column: COMMISSION,
            category: FeeCategory::Commission,
        },
        FeeComponent {
            column: Column::optional("送料", &["配送料"]),
            category: FeeCategory::Shipping,
        },
    ],
    fee_rate: Some(FeeRate {
        column: Column::optional("販売手数料率", &[]),
        replaces: COMMISSION,
        category: FeeCategory::Commission,
    }),
    channel: ChannelRule::Fixed(SalesChannel::Mercari),
    account_marker: None,
};
