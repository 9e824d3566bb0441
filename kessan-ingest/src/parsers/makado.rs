//! マカド sales export
//!
//! Excel-saved files arrive as Shift_JIS; newer downloads are UTF-8.
//!
//!   注文番号,注文日,販売価格,送料,ポイント,割引,Amazon手数料,FBA手数料
//!   250-1234567-1234567,2024/06/01,"¥10,000",0,100,0,"-1,000",434

use kessan_core::{FeeCategory, SalesChannel, SourceSchema};

use crate::schema::{
    ChannelRule, Column, DateFormat, FeeComponent, RevenueComponent, SchemaDescriptor, Sign,
};
use crate::types::TextEncoding;

pub static DESCRIPTOR: SchemaDescriptor = SchemaDescriptor {
    schema: SourceSchema::Makado,
    encodings: &[TextEncoding::Utf8, TextEncoding::ShiftJis],
    identifier: Column::required("注文番号", &["オーダーID", "order-id"]),
    date: Column::required("注文日", &["購入日", "注文日時"]),
    date_formats: &[
        DateFormat::Date("%Y/%m/%d"),
        DateFormat::DateTime("%Y/%m/%d %H:%M:%S"),
        DateFormat::DateTime("%Y/%m/%d %H:%M"),
        DateFormat::Date("%Y-%m-%d"),
    ],
    revenue: &[
        RevenueComponent {
            column: Column::required("販売価格", &["売上"]),
            sign: Sign::Add,
        },
        RevenueComponent {
            column: Column::optional("送料", &["配送料"]),
            sign: Sign::Add,
        },
        RevenueComponent {
            column: Column::optional("ポイント", &[]),
            sign: Sign::Subtract,
        },
        RevenueComponent {
            column: Column::optional("割引", &["プロモーション割引"]),
            sign: Sign::Subtract,
        },
    ],
    fees: &[
        FeeComponent {
            column: Column::required("Amazon手数料", &["販売手数料"]),
            category: FeeCategory::Commission,
        },
        FeeComponent {
            column: Column::optional("FBA手数料", &["FBA出荷手数料"]),
            category: FeeCategory::Fulfillment,
        },
    ],
    fee_rate: None,
    channel: ChannelRule::Fixed(SalesChannel::Amazon),
    account_marker: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::parser::read_rows;
    use crate::types::SourceFile;
    use encoding_rs::SHIFT_JIS;
    use kessan_core::Limits;

    const SAMPLE: &str = "\
注文番号,注文日,販売価格,送料,ポイント,割引,Amazon手数料,FBA手数料
250-0000000-0000001,2024/06/01,\"¥10,000\",0,0,0,\"-1,000\",200
250-0000000-0000002,2024/06/15 10:22:01,5000,,,,500,100
";

    fn transactions(bytes: Vec<u8>) -> Vec<kessan_core::CanonicalTransaction> {
        let file = SourceFile::new("makado.csv", bytes, SourceSchema::Makado, "A_M");
        read_rows(&file, &Limits::default())
            .unwrap()
            .map(|r| normalize(&r.unwrap(), &DESCRIPTOR, &file.name).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_makado_utf8() {
        let txns = transactions(SAMPLE.as_bytes().to_vec());
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].revenue_amount, 10_000);
        assert_eq!(txns[0].fee_amount, 1_200);
        assert_eq!(txns[1].revenue_amount, 5_000);
        assert_eq!(txns[1].fee_amount, 600);
        assert_eq!(txns[1].origin.line, 3);
    }

    #[test]
    fn test_parse_makado_shift_jis() {
        let (bytes, _, had_errors) = SHIFT_JIS.encode(SAMPLE);
        assert!(!had_errors);
        let txns = transactions(bytes.into_owned());
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].raw_identifier, "250-0000000-0000001");
        assert_eq!(txns[0].revenue_amount, 10_000);
    }
}
