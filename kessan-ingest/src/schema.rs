//! Schema descriptors: everything that differs between export formats, as
//! data. Adding a format means adding a descriptor under `parsers/`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use kessan_core::{FeeCategory, ParseError, SalesChannel, SourceSchema};

use crate::parsers;
use crate::types::{RawRow, TextEncoding};

/// A source column and the header spellings it has been seen under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Canonical header, used in diagnostics.
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub required: bool,
}

impl Column {
    pub const fn required(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self {
            name,
            aliases,
            required: false,
        }
    }

    fn spellings(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    pub fn is_present(&self, headers: &[String]) -> bool {
        self.spellings().any(|s| headers.iter().any(|h| h == s))
    }

    /// The row's value under the first spelling present, trimmed.
    pub fn value<'r>(&self, row: &'r RawRow) -> Option<&'r str> {
        self.spellings().find_map(|s| row.get(s)).map(str::trim)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Add,
    Subtract,
}

/// A column contributing to revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueComponent {
    pub column: Column,
    pub sign: Sign,
}

/// A column contributing to one fee category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeComponent {
    pub column: Column,
    pub category: FeeCategory,
}

/// Percentage fee applied to revenue when the `replaces` amount cell is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRate {
    pub column: Column,
    pub replaces: Column,
    pub category: FeeCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRule {
    Fixed(SalesChannel),
    /// Read a mall label; blank cells fall back to `default`.
    FromColumn {
        column: Column,
        default: SalesChannel,
    },
}

impl ChannelRule {
    pub fn resolve(&self, row: &RawRow) -> SalesChannel {
        match self {
            ChannelRule::Fixed(channel) => *channel,
            ChannelRule::FromColumn { column, default } => match column.value(row) {
                Some(label) if !label.is_empty() => SalesChannel::from_label(label),
                _ => *default,
            },
        }
    }

    fn column(&self) -> Option<&Column> {
        match self {
            ChannelRule::Fixed(_) => None,
            ChannelRule::FromColumn { column, .. } => Some(column),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    Date(&'static str),
    /// Date with a time part; the time is dropped.
    DateTime(&'static str),
    /// RFC 3339 timestamp; the wall-clock date in its own offset is kept.
    Rfc3339,
}

impl DateFormat {
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        match self {
            DateFormat::Date(fmt) => NaiveDate::parse_from_str(raw, fmt).ok(),
            DateFormat::DateTime(fmt) => NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.date()),
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub schema: SourceSchema,
    /// Detection order.
    pub encodings: &'static [TextEncoding],
    pub identifier: Column,
    pub date: Column,
    pub date_formats: &'static [DateFormat],
    pub revenue: &'static [RevenueComponent],
    pub fees: &'static [FeeComponent],
    pub fee_rate: Option<FeeRate>,
    pub channel: ChannelRule,
    /// Column naming the account a row belongs to, if the export has one.
    pub account_marker: Option<Column>,
}

impl SchemaDescriptor {
    pub fn for_schema(schema: SourceSchema) -> &'static SchemaDescriptor {
        match schema {
            SourceSchema::Makado => &parsers::makado::DESCRIPTOR,
            SourceSchema::MercariShop => &parsers::mercari_shop::DESCRIPTOR,
            SourceSchema::HanroPlus => &parsers::hanro_plus::DESCRIPTOR,
        }
    }

    /// Every column the descriptor knows about.
    pub fn columns(&self) -> Vec<&Column> {
        let mut out = vec![&self.identifier, &self.date];
        out.extend(self.revenue.iter().map(|c| &c.column));
        out.extend(self.fees.iter().map(|c| &c.column));
        if let Some(rate) = &self.fee_rate {
            out.push(&rate.column);
        }
        out.extend(self.channel.column());
        out.extend(self.account_marker.as_ref());
        out
    }

    /// Fail on the first required column the header lacks.
    pub fn check_header(&self, headers: &[String]) -> Result<(), ParseError> {
        match self
            .columns()
            .into_iter()
            .find(|c| c.required && !c.is_present(headers))
        {
            Some(missing) => Err(ParseError::MissingRequiredColumn {
                column: missing.name.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        self.date_formats.iter().find_map(|f| f.parse(raw))
    }
}
