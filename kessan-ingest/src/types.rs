use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use kessan_core::SourceSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One uploaded export: its bytes, declared schema and the account slot it
/// was uploaded into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub schema: SourceSchema,
    /// Slot tag as declared by the uploader (`a_m`, `o_aa`, ...).
    pub account_slot: String,
}

impl SourceFile {
    pub fn new(
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        schema: SourceSchema,
        account_slot: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            schema,
            account_slot: account_slot.into(),
        }
    }
}

/// Text encodings the exports are known to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    /// Windows-31J / CP932, the usual encoding of Japanese Excel exports.
    ShiftJis,
}

impl TextEncoding {
    pub fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::ShiftJis => SHIFT_JIS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::ShiftJis => "Shift_JIS",
        }
    }

    /// Decode without replacement; `None` if any byte sequence is malformed.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|s| s.into_owned())
    }
}

/// A data row keyed by header name. Lives only inside one parser pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line where the record starts (header is line 1).
    pub line: u64,
    pub fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}
