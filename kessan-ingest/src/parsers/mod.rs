//! Export schemas, one descriptor per file.

pub mod hanro_plus;
pub mod makado;
pub mod mercari_shop;
