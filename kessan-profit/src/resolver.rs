//! Account Resolver: attaches the owning account to a transaction.

use kessan_core::{AccountId, CanonicalTransaction, EngineConfig, ResolutionError};

/// Resolves upload-slot tags and embedded row markers to accounts.
///
/// The slot decides by default. A row marker that names a known account
/// must agree with it; disagreement is reported, never silently resolved.
#[derive(Debug, Clone, Copy)]
pub struct AccountResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> AccountResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    pub fn tag(&self, tag: &str) -> Result<AccountId, ResolutionError> {
        self.config
            .resolve_tag(tag)
            .ok_or_else(|| ResolutionError::UnknownAccountTag {
                tag: tag.to_string(),
            })
    }

    pub fn resolve(
        &self,
        mut txn: CanonicalTransaction,
        slot_tag: &str,
    ) -> Result<CanonicalTransaction, ResolutionError> {
        let slot = self.tag(slot_tag)?;
        let account = match txn.account_marker.as_deref() {
            Some(marker) if !marker.trim().is_empty() => {
                let marker = self.tag(marker)?;
                if marker != slot {
                    return Err(ResolutionError::AccountMarkerMismatch { marker, slot });
                }
                marker
            }
            _ => slot,
        };
        txn.account_id = Some(account);
        Ok(txn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kessan_core::{FeeBreakdown, RowOrigin, SalesChannel, SourceSchema};
    use std::collections::BTreeMap;

    fn txn(marker: Option<&str>) -> CanonicalTransaction {
        let t = CanonicalTransaction::new(
            SourceSchema::HanroPlus,
            "HP-1",
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            1000,
            FeeBreakdown::default(),
            SalesChannel::Amazon,
            RowOrigin {
                file: "hanro.csv".to_string(),
                line: 2,
            },
        );
        match marker {
            Some(m) => t.with_account_marker(m),
            None => t,
        }
    }

    #[test]
    fn test_slot_decides_without_marker() {
        let config = EngineConfig::default();
        let resolver = AccountResolver::new(&config);
        let resolved = resolver.resolve(txn(None), "o-aa").unwrap();
        assert_eq!(resolved.account_id, Some(AccountId::Oaa));
    }

    #[test]
    fn test_agreeing_marker_accepted() {
        let config = EngineConfig::default();
        let resolver = AccountResolver::new(&config);
        let resolved = resolver.resolve(txn(Some("a_m")), "A_M").unwrap();
        assert_eq!(resolved.account_id, Some(AccountId::Am));
    }

    #[test]
    fn test_marker_mismatch_reported() {
        let config = EngineConfig::default();
        let resolver = AccountResolver::new(&config);
        assert_eq!(
            resolver.resolve(txn(Some("O_AA")), "A_M"),
            Err(ResolutionError::AccountMarkerMismatch {
                marker: AccountId::Oaa,
                slot: AccountId::Am,
            })
        );
    }

    #[test]
    fn test_unknown_tags() {
        let config = EngineConfig::default();
        let resolver = AccountResolver::new(&config);
        assert_eq!(
            resolver.resolve(txn(None), "shop3"),
            Err(ResolutionError::UnknownAccountTag {
                tag: "shop3".to_string()
            })
        );
        assert_eq!(
            resolver.resolve(txn(Some("???")), "A_M"),
            Err(ResolutionError::UnknownAccountTag {
                tag: "???".to_string()
            })
        );
    }

    #[test]
    fn test_configured_alias() {
        let mut config = EngineConfig::default();
        config.accounts.aliases = BTreeMap::from([("amazon2".to_string(), AccountId::Oaa)]);
        let resolver = AccountResolver::new(&config);
        let resolved = resolver.resolve(txn(Some("Amazon2")), "o_aa").unwrap();
        assert_eq!(resolved.account_id, Some(AccountId::Oaa));
    }
}
