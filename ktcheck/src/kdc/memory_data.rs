use super::{keytab_entries, random_keys, Kdc, PrincipalFilter};
use crate::{Keyblock, Keytab, Kvno, Principal};
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

/// An in-process principal database.
#[derive(Debug, Default)]
pub struct MemoryKdc {
    principals: Mutex<BTreeMap<String, PrincipalRecord>>,
}

#[derive(Debug, Clone)]
struct PrincipalRecord {
    principal: Principal,
    vno: Kvno,
    keys: Vec<Keyblock>,
}

impl MemoryKdc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principals<'a>(principals: impl IntoIterator<Item = &'a Principal>) -> Self {
        let records = principals
            .into_iter()
            .map(|principal| (principal.full(), PrincipalRecord::new(principal)))
            .collect();
        Self {
            principals: Mutex::new(records),
        }
    }

    fn principals(&self) -> anyhow::Result<MutexGuard<'_, BTreeMap<String, PrincipalRecord>>> {
        self.principals
            .lock()
            .map_err(|_| anyhow::anyhow!("principal database lock poisoned"))
    }
}

impl PrincipalRecord {
    fn new(principal: &Principal) -> Self {
        Self {
            principal: principal.clone(),
            vno: 1,
            keys: random_keys(),
        }
    }
}

impl Kdc for MemoryKdc {
    fn has_principal(&self, principal: &Principal) -> anyhow::Result<bool> {
        Ok(self.principals()?.contains_key(&principal.full()))
    }

    fn list_principals(&self, filter: &PrincipalFilter) -> anyhow::Result<Vec<Principal>> {
        Ok(self
            .principals()?
            .iter()
            .filter(|(name, _)| filter.is_match(name))
            .map(|(_, record)| record.principal.clone())
            .collect())
    }

    fn add_missing_principals(&self, principals: &[Principal]) -> anyhow::Result<()> {
        let mut records = self.principals()?;
        for principal in principals {
            records.entry(principal.full()).or_insert_with(|| {
                debug!(%principal, "adding principal");
                PrincipalRecord::new(principal)
            });
        }
        Ok(())
    }

    fn delete_principals(&self, principals: &[Principal]) -> anyhow::Result<()> {
        let mut records = self.principals()?;
        for principal in principals {
            if records.remove(&principal.full()).is_some() {
                debug!(%principal, "deleted principal");
            }
        }
        Ok(())
    }

    fn export_keytab(&self, principals: &[Principal]) -> anyhow::Result<Vec<u8>> {
        let records = self.principals()?;
        let mut keytab = Keytab::new();
        for principal in principals {
            let record = records
                .get(&principal.full())
                .ok_or_else(|| anyhow::anyhow!("Principal '{}' does not exist", principal))?;
            keytab
                .entries
                .extend(keytab_entries(&record.principal, record.vno, &record.keys)?);
        }
        keytab.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keytab_checksum, KeyIndex};

    fn principal(name: &str) -> Principal {
        name.parse().unwrap()
    }

    #[test]
    fn adds_and_deletes_idempotently() {
        let kdc = MemoryKdc::new();
        let alice = principal("alice@EXAMPLE.COM");
        let service = principal("svc/host@EXAMPLE.COM");

        kdc.add_missing_principals(&[alice.clone(), service.clone()]).unwrap();
        let checksum = |kdc: &MemoryKdc| {
            keytab_checksum(&kdc.export_keytab(&[alice.clone()]).unwrap(), &[alice.clone()]).unwrap()
        };
        let before = checksum(&kdc);
        kdc.add_missing_principals(&[alice.clone()]).unwrap();
        // Re-adding an existing principal keeps its keys.
        assert_eq!(checksum(&kdc), before);

        kdc.delete_principals(&[service.clone(), service.clone()]).unwrap();
        assert!(kdc.has_principal(&alice).unwrap());
        assert!(!kdc.has_principal(&service).unwrap());
    }

    #[test]
    fn lists_sorted_by_canonical_name() {
        let kdc = MemoryKdc::with_principals(&[
            principal("zed@EXAMPLE.COM"),
            principal("HTTP/web@EXAMPLE.COM"),
            principal("alice@EXAMPLE.ORG"),
        ]);
        let names: Vec<String> = kdc
            .list_principals(&PrincipalFilter::new("*@EXAMPLE.COM").unwrap())
            .unwrap()
            .iter()
            .map(Principal::full)
            .collect();
        assert_eq!(names, ["HTTP/web@EXAMPLE.COM", "zed@EXAMPLE.COM"]);
    }

    #[test]
    fn exports_every_key_of_the_requested_principals() {
        let service = principal("svc/host@EXAMPLE.COM");
        let kdc = MemoryKdc::with_principals(&[service.clone(), principal("other@EXAMPLE.COM")]);
        let keytab = Keytab::parse(&kdc.export_keytab(&[service.clone()]).unwrap()).unwrap();
        assert_eq!(keytab.len(), 2);

        let index = KeyIndex::from(&keytab);
        assert_eq!(index.len(), 1);
        assert_eq!(index.keys(&service).unwrap().len(), 2);

        assert!(kdc.export_keytab(&[principal("ghost@EXAMPLE.COM")]).is_err());
    }
}
