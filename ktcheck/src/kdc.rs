mod file_data;
mod memory_data;

pub use self::{file_data::FileKdc, memory_data::MemoryKdc};
use crate::{
    Enctype, Keyblock, KeytabEntry, Kvno, Principal, Timestamp, ENCTYPE_AES128_CTS_HMAC_SHA1_96,
    ENCTYPE_AES256_CTS_HMAC_SHA1_96,
};
use anyhow::Context as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use regex::Regex;

/// Enctypes and key sizes generated for new or re-keyed principals.
const KEY_ENCTYPES: [(Enctype, usize); 2] = [
    (ENCTYPE_AES256_CTS_HMAC_SHA1_96, 32),
    (ENCTYPE_AES128_CTS_HMAC_SHA1_96, 16),
];

const MATCH_ALL: &str = "*";

/// The principal database of a Key Distribution Center.
pub trait Kdc: Send + Sync {
    /// Returns whether `principal` is registered.
    fn has_principal(&self, principal: &Principal) -> anyhow::Result<bool>;

    /// Lists the principals whose canonical name matches `filter`.
    fn list_principals(&self, filter: &PrincipalFilter) -> anyhow::Result<Vec<Principal>>;

    /// Registers the principals that are not there yet.
    fn add_missing_principals(&self, principals: &[Principal]) -> anyhow::Result<()>;

    /// Removes the principals, ignoring the ones already absent.
    fn delete_principals(&self, principals: &[Principal]) -> anyhow::Result<()>;

    /// Exports a keytab holding the keys of `principals`.
    fn export_keytab(&self, principals: &[Principal]) -> anyhow::Result<Vec<u8>>;
}

/// A compiled `list_principals` expression in kadmin style, where `*`
/// matches any run of characters and `?` exactly one. An empty expression
/// matches everything.
#[derive(Debug, Clone)]
pub struct PrincipalFilter {
    regex: Regex,
}

impl PrincipalFilter {
    pub fn new(filter: &str) -> anyhow::Result<Self> {
        let filter = if filter.is_empty() { MATCH_ALL } else { filter };
        let pattern = regex::escape(filter)
            .replace(r"\*", ".*")
            .replace(r"\?", ".");
        let regex = Regex::new(&format!("^{}$", pattern))
            .with_context(|| format!("Invalid principal filter '{}'", filter))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

fn random_keys() -> Vec<Keyblock> {
    let mut rng = rand::thread_rng();
    KEY_ENCTYPES
        .iter()
        .map(|(enctype, size)| {
            let mut contents = vec![0; *size];
            rng.fill_bytes(&mut contents);
            Keyblock {
                enctype: *enctype,
                contents,
            }
        })
        .collect()
}

fn keytab_entries(
    principal: &Principal,
    vno: Kvno,
    keys: &[Keyblock],
) -> anyhow::Result<Vec<KeytabEntry>> {
    let timestamp = keytab_timestamp(Utc::now())?;
    Ok(keys
        .iter()
        .map(|key| KeytabEntry {
            principal: principal.into(),
            timestamp,
            vno,
            key: key.clone(),
        })
        .collect())
}

// Keytab timestamps are unsigned 32-bit seconds since the epoch.
fn keytab_timestamp(time: DateTime<Utc>) -> anyhow::Result<Timestamp> {
    Timestamp::try_from(time.timestamp())
        .with_context(|| format!("{} does not fit a keytab timestamp", time))
}
