use crate::{Enctype, Keyblock, Keytab, KeytabEntry, Principal};
use std::collections::HashMap;

const FINGERPRINT_SEP: char = ':';

/// One key of a principal, reduced to its encryption type and a canonical
/// `enctype:hex(contents)` fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub enctype: Enctype,
    pub fingerprint: String,
}

impl From<&Keyblock> for Key {
    fn from(keyblock: &Keyblock) -> Self {
        Self {
            enctype: keyblock.enctype,
            fingerprint: format!(
                "{}{}{}",
                keyblock.enctype,
                FINGERPRINT_SEP,
                hex::encode(&keyblock.contents)
            ),
        }
    }
}

/// Keys of every principal found in a keytab, keyed by canonical name.
///
/// Each key list is sorted by enctype, then by fingerprint so that several
/// keys with the same enctype (older key versions) do not depend on their
/// keytab order.
#[derive(Debug, Default)]
pub struct KeyIndex {
    keys: HashMap<String, Vec<Key>>,
}

impl KeyIndex {
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a KeytabEntry>) -> Self {
        let mut keys: HashMap<String, Vec<Key>> = HashMap::new();
        for entry in entries {
            let principal = Principal::from(&entry.principal);
            keys.entry(principal.full())
                .or_default()
                .push(Key::from(&entry.key));
        }
        for list in keys.values_mut() {
            list.sort_by(|a, b| {
                a.enctype
                    .cmp(&b.enctype)
                    .then_with(|| a.fingerprint.cmp(&b.fingerprint))
            });
        }
        Self { keys }
    }

    pub fn keys(&self, principal: &Principal) -> Option<&[Key]> {
        self.keys.get(&principal.full()).map(Vec::as_slice)
    }

    pub fn contains(&self, principal: &Principal) -> bool {
        self.keys.contains_key(&principal.full())
    }

    /// Number of distinct principals.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<&Keytab> for KeyIndex {
    fn from(keytab: &Keytab) -> Self {
        Self::build(&keytab.entries)
    }
}
