mod keytypes;

use self::keytypes::KEYTYPES;
use crate::{Enctype, Flags};

const MAX_ENCTYPE_ALIASES: usize = 2;
const ENCTYPE_WEAK: Flags = 1 << 0;
const ENCTYPE_DEPRECATED: Flags = 1 << 1;

pub struct Keytype {
    pub enctype: Enctype,
    pub name: &'static str,
    pub aliases: [Option<&'static str>; MAX_ENCTYPE_ALIASES],
    pub flags: Flags,
}

impl Keytype {
    pub fn find_enctype(enctype: Enctype) -> Option<&'static Self> {
        KEYTYPES.iter().find(|ktp| ktp.enctype == enctype)
    }

    pub fn is_weak(&self) -> bool {
        self.flags & ENCTYPE_WEAK != 0
    }

    pub fn is_deprecated(&self) -> bool {
        self.flags & ENCTYPE_DEPRECATED != 0
    }
}

/// Name of `enctype`, its shortest alias if `shortest`, or `etype N` when unknown.
pub fn enctype_to_name(enctype: Enctype, shortest: bool) -> String {
    let ktp = match Keytype::find_enctype(enctype) {
        Some(ktp) => ktp,
        None => return format!("etype {}", enctype),
    };
    let mut name = ktp.name;
    if shortest {
        for alias in ktp.aliases.iter().flatten() {
            if alias.len() < name.len() {
                name = alias;
            }
        }
    }
    name.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ENCTYPE_AES256_CTS_HMAC_SHA1_96, ENCTYPE_ARCFOUR_HMAC, ENCTYPE_DES3_CBC_RAW};

    #[test]
    fn names_known_and_unknown_enctypes() {
        assert_eq!(
            enctype_to_name(ENCTYPE_AES256_CTS_HMAC_SHA1_96, false),
            "aes256-cts-hmac-sha1-96"
        );
        assert_eq!(enctype_to_name(ENCTYPE_AES256_CTS_HMAC_SHA1_96, true), "aes256-cts");
        assert_eq!(enctype_to_name(ENCTYPE_ARCFOUR_HMAC, true), "rc4-hmac");
        assert_eq!(enctype_to_name(99, false), "etype 99");
    }

    #[test]
    fn flags_weak_and_deprecated_enctypes() {
        let rc4 = Keytype::find_enctype(ENCTYPE_ARCFOUR_HMAC).unwrap();
        assert!(rc4.is_deprecated());
        assert!(!rc4.is_weak());
        let raw = Keytype::find_enctype(ENCTYPE_DES3_CBC_RAW).unwrap();
        assert!(raw.is_weak() && raw.is_deprecated());
        let aes = Keytype::find_enctype(ENCTYPE_AES256_CTS_HMAC_SHA1_96).unwrap();
        assert!(!aes.is_weak());
        assert!(!aes.is_deprecated());
    }
}
