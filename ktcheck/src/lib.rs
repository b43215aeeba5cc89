pub mod checker;
pub mod checksum;
pub mod context;
pub mod crypto;
pub mod error;
pub mod kdc;
pub mod key_index;
pub mod keytab;
pub mod principal;
pub mod report;
pub mod secret_store;

pub use self::{
    checker::{CheckOutcome, Checker, PrincipalListing},
    checksum::{keytab_checksum, principals_checksum},
    context::{Context, LogFormat},
    crypto::Keytype,
    error::{CheckError, Error},
    kdc::{FileKdc, Kdc, MemoryKdc, PrincipalFilter},
    key_index::{Key, KeyIndex},
    keytab::{FormatVersion, Keytab, KeytabEntry, KeytabPrincipal, NameType},
    principal::Principal,
    secret_store::{FileSecretStore, MemorySecretStore, SecretStore},
};

/// @deprecated DES-3 cbc mode raw
pub const ENCTYPE_DES3_CBC_RAW: Enctype = 0x0006;
pub const ENCTYPE_DES3_CBC_SHA1: Enctype = 0x0010;
/// RFC 3962
pub const ENCTYPE_AES128_CTS_HMAC_SHA1_96: Enctype = 0x0011;
/// RFC 3962
pub const ENCTYPE_AES256_CTS_HMAC_SHA1_96: Enctype = 0x0012;
/// RFC 8009
pub const ENCTYPE_AES128_CTS_HMAC_SHA256_128: Enctype = 0x0013;
/// RFC 8009
pub const ENCTYPE_AES256_CTS_HMAC_SHA384_192: Enctype = 0x0014;
/// RFC 4757
pub const ENCTYPE_ARCFOUR_HMAC: Enctype = 0x0017;
/// RFC 4757
pub const ENCTYPE_ARCFOUR_HMAC_EXP: Enctype = 0x0018;
/// RFC 6803
pub const ENCTYPE_CAMELLIA128_CTS_CMAC: Enctype = 0x0019;
/// RFC 6803
pub const ENCTYPE_CAMELLIA256_CTS_CMAC: Enctype = 0x001a;

pub type Kvno = u32;
pub type Enctype = i32;
pub type Flags = i32;
pub type Timestamp = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyblock {
    pub enctype: Enctype,
    pub contents: Vec<u8>,
}
