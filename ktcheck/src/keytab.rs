mod decoder;
mod encoder;
mod keytab_entry;

pub use self::keytab_entry::{KeytabEntry, KeytabPrincipal, NameType};
use crate::{
    error::{Error, KRB5_KEYTAB_BADVNO},
    CheckError,
};

const FILE_FIRST_BYTE: u8 = 5;

/// Version of the FILE keytab format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V1 = 1,
    V2,
}

impl TryFrom<u8> for FormatVersion {
    type Error = &'static Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            _ => Err(KRB5_KEYTAB_BADVNO),
        }
    }
}

/// The decoded contents of a keytab artifact, entries in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keytab {
    pub version: FormatVersion,
    pub entries: Vec<KeytabEntry>,
}

impl Keytab {
    pub fn new() -> Self {
        Self {
            version: FormatVersion::V2,
            entries: vec![],
        }
    }

    /// Decodes a keytab blob.
    ///
    /// Any structural problem (bad header, truncated record, lengths that do
    /// not add up) is reported as [`CheckError::MalformedKeytab`]; a header
    /// with no records is a valid, empty keytab.
    pub fn parse(bytes: &[u8]) -> Result<Self, CheckError> {
        decoder::decode(bytes)
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        encoder::encode(self)
    }

    pub fn push(&mut self, entry: KeytabEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for Keytab {
    fn default() -> Self {
        Self::new()
    }
}
