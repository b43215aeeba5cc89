use crate::{CheckError, KeyIndex, Keytab, Principal};
use sha2::{Digest, Sha256};

const FINGERPRINT_JOIN: &str = ",";

/// Computes the consistency checksum of `principals` against `index`.
///
/// Principals are sorted by canonical name, then the fingerprints of their
/// keys are joined with commas into one flat sequence and hashed with
/// SHA-256. Principal boundaries are not marked in the hashed text; changing
/// that would invalidate every checksum issued so far.
///
/// Every principal must have keys in the index, otherwise
/// [`CheckError::PrincipalNotInKeytab`] is returned.
pub fn principals_checksum(
    principals: &[Principal],
    index: &KeyIndex,
) -> Result<String, CheckError> {
    let mut sorted: Vec<&Principal> = principals.iter().collect();
    sorted.sort_by_cached_key(|principal| principal.full());

    let mut fingerprints = vec![];
    for principal in sorted {
        let keys = index
            .keys(principal)
            .ok_or_else(|| CheckError::PrincipalNotInKeytab(principal.full()))?;
        fingerprints.extend(keys.iter().map(|key| key.fingerprint.as_str()));
    }

    let digest = Sha256::digest(fingerprints.join(FINGERPRINT_JOIN).as_bytes());
    Ok(hex::encode(digest))
}

/// Decodes `keytab` and computes the checksum of `principals` over it.
pub fn keytab_checksum(keytab: &[u8], principals: &[Principal]) -> Result<String, CheckError> {
    let keytab = Keytab::parse(keytab)?;
    principals_checksum(principals, &KeyIndex::from(&keytab))
}
