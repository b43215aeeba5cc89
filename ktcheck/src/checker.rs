use crate::{
    kdc::PrincipalFilter, principals_checksum, CheckError, Kdc, KeyIndex, Keytab, Keytype,
    Principal, SecretStore,
};
use tracing::{debug, info, warn};

/// The verdict of a consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every principal is in the KDC and in the keytab; `checksum`
    /// fingerprints the verified keys.
    Pass { checksum: String },
    /// The check did not pass, for the named principal or secret.
    Fail { reason: String },
}

impl CheckOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Fail { reason } => Some(reason),
            Self::Pass { .. } => None,
        }
    }

    pub fn checksum(&self) -> Option<&str> {
        match self {
            Self::Pass { checksum } => Some(checksum),
            Self::Fail { .. } => None,
        }
    }

    fn fail(reason: String) -> Self {
        warn!(%reason, "check failed");
        Self::Fail { reason }
    }
}

/// Principals sorted by canonical name, with the checksum of their keys when
/// they were matched against a keytab secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalListing {
    pub principals: Vec<Principal>,
    pub checksum: Option<String>,
}

/// Reconciles requested principals with a KDC and a keytab secret store.
#[derive(Debug)]
pub struct Checker<K, S> {
    kdc: K,
    secrets: S,
}

impl<K: Kdc, S: SecretStore> Checker<K, S> {
    pub fn new(kdc: K, secrets: S) -> Self {
        Self { kdc, secrets }
    }

    pub fn kdc(&self) -> &K {
        &self.kdc
    }

    pub fn secret_store(&self) -> &S {
        &self.secrets
    }

    /// Verifies that every principal exists in the KDC and has keys in the
    /// keytab stored as `secret`.
    ///
    /// The KDC is consulted first and the secret is only loaded once all
    /// principals are known there. The first missing principal (or a missing
    /// secret) ends the check with [`CheckOutcome::Fail`]. A corrupt keytab or
    /// a collaborator failure is an error, not a failed check.
    pub fn check(
        &self,
        principals: &[Principal],
        secret: &str,
        binary: bool,
    ) -> Result<CheckOutcome, CheckError> {
        if principals.is_empty() {
            return Err(CheckError::EmptyPrincipalList);
        }

        for principal in principals {
            let present = self.kdc.has_principal(principal).map_err(CheckError::kdc(format!(
                "Unable to check if principal {} exists",
                principal
            )))?;
            if !present {
                return Ok(CheckOutcome::fail(format!(
                    "Principal '{}' does not exist in kerberos",
                    principal
                )));
            }
        }
        debug!(count = principals.len(), "principals present in kdc");

        let keytab = match self.load_keytab(secret, binary)? {
            Some(keytab) => keytab,
            None => return Ok(CheckOutcome::fail(format!("Secret '{}' does not exist", secret))),
        };
        debug!(secret, entries = keytab.len(), "loaded keytab secret");

        let index = KeyIndex::from(&keytab);
        if let Some(missing) = principals.iter().find(|p| !index.contains(p)) {
            return Ok(CheckOutcome::fail(format!(
                "Principal '{}' does not exist in keytab",
                missing
            )));
        }
        debug!(secret, "principals present in keytab");

        let checksum = principals_checksum(principals, &index)?;
        info!(secret, %checksum, "check passed");
        Ok(CheckOutcome::Pass { checksum })
    }

    /// Lists the KDC principals matching `filter`.
    ///
    /// With a `secret`, principals without keys in its keytab are dropped and
    /// the checksum of the remaining ones is attached.
    pub fn list(
        &self,
        filter: &str,
        secret: Option<&str>,
        binary: bool,
    ) -> Result<PrincipalListing, CheckError> {
        let matcher = PrincipalFilter::new(filter).map_err(CheckError::kdc(format!(
            "Unable to list principals matching '{}'",
            filter
        )))?;
        let mut principals = self
            .kdc
            .list_principals(&matcher)
            .map_err(CheckError::kdc("Unable to list principals".to_owned()))?;
        principals.sort_by_cached_key(Principal::full);

        let secret = match secret {
            Some(secret) => secret,
            None => {
                return Ok(PrincipalListing {
                    principals,
                    checksum: None,
                })
            }
        };

        let keytab = self
            .load_keytab(secret, binary)?
            .ok_or_else(|| CheckError::SecretNotFound(secret.to_owned()))?;
        let index = KeyIndex::from(&keytab);
        principals.retain(|principal| index.contains(principal));
        let checksum = principals_checksum(&principals, &index)?;
        debug!(filter, secret, count = principals.len(), "listed principals in keytab");

        Ok(PrincipalListing {
            principals,
            checksum: Some(checksum),
        })
    }

    /// Registers missing principals, exports their keys and stores the keytab
    /// as `secret`.
    pub fn provision(
        &self,
        principals: &[Principal],
        secret: &str,
        binary: bool,
    ) -> Result<(), CheckError> {
        if principals.is_empty() {
            return Err(CheckError::EmptyPrincipalList);
        }
        self.kdc
            .add_missing_principals(principals)
            .map_err(CheckError::kdc("Unable to add principals".to_owned()))?;
        let keytab = self
            .kdc
            .export_keytab(principals)
            .map_err(CheckError::kdc("Unable to export keytab".to_owned()))?;
        self.secrets
            .store(secret, &keytab, binary)
            .map_err(CheckError::secret_store(
                "Unable to upload to secret store".to_owned(),
            ))?;
        info!(secret, count = principals.len(), "provisioned principals");
        Ok(())
    }

    /// Deletes `secret`, then removes the principals from the KDC.
    pub fn revoke(
        &self,
        principals: &[Principal],
        secret: &str,
        binary: bool,
    ) -> Result<(), CheckError> {
        if principals.is_empty() {
            return Err(CheckError::EmptyPrincipalList);
        }
        self.secrets
            .delete(secret, binary)
            .map_err(CheckError::secret_store("Unable to delete secret".to_owned()))?;
        self.kdc
            .delete_principals(principals)
            .map_err(CheckError::kdc("Unable to delete principals".to_owned()))?;
        info!(secret, count = principals.len(), "revoked principals");
        Ok(())
    }

    // An empty secret is as good as no secret.
    fn load_keytab(&self, secret: &str, binary: bool) -> Result<Option<Keytab>, CheckError> {
        let contents = self
            .secrets
            .load(secret, binary)
            .map_err(CheckError::secret_store(
                "Unable to read the keytab secret".to_owned(),
            ))?;
        let keytab = match contents {
            Some(contents) if !contents.is_empty() => Keytab::parse(&contents)?,
            _ => return Ok(None),
        };
        for entry in &keytab.entries {
            let keytype = Keytype::find_enctype(entry.key.enctype)
                .filter(|keytype| keytype.is_weak() || keytype.is_deprecated());
            if let Some(keytype) = keytype {
                warn!(
                    secret,
                    principal = %entry.principal.unparse_name(),
                    enctype = keytype.name,
                    weak = keytype.is_weak(),
                    "keytab holds a weak or deprecated enctype"
                );
            }
        }
        Ok(Some(keytab))
    }
}
