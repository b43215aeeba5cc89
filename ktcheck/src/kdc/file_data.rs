use super::{keytab_entries, random_keys, Kdc, PrincipalFilter};
use crate::{Keytab, Kvno, Principal};
use anyhow::Context as _;
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Mutex,
};
use tracing::{debug, info};

const COMMENT_PREFIX: char = '#';

/// A principal database kept as a text file, one canonical name per line.
///
/// The file is re-read on every call. Exporting a keytab randomizes the
/// keys of the exported principals and bumps their key version, the way
/// `kadmin ktadd` does.
#[derive(Debug)]
pub struct FileKdc {
    path: PathBuf,
    kvnos: Mutex<HashMap<String, Kvno>>,
}

impl FileKdc {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kvnos: Mutex::new(HashMap::new()),
        }
    }

    fn read(&self) -> anyhow::Result<BTreeSet<Principal>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "principal database does not exist yet");
                return Ok(BTreeSet::new());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Unable to read {}", self.path.display()))
            }
        };
        let mut principals = BTreeSet::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            let principal = line
                .parse::<Principal>()
                .with_context(|| format!("{}:{}: '{}'", self.path.display(), number + 1, line))?;
            principals.insert(principal);
        }
        Ok(principals)
    }

    fn write(&self, principals: &BTreeSet<Principal>) -> anyhow::Result<()> {
        let mut contents = String::new();
        for principal in principals {
            contents.push_str(&principal.full());
            contents.push('\n');
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("Unable to write {}", self.path.display()))
    }

    fn next_kvno(&self, principal: &Principal) -> anyhow::Result<Kvno> {
        let mut kvnos = self
            .kvnos
            .lock()
            .map_err(|_| anyhow::anyhow!("key version table lock poisoned"))?;
        let kvno = kvnos.entry(principal.full()).or_insert(0);
        *kvno += 1;
        Ok(*kvno)
    }
}

impl Kdc for FileKdc {
    fn has_principal(&self, principal: &Principal) -> anyhow::Result<bool> {
        Ok(self.read()?.contains(principal))
    }

    fn list_principals(&self, filter: &PrincipalFilter) -> anyhow::Result<Vec<Principal>> {
        Ok(self
            .read()?
            .into_iter()
            .filter(|principal| filter.is_match(&principal.full()))
            .collect())
    }

    fn add_missing_principals(&self, principals: &[Principal]) -> anyhow::Result<()> {
        let mut database = self.read()?;
        let before = database.len();
        database.extend(principals.iter().cloned());
        if database.len() != before {
            self.write(&database)?;
            info!(added = database.len() - before, path = %self.path.display(), "added principals");
        }
        Ok(())
    }

    fn delete_principals(&self, principals: &[Principal]) -> anyhow::Result<()> {
        let mut database = self.read()?;
        let before = database.len();
        for principal in principals {
            database.remove(principal);
        }
        if database.len() != before {
            self.write(&database)?;
            info!(deleted = before - database.len(), path = %self.path.display(), "deleted principals");
        }
        Ok(())
    }

    fn export_keytab(&self, principals: &[Principal]) -> anyhow::Result<Vec<u8>> {
        let database = self.read()?;
        let mut keytab = Keytab::new();
        for principal in principals {
            if !database.contains(principal) {
                anyhow::bail!("Principal '{}' does not exist", principal);
            }
            let kvno = self.next_kvno(principal)?;
            keytab
                .entries
                .extend(keytab_entries(principal, kvno, &random_keys())?);
        }
        keytab.to_bytes()
    }
}
