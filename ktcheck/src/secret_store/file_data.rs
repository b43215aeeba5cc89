use super::{decode_secret, encode_secret, SecretStore};
use anyhow::Context as _;
use std::{
    fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info};

/// Secrets stored as files below a directory, one file per secret.
///
/// Secret names may contain `/` to address nested paths, but never `..` or
/// a leading `/`.
#[derive(Debug)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn secret_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(name);
        let valid = !name.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            anyhow::bail!("Invalid secret name '{}'", name);
        }
        Ok(self.dir.join(relative))
    }
}

impl SecretStore for FileSecretStore {
    fn load(&self, name: &str, binary: bool) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.secret_path(name)?;
        let stored = match fs::read(&path) {
            Ok(stored) => stored,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(secret = name, path = %path.display(), "secret not found");
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Unable to read {}", path.display()))
            }
        };
        decode_secret(name, stored, binary).map(Some)
    }

    fn store(&self, name: &str, contents: &[u8], binary: bool) -> anyhow::Result<()> {
        let path = self.secret_path(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create {}", parent.display()))?;
        }
        fs::write(&path, encode_secret(contents, binary))
            .with_context(|| format!("Unable to write {}", path.display()))?;
        info!(secret = name, binary, "stored secret");
        Ok(())
    }

    fn delete(&self, name: &str, _binary: bool) -> anyhow::Result<()> {
        let path = self.secret_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(secret = name, "deleted secret");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("Unable to delete {}", path.display())),
        }
    }
}
