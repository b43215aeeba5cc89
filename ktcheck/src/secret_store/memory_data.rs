use super::{decode_secret, encode_secret, SecretStore};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

/// Secrets kept in process memory, in their stored representation.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places an already encoded value under `name`, bypassing encoding.
    pub fn insert_raw(&self, name: &str, stored: Vec<u8>) -> anyhow::Result<()> {
        self.secrets()?.insert(name.to_owned(), stored);
        Ok(())
    }

    fn secrets(&self) -> anyhow::Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.secrets
            .lock()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))
    }
}

impl SecretStore for MemorySecretStore {
    fn load(&self, name: &str, binary: bool) -> anyhow::Result<Option<Vec<u8>>> {
        match self.secrets()?.get(name) {
            Some(stored) => Ok(Some(decode_secret(name, stored.clone(), binary)?)),
            None => Ok(None),
        }
    }

    fn store(&self, name: &str, contents: &[u8], binary: bool) -> anyhow::Result<()> {
        self.secrets()?
            .insert(name.to_owned(), encode_secret(contents, binary));
        Ok(())
    }

    fn delete(&self, name: &str, _binary: bool) -> anyhow::Result<()> {
        self.secrets()?.remove(name);
        Ok(())
    }
}
