mod file_data;
mod memory_data;

pub use self::{file_data::FileSecretStore, memory_data::MemorySecretStore};
use anyhow::Context as _;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Storage for keytab secrets.
///
/// A binary secret holds the keytab bytes as they are; a text secret holds
/// them base64 encoded. The `binary` flag passed to each call selects the
/// representation, and implementations hand back the decoded keytab bytes.
pub trait SecretStore: Send + Sync {
    /// Loads a secret, or `None` when it does not exist.
    fn load(&self, name: &str, binary: bool) -> anyhow::Result<Option<Vec<u8>>>;

    fn store(&self, name: &str, contents: &[u8], binary: bool) -> anyhow::Result<()>;

    /// Deletes a secret; deleting a missing secret is not an error.
    fn delete(&self, name: &str, binary: bool) -> anyhow::Result<()>;
}

fn encode_secret(contents: &[u8], binary: bool) -> Vec<u8> {
    if binary {
        contents.to_vec()
    } else {
        STANDARD.encode(contents).into_bytes()
    }
}

fn decode_secret(name: &str, stored: Vec<u8>, binary: bool) -> anyhow::Result<Vec<u8>> {
    if binary {
        return Ok(stored);
    }
    let text = String::from_utf8(stored)
        .with_context(|| format!("Secret '{}' is not a text secret", name))?;
    STANDARD
        .decode(text.trim())
        .with_context(|| format!("Secret '{}' is not valid base64", name))
}
