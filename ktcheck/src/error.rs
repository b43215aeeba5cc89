mod krb5_error;

pub use self::krb5_error::*;

pub type ErrorCode = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: &'static str,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

macro_rules! error {
    ($error:ident, $code:expr, $message:expr) => {
        pub const $error: &Error = &Error {
            code: $code,
            message: $message,
        };
    };
}

pub(self) use error;

/// Failures of the consistency engine.
///
/// A check that merely does not pass is not an error: see
/// [`CheckOutcome::Fail`](crate::CheckOutcome::Fail).
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Unable to parse keytab contents: {source} (at byte {offset})")]
    MalformedKeytab { offset: usize, source: Error },
    #[error("Could not locate principal '{0}' in the parsed keytab")]
    PrincipalNotInKeytab(String),
    #[error("given an empty list of principals")]
    EmptyPrincipalList,
    #[error("Secret '{0}' does not exist")]
    SecretNotFound(String),
    #[error("{context}: {source:#}")]
    Kdc {
        context: String,
        source: anyhow::Error,
    },
    #[error("{context}: {source:#}")]
    SecretStore {
        context: String,
        source: anyhow::Error,
    },
}

impl CheckError {
    pub(crate) fn malformed(offset: usize, error: &'static Error) -> Self {
        Self::MalformedKeytab {
            offset,
            source: *error,
        }
    }

    pub(crate) fn kdc(context: String) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| {
            tracing::error!(%context, error = %format!("{:#}", source), "kdc call failed");
            Self::Kdc { context, source }
        }
    }

    pub(crate) fn secret_store(context: String) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| {
            tracing::error!(%context, error = %format!("{:#}", source), "secret store call failed");
            Self::SecretStore { context, source }
        }
    }

    /// Returns the krb5 error code behind a keytab parse failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::MalformedKeytab { source, .. } => Some(source.code),
            _ => None,
        }
    }
}
