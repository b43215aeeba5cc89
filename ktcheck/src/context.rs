mod profile;

pub use self::profile::Profile;
use nix::unistd::{Uid, User};
use std::path::PathBuf;

const DEFAULT_LOG_FILTER: &str = "info";

pub struct Conf;

macro_rules! conf {
    ($name:ident, $value:expr) => {
        pub const $name: &'static str = $value;
    };
}

impl Conf {
    conf!(BINARY_SECRETS, "binary_secrets");
    conf!(KTCHECK, "ktcheck");
    conf!(LOG_FILTER, "log_filter");
    conf!(LOG_FORMAT, "log_format");
    conf!(PRINCIPAL_DB, "principal_db");
    conf!(SECRETS_DIR, "secrets_dir");
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            v if v.eq_ignore_ascii_case("text") => Ok(Self::Text),
            v if v.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid log format '{}'", value)),
        }
    }
}

/// Settings resolved from the profile.
#[derive(Debug)]
pub struct Context {
    pub profile: Profile,
    pub principal_db: Option<PathBuf>,
    pub secrets_dir: Option<PathBuf>,
    pub binary_secrets: bool,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Context {
    pub fn init() -> anyhow::Result<Self> {
        Self::new(Profile::new()?)
    }

    pub fn from_file(filename: &str) -> anyhow::Result<Self> {
        Self::new(Profile::from_files(&[filename.to_owned()])?)
    }

    pub fn new(profile: Profile) -> anyhow::Result<Self> {
        let principal_db = Self::get_path(&profile, Conf::PRINCIPAL_DB)?;
        let secrets_dir = Self::get_path(&profile, Conf::SECRETS_DIR)?;
        let binary_secrets = Self::get_bool(&profile, Conf::BINARY_SECRETS, false);
        let log_filter = Self::get_string(&profile, Conf::LOG_FILTER)
            .unwrap_or(DEFAULT_LOG_FILTER.to_owned());
        let log_format = match Self::get_string(&profile, Conf::LOG_FORMAT) {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            profile,
            principal_db,
            secrets_dir,
            binary_secrets,
            log_filter,
            log_format,
        })
    }

    fn get_bool(profile: &Profile, name: &str, default: bool) -> bool {
        profile
            .get_bool(&format!("{}.{}", Conf::KTCHECK, name))
            .unwrap_or(default)
    }

    fn get_string(profile: &Profile, name: &str) -> Option<String> {
        profile.get_string(&format!("{}.{}", Conf::KTCHECK, name))
    }

    fn get_path(profile: &Profile, name: &str) -> anyhow::Result<Option<PathBuf>> {
        Self::get_string(profile, name)
            .map(|path| Self::expand_path_tokens(&path).map(PathBuf::from))
            .transpose()
    }

    /// Expands `%{uid}`, `%{euid}`, `%{USERID}` and `%{username}` in `path`.
    pub fn expand_path_tokens(path: &str) -> anyhow::Result<String> {
        let mut buf = String::new();
        let mut path_remained = path;
        while !path_remained.is_empty() {
            let token_begin = match path_remained.find("%{") {
                Some(token_begin) => {
                    buf.push_str(&path_remained[..token_begin]);
                    token_begin
                }
                None => {
                    buf.push_str(path_remained);
                    break;
                }
            };
            let token_end = match path_remained[token_begin..].find('}') {
                Some(token_end) => token_begin + token_end,
                None => Err(anyhow::anyhow!("Invalid argument"))?,
            };
            buf.push_str(&Self::expand_token(
                &path_remained[token_begin + 2..token_end],
            )?);
            path_remained = &path_remained[token_end + 1..];
        }
        Ok(buf)
    }

    fn expand_token(token: &str) -> anyhow::Result<String> {
        let token_value = match token {
            "euid" => Uid::effective().to_string(),
            "username" => User::from_uid(Uid::effective())?
                .map(|u| u.name)
                .unwrap_or_else(|| Uid::effective().to_string()),
            "uid" | "USERID" => Uid::current().to_string(),
            _ => Err(anyhow::anyhow!("Invalid argument"))?,
        };
        Ok(token_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_settings_from_an_ini_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ktcheck.conf");
        fs::write(
            &path,
            "[ktcheck]\n\
             principal_db = /var/lib/ktcheck/principals\n\
             secrets_dir = /var/lib/ktcheck/secrets-%{uid}\n\
             binary_secrets = true\n\
             log_format = JSON\n",
        )
        .unwrap();

        let context = Context::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(
            context.principal_db,
            Some(PathBuf::from("/var/lib/ktcheck/principals"))
        );
        assert_eq!(
            context.secrets_dir,
            Some(PathBuf::from(format!(
                "/var/lib/ktcheck/secrets-{}",
                Uid::current()
            )))
        );
        assert!(context.binary_secrets);
        assert_eq!(context.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(context.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_profile_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.conf");
        let context = Context::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(context.principal_db, None);
        assert_eq!(context.secrets_dir, None);
        assert!(!context.binary_secrets);
        assert_eq!(context.log_format, LogFormat::Text);
    }

    #[test]
    fn expands_path_tokens() {
        assert_eq!(Context::expand_path_tokens("/plain/path").unwrap(), "/plain/path");
        assert_eq!(
            Context::expand_path_tokens("/tmp/%{euid}/kt").unwrap(),
            format!("/tmp/{}/kt", Uid::effective())
        );
        assert!(Context::expand_path_tokens("/tmp/%{nope}").is_err());
        assert!(Context::expand_path_tokens("/tmp/%{uid").is_err());
    }
}
