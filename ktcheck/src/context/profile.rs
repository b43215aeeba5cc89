use config::{Config, File, FileFormat};
use std::env;

const CONFIG_ENV: &str = "KTCHECK_CONFIG";
const DEFAULT_PROFILE_PATH: &str = "/etc/ktcheck.conf";

/// Layered INI configuration; earlier files win.
#[derive(Debug)]
pub struct Profile {
    files: Vec<ProfileFile>,
}

macro_rules! get_value {
    ($fn:ident, $type:ident) => {
        pub fn $fn(&self, key: &str) -> Option<$type> {
            for file in &self.files {
                if let Ok(value) = file.config.$fn(key) {
                    return Some(value);
                }
            }
            None
        }
    };
}

impl Profile {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_files(&Self::default_config_files())
    }

    pub fn from_files(filenames: &[String]) -> anyhow::Result<Self> {
        let mut files = vec![];
        for filename in filenames {
            files.push(ProfileFile::new(filename)?);
        }
        Ok(Self { files })
    }

    fn default_config_files() -> Vec<String> {
        env::var(CONFIG_ENV)
            .unwrap_or(DEFAULT_PROFILE_PATH.to_owned())
            .split(':')
            .filter(|f| !f.is_empty())
            .map(|f| f.to_owned())
            .collect()
    }

    get_value!(get_string, String);

    get_value!(get_bool, bool);
}

#[derive(Debug)]
struct ProfileFile {
    config: Config,
}

impl ProfileFile {
    fn new(filename: &str) -> anyhow::Result<Self> {
        let expanded_filename = match (filename.starts_with("~/"), env::var("HOME")) {
            (true, Ok(home_env)) => format!("{}{}", home_env, &filename[1..]),
            _ => filename.to_owned(),
        };
        let config = Config::builder()
            .add_source(
                File::with_name(&expanded_filename)
                    .format(FileFormat::Ini)
                    .required(false),
            )
            .build()?;
        Ok(Self { config })
    }
}
