use crate::constants::*;
use crate::error::{EtlError, Result};
use crate::transform::Schema;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Layout of the delimited input files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub delimiter: char,
    pub quote: char,
    pub has_headers: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            has_headers: true,
        }
    }
}

impl InputConfig {
    // Only valid after Config::validate
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn quote_byte(&self) -> u8 {
        self.quote as u8
    }
}

/// Where accepted documents are written
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub url: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout_secs: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MONGO_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl SinkConfig {
    /// Compose the full connection string, placing the credentials in the
    /// user-info part of the URL.
    pub fn connection_string(&self, credentials: &Credentials) -> Result<String> {
        let (scheme, rest) = self
            .url
            .split_once("://")
            .ok_or_else(|| EtlError::Config(format!("sink url '{}' has no scheme", self.url)))?;
        if scheme != "mongodb" && scheme != "mongodb+srv" {
            return Err(EtlError::Config(format!("unsupported sink scheme '{scheme}'")));
        }
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.contains('@') {
            return Err(EtlError::Config(
                "sink url must not embed credentials; use the environment instead".to_string(),
            ));
        }

        Ok(format!(
            "{scheme}://{}:{}@{rest}",
            encode_userinfo(&credentials.username),
            encode_userinfo(&credentials.password)
        ))
    }
}

fn encode_userinfo(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub reference_date: NaiveDate,
}

impl Default for TransformConfig {
    fn default() -> Self {
        let (y, m, d) = DEFAULT_REFERENCE_DATE;
        Self {
            reference_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        }
    }
}

/// Administrative credentials for the sink. Never read from the config file.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| EtlError::MissingEnv(key.to_string()))
        };
        Ok(Self {
            username: require(ENV_MONGO_USERNAME)?,
            password: require(ENV_MONGO_PASSWORD)?,
        })
    }
}

/// Run configuration: an optional TOML file overlaid with environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub sink: SinkConfig,
    pub transform: TransformConfig,
    pub schema: Schema,
}

impl Config {
    /// Load from `path`, or from `etl.toml` when it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        info!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_MONGO_URL) {
            self.sink.url = url;
        }
        if let Some(database) = non_empty(ENV_MONGO_DATABASE) {
            self.sink.database = database;
        }
        if let Some(collection) = non_empty(ENV_MONGO_COLLECTION) {
            self.sink.collection = collection;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let input = &self.input;
        if !input.delimiter.is_ascii() || !input.quote.is_ascii() {
            return Err(EtlError::Config("delimiter and quote must be ASCII characters".to_string()));
        }
        if input.delimiter == input.quote {
            return Err(EtlError::Config("delimiter and quote must differ".to_string()));
        }
        if self.sink.database.is_empty() || self.sink.collection.is_empty() {
            return Err(EtlError::Config("sink database and collection must be set".to_string()));
        }
        self.schema.validate().map_err(EtlError::Config)
    }
}
