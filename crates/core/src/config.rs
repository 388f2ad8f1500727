use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub company: CompanyProfile,
    pub quotation: QuotationConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Issuing company identity used as the default for the company-info agent.
/// In the deployed product this would come out of a directory service; here
/// it is configuration with sensible demo defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub registration_number: String,
    pub tax_id: String,
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuotationConfig {
    pub default_validity_days: u32,
    pub quote_number_prefix: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub company_name: Option<String>,
    pub default_validity_days: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            company: CompanyProfile {
                name: "ProQuote Electrical Ltd".to_string(),
                address: "123 Electric Avenue, Tech City, TC 12345".to_string(),
                phone: "+1 (555) 123-4567".to_string(),
                email: "info@proquote.com".to_string(),
                website: "www.proquote.com".to_string(),
                registration_number: "REG-2024-001".to_string(),
                tax_id: "TAX-123456789".to_string(),
                logo_url: None,
            },
            quotation: QuotationConfig {
                default_validity_days: 30,
                quote_number_prefix: "QT".to_string(),
            },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("proquote.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(company) = patch.company {
            if let Some(name) = company.name {
                self.company.name = name;
            }
            if let Some(address) = company.address {
                self.company.address = address;
            }
            if let Some(phone) = company.phone {
                self.company.phone = phone;
            }
            if let Some(email) = company.email {
                self.company.email = email;
            }
            if let Some(website) = company.website {
                self.company.website = website;
            }
            if let Some(registration_number) = company.registration_number {
                self.company.registration_number = registration_number;
            }
            if let Some(tax_id) = company.tax_id {
                self.company.tax_id = tax_id;
            }
            if let Some(logo_url) = company.logo_url {
                self.company.logo_url = Some(logo_url);
            }
        }

        if let Some(quotation) = patch.quotation {
            if let Some(default_validity_days) = quotation.default_validity_days {
                self.quotation.default_validity_days = default_validity_days;
            }
            if let Some(quote_number_prefix) = quotation.quote_number_prefix {
                self.quotation.quote_number_prefix = quote_number_prefix;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PROQUOTE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PROQUOTE_SERVER_PORT") {
            self.server.port = parse_u16("PROQUOTE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PROQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("PROQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("PROQUOTE_COMPANY_NAME") {
            self.company.name = value;
        }
        if let Some(value) = read_env("PROQUOTE_COMPANY_EMAIL") {
            self.company.email = value;
        }

        if let Some(value) = read_env("PROQUOTE_QUOTATION_DEFAULT_VALIDITY_DAYS") {
            self.quotation.default_validity_days =
                parse_u32("PROQUOTE_QUOTATION_DEFAULT_VALIDITY_DAYS", &value)?;
        }

        let log_level =
            read_env("PROQUOTE_LOGGING_LEVEL").or_else(|| read_env("PROQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PROQUOTE_LOGGING_FORMAT").or_else(|| read_env("PROQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(company_name) = overrides.company_name {
            self.company.name = company_name;
        }
        if let Some(default_validity_days) = overrides.default_validity_days {
            self.quotation.default_validity_days = default_validity_days;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.bind_address must not be empty".to_string(),
            ));
        }
        if self.server.graceful_shutdown_secs == 0 || self.server.graceful_shutdown_secs > 300 {
            return Err(ConfigError::Validation(
                "server.graceful_shutdown_secs must be in range 1..=300".to_string(),
            ));
        }

        if self.company.name.trim().is_empty() {
            return Err(ConfigError::Validation("company.name must not be empty".to_string()));
        }
        if !self.company.email.contains('@') {
            return Err(ConfigError::Validation(
                "company.email must be a plausible email address".to_string(),
            ));
        }

        if self.quotation.default_validity_days == 0
            || self.quotation.default_validity_days > 3650
        {
            return Err(ConfigError::Validation(
                "quotation.default_validity_days must be in range 1..=3650".to_string(),
            ));
        }
        if self.quotation.quote_number_prefix.trim().is_empty() {
            return Err(ConfigError::Validation(
                "quotation.quote_number_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("proquote.toml"), PathBuf::from("config/proquote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    company: Option<CompanyPatch>,
    quotation: Option<QuotationPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyPatch {
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    website: Option<String>,
    registration_number: Option<String>,
    tax_id: Option<String>,
    logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct QuotationPatch {
    default_validity_days: Option<u32>,
    quote_number_prefix: Option<String>,
}
