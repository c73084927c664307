use crate::core::classifier::{builtin_rules, CountryRuleDef};
use crate::core::params::DEFAULT_LIMIT;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
    pub countries: Vec<CountryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "sample.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// An additional country rule on top of the built-in registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryConfig {
    pub name: String,
    pub calling_code: String,
    pub pattern: String,
}

impl AppConfig {
    /// Loads configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string, expanding `${VAR}` first
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn country_rules(&self) -> Vec<CountryRuleDef> {
        self.countries
            .iter()
            .map(|c| CountryRuleDef::new(&c.name, &c.calling_code, &c.pattern))
            .collect()
    }

    fn validate_countries(&self) -> Result<()> {
        let builtin = builtin_rules();
        let mut names: HashSet<String> = builtin.iter().map(|r| r.name.to_lowercase()).collect();
        let mut codes: HashSet<String> = builtin.into_iter().map(|r| r.calling_code).collect();

        for country in &self.countries {
            validation::validate_non_empty_string("countries.name", &country.name)?;
            validation::validate_digits("countries.calling_code", &country.calling_code)?;
            validation::validate_non_empty_string("countries.pattern", &country.pattern)?;

            if !names.insert(country.name.to_lowercase()) {
                return Err(AppError::InvalidConfigValueError {
                    field: "countries.name".to_string(),
                    value: country.name.clone(),
                    reason: "Country is already registered".to_string(),
                });
            }

            if !codes.insert(country.calling_code.clone()) {
                return Err(AppError::InvalidConfigValueError {
                    field: "countries.calling_code".to_string(),
                    value: country.calling_code.clone(),
                    reason: "Calling code is already registered".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", self.server.port as usize, 1)?;
        validation::validate_path("database.path", &self.database.path)?;
        validation::validate_range("pagination.default_limit", self.pagination.default_limit, 1, 1000)?;

        let levels = ["trace", "debug", "info", "warn", "error"];
        if !levels.contains(&self.logging.level.as_str()) {
            return Err(AppError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", levels.join(", ")),
            });
        }

        self.validate_countries()
    }
}
