use crate::backend::cypher::filter_impl::{LowererOptions, DEFAULT_PARAMETER_PREFIX};
use crate::error::{AppError, AppResult};
use crate::parser::filter_parser::{ValidatorOptions, DEFAULT_MAX_DEPTH};
use crate::utils::is_identifier;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

lazy_static! {
    static ref ENV_VAR: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap();
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub lowering: LoweringConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Fail on unrecognized `$` keys instead of dropping them
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoweringConfig {
    #[serde(default = "default_entity_reference")]
    pub entity_reference: String,
    #[serde(default = "default_parameter_prefix")]
    pub parameter_prefix: String,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_entity_reference() -> String {
    "e".to_string()
}

fn default_parameter_prefix() -> String {
    DEFAULT_PARAMETER_PREFIX.to_string()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            strict: false,
            max_depth: default_max_depth(),
        }
    }
}

impl Default for LoweringConfig {
    fn default() -> Self {
        LoweringConfig {
            entity_reference: default_entity_reference(),
            parameter_prefix: default_parameter_prefix(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse configuration from YAML text, expanding `${VAR}` references first
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        let expanded_content = Self::expand_env_vars(content).map_err(AppError::Configuration)?;

        let app_config: AppConfig = if expanded_content.trim().is_empty() {
            AppConfig::default()
        } else {
            serde_yaml::from_str(&expanded_content)?
        };

        app_config.check().map_err(AppError::Configuration)?;
        Ok(app_config)
    }

    pub fn default_config() -> Self {
        AppConfig::default()
    }

    fn check(&self) -> Result<(), String> {
        if self.validation.max_depth == 0 {
            return Err("validation.max_depth must be at least 1".to_string());
        }
        if !is_identifier(&self.lowering.entity_reference) {
            return Err(format!(
                "lowering.entity_reference is not a valid identifier: {}",
                self.lowering.entity_reference
            ));
        }
        if !is_identifier(&self.lowering.parameter_prefix) {
            return Err(format!(
                "lowering.parameter_prefix is not a valid identifier: {}",
                self.lowering.parameter_prefix
            ));
        }
        Ok(())
    }

    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            strict: self.validation.strict,
            max_depth: self.validation.max_depth,
        }
    }

    pub fn lowerer_options(&self) -> LowererOptions {
        LowererOptions {
            parameter_prefix: self.lowering.parameter_prefix.clone(),
        }
    }

    /// Replace `${VAR}` and `${VAR:-default}` with environment values
    fn expand_env_vars(content: &str) -> Result<String, String> {
        let mut missing = None;
        let expanded = ENV_VAR.replace_all(content, |caps: &Captures| {
            match (std::env::var(&caps[1]), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| caps[1].to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var_name) => Err(format!(
                "Environment variable {} not found and no default provided",
                var_name
            )),
            None => Ok(expanded.into_owned()),
        }
    }
}
