pub mod aliases;
pub mod app_config;
pub mod config;

pub use aliases::{default_alias_rules, load_alias_rules, AliasRule, AliasRulesFile};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read alias rules file {path}: {source}")]
    AliasFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse alias rules file: {0}")]
    AliasFileParse(#[source] serde_yaml::Error),

    #[error("alias rules validation failed: {0}")]
    Validation(String),
}
