use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL shared by the pricing and advisor services.
    pub api_base_url: String,
    /// Advisor base URL; equals `api_base_url` unless overridden.
    pub advisor_base_url: String,
    /// Brand-configuration service base URL. `None` disables the fetch and
    /// keeps the static alias table.
    pub brand_config_url: Option<String>,
    /// Optional YAML file replacing the built-in static alias rules.
    pub aliases_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub travel_speed_kmh: f64,
}
