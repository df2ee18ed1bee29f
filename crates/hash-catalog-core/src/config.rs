use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Catalog database file, unless overridden on the command line.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// External scanner executable that populates the catalog.
    #[serde(default)]
    pub scanner_command: Option<String>,
}

fn default_catalog_path() -> String {
    "catalog.db".to_string()
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
