use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub pagination: PaginationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection string, e.g. `sqlite:trivia.db`
    pub url: String,
    pub max_connections: u32,
    pub create_if_missing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    pub questions_per_page: u32,
}

impl Settings {
    /// Reads settings from defaults, an optional `trivia.{toml,yaml,...}` file in the working
    /// directory and `TRIVIA__*` environment variables, in increasing priority.
    pub fn load() -> Result<Self, SettingsError> {
        dotenv::dotenv().ok();
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("trivia").required(false))
                .add_source(
                    config::Environment::with_prefix("TRIVIA")
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, SettingsError> {
        let settings: Settings = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:trivia.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.create_if_missing", true)?
            .set_default("pagination.questions_per_page", 10)?
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.pagination.questions_per_page == 0 {
            return Err(SettingsError::Invalid(
                "pagination.questions_per_page must be at least 1".to_owned(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid(
                "database.max_connections must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}
