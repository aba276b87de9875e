use config::{Config, ConfigError};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};

pub mod domain;
pub mod format;

use crate::format::Culture;

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustfmtConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub culture: Culture,
    #[serde(default)]
    pub logger: Logger,
}

impl CustfmtConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("custfmt.toml").required(false))
            .add_source(config::Environment::with_prefix("CUSTFMT").separator("_"))
            .build()?
            .try_deserialize::<CustfmtConfig>()
    }

    /// Makes the configured culture the process-wide default.
    pub fn install(&self) {
        Culture::set_default(self.culture.clone());
    }

    pub fn init_logging(
        &self,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::from(&self.logger.level))
            .try_init()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Logger {
    #[serde(default)]
    pub level: Level,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum Level {
    TRACE,
    DEBUG,
    #[default]
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}
