use serde::Deserialize;
use tracing_subscriber::fmt::SubscriberBuilder;

use crate::config::ApplicationConfig;

#[derive(Default)]
pub(super) struct LoggerConfig {
    pub format: LoggerFormat,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LoggerFormat {
    Json,
    #[default]
    Pretty,
}

impl From<&ApplicationConfig> for LoggerConfig {
    fn from(value: &ApplicationConfig) -> Self {
        Self { format: value.logger.format }
    }
}

pub(super) fn init_logger(config: LoggerConfig) {
    let builder = SubscriberBuilder::default();

    match config.format {
        LoggerFormat::Json => builder.json().init(),
        LoggerFormat::Pretty => builder.pretty().init(),
    }
}
