use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, File, FileFormat};
use serde::Deserialize;

use crate::{logger::LoggerFormat, Args};

#[derive(Deserialize, Debug)]
pub(crate) struct ApplicationConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logger: LoggerSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct LoggerSettings {
    #[serde(default)]
    pub format: LoggerFormat,
}

pub(super) fn load_config(args: Args) -> anyhow::Result<ApplicationConfig> {
    let config_file_path = if let Some(path_override) = args.config {
        path_override
    } else {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("ansv").context("failed to resolve XDG directories")?;

        let user_config_dir = xdg_dirs.get_config_home();
        if !user_config_dir.exists() {
            std::fs::create_dir_all(&user_config_dir)?;
        }

        let mut config_file_path = user_config_dir.clone();
        config_file_path.push("backbone_config.toml");

        if !config_file_path.exists() {
            write_default_config_file(&config_file_path)?;
        }

        config_file_path
    };
    let config_file_path = config_file_path.to_str().context("config file path is not valid UTF-8")?;
    let database_path_override = args
        .database_path
        .map(|path| path.to_str().map(ToOwned::to_owned).context("database path is not valid UTF-8"))
        .transpose()?;

    let mut config: ApplicationConfig = Config::builder()
        .set_default("port", 5001)?
        .set_default("database.path", "data/soporte_db.db")?
        .add_source(File::new(config_file_path, FileFormat::Toml))
        .set_override_option("port", args.port.map(|port| port.to_string()))?
        .set_override_option("database.path", database_path_override)?
        .build()?
        .try_deserialize()?;

    let install_dir = install_directory()?;
    config.database.path = resolve_database_path(&install_dir, &config.database.path);

    Ok(config)
}

fn write_default_config_file(path: &Path) -> anyhow::Result<()> {
    let default_config_content = include_str!("../static/default_config.toml");
    std::fs::write(path, default_config_content)?;
    Ok(())
}

fn install_directory() -> anyhow::Result<PathBuf> {
    let executable = std::env::current_exe()?;
    let directory = executable.parent().context("executable has no parent directory")?;
    Ok(directory.to_path_buf())
}

fn resolve_database_path(install_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        install_dir.join(path)
    }
}
