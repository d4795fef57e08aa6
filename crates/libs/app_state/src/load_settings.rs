use crate::{AppSettings, RawSettings};
use color_eyre::eyre::Result;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use std::path::Path;

const SETTINGS_PATH: &str = "config/settings.yaml";

/// Loads `config/settings.yaml`, overridden by `APP__*` environment variables.
pub fn load_app_settings() -> Result<AppSettings> {
    // Need to load from dotenv to get it to overwrite the db url from env.
    dotenv::from_path(".env").ok();
    let config_path = Path::new(SETTINGS_PATH).canonicalize()?;

    let builder = with_env_overrides(Config::builder().add_source(File::from(config_path)));
    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;

    Ok(raw_settings.into())
}

/// Parses settings from a YAML string, still honouring `APP__*` environment overrides.
pub fn app_settings_from_yaml(yaml: &str) -> Result<AppSettings> {
    let builder =
        with_env_overrides(Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml)));
    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;

    Ok(raw_settings.into())
}

fn with_env_overrides(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    )
}
