use kvcore_engine::EngineConfig;
use serde::Deserialize;

/// The full configuration surface read by the binary: every option in
/// `EngineConfig`'s table, flattened into the same TOML table, plus the
/// two knobs only a deployable process needs (where to listen, how loud
/// to log). Lower crates only ever see `EngineConfig`; this type exists
/// solely at the process boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct KvConfig {
    #[serde(flatten)]
    pub(crate) engine: EngineConfig,
    pub(crate) listen_addr: String,
    pub(crate) log_level: String,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self { engine: EngineConfig::default(), listen_addr: "127.0.0.1:7878".to_owned(), log_level: "info".to_owned() }
    }
}

/// Loads configuration from (lowest to highest precedence) built-in
/// defaults, an optional TOML file, then `KVCORE_*` environment
/// variables, matching the layering described for the binary's
/// configuration surface.
pub(crate) fn load(config_path: Option<&std::path::Path>) -> Result<KvConfig, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix("KVCORE").separator("_"));
    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_used_when_no_file_or_env_is_present() {
        let config = load(None).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:7878");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn a_missing_config_file_is_tolerated() {
        let config = load(Some(std::path::Path::new("/nonexistent/kvcored.toml"))).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:7878");
    }
}
