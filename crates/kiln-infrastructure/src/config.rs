//! Configuration loading: merges defaults, an optional TOML file, and
//! `KILN_`-prefixed environment overrides into [`KilnConfig`].

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use kiln_application::config::KilnConfig;
use kiln_domain::{Error, Result};
use std::path::Path;

/// Build a [`KilnConfig`] from, in ascending priority order: the struct's
/// `Default`, an optional `config.toml` at `path`, and `KILN_`-prefixed
/// environment variables (e.g. `KILN_THRESHOLDS.ACCEPTANCE=80`).
pub fn load(path: impl AsRef<Path>) -> Result<KilnConfig> {
    let path = path.as_ref();
    let mut figment = Figment::from(Serialized::defaults(KilnConfig::default()));
    if path.exists() {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("KILN_").split("__"));

    figment
        .extract()
        .map_err(|e| Error::configuration(format!("failed to load configuration from {}: {e}", path.display())))
}

/// Build a [`KilnConfig`] from pure defaults plus environment overrides,
/// skipping any file lookup (used by tests and embedders without a config
/// file on disk).
pub fn load_defaults() -> Result<KilnConfig> {
    Figment::from(Serialized::defaults(KilnConfig::default()))
        .merge(Env::prefixed("KILN_").split("__"))
        .extract()
        .map_err(|e| Error::configuration(format!("failed to load default configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let cfg = load_defaults().expect("defaults must always extract");
        assert_eq!(cfg.thresholds.acceptance, 80);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load("/nonexistent/path/config.toml").expect("missing file must not error");
        assert_eq!(cfg.pool.major_threshold, 2000);
    }
}
