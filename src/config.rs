//! REPL configuration (SPEC_FULL.md's [EXPANSION] "Configuration"
//! section): an optional `.oscine.toml` read from the current directory,
//! parsed with `serde`/`toml` the way `passerine-aspen::manifest` reads
//! its package manifest. Absence of the file is not an error -- every
//! field has a default.

use std::fs;
use std::path::Path;

use serde::Deserialize;

fn default_prompt() -> String { "oscine> ".to_string() }

fn default_history_file() -> String { ".oscine_history".to_string() }

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for Config {
    fn default() -> Config {
        Config { prompt: default_prompt(), history_file: default_history_file() }
    }
}

impl Config {
    /// Reads and parses `path`. A missing file is not an error -- this
    /// returns the default configuration, exactly like
    /// `passerine-aspen::manifest::Manifest::package` except that an
    /// `.oscine.toml` is optional where an `aspen.toml` is not.
    pub fn load(path: &Path) -> Result<Config, String> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => return Ok(Config::default()),
        };
        toml::from_str(&contents).map_err(|e| format!("Could not parse {}: {}", path.display(), e))
    }

    /// Looks for `.oscine.toml` in `dir`, falling back to defaults.
    pub fn discover(dir: &Path) -> Result<Config, String> { Config::load(&dir.join(".oscine.toml")) }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let config = Config::load(Path::new("/nonexistent/.oscine.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_partial_overrides() {
        let config: Config = toml::from_str(r#"prompt = "> ""#).unwrap();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history_file, default_history_file());
    }
}
