use std::{fs, path::Path};

use super::{Config, ConfigError};

impl Config {
    /// Loads the configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse as a
    /// valid configuration.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let file_content = fs::read_to_string(path).map_err(|e| ConfigError::read(e, path))?;

        toml::from_str(&file_content).map_err(|e| ConfigError::parse(e, path))
    }

    /// Loads the configuration from a TOML file, falling back to
    /// `Config::default()` when the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_listen_address_and_bus_flag() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[server]\nlisten = \"0.0.0.0:9000\"\n\n[bus]\nprivate = true\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:9000");
        assert!(config.bus.private);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:8015");
        assert!(!config.bus.private);
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = Config::load_or_default(&path).unwrap();

        assert_eq!(config.server.listen, "127.0.0.1:8015");
        assert!(!config.bus.private);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[server\nlisten = 12").unwrap();

        let err = Config::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
