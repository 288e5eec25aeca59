//! # Configuration
//!
//! Utilities to configure the text editor.

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::xdg::config_dirs;
use crate::Error;

#[derive(Debug, PartialEq)]
pub struct Config {
    /// The size of a tab. Must be > 0.
    pub tab_stop: usize,
    /// The number of confirmations needed before quitting, when changes have been made since the
    /// file was last changed.
    pub quit_times: usize,
    /// The duration for which messages are shown in the status bar.
    pub message_dur: Duration,
    /// Whether to display line numbers.
    pub show_line_num: bool,
}

impl Default for Config {
    /// Default configuration.
    fn default() -> Self {
        Self { tab_stop: 8, quit_times: 3, message_dur: Duration::new(5, 0), show_line_num: true }
    }
}

impl Config {
    /// Load the configuration, potentially overridden using `config.ini` files that can be located
    /// in the following directories:
    ///   - `/etc/kiroglyph` (system-wide configuration).
    ///   - `$XDG_CONFIG_HOME/kiroglyph` if environment variable `$XDG_CONFIG_HOME` is defined,
    ///     `$HOME/.config/kiroglyph` otherwise (user-level configuration).
    ///
    /// Files are applied in that order, so a user-level setting overrides a system-wide one.
    ///
    /// # Errors
    ///
    /// Will return `Err` if one of the configuration files cannot be parsed properly.
    pub fn load() -> Result<Self, Error> {
        let mut config = Self::default();
        for dir in config_dirs() {
            let path = dir.join("config.ini");
            if path.is_file() {
                config.apply_file(&path)?;
            }
        }
        Ok(config)
    }

    /// Parse a single `config.ini` file and apply its key-value pairs to `self`.
    fn apply_file(&mut self, path: &Path) -> Result<(), Error> {
        process_ini_file(path, &mut |key, value| match key {
            "tab_stop" => {
                self.tab_stop = parse_value(value)?;
                Ok(())
            }
            "quit_times" => {
                self.quit_times = parse_value(value)?;
                Ok(())
            }
            "message_duration_ms" => {
                self.message_dur = Duration::from_millis(parse_value(value)?);
                Ok(())
            }
            "show_line_numbers" => {
                self.show_line_num = parse_value(value)?;
                Ok(())
            }
            other => Err(format!("unrecognized configuration key: {other}")),
        })
    }
}

/// Process an INI file.
///
/// The `kv_fn` function will be called for each key-value pair in the file. Typically, this
/// function will update a configuration instance. Blank lines and lines starting with `#` or `;`
/// are ignored.
pub fn process_ini_file<F>(path: &Path, kv_fn: &mut F) -> Result<(), Error>
where F: FnMut(&str, &str) -> Result<(), String> {
    let contents = fs::read_to_string(path)?;
    for (i, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(Error::Config(
                path.to_path_buf(),
                i + 1,
                format!("expected `key = value`, got: {line}"),
            ));
        };
        kv_fn(key.trim(), value.trim())
            .map_err(|msg| Error::Config(path.to_path_buf(), i + 1, msg))?;
    }
    Ok(())
}

/// Trim a value (right-hand side of a key-value INI line) and parse it.
pub fn parse_value<T: FromStr<Err = E>, E: Display>(value: &str) -> Result<T, String> {
    value.trim().parse().map_err(|e| format!("could not parse {value:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_original_source() {
        let config = Config::default();
        assert_eq!(config.tab_stop, 8);
        assert_eq!(config.quit_times, 3);
        assert_eq!(config.message_dur, Duration::new(5, 0));
        assert!(config.show_line_num);
    }

    #[test]
    fn parse_value_rejects_garbage() {
        let result: Result<usize, String> = parse_value("not-a-number");
        assert!(result.is_err());
    }

    #[test]
    fn process_ini_file_applies_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "tab_stop = 4\nquit_times = 1\n# comment\n\nshow_line_numbers = false\n")
            .unwrap();
        let mut config = Config::default();
        config.apply_file(&path).unwrap();
        assert_eq!(config.tab_stop, 4);
        assert_eq!(config.quit_times, 1);
        assert!(!config.show_line_num);
    }

    #[test]
    fn process_ini_file_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "not-a-kv-pair\n").unwrap();
        let err = Config::default().apply_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_, 1, _)));
    }
}
