//! # XDG
//!
//! Resolve the directories that may hold a `config.ini` for the editor, in the order they should
//! be applied (system-wide first, user-level last, so later entries win).

use std::env;
use std::path::PathBuf;

const APP_NAME: &str = "kiroglyph";

/// Return the ordered list of configuration directories to search.
pub fn config_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/etc").join(APP_NAME)];
    if let Some(dir) = user_config_dir() {
        dirs.push(dir);
    }
    dirs
}

/// The user-level configuration directory: `$XDG_CONFIG_HOME/kiroglyph`, or
/// `$HOME/.config/kiroglyph` if `XDG_CONFIG_HOME` is unset.
fn user_config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        if !xdg_config_home.is_empty() {
            return Some(PathBuf::from(xdg_config_home).join(APP_NAME));
        }
    }
    env::var("HOME").ok().map(|home| PathBuf::from(home).join(".config").join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn xdg_config_home_takes_priority() {
        env::set_var("XDG_CONFIG_HOME", "/tmp/xdg-home");
        let dirs = config_dirs();
        assert_eq!(dirs.last().unwrap(), &PathBuf::from("/tmp/xdg-home").join(APP_NAME));
        env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    fn falls_back_to_home_config() {
        env::remove_var("XDG_CONFIG_HOME");
        env::set_var("HOME", "/tmp/home");
        let dirs = config_dirs();
        assert_eq!(dirs.last().unwrap(), &PathBuf::from("/tmp/home/.config").join(APP_NAME));
    }
}
