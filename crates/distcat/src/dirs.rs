use std::{
    env,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;

/// Configuration directory name
const CONFIG_DIR: &str = "distcat";

/// Configuration file name
const CONFIG_FILE: &str = "distcat.toml";

/// Returns the path to the user configuration directory.
///
/// On Windows, use, e.g., C:\Users\Alice\AppData\Roaming
/// On Linux and macOS, use `XDG_CONFIG_HOME` or $HOME/.config, e.g., /home/alice/.config.
pub fn user_config_dir() -> Option<PathBuf> {
    match etcetera::choose_base_strategy() {
        Ok(dirs) => Some(dirs.config_dir()),
        Err(_) => None,
    }
}

pub fn user_distcat_config_dir() -> Option<PathBuf> {
    user_config_dir().map(|mut path| {
        path.push(CONFIG_DIR);
        path
    })
}

#[cfg(not(windows))]
fn locate_system_config_xdg(value: Option<&str>) -> Option<PathBuf> {
    // On Linux and macOS, read the `XDG_CONFIG_DIRS` environment variable.
    let default = "/etc/xdg";
    let config_dirs = value.filter(|s| !s.is_empty()).unwrap_or(default);

    for dir in config_dirs.split(':').take_while(|s| !s.is_empty()) {
        let distcat_toml_path = Path::new(dir).join(CONFIG_DIR).join(CONFIG_FILE);
        if distcat_toml_path.is_file() {
            return Some(distcat_toml_path);
        }
    }
    None
}

#[cfg(windows)]
fn locate_system_config_windows(system_drive: impl AsRef<Path>) -> Option<PathBuf> {
    // On Windows, use `%SYSTEMDRIVE%\ProgramData\distcat\distcat.toml` (e.g., `C:\ProgramData`).
    let candidate = system_drive
        .as_ref()
        .join("ProgramData")
        .join(CONFIG_DIR)
        .join(CONFIG_FILE);
    candidate.as_path().is_file().then_some(candidate)
}

/// Returns the path to the system configuration file.
///
/// On Unix-like systems, uses the `XDG_CONFIG_DIRS` environment variable (falling back to
/// `/etc/xdg/distcat/distcat.toml` if unset or empty) and then `/etc/distcat/distcat.toml`
///
/// On Windows, uses `%SYSTEMDRIVE%\ProgramData\distcat\distcat.toml`.
pub fn system_config_file() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        env::var("SYSTEMDRIVE")
            .ok()
            .and_then(|system_drive| locate_system_config_windows(PathBuf::from(system_drive)))
    }

    #[cfg(not(windows))]
    {
        // Convert Result to Option - we want to continue if env var is not set
        let xdg_config_dirs = env::var("XDG_CONFIG_DIRS").ok();
        if let Some(path) = locate_system_config_xdg(xdg_config_dirs.as_deref()) {
            return Some(path);
        }

        // Fallback to `/etc/distcat/distcat.toml` if `XDG_CONFIG_DIRS` is not set or no valid
        // path is found.
        let candidate = Path::new("/etc").join(CONFIG_DIR).join(CONFIG_FILE);
        match candidate.try_exists() {
            Ok(true) => Some(candidate),
            Ok(false) => None,
            Err(err) => {
                log::warn!("Failed to query system configuration file: {err}");
                None
            }
        }
    }
}
