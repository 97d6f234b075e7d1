use std::path::PathBuf;

use crate::config::Settings;

/// Where the command log is written: ~/.local/share/sift/sift.log.
pub fn log_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".local/share/sift/sift.log"))
}

/// Install a file logger at the configured level.
/// Best-effort: failures are silently ignored (logging must never block the
/// interpreter).
pub fn init(settings: &Settings) {
    let Some(path) = log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    else {
        return;
    };

    let config = simplelog::ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let _ = simplelog::WriteLogger::init(settings.log_level(), config, file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_path_under_home() {
        if let Some(path) = log_path() {
            assert!(path.ends_with(".local/share/sift/sift.log"));
        }
    }
}
