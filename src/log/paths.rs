use std::path::{Path, PathBuf};

/// Directory of the running executable, or the current working directory on error.
pub(crate) fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// File stem of the running executable; `"unknown"` if it cannot be determined.
pub(crate) fn process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Expands tilde (`~`) in file paths to the user's home directory.
pub(crate) fn expand_path(path_str: &str) -> PathBuf {
    if path_str.starts_with('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);

        if let Some(mut home_path) = home {
            if path_str == "~" {
                return home_path;
            }
            if path_str.starts_with("~/") || path_str.starts_with("~\\") {
                home_path.push(&path_str[2..]);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}

/// Resolves a configured directory: `~` is expanded and relative paths are
/// anchored at the executable's directory.
pub(crate) fn resolve_log_dir(configured: &str) -> PathBuf {
    let p = expand_path(configured);
    if p.is_absolute() {
        p
    } else {
        exe_dir_fallback_cwd().join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_dirs_are_kept() {
        let abs = std::env::temp_dir().join("fanlog-abs");
        let s = abs.to_string_lossy().into_owned();
        assert_eq!(resolve_log_dir(&s), abs);
    }

    #[test]
    fn relative_dirs_sit_next_to_executable() {
        assert_eq!(resolve_log_dir("logs"), exe_dir_fallback_cwd().join("logs"));
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_path("a/b"), PathBuf::from("a/b"));
    }
}
