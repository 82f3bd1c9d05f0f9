use stagegate_core::paths::STAGEGATE_DIR;
use std::path::{Path, PathBuf};

/// Resolve the stagegate root directory.
///
/// Priority:
/// 1. `--root` flag / `STAGEGATE_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.stagegate/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, STAGEGATE_DIR)
        .or_else(|| find_upward(&cwd, ".git"))
        .unwrap_or(cwd)
}

/// First ancestor of `start` (inclusive) containing a `marker` directory.
fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_stagegate_dir_from_nested_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".stagegate")).unwrap();
        let subdir = dir.path().join("docs/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(
            find_upward(&subdir, ".stagegate").as_deref(),
            Some(dir.path())
        );
    }

    #[test]
    fn stagegate_marker_beats_git() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("team");
        std::fs::create_dir_all(inner.join(".stagegate")).unwrap();

        let found = find_upward(&inner, ".stagegate").or_else(|| find_upward(&inner, ".git"));
        assert_eq!(found.as_deref(), Some(inner.as_path()));
    }

    #[test]
    fn missing_marker_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(find_upward(dir.path(), "no-such-marker-dir").is_none());
    }
}
