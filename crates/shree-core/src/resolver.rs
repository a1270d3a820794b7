//! Executable resolution: which candidate of an application alias is
//! actually present on the system.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Outcome of resolving an ordered candidate list. Produced fresh per
/// request and never cached; installed software can change between calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionResult {
    Resolved(PathBuf),
    Unresolved,
}

/// Resolve `candidates` against the current `PATH`.
pub fn resolve<S: AsRef<str>>(candidates: &[S]) -> ResolutionResult {
    let path = std::env::var_os("PATH").unwrap_or_default();
    resolve_in(&path, candidates)
}

/// Resolve `candidates` against an explicit search path.
///
/// Candidates are scanned in declared order and the first executable hit
/// wins; a file that exists but lacks the execute bit is a non-match.
pub fn resolve_in<S: AsRef<str>>(search_path: &OsStr, candidates: &[S]) -> ResolutionResult {
    for candidate in candidates {
        for dir in std::env::split_paths(search_path) {
            if dir.as_os_str().is_empty() {
                continue;
            }
            let full = dir.join(candidate.as_ref());
            if is_executable(&full) {
                tracing::debug!(candidate = candidate.as_ref(), path = %full.display(), "resolved executable");
                return ResolutionResult::Resolved(full);
            }
        }
    }
    ResolutionResult::Unresolved
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn place(dir: &TempDir, name: &str, executable: bool) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.path().join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        let mode = if executable { 0o755 } else { 0o644 };
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn search_path(dirs: &[&TempDir]) -> OsString {
        std::env::join_paths(dirs.iter().map(|d| d.path())).unwrap()
    }

    #[test]
    #[cfg(unix)]
    fn first_present_candidate_wins() {
        let dir = TempDir::new().unwrap();
        let konsole = place(&dir, "konsole", true);
        place(&dir, "xfce4-terminal", true);

        let result = resolve_in(
            &search_path(&[&dir]),
            &["gnome-terminal", "konsole", "xfce4-terminal"],
        );
        assert_eq!(result, ResolutionResult::Resolved(konsole));
    }

    #[test]
    #[cfg(unix)]
    fn declared_order_beats_search_path_order() {
        // The preferred candidate sits in a later PATH entry; it must
        // still win over a less-preferred candidate found earlier.
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        place(&first, "konsole", true);
        let preferred = place(&second, "gnome-terminal", true);

        let result = resolve_in(&search_path(&[&first, &second]), &["gnome-terminal", "konsole"]);
        assert_eq!(result, ResolutionResult::Resolved(preferred));
    }

    #[test]
    #[cfg(unix)]
    fn non_executable_file_is_not_a_match() {
        let dir = TempDir::new().unwrap();
        place(&dir, "gnome-terminal", false);
        let konsole = place(&dir, "konsole", true);

        let result = resolve_in(&search_path(&[&dir]), &["gnome-terminal", "konsole"]);
        assert_eq!(result, ResolutionResult::Resolved(konsole));
    }

    #[test]
    fn no_candidate_present_is_unresolved() {
        let dir = TempDir::new().unwrap();
        let result = resolve_in(&search_path(&[&dir]), &["gnome-control-center", "systemsettings5"]);
        assert_eq!(result, ResolutionResult::Unresolved);
    }

    #[test]
    fn empty_search_path_is_unresolved() {
        let result = resolve_in(OsStr::new(""), &["sh"]);
        assert_eq!(result, ResolutionResult::Unresolved);
    }

    #[test]
    #[cfg(unix)]
    fn directory_with_candidate_name_is_not_a_match() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("konsole")).unwrap();

        let result = resolve_in(&search_path(&[&dir]), &["konsole"]);
        assert_eq!(result, ResolutionResult::Unresolved);
    }
}
