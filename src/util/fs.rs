//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Make a path absolute without touching the filesystem.
/// Returns the path as-is if the current directory is unavailable.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Canonicalize a path, but don't fail if it doesn't exist yet.
/// Returns the path as-is if canonicalization fails.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Whether two paths name the same location once normalized.
pub fn same_location(a: &Path, b: &Path) -> bool {
    a == b || normalize_path(a) == normalize_path(b)
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Check that a path exists and is a regular file.
pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Modification time of a path.
pub fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Render a repository-relative path with `/` separators.
pub fn to_slash_string(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relative_path_across_siblings() {
        let rel = relative_path(Path::new("/home/u/.m2/repository"), Path::new("/w/target/local-repo/g/a"));
        assert_eq!(rel, PathBuf::from("../../../../w/target/local-repo/g/a"));
    }

    #[test]
    fn test_is_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.jar");
        fs::write(&file, "jar").unwrap();

        assert!(is_regular_file(&file));
        assert!(!is_regular_file(tmp.path()));
        assert!(!is_regular_file(&tmp.path().join("missing.jar")));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/home/u/.m2/repository/../../../../w/./target/a.jar")),
            PathBuf::from("/w/target/a.jar")
        );
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_lexically(Path::new("../a/../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_absolute_path() {
        assert!(absolute_path(Path::new("relative/dir")).is_absolute());
    }
}
