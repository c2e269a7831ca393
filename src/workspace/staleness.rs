//! Staleness check for packaged workspace artifacts.

use std::path::Path;
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::util::config::StalenessPolicy;
use crate::util::fs::{is_regular_file, modified};

/// Whether `packaged` is up to date with the compiled output in `output_dir`.
///
/// The file must exist. It is up to date when the output directory is
/// missing, when it was written after `build_start`, or when no file or
/// directory below `output_dir` is newer than it. Scan errors are answered
/// by `policy`.
pub fn is_actual(
    packaged: &Path,
    output_dir: &Path,
    build_start: Option<SystemTime>,
    policy: StalenessPolicy,
) -> bool {
    if !is_regular_file(packaged) {
        return false;
    }
    if !output_dir.is_dir() {
        return true;
    }

    let artifact_time = match modified(packaged) {
        Ok(time) => time,
        Err(e) => return scan_failed(packaged, policy, &e),
    };
    if build_start.is_some_and(|start| artifact_time > start) {
        return true;
    }

    for entry in WalkDir::new(output_dir).min_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return scan_failed(packaged, policy, &e),
        };
        let entry_time = match entry.metadata() {
            Ok(metadata) => match metadata.modified() {
                Ok(time) => time,
                Err(e) => return scan_failed(packaged, policy, &e),
            },
            Err(e) => return scan_failed(packaged, policy, &e),
        };

        if entry_time > artifact_time {
            tracing::debug!(
                "{} is stale: {} is newer",
                packaged.display(),
                entry.path().display()
            );
            return false;
        }
    }

    true
}

fn scan_failed(packaged: &Path, policy: StalenessPolicy, error: &dyn std::fmt::Display) -> bool {
    let actual = policy == StalenessPolicy::FailOpen;
    tracing::warn!(
        "Failed to check whether {} is up-to-date, assuming it is{}: {}",
        packaged.display(),
        if actual { "" } else { " not" },
        error
    );
    actual
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    const T: i64 = 1_700_000_000;

    struct Fixture {
        _tmp: TempDir,
        packaged: PathBuf,
        classes: PathBuf,
        class_file: PathBuf,
    }

    /// target/app-1.0.jar at `T`, target/classes/pkg/App.class at `class_time`.
    fn fixture(class_time: i64) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        let classes = target.join("classes");
        let pkg = classes.join("pkg");
        fs::create_dir_all(&pkg).unwrap();

        let packaged = target.join("app-1.0.jar");
        let class_file = pkg.join("App.class");
        fs::write(&packaged, "jar").unwrap();
        fs::write(&class_file, "class").unwrap();

        set_file_mtime(&packaged, FileTime::from_unix_time(T, 0)).unwrap();
        set_file_mtime(&class_file, FileTime::from_unix_time(class_time, 0)).unwrap();
        set_file_mtime(&pkg, FileTime::from_unix_time(T - 10, 0)).unwrap();

        Fixture {
            _tmp: tmp,
            packaged,
            classes,
            class_file,
        }
    }

    fn at(secs: i64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs as u64)
    }

    #[test]
    fn test_older_output_is_actual() {
        let f = fixture(T - 1);
        assert!(is_actual(&f.packaged, &f.classes, None, StalenessPolicy::FailOpen));
    }

    #[test]
    fn test_newer_output_is_stale() {
        let f = fixture(T + 1);
        assert!(!is_actual(&f.packaged, &f.classes, None, StalenessPolicy::FailOpen));
    }

    #[test]
    fn test_newer_directory_is_stale() {
        let f = fixture(T - 1);
        let pkg = f.class_file.parent().unwrap();
        set_file_mtime(pkg, FileTime::from_unix_time(T + 5, 0)).unwrap();
        assert!(!is_actual(&f.packaged, &f.classes, None, StalenessPolicy::FailOpen));
    }

    #[test]
    fn test_packaged_during_build_is_actual() {
        let f = fixture(T + 1);
        assert!(is_actual(&f.packaged, &f.classes, Some(at(T - 60)), StalenessPolicy::FailOpen));
        // packaged before the build started: the scan decides
        assert!(!is_actual(&f.packaged, &f.classes, Some(at(T + 60)), StalenessPolicy::FailOpen));
    }

    #[test]
    fn test_missing_files() {
        let f = fixture(T - 1);
        let missing = f.classes.join("nothing.jar");
        assert!(!is_actual(&missing, &f.classes, None, StalenessPolicy::FailOpen));
        // a directory is not a packaged file
        assert!(!is_actual(&f.classes, &f.classes, None, StalenessPolicy::FailOpen));
        // no compiled output at all
        assert!(is_actual(&f.packaged, &f.classes.join("gone"), None, StalenessPolicy::FailClosed));
    }

    #[test]
    fn test_scan_failure_follows_policy() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(scan_failed(Path::new("a.jar"), StalenessPolicy::FailOpen, &err));
        assert!(!scan_failed(Path::new("a.jar"), StalenessPolicy::FailClosed, &err));
    }
}
