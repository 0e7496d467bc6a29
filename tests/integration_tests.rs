//! Integration tests for buildtee
//!
//! These drive the real binary against small shell scripts standing in for
//! the version check and the build.
#![cfg(unix)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SEP: &str = "[INFO] ------------------------------------------------------------------------";

/// Helper to create a buildtee Command
fn buildtee() -> Command {
    cargo_bin_cmd!("buildtee")
}

/// Helper to create a project whose version check and build are scripts
fn create_project(version_script: &str, build_script: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("version.sh"), version_script).unwrap();
    fs::write(dir.path().join("build.sh"), build_script).unwrap();
    fs::write(
        dir.path().join("buildtee.toml"),
        format!(
            "[commands]\nversion = \"sh {v}\"\nbuild = \"sh {b}\"\n",
            v = dir.path().join("version.sh").display(),
            b = dir.path().join("build.sh").display(),
        ),
    )
    .unwrap();
    dir
}

fn echo_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|l| format!("printf '%s\\n' '{}'\n", l))
        .collect()
}

fn successful_build() -> String {
    echo_lines(&[
        "[INFO] Scanning for projects...",
        "[INFO] Building core [1/2]",
        "[INFO] Compiling 3 source files",
        "[INFO] Building api [2/2]",
        "[INFO] Compiling 5 source files",
        SEP,
        "[INFO] Reactor Summary for parent 1.0:",
        "[INFO] ",
        "[INFO] core ............................................... SUCCESS [  1.0 s]",
        "[INFO] api ................................................ SUCCESS [  2.0 s]",
        SEP,
        "[INFO] BUILD SUCCESS",
        SEP,
    ])
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_buildtee_help() {
        buildtee().arg("--help").assert().success();
    }

    #[test]
    fn test_buildtee_version() {
        buildtee().arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        buildtee().arg("--no-such-flag").assert().failure();
    }
}

// =============================================================================
// Successful Builds
// =============================================================================

mod success {
    use super::*;

    #[test]
    fn test_prints_version_banner_progress_and_summary() {
        let dir = create_project("echo 'Apache Maven 3.9.9'\n", &successful_build());

        buildtee()
            .current_dir(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Apache Maven 3.9.9"))
            .stdout(predicate::str::contains("Building all projects"))
            .stdout(predicate::str::contains("+ sh "))
            .stdout(predicate::str::contains("1/2| core\n"))
            .stdout(predicate::str::contains("2/2| api\n"))
            .stdout(predicate::str::contains("\nReactor Summary for parent 1.0:\n"))
            .stdout(predicate::str::contains("\nBUILD SUCCESS\n"))
            .stdout(predicate::str::contains("[INFO]").not())
            .stdout(predicate::str::contains("Compiling").not());
    }

    #[test]
    fn test_build_log_holds_every_line() {
        let dir = create_project("exit 0\n", &successful_build());

        buildtee().current_dir(dir.path()).assert().success();

        let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
        assert_eq!(log.lines().count(), 13);
        assert!(log.starts_with("[INFO] Scanning for projects...\n"));
        assert!(log.contains("[INFO] Compiling 5 source files\n"));
    }

    #[test]
    fn test_build_log_is_rewritten_each_run() {
        let dir = create_project("exit 0\n", "echo fresh\n");
        fs::write(dir.path().join("build.log"), "old\nold\nold\n").unwrap();

        buildtee().current_dir(dir.path()).assert().success();

        let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
        assert_eq!(log, "fresh\n");
    }

    #[test]
    fn test_stderr_of_build_lands_in_log() {
        let dir = create_project("exit 0\n", "echo to-stderr 1>&2\n");

        buildtee().current_dir(dir.path()).assert().success();

        let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
        assert_eq!(log, "to-stderr\n");
    }
}

// =============================================================================
// Failures
// =============================================================================

mod failures {
    use super::*;

    #[test]
    fn test_build_failure_dumps_window_and_exits_with_code() {
        let mut script = echo_lines(&[
            "[INFO] Building core [1/1]",
            "[ERROR] Failed to execute goal compile",
        ]);
        script.push_str("exit 1\n");
        let dir = create_project("exit 0\n", &script);

        buildtee()
            .current_dir(dir.path())
            .assert()
            .code(1)
            .stdout(predicate::str::contains("1/1| core\n"))
            .stdout(predicate::str::contains(
                "\n[INFO] Building core [1/1]\n[ERROR] Failed to execute goal compile\n",
            ));
    }

    #[test]
    fn test_failure_dump_is_bounded_by_window() {
        let dir = create_project(
            "exit 0\n",
            "echo first-line\necho second-line\necho third-line\nexit 5\n",
        );

        buildtee()
            .current_dir(dir.path())
            .env("BUILDTEE_WINDOW", "2")
            .assert()
            .code(5)
            .stdout(predicate::str::contains("second-line\nthird-line\n"))
            .stdout(predicate::str::contains("first-line").not());

        let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
        assert_eq!(log, "first-line\nsecond-line\nthird-line\n");
    }

    #[test]
    fn test_version_failure_stops_before_build() {
        let dir = create_project("echo no-maven\nexit 7\n", "echo building\n");

        buildtee()
            .current_dir(dir.path())
            .assert()
            .code(7)
            .stdout(predicate::str::contains("no-maven"))
            .stdout(predicate::str::contains("Building all projects").not());

        assert!(!dir.path().join("build.log").exists());
    }

    #[test]
    fn test_missing_program_is_fatal() {
        let dir = TempDir::new().unwrap();

        buildtee()
            .current_dir(dir.path())
            .env("BUILDTEE_VERSION_CMD", "buildtee-no-such-tool -v")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to spawn"));
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_zero_window_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("buildtee.toml"), "[log]\nwindow = 0\n").unwrap();

        buildtee()
            .current_dir(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("log.window"));
    }

    #[test]
    fn test_explicit_config_path() {
        let dir = create_project("exit 0\n", "echo via-explicit-config\n");
        let config = dir.path().join("buildtee.toml");
        let elsewhere = TempDir::new().unwrap();
        fs::rename(&config, elsewhere.path().join("custom.toml")).unwrap();

        buildtee()
            .current_dir(dir.path())
            .arg("--config")
            .arg(elsewhere.path().join("custom.toml"))
            .assert()
            .success();

        let log = fs::read_to_string(dir.path().join("build.log")).unwrap();
        assert_eq!(log, "via-explicit-config\n");
    }

    #[test]
    fn test_log_file_override() {
        let dir = create_project("exit 0\n", "echo custom\n");

        buildtee()
            .current_dir(dir.path())
            .env("BUILDTEE_LOG_FILE", "full.log")
            .assert()
            .success();

        assert!(dir.path().join("full.log").exists());
        assert!(!dir.path().join("build.log").exists());
    }
}
