//! CLI help output tests for vt-core.
//!
//! These tests verify that all commands and subcommands correctly display
//! their help text without errors.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for vt-core binary.
fn vt_core() -> Command {
    Command::cargo_bin("vt-core").expect("vt-core binary should exist")
}

mod top_level {
    use super::*;

    #[test]
    fn help_flag_works() {
        vt_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Vet triage assessment engine"));
    }

    #[test]
    fn help_subcommand_works() {
        vt_core()
            .arg("help")
            .assert()
            .success()
            .stdout(predicate::str::contains("assess"));
    }

    #[test]
    fn version_flag_works() {
        vt_core()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("vt-core"));
    }

    #[test]
    fn help_shows_all_commands() {
        vt_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("assess"))
            .stdout(predicate::str::contains("classify"))
            .stdout(predicate::str::contains("catalog"))
            .stdout(predicate::str::contains("version"));
    }

    #[test]
    fn help_shows_global_options() {
        vt_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--catalog"))
            .stdout(predicate::str::contains("--preset"))
            .stdout(predicate::str::contains("--format"))
            .stdout(predicate::str::contains("--log-format"));
    }

    #[test]
    fn no_command_is_args_error() {
        vt_core().assert().code(10);
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn assess_help() {
        vt_core()
            .args(["assess", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--answer"))
            .stdout(predicate::str::contains("--share-context"))
            .stdout(predicate::str::contains("--advance-delay-ms"));
    }

    #[test]
    fn classify_help() {
        vt_core()
            .args(["classify", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<SCORE>"));
    }

    #[test]
    fn catalog_help_lists_subcommands() {
        vt_core()
            .args(["catalog", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("show"))
            .stdout(predicate::str::contains("validate"))
            .stdout(predicate::str::contains("presets"));
    }

    #[test]
    fn unknown_subcommand_fails() {
        vt_core()
            .arg("diagnose")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn unknown_preset_fails() {
        vt_core()
            .args(["--preset", "hamster", "classify", "3"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("Unknown preset 'hamster'"));
    }
}
