use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

mod test {

    use super::*;

    #[test]
    fn cli_version_flag() {
        Command::cargo_bin("surfacer")
            .unwrap()
            .arg("--version")
            .assert()
            .success()
            .stdout(contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn cli_help_lists_subcommands() {
        Command::cargo_bin("surfacer")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("enumerate").and(contains("regions")));
    }

    #[test]
    fn enumerate_help_shows_artifact_defaults() {
        Command::cargo_bin("surfacer")
            .unwrap()
            .args(["enumerate", "--help"])
            .assert()
            .success()
            .stdout(
                contains("/tmp/asi_assets.ndjson")
                    .and(contains("/tmp/asi_hosts.txt"))
                    .and(contains("/tmp/asi_summary.csv"))
                    .and(contains("ROLE_TO_ASSUME")),
            );
    }
}
