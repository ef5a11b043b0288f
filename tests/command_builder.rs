// tests/command_builder.rs

mod common;
use crate::common::builders::ConfigFileBuilder;

use fedorable::command::CommandBuilder;
use fedorable::config::defaults::builtin_config;
use fedorable::config::ConfigSnapshot;
use fedorable::errors::FedorableError;

fn stock_builder(script: &str) -> CommandBuilder {
    let mut cfg = builtin_config();
    cfg.settings.script = script.into();
    CommandBuilder::new(&cfg.settings, &cfg.catalogue)
}

#[test]
fn disabling_only_clean_journal() {
    let builder = stock_builder("/opt/fedorable/fedorable.sh");
    let snap = ConfigSnapshot::defaults(builder.catalogue()).with_task("clean_journal", false);

    let spec = builder.build(&snap).unwrap();
    assert_eq!(
        spec.argv(),
        ["pkexec", "/opt/fedorable/fedorable.sh", "--no-clean-journal"]
    );
}

#[test]
fn all_tasks_enabled_with_dry_run() {
    let builder = stock_builder("/opt/fedorable/fedorable.sh");
    let snap = ConfigSnapshot::defaults(builder.catalogue()).with_option("dry_run", true);

    let spec = builder.build(&snap).unwrap();
    assert_eq!(spec.argv(), ["pkexec", "/opt/fedorable/fedorable.sh", "--dry-run"]);
}

#[test]
fn every_stock_option_has_its_flag() {
    let builder = stock_builder("/s.sh");
    let mut snap = ConfigSnapshot::defaults(builder.catalogue());
    for option in builder.catalogue().options() {
        snap = snap.with_option(option.key.clone(), true);
    }

    let spec = builder.build(&snap).unwrap();
    assert_eq!(
        spec.flags(),
        [
            "--perform-timeshift",
            "--perform-backup",
            "--perform-update-firmware",
            "--perform-clear-history",
            "--yes",
            "--dry-run",
            "--email-report",
            "--check-only",
        ]
    );
}

#[test]
fn custom_catalogue_order_is_respected() {
    let cfg = ConfigFileBuilder::new()
        .elevation("sudo")
        .script("/srv/maint.sh")
        .task("zeta")
        .task("alpha")
        .task_with_default("beta", false)
        .option("perform_snapshot", None)
        .option("quiet", Some("--quiet"))
        .build();
    let builder = CommandBuilder::new(&cfg.settings, &cfg.catalogue);

    let snap = ConfigSnapshot::defaults(&cfg.catalogue)
        .with_task("alpha", false)
        .with_task("zeta", false)
        .with_option("quiet", true)
        .with_option("perform_snapshot", true);

    let spec = builder.build(&snap).unwrap();
    assert_eq!(
        spec.argv(),
        [
            "sudo",
            "/srv/maint.sh",
            "--no-zeta",
            "--no-alpha",
            "--no-beta",
            "--perform-snapshot",
            "--quiet",
        ]
    );
}

#[test]
fn empty_snapshot_is_invalid_configuration() {
    let builder = stock_builder("/s.sh");
    match builder.build(&ConfigSnapshot::default()) {
        Err(FedorableError::InvalidConfiguration(msg)) => {
            assert!(msg.contains("missing task 'update'"));
            assert!(msg.contains("missing option 'dry_run'"));
        }
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
}

#[test]
fn display_echoes_shell_quoted_command() {
    let builder = stock_builder("/home/op/My Tools/fedorable.sh");
    let snap = ConfigSnapshot::defaults(builder.catalogue()).with_option("yes", true);

    let spec = builder.build(&snap).unwrap();
    assert_eq!(
        spec.display(),
        "pkexec '/home/op/My Tools/fedorable.sh' --yes"
    );
}
