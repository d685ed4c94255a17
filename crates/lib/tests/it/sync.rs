//! Full sync runs through scratch, encode and install.

use std::os::unix::fs::PermissionsExt;

use fas_client::{
    SyncOptions,
    directory::Role,
    record::Category,
    sync::{ALIASES_FILE, RELAY_RECIPIENTS_FILE, compile_to_dir},
};

use crate::{
    context::SyncContext,
    helpers::{FailingEncoder, StaticDirectory, group, member, person, sample_directory},
};

fn mode_of(path: &std::path::Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[tokio::test]
async fn test_full_run_installs_every_database() {
    let ctx = SyncContext::new();
    let report = ctx
        .run(&sample_directory(), &SyncOptions::default())
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.people, 4);
    assert_eq!(report.groups, 3);
    assert_eq!(report.authorized, 3);
    let labels: Vec<_> = report
        .install
        .installed
        .iter()
        .map(|(label, _)| label.as_str())
        .collect();
    assert_eq!(labels, vec!["passwd", "shadow", "group"]);

    let passwd = ctx.installed_table(Category::Passwd);
    let alice = "alice:x:42:42:alice Example:/home/fedora/alice:/bin/bash";
    assert_eq!(passwd.by_id(42), Some(alice));
    assert_eq!(passwd.by_index(0), Some(alice));
    assert_eq!(passwd.by_name("alice"), Some(alice));
    assert_eq!(passwd.by_name("dave"), None);

    let shadow = ctx.installed_table(Category::Shadow);
    assert_eq!(
        shadow.by_name("bob"),
        Some("bob:$6$salt$bob:99999:0:99999:7:::")
    );

    let group = ctx.installed_table(Category::Group);
    assert_eq!(group.by_name("g1"), Some("g1:x:100:alice,bob"));
    assert_eq!(group.by_id(102), Some("empty:x:102:"));
    assert_eq!(group.by_name("dave"), Some("dave:x:7:"));
}

#[tokio::test]
async fn test_installed_modes() {
    let ctx = SyncContext::new();
    ctx.run(&sample_directory(), &SyncOptions::default())
        .await
        .unwrap();

    assert_eq!(mode_of(&ctx.live_path(Category::Shadow)), 0o400);
    assert_eq!(mode_of(&ctx.live_path(Category::Passwd)), 0o644);
    assert_eq!(mode_of(&ctx.live_path(Category::Group)), 0o644);
}

#[tokio::test]
async fn test_scratch_is_removed_after_run() {
    let ctx = SyncContext::new();
    ctx.run(&sample_directory(), &SyncOptions::default())
        .await
        .unwrap();
    assert!(ctx.scratch_leftovers().is_empty());

    let failing = FailingEncoder { fail_on: "group" };
    ctx.run_with(&sample_directory(), &failing, &SyncOptions::default())
        .await
        .unwrap();
    assert!(ctx.scratch_leftovers().is_empty());
}

#[tokio::test]
async fn test_skipped_category_leaves_live_file_alone() {
    let ctx = SyncContext::new();
    let live_group = ctx.live_path(Category::Group);
    std::fs::write(&live_group, "previous").unwrap();

    let options = SyncOptions {
        install_group: false,
        ..SyncOptions::default()
    };
    let report = ctx.run(&sample_directory(), &options).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.install.installed.len(), 2);
    assert_eq!(std::fs::read_to_string(&live_group).unwrap(), "previous");
    assert!(ctx.live_path(Category::Passwd).exists());
}

#[tokio::test]
async fn test_encode_failure_is_reported_and_run_continues() {
    let ctx = SyncContext::new();
    let live_shadow = ctx.live_path(Category::Shadow);
    std::fs::write(&live_shadow, "previous").unwrap();

    let failing = FailingEncoder { fail_on: "shadow" };
    let report = ctx
        .run_with(&sample_directory(), &failing, &SyncOptions::default())
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.install.failures.len(), 1);
    let (label, err) = &report.install.failures[0];
    assert_eq!(label, "shadow");
    assert!(err.is_encode_error());

    assert_eq!(std::fs::read_to_string(&live_shadow).unwrap(), "previous");
    assert!(ctx.installed_table(Category::Passwd).by_name("alice").is_some());
    assert!(ctx.installed_table(Category::Group).by_name("g1").is_some());
}

#[tokio::test]
async fn test_rejected_login_installs_nothing() {
    let ctx = SyncContext::new();
    let err = ctx
        .run(&StaticDirectory::rejecting(), &SyncOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_authentication_error());
    for category in Category::ALL {
        assert!(!ctx.live_path(category).exists());
    }
    assert!(ctx.scratch_leftovers().is_empty());
}

#[tokio::test]
async fn test_malformed_person_installs_nothing() {
    let ctx = SyncContext::new();
    let directory = StaticDirectory::new(
        vec![person(42, "alice"), person(43, "bad:name")],
        vec![group(100, "g1")],
        vec![member("g1", 42, Role::Member), member("g1", 43, Role::Member)],
    );
    let err = ctx
        .run(&directory, &SyncOptions::default())
        .await
        .unwrap_err();

    assert!(err.is_malformed_record());
    for category in Category::ALL {
        assert!(!ctx.live_path(category).exists());
    }
}

#[tokio::test]
async fn test_missing_template_is_fatal() {
    let ctx = SyncContext::new();
    let options = SyncOptions {
        aliases: true,
        ..SyncOptions::default()
    };
    let err = ctx.run(&sample_directory(), &options).await.unwrap_err();

    assert!(err.is_compile_error());
    assert!(!ctx.live_path(Category::Passwd).exists());
    assert!(!ctx.config().paths.aliases.exists());
}

#[tokio::test]
async fn test_alias_artifacts_are_installed() {
    let ctx = SyncContext::new().with_template("postmaster: root\n");
    let options = SyncOptions {
        aliases: true,
        ..SyncOptions::default()
    };
    let report = ctx.run(&sample_directory(), &options).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.install.installed.len(), 5);

    let paths = &ctx.config().paths;
    let aliases = std::fs::read_to_string(&paths.aliases).unwrap();
    assert!(aliases.starts_with("# Generated by fas-client\npostmaster: root\n"));
    assert!(aliases.contains("alice: alice@example.com\n"));
    assert!(aliases.contains("ops-administrators: carol\n"));

    let relay = std::fs::read_to_string(&paths.relay_recipients).unwrap();
    assert_eq!(
        relay,
        "alice@fedoraproject.org OK\nbob@example.com OK\ncarol@fedoraproject.org OK\n"
    );
    assert_eq!(mode_of(&paths.aliases), 0o644);
}

#[tokio::test]
async fn test_compile_to_dir_writes_text_only() {
    let ctx = SyncContext::new().with_template("");
    let out = ctx.root().join("out");
    let options = SyncOptions {
        aliases: true,
        ..SyncOptions::default()
    };
    let directory = sample_directory();
    let written = compile_to_dir(ctx.config(), &directory, &options, &out)
        .await
        .unwrap();

    assert_eq!(written.len(), 5);
    assert!(out.join(ALIASES_FILE).exists());
    assert!(out.join(RELAY_RECIPIENTS_FILE).exists());
    assert_eq!(mode_of(&out.join("shadow.txt")), 0o400);

    let passwd = std::fs::read_to_string(out.join("passwd.txt")).unwrap();
    assert_eq!(passwd.lines().count(), 9);
    assert!(passwd.starts_with("=42 alice:x:42:42:"));

    for category in Category::ALL {
        assert!(!ctx.live_path(category).exists());
    }
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let ctx = SyncContext::new();
    ctx.run(&sample_directory(), &SyncOptions::default())
        .await
        .unwrap();
    let first = std::fs::read(ctx.live_path(Category::Group)).unwrap();

    ctx.run(&sample_directory(), &SyncOptions::default())
        .await
        .unwrap();
    let second = std::fs::read(ctx.live_path(Category::Group)).unwrap();
    assert_eq!(first, second);
}
