//! Compilation scenarios over small, hand-built directories.

use std::path::PathBuf;

use fas_client::{
    MembershipIndex,
    alias::{AliasCompiler, AliasTemplate},
    directory::Role,
    record::{AccountSettings, Category, KeyKind, RecordCompiler, RecordKey, RecordTable},
};

use crate::helpers::{StaticDirectory, group, member, person, sample_directory};

fn settings() -> AccountSettings {
    AccountSettings {
        home_root: PathBuf::from("/home/fedora"),
        shell: "/bin/bash".to_string(),
    }
}

#[test]
fn test_alias_enabled_member_is_everywhere() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = settings();
    let records = RecordCompiler::new(&snapshot, &index, &settings)
        .compile_all()
        .unwrap();

    let passwd = RecordTable::parse(&records.passwd.to_text());
    let shadow = RecordTable::parse(&records.shadow.to_text());
    assert!(passwd.by_name("alice").is_some());
    assert!(shadow.by_id(42).is_some());

    let template = AliasTemplate::from_text("");
    let aliases = AliasCompiler::new(&snapshot, &index, &template, "fedoraproject.org")
        .unwrap()
        .compile();
    let members_line = aliases
        .aliases
        .lines()
        .find(|l| l.starts_with("g1-members: "))
        .unwrap();
    assert!(members_line.split(": ").nth(1).unwrap().split(',').any(|a| a == "alice"));
}

#[test]
fn test_person_without_membership_is_excluded() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = settings();
    let records = RecordCompiler::new(&snapshot, &index, &settings)
        .compile_all()
        .unwrap();

    assert!(!index.is_valid_user(7));
    assert!(records.passwd.records().iter().all(|r| r.id != 7));
    assert!(records.shadow.records().iter().all(|r| r.id != 7));
    // dave still resolves as a private group.
    assert!(RecordTable::parse(&records.group.to_text()).by_name("dave").is_some());

    let template = AliasTemplate::from_text("");
    let aliases = AliasCompiler::new(&snapshot, &index, &template, "fedoraproject.org")
        .unwrap()
        .compile();
    assert!(!aliases.aliases.contains("dave"));
    assert!(!aliases.relay_recipients.contains("dave"));
}

#[test]
fn test_lone_administrator_appears_in_all_lists() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let template = AliasTemplate::from_text("");
    let aliases = AliasCompiler::new(&snapshot, &index, &template, "fedoraproject.org")
        .unwrap()
        .compile();
    for suffix in ["administrators", "sponsors", "members"] {
        assert!(
            aliases.aliases.contains(&format!("ops-{suffix}: carol\n")),
            "missing ops-{suffix}"
        );
    }
}

#[test]
fn test_non_alias_person_routes_by_literal_email() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let template = AliasTemplate::from_text("");
    let aliases = AliasCompiler::new(&snapshot, &index, &template, "fedoraproject.org")
        .unwrap()
        .compile();

    assert!(aliases.relay_recipients.lines().any(|l| l == "bob@example.com OK"));
    assert!(aliases.aliases.contains("g1-sponsors: bob@example.com\n"));
    assert!(aliases.aliases.contains("g1-members: alice,bob@example.com\n"));
    assert!(!aliases.aliases.contains("bob@fedoraproject.org"));
}

#[test]
fn test_missing_username_aborts_compilation() {
    let directory = StaticDirectory::new(
        vec![person(42, "alice"), person(43, "")],
        vec![group(100, "g1")],
        vec![member("g1", 42, Role::Member), member("g1", 43, Role::Member)],
    );
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = settings();
    let err = RecordCompiler::new(&snapshot, &index, &settings)
        .compile_all()
        .unwrap_err();
    assert!(err.is_malformed());
    assert_eq!(err.entity_id(), 43);
    assert_eq!(err.field(), Some("username"));
}

#[test]
fn test_every_key_resolves_to_the_same_payload() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = settings();
    let records = RecordCompiler::new(&snapshot, &index, &settings)
        .compile_all()
        .unwrap();

    for category in Category::ALL {
        let set = records.get(category);
        let table = RecordTable::parse(&set.to_text());
        assert_eq!(table.len(), set.len() * 3, "{category} has colliding keys");
        for (index, record) in set.records().iter().enumerate() {
            for key in record.keys(index) {
                assert_eq!(
                    table.get(&key),
                    Some(record.payload.as_str()),
                    "{category} key {key}"
                );
            }
        }
    }
}

#[test]
fn test_index_keys_are_dense_and_independent_of_ids() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = settings();
    let records = RecordCompiler::new(&snapshot, &index, &settings)
        .compile_all()
        .unwrap();
    let text = records.passwd.to_text();
    let index_keys: Vec<_> = text
        .lines()
        .filter_map(|l| RecordKey::parse(l.split(' ').next().unwrap()))
        .filter(|k| k.kind() == KeyKind::Index)
        .collect();
    assert_eq!(
        index_keys,
        vec![RecordKey::Index(0), RecordKey::Index(1), RecordKey::Index(2)]
    );
}

#[test]
fn test_roles_nest_for_every_group() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    for g in snapshot.groups() {
        let roles = index.roles_of(&g.name);
        assert!(roles.administrators().iter().all(|id| roles.sponsors().contains(id)));
        assert!(roles.sponsors().iter().all(|id| roles.members().contains(id)));
        let mut unique = roles.members().to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), roles.members().len());
    }
}

#[test]
fn test_distribution_lists_are_already_sorted() {
    let directory = sample_directory();
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let template = AliasTemplate::from_text("");
    let aliases = AliasCompiler::new(&snapshot, &index, &template, "fedoraproject.org")
        .unwrap()
        .compile();
    for line in aliases.aliases.lines().filter(|l| l.contains("-members: ")) {
        let list: Vec<_> = line.split(": ").nth(1).unwrap().split(',').collect();
        let mut resorted = list.clone();
        resorted.sort_unstable();
        assert_eq!(list, resorted);
    }
}

#[test]
fn test_overlapping_person_and_group_ids_keep_keys_unique() {
    let directory = StaticDirectory::new(
        vec![person(100, "alice"), person(101, "bob")],
        vec![group(100, "web"), group(102, "bob")],
        vec![member("web", 100, Role::Member), member("bob", 101, Role::Sponsor)],
    );
    let snapshot = directory.snapshot();
    let index = MembershipIndex::new(snapshot.memberships());
    let settings = settings();
    let records = RecordCompiler::new(&snapshot, &index, &settings)
        .compile_all()
        .unwrap();

    let set = records.get(Category::Group);
    let table = RecordTable::parse(&set.to_text());
    assert_eq!(table.len(), set.len() * 3);
    for (index, record) in set.records().iter().enumerate() {
        for key in record.keys(index) {
            assert_eq!(table.get(&key), Some(record.payload.as_str()), "key {key}");
        }
    }
    assert_eq!(table.by_id(100), Some("web:x:100:alice"));
    assert_eq!(table.by_name("bob"), Some("bob:x:102:bob"));
}
