//! Compile a directory snapshot into passwd, shadow and group record sets.

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
};

use tracing::{debug, info, warn};

use super::{
    errors::{EntityKind, RecordError},
    key::{Category, Record, RecordSet},
};
use crate::{
    directory::{DirectorySnapshot, Group, Person, PersonId},
    index::MembershipIndex,
};

/// Fixed password aging fields appended to every shadow entry.
const SHADOW_AGING: &str = "99999:0:99999:7:::";

/// Characters that would break a `name:field:...` payload line.
const PAYLOAD_FORBIDDEN: &[char] = &[':', '\n', '\r'];

/// Characters additionally forbidden in names, which also appear in keys and
/// comma separated member lists.
const NAME_FORBIDDEN: &[char] = &[':', ',', ' ', '\t', '\n', '\r'];

/// Host settings that shape passwd entries.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Directory under which every home directory lives.
    pub home_root: PathBuf,
    /// Login shell given to every account.
    pub shell: String,
}

impl AccountSettings {
    pub fn home_dir(&self, username: &str) -> PathBuf {
        self.home_root.join(username)
    }
}

/// The three record sets of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRecords {
    pub passwd: RecordSet,
    pub shadow: RecordSet,
    pub group: RecordSet,
}

impl CompiledRecords {
    pub fn get(&self, category: Category) -> &RecordSet {
        match category {
            Category::Passwd => &self.passwd,
            Category::Shadow => &self.shadow,
            Category::Group => &self.group,
        }
    }
}

/// Turns a snapshot and its membership index into keyed record sets.
///
/// Compilation is pure: the same snapshot always yields byte-identical
/// record sets.
pub struct RecordCompiler<'a> {
    snapshot: &'a DirectorySnapshot,
    index: &'a MembershipIndex,
    settings: &'a AccountSettings,
}

impl<'a> RecordCompiler<'a> {
    pub fn new(
        snapshot: &'a DirectorySnapshot,
        index: &'a MembershipIndex,
        settings: &'a AccountSettings,
    ) -> Self {
        Self {
            snapshot,
            index,
            settings,
        }
    }

    /// Compile all three record sets.
    ///
    /// Either every set is produced or none is.
    pub fn compile_all(&self) -> Result<CompiledRecords, RecordError> {
        let records = CompiledRecords {
            passwd: self.compile_passwd()?,
            shadow: self.compile_shadow()?,
            group: self.compile_group()?,
        };
        info!(
            passwd = records.passwd.len(),
            shadow = records.shadow.len(),
            group = records.group.len(),
            "Compiled record sets"
        );
        Ok(records)
    }

    /// People authorized on this host, ascending by id.
    fn valid_people(&self) -> impl Iterator<Item = &'a Person> + '_ {
        self.snapshot
            .people()
            .iter()
            .filter(|p| self.index.is_valid_user(p.id))
    }

    /// `username:x:uid:uid:human_name:home_dir:shell` for each authorized person.
    pub fn compile_passwd(&self) -> Result<RecordSet, RecordError> {
        let mut set = RecordSet::new(Category::Passwd);
        let mut keys = KeyGuard::new(EntityKind::Person);
        for person in self.valid_people() {
            let username = check_name(EntityKind::Person, person.id, "username", &person.username)?;
            keys.claim(username, person.id)?;
            let human_name = check_payload(person.id, "human_name", &person.human_name)?;
            let home_dir = self.settings.home_dir(username);
            let payload = format!(
                "{username}:x:{uid}:{uid}:{human_name}:{home}:{shell}",
                uid = person.id,
                home = home_dir.display(),
                shell = self.settings.shell,
            );
            set.push(Record {
                id: person.id,
                name: username.to_string(),
                payload,
            });
        }
        debug!(records = set.len(), "Compiled passwd records");
        Ok(set)
    }

    /// `username:hash:99999:0:99999:7:::` for each authorized person.
    pub fn compile_shadow(&self) -> Result<RecordSet, RecordError> {
        let mut set = RecordSet::new(Category::Shadow);
        let mut keys = KeyGuard::new(EntityKind::Person);
        for person in self.valid_people() {
            let username = check_name(EntityKind::Person, person.id, "username", &person.username)?;
            keys.claim(username, person.id)?;
            if person.password_hash.is_empty() {
                return Err(RecordError::MissingField {
                    entity: EntityKind::Person,
                    id: person.id,
                    field: "password_hash",
                });
            }
            let hash = check_payload(person.id, "password_hash", &person.password_hash)?;
            set.push(Record {
                id: person.id,
                name: username.to_string(),
                payload: format!("{username}:{hash}:{SHADOW_AGING}"),
            });
        }
        debug!(records = set.len(), "Compiled shadow records");
        Ok(set)
    }

    /// A private group for every person, then every synced group with its
    /// members.
    ///
    /// Private groups are emitted for all people, authorized or not, so that
    /// any member name in a group line resolves. Synced groups own their gid
    /// and name: a private group that would share either is left out, so
    /// every key in the set maps to exactly one payload.
    pub fn compile_group(&self) -> Result<RecordSet, RecordError> {
        let mut set = RecordSet::new(Category::Group);
        let mut usernames: HashMap<PersonId, &str> = HashMap::new();
        let mut person_keys = KeyGuard::new(EntityKind::Person);
        for person in self.snapshot.people() {
            let username = check_name(EntityKind::Person, person.id, "username", &person.username)?;
            person_keys.claim(username, person.id)?;
            usernames.insert(person.id, username);
        }

        let mut group_keys = KeyGuard::new(EntityKind::Group);
        let mut synced = Vec::with_capacity(self.snapshot.groups().len());
        for group in self.snapshot.groups() {
            let name = check_name(EntityKind::Group, group.id, "name", &group.name)?;
            group_keys.claim(name, group.id)?;
            synced.push((group, name));
        }

        for person in self.snapshot.people() {
            let username = &person.username;
            if group_keys.holds(username, person.id) {
                warn!(
                    id = person.id,
                    username = %username,
                    "Private group collides with a synced group, skipping"
                );
                continue;
            }
            set.push(Record {
                id: person.id,
                name: username.clone(),
                payload: format!("{username}:x:{gid}:", gid = person.id),
            });
        }

        for (group, name) in synced {
            let members = self.member_list(group, &usernames);
            set.push(Record {
                id: group.id,
                name: name.to_string(),
                payload: format!("{name}:x:{gid}:{members}", gid = group.id),
            });
        }
        debug!(records = set.len(), "Compiled group records");
        Ok(set)
    }

    /// Comma joined usernames of the group's members, in membership order.
    fn member_list(&self, group: &Group, usernames: &HashMap<PersonId, &str>) -> String {
        if !self.index.has_group(&group.name) {
            debug!(group = %group.name, "Group has no members");
            return String::new();
        }
        self.index
            .roles_of(&group.name)
            .members()
            .iter()
            .filter_map(|id| usernames.get(id).copied())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Rejects a second entity claiming an already used id or name.
struct KeyGuard<'a> {
    entity: EntityKind,
    ids: HashSet<u32>,
    names: HashMap<&'a str, u32>,
}

impl<'a> KeyGuard<'a> {
    fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            ids: HashSet::new(),
            names: HashMap::new(),
        }
    }

    fn claim(&mut self, name: &'a str, id: u32) -> Result<(), RecordError> {
        if !self.ids.insert(id) {
            return Err(RecordError::DuplicateId {
                entity: self.entity,
                id,
            });
        }
        if let Some(first) = self.names.insert(name, id) {
            return Err(RecordError::DuplicateName {
                entity: self.entity,
                name: name.to_string(),
                first,
                second: id,
            });
        }
        Ok(())
    }

    /// Whether either key is already taken.
    fn holds(&self, name: &str, id: u32) -> bool {
        self.ids.contains(&id) || self.names.contains_key(name)
    }
}

fn check_name<'v>(
    entity: EntityKind,
    id: u32,
    field: &'static str,
    value: &'v str,
) -> Result<&'v str, RecordError> {
    if value.is_empty() {
        return Err(RecordError::MissingField { entity, id, field });
    }
    reject_chars(entity, id, field, value, NAME_FORBIDDEN)
}

fn check_payload<'v>(id: u32, field: &'static str, value: &'v str) -> Result<&'v str, RecordError> {
    reject_chars(EntityKind::Person, id, field, value, PAYLOAD_FORBIDDEN)
}

fn reject_chars<'v>(
    entity: EntityKind,
    id: u32,
    field: &'static str,
    value: &'v str,
    forbidden: &[char],
) -> Result<&'v str, RecordError> {
    match value.chars().find(|c| forbidden.contains(c)) {
        Some(character) => Err(RecordError::InvalidField {
            entity,
            id,
            field,
            character,
        }),
        None => Ok(value),
    }
}
