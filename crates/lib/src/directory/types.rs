//! Entities fetched from the account system.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Numeric account id, used as both uid and the user's private gid.
pub type PersonId = u32;

/// Numeric group id.
pub type GroupId = u32;

/// Treats an explicit JSON `null` the same as an absent field.
///
/// Missing values are reported by the record compiler, which knows which
/// fields each output actually requires.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// An account as returned by `user/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, alias = "password", deserialize_with = "null_as_empty")]
    pub password_hash: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub human_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default)]
    pub alias_enabled: bool,
}

/// A group as returned by `group/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
}

/// Role a person holds in a group.
///
/// Roles nest: an administrator is also a sponsor and a member, and a
/// sponsor is also a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "user")]
    Member,
    Sponsor,
    Administrator,
}

impl Role {
    /// Whether holding `self` implies holding `other`.
    pub fn implies(self, other: Role) -> bool {
        self >= other
    }
}

/// One `(group, person, role)` row of the membership relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub group: String,
    pub person_id: PersonId,
    pub role: Role,
}

impl Membership {
    pub fn new(group: impl Into<String>, person_id: PersonId, role: Role) -> Self {
        Self {
            group: group.into(),
            person_id,
            role,
        }
    }
}

/// Everything fetched in one sync run.
///
/// People and groups are held in ascending id order so that every compiler
/// walks them identically. The snapshot is never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    people: Vec<Person>,
    groups: Vec<Group>,
    memberships: Vec<Membership>,
    people_by_id: HashMap<PersonId, usize>,
}

impl DirectorySnapshot {
    pub fn new(
        mut people: Vec<Person>,
        mut groups: Vec<Group>,
        memberships: Vec<Membership>,
    ) -> Self {
        people.sort_by_key(|p| p.id);
        groups.sort_by_key(|g| g.id);
        let people_by_id = people
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.id, pos))
            .collect();
        Self {
            people,
            groups,
            memberships,
            people_by_id,
        }
    }

    /// All people, ascending by id.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// All groups, ascending by id.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The membership relation in the order the server returned it.
    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    /// Look up a person by id.
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people_by_id.get(&id).map(|&pos| &self.people[pos])
    }
}
