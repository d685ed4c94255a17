//! Membership lookups built once per sync run.
//!
//! The index answers two questions: is a person authorized on this host (a
//! member of at least one synced group), and who holds each role in a group.
//! Role buckets are expanded on construction so that administrators are
//! always sponsors and sponsors are always members.

use std::collections::{HashMap, HashSet};

use crate::directory::{Membership, PersonId, Role};

static NO_ROLES: RoleBuckets = RoleBuckets {
    members: Vec::new(),
    sponsors: Vec::new(),
    administrators: Vec::new(),
};

/// People holding each role in one group, in first-seen order without repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleBuckets {
    members: Vec<PersonId>,
    sponsors: Vec<PersonId>,
    administrators: Vec<PersonId>,
}

impl RoleBuckets {
    /// Everyone in the group, whatever their role.
    pub fn members(&self) -> &[PersonId] {
        &self.members
    }

    /// Sponsors and administrators.
    pub fn sponsors(&self) -> &[PersonId] {
        &self.sponsors
    }

    pub fn administrators(&self) -> &[PersonId] {
        &self.administrators
    }

    /// The bucket for a single role.
    pub fn with_role(&self, role: Role) -> &[PersonId] {
        match role {
            Role::Member => &self.members,
            Role::Sponsor => &self.sponsors,
            Role::Administrator => &self.administrators,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Default)]
struct BucketBuilder {
    buckets: RoleBuckets,
    seen: HashSet<(Role, PersonId)>,
}

impl BucketBuilder {
    fn add(&mut self, person_id: PersonId, role: Role) {
        for implied in [Role::Administrator, Role::Sponsor, Role::Member] {
            if role.implies(implied) && self.seen.insert((implied, person_id)) {
                let bucket = match implied {
                    Role::Member => &mut self.buckets.members,
                    Role::Sponsor => &mut self.buckets.sponsors,
                    Role::Administrator => &mut self.buckets.administrators,
                };
                bucket.push(person_id);
            }
        }
    }
}

/// Group role buckets and the set of authorized people.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    groups: HashMap<String, RoleBuckets>,
    valid_users: HashSet<PersonId>,
}

impl MembershipIndex {
    /// Build the index in a single pass over the membership relation.
    pub fn new(memberships: &[Membership]) -> Self {
        let mut builders: HashMap<String, BucketBuilder> = HashMap::new();
        let mut valid_users = HashSet::new();

        for membership in memberships {
            builders
                .entry(membership.group.clone())
                .or_default()
                .add(membership.person_id, membership.role);
            valid_users.insert(membership.person_id);
        }

        let groups = builders
            .into_iter()
            .map(|(name, builder)| (name, builder.buckets))
            .collect();
        Self {
            groups,
            valid_users,
        }
    }

    /// Whether the person belongs to any synced group, at any role.
    pub fn is_valid_user(&self, person_id: PersonId) -> bool {
        self.valid_users.contains(&person_id)
    }

    /// Role buckets for a group. Unknown groups have empty buckets.
    pub fn roles_of(&self, group: &str) -> &RoleBuckets {
        self.groups.get(group).unwrap_or(&NO_ROLES)
    }

    /// Whether any membership row names this group.
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn valid_user_count(&self) -> usize {
        self.valid_users.len()
    }
}
