//! Mail alias and relay recipient artifacts.
//!
//! Alias-enabled people get an address under the alias domain that forwards
//! to their real email; everyone else is accepted by the relay at their
//! literal email address. Each group with members also gets
//! `<group>-administrators`, `<group>-sponsors` and `<group>-members`
//! distribution lists.

pub mod errors;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

pub use errors::AliasError;

use crate::{
    directory::{DirectorySnapshot, Person, PersonId, Role},
    index::MembershipIndex,
};

/// First line of every generated alias file.
pub const ALIAS_HEADER: &str = "# Generated by fas-client\n";

/// Static prologue copied to the head of the alias file.
#[derive(Debug, Clone)]
pub struct AliasTemplate {
    path: Option<PathBuf>,
    text: String,
}

impl AliasTemplate {
    /// Read the template. A missing or unreadable file is fatal for the
    /// alias artifacts.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AliasError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AliasError::TemplateMissing {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), bytes = text.len(), "Loaded aliases template");
        Ok(Self {
            path: Some(path.to_path_buf()),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The alias file and relay recipient map of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasArtifacts {
    pub aliases: String,
    pub relay_recipients: String,
}

/// Role suffixes in the order their lists are written.
const DISTRIBUTION_LISTS: [(Role, &str); 3] = [
    (Role::Administrator, "administrators"),
    (Role::Sponsor, "sponsors"),
    (Role::Member, "members"),
];

pub struct AliasCompiler<'a> {
    snapshot: &'a DirectorySnapshot,
    index: &'a MembershipIndex,
    template: &'a AliasTemplate,
    domain: &'a str,
}

impl<'a> AliasCompiler<'a> {
    pub fn new(
        snapshot: &'a DirectorySnapshot,
        index: &'a MembershipIndex,
        template: &'a AliasTemplate,
        domain: &'a str,
    ) -> Result<Self, AliasError> {
        if domain.trim().is_empty() {
            return Err(AliasError::EmptyDomain);
        }
        Ok(Self {
            snapshot,
            index,
            template,
            domain,
        })
    }

    pub fn compile(&self) -> AliasArtifacts {
        let mut aliases = String::from(ALIAS_HEADER);
        aliases.push_str(self.template.text());
        if !aliases.ends_with('\n') {
            aliases.push('\n');
        }

        let mut user_aliases: Vec<(&str, &str)> = Vec::new();
        let mut relay: Vec<String> = Vec::new();
        for person in self.authorized_people() {
            if person.alias_enabled {
                relay.push(format!("{}@{} OK", person.username, self.domain));
                match deliverable_email(person) {
                    Some(email) => user_aliases.push((person.username.as_str(), email)),
                    None => warn!(id = person.id, "No usable email, skipping alias"),
                }
            } else if let Some(email) = deliverable_email(person) {
                relay.push(format!("{email} OK"));
            } else {
                warn!(id = person.id, "No usable email, not added to relay recipients");
            }
        }
        user_aliases.sort();
        relay.sort();
        relay.dedup();

        for (username, email) in &user_aliases {
            aliases.push_str(&format!("{username}: {email}\n"));
        }

        let mut groups: Vec<_> = self.snapshot.groups().iter().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        let mut list_count = 0;
        for group in groups {
            if !is_line_safe(&group.name) {
                warn!(id = group.id, "Group name cannot be written as an alias, skipping");
                continue;
            }
            let roles = self.index.roles_of(&group.name);
            for (role, suffix) in DISTRIBUTION_LISTS {
                let addresses = self.distribution_list(roles.with_role(role));
                if addresses.is_empty() {
                    continue;
                }
                aliases.push_str(&format!("{}-{suffix}: {}\n", group.name, addresses.join(",")));
                list_count += 1;
            }
        }

        let mut relay_recipients = String::new();
        for line in &relay {
            relay_recipients.push_str(line);
            relay_recipients.push('\n');
        }

        info!(
            user_aliases = user_aliases.len(),
            distribution_lists = list_count,
            relay_recipients = relay.len(),
            "Compiled alias artifacts"
        );
        AliasArtifacts {
            aliases,
            relay_recipients,
        }
    }

    fn authorized_people(&self) -> impl Iterator<Item = &'a Person> + '_ {
        self.snapshot
            .people()
            .iter()
            .filter(|p| self.index.is_valid_user(p.id))
            .filter(|p| {
                let safe = is_line_safe(&p.username);
                if !safe {
                    warn!(id = p.id, "Username cannot be written as an alias, skipping");
                }
                safe
            })
    }

    /// Sorted, de-duplicated deliverable addresses for the given people.
    ///
    /// People who are not alias-enabled and have no usable email are left
    /// out rather than failing the run.
    fn distribution_list(&self, ids: &[PersonId]) -> Vec<&'a str> {
        let mut addresses: Vec<&'a str> = ids
            .iter()
            .filter_map(|&id| self.snapshot.person(id))
            .filter_map(|person| {
                if person.alias_enabled {
                    is_line_safe(&person.username).then_some(person.username.as_str())
                } else {
                    let email = deliverable_email(person);
                    if email.is_none() {
                        debug!(id = person.id, "Omitting person without usable email from distribution list");
                    }
                    email
                }
            })
            .collect();
        addresses.sort_unstable();
        addresses.dedup();
        addresses
    }
}

/// Characters that would split an alias line or a relay map entry.
const LINE_FORBIDDEN: &[char] = &['\n', '\r', ',', ':', ' ', '\t'];

fn is_line_safe(value: &str) -> bool {
    !value.is_empty() && !value.contains(LINE_FORBIDDEN)
}

/// The person's email if it can be written as a single address.
fn deliverable_email(person: &Person) -> Option<&str> {
    let email = person.email.as_str();
    if email.is_empty() {
        return None;
    }
    if !is_line_safe(email) {
        warn!(id = person.id, "Email contains a forbidden character, ignoring it");
        return None;
    }
    Some(email)
}
