//! HTTP client for the account system.
//!
//! The account system exposes `user/list` and `group/list` as JSON methods
//! that take a `search` pattern and require HTTP basic authentication.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::{
    errors::DirectoryError,
    types::{DirectorySnapshot, Group, Membership, Person, PersonId, Role},
};
use crate::Result;

/// Search pattern matching every entity.
pub const MATCH_ALL: &str = "*";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Source of the account data for a sync run.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// List people whose username matches `search`.
    async fn list_people(&self, search: &str) -> Result<Vec<Person>>;

    /// List groups whose name matches `search`, with their memberships.
    async fn list_groups(&self, search: &str) -> Result<(Vec<Group>, Vec<Membership>)>;
}

/// Fetch people and groups and freeze them into a snapshot.
///
/// Both calls complete before the snapshot is returned; any failure aborts
/// the fetch as a whole.
pub async fn fetch_snapshot(
    source: &dyn DirectorySource,
    search: &str,
) -> Result<DirectorySnapshot> {
    let (groups, memberships) = source.list_groups(search).await?;
    let people = source.list_people(search).await?;
    info!(
        people = people.len(),
        groups = groups.len(),
        memberships = memberships.len(),
        "Fetched account snapshot"
    );
    Ok(DirectorySnapshot::new(people, groups, memberships))
}

#[derive(Deserialize)]
struct PeopleResponse {
    people: Vec<Person>,
}

#[derive(Deserialize)]
struct MembershipEntry {
    person_id: PersonId,
    #[serde(alias = "role_type")]
    role: Role,
}

#[derive(Deserialize)]
struct GroupsResponse {
    groups: Vec<Group>,
    /// Group name to role rows. A BTreeMap keeps the flattened relation in a
    /// stable order regardless of the server's object key order.
    #[serde(default)]
    memberships: BTreeMap<String, Vec<MembershipEntry>>,
}

impl GroupsResponse {
    fn flatten(self) -> (Vec<Group>, Vec<Membership>) {
        let memberships = self
            .memberships
            .into_iter()
            .flat_map(|(group, entries)| {
                entries
                    .into_iter()
                    .map(move |e| Membership::new(group.clone(), e.person_id, e.role))
            })
            .collect();
        (self.groups, memberships)
    }
}

/// [`DirectorySource`] backed by the account system's JSON API.
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    base_url: url::Url,
    login: String,
    password: Zeroizing<String>,
}

impl HttpDirectoryClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str, login: &str, password: Zeroizing<String>) -> Result<Self> {
        Self::with_timeout(base_url, login, password, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        login: &str,
        password: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self> {
        // A trailing slash makes Url::join append method paths instead of
        // replacing the last segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = url::Url::parse(&normalized).map_err(|e| DirectoryError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Transport {
                url: redact_url(&base_url),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            login: login.to_string(),
            password,
        })
    }

    /// The server URL with any embedded credentials removed, for logging.
    pub fn display_url(&self) -> String {
        redact_url(&self.base_url)
    }

    async fn send_request<T: DeserializeOwned>(&self, method: &str, search: &str) -> Result<T> {
        let url = self
            .base_url
            .join(method)
            .map_err(|e| DirectoryError::InvalidUrl {
                url: self.display_url(),
                reason: e.to_string(),
            })?;
        let shown = redact_url(&url);
        debug!(url = %shown, search, "Sending account system request");

        let response = self
            .client
            .post(url)
            .basic_auth(&self.login, Some(self.password.as_str()))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("search", search)])
            .send()
            .await
            .map_err(|e| DirectoryError::Transport {
                url: shown.clone(),
                reason: e.to_string(),
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(DirectoryError::AuthenticationFailed {
                    url: shown,
                    status: response.status().as_u16(),
                }
                .into());
            }
            status if !status.is_success() => {
                return Err(DirectoryError::Status {
                    url: shown,
                    status: status.as_u16(),
                }
                .into());
            }
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DirectoryError::Transport {
                url: shown.clone(),
                reason: e.to_string(),
            })?;
        serde_json::from_slice(&body).map_err(|e| {
            DirectoryError::Decode {
                url: shown,
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl DirectorySource for HttpDirectoryClient {
    async fn list_people(&self, search: &str) -> Result<Vec<Person>> {
        let response: PeopleResponse = self.send_request("user/list", search).await?;
        Ok(response.people)
    }

    async fn list_groups(&self, search: &str) -> Result<(Vec<Group>, Vec<Membership>)> {
        let response: GroupsResponse = self.send_request("group/list", search).await?;
        Ok(response.flatten())
    }
}

/// Redact credentials from a URL for safe logging.
pub fn redact_url(url: &url::Url) -> String {
    let mut redacted = url.clone();
    if !url.username().is_empty() {
        let _ = redacted.set_username("***");
    }
    if url.password().is_some() {
        let _ = redacted.set_password(Some("***"));
    }
    redacted.to_string()
}
