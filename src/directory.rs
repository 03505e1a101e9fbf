use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// A user known to the service. Constructed once at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    /// Stable identifier. Identities originating from tokens are opaque
    /// strings, so the directory keys on strings uniformly.
    pub id: String,
    /// Display name
    pub name: String,
}

/// Read-only identity-to-profile lookup.
///
/// Lookup is pure and side-effect-free; a missing identity is a normal
/// outcome, not an error. The seam exists so a persistent store can replace
/// the static table without touching the authorizer or the routes.
pub trait Directory: Send + Sync {
    fn lookup(&self, identity: &str) -> Option<UserProfile>;
}

/// Fixed in-memory user table.
pub struct StaticDirectory {
    people: HashMap<String, UserProfile>,
}

impl StaticDirectory {
    pub fn new(people: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            people: people
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
        }
    }

    /// The built-in user table served by this deployment.
    pub fn with_default_people() -> Self {
        Self::new([
            UserProfile {
                id: "1".to_string(),
                name: "Jen Jones".to_string(),
            },
            UserProfile {
                id: "2".to_string(),
                name: "Ada Lovelace".to_string(),
            },
            UserProfile {
                id: "114874691531207529332".to_string(),
                name: "Robin".to_string(),
            },
        ])
    }
}

impl Directory for StaticDirectory {
    fn lookup(&self, identity: &str) -> Option<UserProfile> {
        self.people.get(identity).cloned()
    }
}
