//! Destination types: what the catalog returns for a round.
//!
//! A destination is immutable once fetched. The round that presents it
//! owns it until the next round replaces it.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DestinationId
// ---------------------------------------------------------------------------

/// Unique identifier of a destination in the catalog.
///
/// The catalog endpoint has served both numeric and string ids, so the
/// id is stored as text and deserializes from either JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct DestinationId(String);

impl DestinationId {
    /// Creates an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{}", self.0)
    }
}

impl From<DestinationId> for String {
    fn from(id: DestinationId) -> Self {
        id.0
    }
}

/// Wire form of an id before normalization.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for DestinationId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

/// A destination the player has to guess.
///
/// `#[serde(rename_all = "camelCase")]` matches the catalog's JSON shape:
/// `{ "id": 1, "name": "Paris", "clues": [..], "funFacts": [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// Catalog identity.
    pub id: DestinationId,

    /// The display name, which is also the correct answer.
    pub name: String,

    /// Cryptic clues, shown in order. A playable destination has at
    /// least one.
    pub clues: Vec<String>,

    /// Trivia revealed after the round resolves.
    #[serde(default)]
    pub fun_facts: Vec<String>,
}

impl Destination {
    /// Builds a destination from its parts.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        clues: Vec<String>,
        fun_facts: Vec<String>,
    ) -> Self {
        Self {
            id: DestinationId::new(id),
            name: name.into(),
            clues,
            fun_facts,
        }
    }

    /// Returns `true` if the destination can be presented as a round.
    pub fn is_playable(&self) -> bool {
        !self.clues.is_empty() && !self.name.trim().is_empty()
    }

    /// The fun fact shown after a correct guess.
    pub fn first_fun_fact(&self) -> Option<&str> {
        self.fun_facts.first().map(String::as_str)
    }

    /// The `{ id, name }` listing entry for this destination.
    pub fn listing(&self) -> DestinationName {
        DestinationName {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// An entry of the catalog listing, used to build distractor pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationName {
    pub id: DestinationId,
    pub name: String,
}

impl DestinationName {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: DestinationId::new(id),
            name: name.into(),
        }
    }
}
