//! "Challenge a friend" invitations.
//!
//! A player who spends the challenge lifeline gets a link like
//!
//! ```text
//! https://globetrotter.example/?invitedBy=Ann&score=5
//! https://globetrotter.example/?roomId=K7Q2XZ&invitedBy=Ann&score=5
//! ```
//!
//! The friend who opens it sees an invitation banner with the name and
//! score. Screenshot capture and clipboard access belong to the share
//! collaborator; this module only builds and parses the link.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::InviteError;

const INVITED_BY: &str = "invitedBy";
const SCORE: &str = "score";
const ROOM_ID: &str = "roomId";

/// The data an invitation link carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub invited_by: String,
    pub score: u32,
    /// Room code to join, for invitations sent from a room.
    pub room: Option<String>,
}

impl Invitation {
    pub fn new(invited_by: impl Into<String>, score: u32) -> Self {
        Self {
            invited_by: invited_by.into(),
            score,
            room: None,
        }
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Appends the invitation's query parameters to `base`.
    ///
    /// Any query already on `base` is replaced.
    ///
    /// # Errors
    /// [`InviteError::InvalidBase`] if `base` is not an absolute URL.
    pub fn to_link(&self, base: &str) -> Result<Url, InviteError> {
        let mut url = Url::parse(base)?;
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            if let Some(room) = &self.room {
                query.append_pair(ROOM_ID, room);
            }
            query
                .append_pair(INVITED_BY, &self.invited_by)
                .append_pair(SCORE, &self.score.to_string());
        }
        Ok(url)
    }

    /// Parses an invitation from a full link or a bare `?query` string.
    ///
    /// Returns `None`, meaning no banner, unless `invitedBy` is non-empty and
    /// `score` is a non-negative integer.
    pub fn from_link(link: &str) -> Option<Self> {
        let query = match Url::parse(link) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => match link.split_once('?') {
                Some((_, query)) => query.to_string(),
                None => link.to_string(),
            },
        };
        Self::from_query(&query)
    }

    fn from_query(query: &str) -> Option<Self> {
        let mut invited_by = None;
        let mut score = None;
        let mut room = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                INVITED_BY => invited_by = Some(value.into_owned()),
                SCORE => score = Some(value.into_owned()),
                ROOM_ID => room = Some(value.into_owned()),
                _ => {}
            }
        }

        let invited_by = invited_by.filter(|name| !name.is_empty())?;
        let score = score?.trim().parse::<u32>().ok()?;
        Some(Self {
            invited_by,
            score,
            room: room.filter(|code| !code.is_empty()),
        })
    }
}

/// The request handed to the share collaborator when the challenge
/// lifeline is spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareIntent {
    pub invitation: Invitation,
}

impl ShareIntent {
    /// The link to copy, rooted at `base`.
    pub fn link(&self, base: &str) -> Result<Url, InviteError> {
        self.invitation.to_link(base)
    }

    /// The text the share collaborator puts on the clipboard.
    pub fn message(&self, base: &str) -> Result<String, InviteError> {
        Ok(format!(
            "{}\n{} scored {} on the Globetrotter Challenge. Can you beat it?",
            self.link(base)?,
            self.invitation.invited_by,
            self.invitation.score
        ))
    }
}
