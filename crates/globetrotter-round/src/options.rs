//! The multiple-choice option set.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Destination, DestinationName, OptionSetError};

/// Number of options shown in a solo round.
pub const DEFAULT_OPTION_COUNT: usize = 4;

/// The candidate names a player picks from.
///
/// Invariants:
/// - exactly one entry equals the destination's name (upheld by
///   [`build`](Self::build) and the 50:50 narrowing),
/// - no duplicate entries (also checked when deserializing).
///
/// Serializes as a plain JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct OptionSet(Vec<String>);

impl OptionSet {
    /// Builds a shuffled option set of `size` names for `target`.
    ///
    /// Names equal to the target's are dropped from `pool` and duplicates
    /// collapse to one entry; `size - 1` of the remaining names are drawn
    /// uniformly, the target's name joins them, and the whole list is
    /// shuffled. Each call is an independent shuffle.
    ///
    /// # Errors
    /// - [`OptionSetError::EmptyOptionSet`] if `size` is 0.
    /// - [`OptionSetError::InsufficientDistractors`] if the pool has fewer
    ///   than `size - 1` distinct names other than the target's.
    pub fn build(
        target: &Destination,
        pool: &[String],
        size: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, OptionSetError> {
        if size == 0 {
            return Err(OptionSetError::EmptyOptionSet);
        }

        let mut seen = HashSet::new();
        let distinct: Vec<&String> = pool
            .iter()
            .filter(|name| **name != target.name)
            .filter(|name| seen.insert(name.as_str()))
            .collect();

        let needed = size - 1;
        if distinct.len() < needed {
            return Err(OptionSetError::InsufficientDistractors {
                needed,
                available: distinct.len(),
            });
        }

        let mut names = Vec::with_capacity(size);
        names.push(target.name.clone());
        names.extend(
            distinct
                .choose_multiple(rng, needed)
                .map(|name| (*name).clone()),
        );
        names.shuffle(rng);

        trace!(destination = %target.id, options = ?names, "option set built");
        Ok(Self(names))
    }

    /// Keeps `answer` plus one randomly chosen wrong name, reshuffled.
    ///
    /// Returns `None` if there is no wrong name left to keep.
    pub(crate) fn narrowed(&self, answer: &str, rng: &mut impl Rng) -> Option<Self> {
        let wrong: Vec<&String> =
            self.0.iter().filter(|name| *name != answer).collect();
        let keep = (*wrong.choose(rng)?).clone();
        let mut pair = vec![answer.to_string(), keep];
        pair.shuffle(rng);
        Some(Self(pair))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl TryFrom<Vec<String>> for OptionSet {
    type Error = OptionSetError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
            return Err(OptionSetError::DuplicateOption(dup.clone()));
        }
        Ok(Self(names))
    }
}

impl From<OptionSet> for Vec<String> {
    fn from(set: OptionSet) -> Self {
        set.0
    }
}

/// Derives a distractor pool from the catalog listing.
///
/// Entries sharing the target's id or name are excluded.
pub fn distractor_pool(
    target: &Destination,
    listing: &[DestinationName],
) -> Vec<String> {
    listing
        .iter()
        .filter(|entry| entry.id != target.id && entry.name != target.name)
        .map(|entry| entry.name.clone())
        .collect()
}
