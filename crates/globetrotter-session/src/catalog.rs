//! The destination catalog: where rounds come from.
//!
//! Globetrotter doesn't own destination data. A catalog is anything that
//! can hand out one destination at a time plus the `{ id, name }` listing
//! used for distractors: an HTTP endpoint, a database, a fixture file.
//!
//! The [`Catalog`] trait is the seam. [`StaticCatalog`] is the in-memory
//! implementation used by the terminal demo and the tests; it accepts the
//! same JSON the catalog endpoint serves.

use globetrotter_round::{Destination, DestinationName};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tokio::sync::Mutex;

use crate::CatalogError;

/// A source of destinations.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` so one catalog can be shared by every room
/// task and called from whichever thread Tokio picks.
///
/// # Example
///
/// ```rust
/// use globetrotter_round::{Destination, DestinationName};
/// use globetrotter_session::{Catalog, CatalogError};
///
/// /// Always serves the same destination.
/// struct OneCity;
///
/// impl Catalog for OneCity {
///     async fn destination(&self) -> Result<Destination, CatalogError> {
///         Ok(Destination::new("1", "Paris", vec!["City of light".into()], vec![]))
///     }
///
///     async fn destination_names(
///         &self,
///     ) -> Result<Vec<DestinationName>, CatalogError> {
///         Ok(vec![DestinationName::new("1", "Paris")])
///     }
/// }
/// ```
pub trait Catalog: Send + Sync + 'static {
    /// Picks the destination for the next round.
    fn destination(
        &self,
    ) -> impl std::future::Future<Output = Result<Destination, CatalogError>> + Send;

    /// Lists every destination by id and name.
    fn destination_names(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<DestinationName>, CatalogError>>
    + Send;
}

/// What one catalog round trip produces: the target and the listing its
/// distractors are drawn from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDestination {
    pub destination: Destination,
    pub listing: Vec<DestinationName>,
}

/// Fetches a destination and the listing from `catalog`.
///
/// # Errors
/// Whatever the catalog returns, plus [`CatalogError::Unplayable`] for a
/// destination without clues or name.
pub async fn fetch_destination(
    catalog: &impl Catalog,
) -> Result<FetchedDestination, CatalogError> {
    let destination = catalog.destination().await?;
    if !destination.is_playable() {
        return Err(CatalogError::Unplayable(destination.id));
    }
    let listing = catalog.destination_names().await?;
    tracing::debug!(
        destination = %destination.id,
        listing = listing.len(),
        "destination fetched"
    );
    Ok(FetchedDestination {
        destination,
        listing,
    })
}

// ---------------------------------------------------------------------------
// StaticCatalog
// ---------------------------------------------------------------------------

/// An in-memory catalog that serves a random destination per call.
///
/// The generator sits behind a Tokio `Mutex` so `&self` calls from
/// several rooms can share it.
pub struct StaticCatalog {
    destinations: Vec<Destination>,
    rng: Mutex<StdRng>,
}

impl StaticCatalog {
    /// Creates a catalog seeded from the OS.
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self {
            destinations,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a catalog with a fixed seed, for reproducible runs.
    pub fn seeded(destinations: Vec<Destination>, seed: u64) -> Self {
        Self {
            destinations,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Loads a catalog from a JSON array in the endpoint's shape:
    /// `[{ "id": 1, "name": "Paris", "clues": [..], "funFacts": [..] }]`.
    ///
    /// # Errors
    /// [`CatalogError::Malformed`] if the JSON doesn't match.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let destinations: Vec<Destination> = serde_json::from_str(json)?;
        Ok(Self::new(destinations))
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

impl Catalog for StaticCatalog {
    async fn destination(&self) -> Result<Destination, CatalogError> {
        let mut rng = self.rng.lock().await;
        self.destinations
            .choose(&mut *rng)
            .cloned()
            .ok_or(CatalogError::Empty)
    }

    async fn destination_names(
        &self,
    ) -> Result<Vec<DestinationName>, CatalogError> {
        Ok(self.destinations.iter().map(Destination::listing).collect())
    }
}
