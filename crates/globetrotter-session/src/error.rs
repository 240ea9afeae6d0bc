//! Error types for the catalog and the session controller.

use globetrotter_round::{DestinationId, OptionSetError};

/// Errors from a [`Catalog`](crate::Catalog).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog could not be reached or refused the request.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog has no destinations to hand out.
    #[error("catalog is empty")]
    Empty,

    /// The catalog returned a destination with no clues or no name.
    #[error("destination {0} has no clues or no name")]
    Unplayable(DestinationId),

    /// Catalog data didn't match the expected JSON shape.
    #[error("malformed catalog data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors from the solo [`Session`](crate::Session) controller.
///
/// None of these are fatal. After `DestinationFetch` or `Options` the
/// session shows a failed slot and the caller may start a round again.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Fetching the destination or the listing failed.
    #[error("failed to fetch destination: {0}")]
    DestinationFetch(#[from] CatalogError),

    /// The listing didn't hold enough distractors for an option set.
    #[error("cannot build options: {0}")]
    Options(#[from] OptionSetError),

    /// The run ended on an exhausted round. Only start over is allowed.
    #[error("the run is over, start over to play again")]
    RunOver,
}
