//! Integration tests for a full solo run against a catalog.

use std::sync::atomic::{AtomicBool, Ordering};

use globetrotter_round::{
    Destination, DestinationName, Feedback, LifelineKind, RoundPhase,
    SessionScore,
};
use globetrotter_session::{
    Catalog, CatalogError, RoundSlot, Session, SessionConfig, SessionError,
    StaticCatalog,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =========================================================================
// Fixtures
// =========================================================================

const CATALOG: &str = r#"[
    { "id": 1, "name": "Paris", "clues": ["City of light"], "funFacts": ["The tower was meant to be temporary."] },
    { "id": 2, "name": "Rome", "clues": ["Seven hills"], "funFacts": ["Cats live among the ruins."] },
    { "id": 3, "name": "Tokyo", "clues": ["Largest metro area"] },
    { "id": 4, "name": "Lima", "clues": ["City of kings"] },
    { "id": 5, "name": "Oslo", "clues": ["Fjord capital"] }
]"#;

fn catalog() -> StaticCatalog {
    StaticCatalog::seeded(serde_json::from_str(CATALOG).unwrap(), 11)
}

/// A catalog that fails until switched on.
struct FlakyCatalog {
    inner: StaticCatalog,
    up: AtomicBool,
}

impl Catalog for FlakyCatalog {
    async fn destination(&self) -> Result<Destination, CatalogError> {
        if !self.up.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable("connection refused".into()));
        }
        self.inner.destination().await
    }

    async fn destination_names(
        &self,
    ) -> Result<Vec<DestinationName>, CatalogError> {
        self.inner.destination_names().await
    }
}

/// Picks an option on the current round that is not the answer.
fn wrong_option(session: &Session) -> String {
    let round = session.current_round().unwrap();
    round
        .options()
        .iter()
        .find(|name| *name != round.destination().name)
        .unwrap()
        .to_string()
}

fn answer(session: &Session) -> String {
    session.current_round().unwrap().destination().name.clone()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_two_wrong_guesses_across_rounds_end_the_run() {
    let catalog = catalog();
    let mut rng = StdRng::seed_from_u64(1);
    let mut session = Session::default();

    session.start_round(&catalog, &mut rng).await.unwrap();
    let wrong = wrong_option(&session);
    assert!(matches!(
        session.submit_guess(&wrong),
        Some(Feedback::IncorrectRetry { attempts_left: 1, .. })
    ));
    let right = answer(&session);
    assert!(matches!(
        session.submit_guess(&right),
        Some(Feedback::Correct { .. })
    ));

    session.start_round(&catalog, &mut rng).await.unwrap();
    let wrong = wrong_option(&session);
    let feedback = session.submit_guess(&wrong).unwrap();
    assert!(matches!(feedback, Feedback::IncorrectExhausted { .. }));

    assert!(session.is_over());
    assert_eq!(session.score(), SessionScore {
        correct: 1,
        incorrect: 2
    });
    assert_eq!(session.history().len(), 2);
    assert_eq!(
        session.history()[1].phase,
        RoundPhase::ResolvedIncorrectExhausted
    );

    // Nothing moves until start over.
    assert_eq!(session.submit_guess(&answer(&session)), None);
    let err = session.start_round(&catalog, &mut rng).await.unwrap_err();
    assert!(matches!(err, SessionError::RunOver));
}

#[tokio::test]
async fn test_start_over_resets_score_budget_and_lifelines() {
    let catalog = catalog();
    let mut rng = StdRng::seed_from_u64(2);
    let mut session = Session::new(SessionConfig::default());

    session.start_round(&catalog, &mut rng).await.unwrap();
    session.narrow_field(&mut rng);
    session.reveal_hint();
    let wrong = wrong_option(&session);
    session.submit_guess(&wrong);
    let wrong = wrong_option(&session);
    session.submit_guess(&wrong);
    assert!(session.is_over());

    session.start_over(&catalog, &mut rng).await.unwrap();

    assert_eq!(session.score(), SessionScore::default());
    assert_eq!(session.attempts_left(), 2);
    assert_eq!(session.lifelines().available(), LifelineKind::ALL.to_vec());
    assert!(session.history().is_empty());
    let round = session.current_round().unwrap();
    assert_eq!(round.phase(), RoundPhase::Active);
    assert_eq!(round.number(), 1);
    assert_eq!(round.options().len(), 4);
}

#[tokio::test]
async fn test_catalog_outage_is_recoverable() {
    let flaky = FlakyCatalog {
        inner: catalog(),
        up: AtomicBool::new(false),
    };
    let mut rng = StdRng::seed_from_u64(3);
    let mut session = Session::default();

    let err = session.start_round(&flaky, &mut rng).await.unwrap_err();
    assert!(matches!(err, SessionError::DestinationFetch(_)));
    assert!(matches!(session.slot(), RoundSlot::Failed(_)));

    flaky.up.store(true, Ordering::SeqCst);
    session.start_round(&flaky, &mut rng).await.unwrap();
    assert!(session.current_round().is_some());
}

#[tokio::test]
async fn test_every_round_holds_option_invariants() {
    let catalog = catalog();
    let mut rng = StdRng::seed_from_u64(4);
    let mut session = Session::default();

    for _ in 0..25 {
        session.start_round(&catalog, &mut rng).await.unwrap();
        let round = session.current_round().unwrap();
        let name = &round.destination().name;
        assert_eq!(round.options().len(), 4);
        assert_eq!(round.options().iter().filter(|n| *n == name.as_str()).count(), 1);
        let right = answer(&session);
        session.submit_guess(&right);
    }
    assert_eq!(session.score().correct, 25);
    assert_eq!(session.attempts_left(), 2);
}
