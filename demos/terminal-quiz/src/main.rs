use std::error::Error;

use globetrotter::prelude::*;
use globetrotter::session::RoundSlot;
use rand::Rng;
use tokio::io::{AsyncBufReadExt, BufReader};

const DESTINATIONS: &str = include_str!("../data/destinations.json");
const SHARE_BASE: &str = "https://globetrotter.example/play";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// 1-based index into the options on screen.
    Guess(usize),
    Lifeline(LifelineKind),
    Next,
    StartOver,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_ascii_lowercase();
    if let Ok(n) = line.parse::<usize>() {
        return (n > 0).then_some(Command::Guess(n));
    }
    match line.as_str() {
        "f" | "50" | "50:50" => Some(Command::Lifeline(LifelineKind::NarrowField)),
        "h" | "hint" => Some(Command::Lifeline(LifelineKind::RevealHint)),
        "c" | "challenge" => Some(Command::Lifeline(LifelineKind::ChallengeFriend)),
        "n" | "next" => Some(Command::Next),
        "s" | "restart" => Some(Command::StartOver),
        "?" | "help" => Some(Command::Help),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn print_help() {
    println!("  1-4        pick an option");
    println!("  f          50:50, drop two wrong options");
    println!("  h          reveal a hint");
    println!("  c          challenge a friend");
    println!("  n          next destination");
    println!("  s          start over");
    println!("  q          quit");
}

fn print_round(session: &Session) {
    match session.slot() {
        RoundSlot::Ready(round) => {
            println!();
            println!("Round {}", round.number());
            for clue in &round.destination().clues {
                println!("  \u{1f50e} {clue}");
            }
            for (i, option) in round.options().iter().enumerate() {
                println!("  {}. {option}", i + 1);
            }
            let lifelines: Vec<String> = session
                .lifelines()
                .available()
                .iter()
                .map(ToString::to_string)
                .collect();
            println!(
                "  attempts left: {}  lifelines: {}",
                session.attempts_left(),
                if lifelines.is_empty() {
                    "none".to_string()
                } else {
                    lifelines.join(", ")
                }
            );
        }
        RoundSlot::Failed(reason) => {
            println!("Couldn't load a destination ({reason}). Press n to try again.");
        }
        RoundSlot::Loading | RoundSlot::Idle => {}
    }
}

fn print_feedback(feedback: &Feedback) {
    match feedback {
        Feedback::Correct { selected, fun_fact } => {
            println!("\u{1f389} {selected} is right!");
            if let Some(fact) = fun_fact {
                println!("   Fun fact: {fact}");
            }
        }
        Feedback::IncorrectRetry {
            selected,
            attempts_left,
        } => {
            println!("\u{1f622} Not {selected}. {attempts_left} attempt(s) left, try again.");
        }
        Feedback::IncorrectExhausted {
            selected,
            answer,
            fun_fact,
        } => {
            println!("\u{1f622} Not {selected}. It was {answer}.");
            if let Some(fact) = fun_fact {
                println!("   Fun fact: {fact}");
            }
        }
        Feedback::HintRevealed { hint } => println!("\u{1f4a1} {hint}"),
    }
}

fn print_score(session: &Session) {
    let score = session.score();
    println!(
        "Score: {} correct, {} incorrect",
        score.correct, score.incorrect
    );
}

// ---------------------------------------------------------------------------
// Game loop
// ---------------------------------------------------------------------------

async fn load_round(
    session: &mut Session,
    catalog: &StaticCatalog,
    rng: &mut impl Rng,
) {
    match session.start_round(catalog, rng).await {
        Ok(()) => print_round(session),
        Err(SessionError::RunOver) => {
            println!("No attempts left. Press s to start over.");
        }
        Err(e) => {
            tracing::warn!(error = %e, "round failed to load");
            print_round(session);
        }
    }
}

fn use_lifeline(
    session: &mut Session,
    kind: LifelineKind,
    player: &str,
    rng: &mut impl Rng,
) {
    match kind {
        LifelineKind::NarrowField => {
            if session.narrow_field(rng).is_some() {
                print_round(session);
            } else {
                println!("50:50 isn't available right now.");
            }
        }
        LifelineKind::RevealHint => match session.reveal_hint() {
            Some(feedback) => print_feedback(&feedback),
            None => println!("No hint available right now."),
        },
        LifelineKind::ChallengeFriend => match session.challenge_friend(player) {
            Some(intent) => match intent.message(SHARE_BASE) {
                Ok(message) => println!("Share this:\n{message}"),
                Err(e) => println!("Couldn't build the link: {e}"),
            },
            None => println!("Challenge isn't available right now."),
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Usage: terminal-quiz [NAME] [INVITE_LINK]
    let mut args = std::env::args().skip(1);
    let player = args.next().unwrap_or_else(|| "Traveller".to_string());
    if let Some(invitation) = args.next().as_deref().and_then(Invitation::from_link) {
        println!(
            "\u{1f30d} {} challenged you! Their score: {}. Can you beat it?",
            invitation.invited_by, invitation.score
        );
    }

    let catalog = StaticCatalog::from_json(DESTINATIONS)?;
    tracing::info!(destinations = catalog.len(), "catalog loaded");

    let mut session = Session::new(SessionConfig::default());
    let mut rng = rand::rng();

    println!("Globetrotter: guess the destination from its clues. Type ? for help.");
    load_round(&mut session, &catalog, &mut rng).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = parse_command(&line) else {
            println!("Unknown command. Type ? for help.");
            continue;
        };

        match command {
            Command::Guess(n) => {
                let selected = session
                    .current_round()
                    .and_then(|round| round.options().as_slice().get(n - 1).cloned());
                let Some(selected) = selected else {
                    println!("There's no option {n}.");
                    continue;
                };
                match session.submit_guess(&selected) {
                    Some(feedback) => {
                        print_feedback(&feedback);
                        if session.is_over() {
                            print_score(&session);
                            println!("Game over. Press s to start over or q to quit.");
                        } else if matches!(feedback, Feedback::Correct { .. }) {
                            print_score(&session);
                            println!("Press n for the next destination.");
                        }
                    }
                    None => println!("This round is finished. Press n to continue."),
                }
            }
            Command::Lifeline(kind) => use_lifeline(&mut session, kind, &player, &mut rng),
            Command::Next => load_round(&mut session, &catalog, &mut rng).await,
            Command::StartOver => match session.start_over(&catalog, &mut rng).await {
                Ok(()) => {
                    println!("Fresh start!");
                    print_round(&session);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "start over failed to load a round");
                    print_round(&session);
                }
            },
            Command::Help => print_help(),
            Command::Quit => break,
        }
    }

    print_score(&session);
    println!("Rounds played: {}", session.history().len());
    Ok(())
}
