//! Interactive challenge session on stdin/stdout.
//!
//! Every line is one input. Wall-clock time since the previous line is
//! fed to the controller before the input is applied, so a countdown
//! that ran out while the user was typing fails first and the input is
//! dropped.

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use clap::Args;
use rouse_core::challenge::{PatternColor, PatternPhase};
use tracing::info;

use rouse_core::{
    AlarmRef, ChallengeController, ChallengeInput, ChallengeKind, Config, Event, PuzzleView,
    SessionSnapshot, SessionState, Verdict,
};

const SETTLE_POLL: Duration = Duration::from_millis(50);

#[derive(Args)]
pub struct PlayArgs {
    /// Challenge kind (math, sequence, pattern, tictactoe, memory, match, shake)
    #[arg(long)]
    kind: ChallengeKind,
    /// Alarm label
    #[arg(long, default_value = "Wake up")]
    label: String,
    /// Alarm time as HH:MM (defaults to now)
    #[arg(long)]
    time: Option<String>,
    /// Fixed puzzle seed (overrides session.seed)
    #[arg(long)]
    seed: Option<u64>,
    /// Print events and snapshots as JSON lines
    #[arg(long)]
    json: bool,
}

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let mut session = config.session_config();
    if args.seed.is_some() {
        session.seed = args.seed;
    }

    let time = match args.time.as_deref() {
        Some(value) => AlarmRef::parse_time(value)?,
        None => Local::now().time(),
    };
    let alarm = AlarmRef::new("cli", time, args.label.clone(), args.kind);
    let json = args.json;

    let label = args.label.clone();
    let mut controller = ChallengeController::new(alarm, session, move || {
        if !json {
            println!("alarm \"{label}\" dismissed");
        }
    });
    controller.begin();
    info!(session = %controller.session_id(), kind = %args.kind, "playing challenge session");
    report(&mut controller, json)?;

    let mut last = Instant::now();
    let mut lines = io::stdin().lock().lines();
    while controller.state() != SessionState::Succeeded {
        if !json {
            print!("> ");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            info!("stdin closed, aborting session");
            controller.abort();
            report(&mut controller, json)?;
            return Ok(());
        };
        let line = line?;

        let now = Instant::now();
        let flushed = controller.advance(now - last);
        last = now;
        if let Verdict::Failure(_) = flushed {
            if !json {
                println!("(input dropped)");
            }
            report(&mut controller, json)?;
            continue;
        }

        if is_status_request(args.kind, &line) {
            report(&mut controller, json)?;
            continue;
        }
        match line.trim() {
            "quit" => {
                controller.abort();
                report(&mut controller, json)?;
                return Ok(());
            }
            "reset" => {
                controller.restart();
                report(&mut controller, json)?;
                continue;
            }
            _ => {}
        }

        if controller.state() != SessionState::Active {
            if !json {
                println!("hold on, the next challenge is not ready yet");
            }
            continue;
        }
        match parse_input(args.kind, &line) {
            Some(input) => {
                controller.submit(input);
            }
            None => {
                if !json {
                    println!("unrecognised input: {}", line.trim());
                }
                continue;
            }
        }
        report(&mut controller, json)?;
    }

    // Let the success settle before the alarm is dismissed.
    while !controller.is_dismissed() {
        thread::sleep(SETTLE_POLL);
        let now = Instant::now();
        controller.advance(now - last);
        last = now;
    }
    print_events(controller.drain_events(), json)?;
    info!(attempts = controller.attempts(), "session finished");
    Ok(())
}

/// `status`, or an empty line for kinds that do not take one as input.
fn is_status_request(kind: ChallengeKind, line: &str) -> bool {
    match line.trim() {
        "status" => true,
        "" => kind != ChallengeKind::Shake,
        _ => false,
    }
}

/// Map one line to an input for `kind`. Positions are typed 1-based.
fn parse_input(kind: ChallengeKind, line: &str) -> Option<ChallengeInput> {
    let text = line.trim();
    let position = || {
        text.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
    };
    match kind {
        ChallengeKind::Math | ChallengeKind::Sequence => {
            Some(ChallengeInput::Answer(text.to_string()))
        }
        ChallengeKind::Pattern => position()
            .or_else(|| PatternColor::index_of(text))
            .map(ChallengeInput::Color),
        ChallengeKind::TicTacToe => position().map(ChallengeInput::Cell),
        ChallengeKind::Memory => position().map(ChallengeInput::Card),
        ChallengeKind::Match => position().map(ChallengeInput::Item),
        ChallengeKind::Shake => Some(ChallengeInput::Stimulus),
    }
}

fn report<F: FnOnce()>(
    controller: &mut ChallengeController<F>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    print_events(controller.drain_events(), json)?;
    let snapshot = controller.snapshot();
    if json {
        println!("{}", snapshot.to_json()?);
    } else if matches!(snapshot.state, SessionState::Active) {
        render(&snapshot);
    }
    Ok(())
}

fn print_events(events: Vec<Event>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        if json {
            println!("{}", serde_json::to_string(&event)?);
            continue;
        }
        match event {
            Event::ChallengeFailed {
                reason, attempts, ..
            } => println!("✗ {reason} (failed attempts: {attempts})"),
            Event::DifficultyEscalated { to, .. } => println!("difficulty raised to {to}"),
            Event::ChallengeRestarted { .. } => println!("new challenge, same difficulty"),
            Event::ChallengeSucceeded { .. } => println!("✓ solved!"),
            Event::SessionAborted { .. } => println!("session aborted"),
            Event::SessionStarted { .. }
            | Event::ChallengeStarted { .. }
            | Event::SessionCompleted { .. } => {}
        }
    }
    Ok(())
}

fn render(snapshot: &SessionSnapshot) {
    let Some(challenge) = &snapshot.challenge else {
        return;
    };
    println!(
        "[{}] {} · {} · {}s left · attempt {} · progress {}%",
        snapshot.alarm.label,
        challenge.kind.title(),
        challenge.difficulty_label,
        challenge.remaining_secs,
        snapshot.attempts + 1,
        snapshot.progress_pct,
    );

    match &challenge.view {
        PuzzleView::Math(view) => println!("  {} = ?", view.question),
        PuzzleView::Sequence(view) => {
            let terms: Vec<String> = view.terms.iter().map(i64::to_string).collect();
            println!("  {}, ?", terms.join(", "));
            println!("  hint: {}", view.hint);
        }
        PuzzleView::Pattern(view) => {
            let palette: Vec<String> = view
                .palette
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}:{}", i + 1, c.name()))
                .collect();
            match (view.phase, &view.pattern) {
                (PatternPhase::Show, Some(pattern)) => {
                    let names: Vec<&str> = pattern.iter().map(|c| c.name()).collect();
                    println!("  memorise: {}", names.join(" "));
                    println!("  (press Enter once it is hidden)");
                }
                _ => println!("  repeat the pattern ({}/{})", view.entered, view.length),
            }
            println!("  palette: {}", palette.join(" "));
        }
        PuzzleView::TicTacToe(view) => {
            for row in view.board.chunks(3) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|cell| match cell {
                        Some(mark) => format!("{mark:?}"),
                        None => ".".into(),
                    })
                    .collect();
                println!("  {}", cells.join(" "));
            }
            println!(
                "  wins {}/{} · losses {} · draws {} (cells 1-9, row by row)",
                view.wins, view.games_needed, view.losses, view.draws
            );
        }
        PuzzleView::Memory(view) => {
            let cards: Vec<String> = view
                .cards
                .iter()
                .enumerate()
                .map(|(i, card)| format!("{}:{}", i + 1, card.face.unwrap_or("??")))
                .collect();
            println!("  {}", cards.join(" "));
            println!(
                "  pairs {}/{} · moves {}",
                view.matches, view.pairs, view.moves
            );
        }
        PuzzleView::Match(view) => {
            let items: Vec<String> = view
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let mark = if item.matched {
                        "✓"
                    } else if item.selected {
                        "*"
                    } else {
                        ""
                    };
                    format!("{}:{}{}{mark}", i + 1, item.emoji, item.name)
                })
                .collect();
            println!("  {}", items.join("  "));
            println!(
                "  groups {}/{} of {} items",
                view.matches, view.categories, view.items_per_category
            );
        }
        PuzzleView::Shake(view) => println!(
            "  shakes {}/{} ({}%), press Enter to shake",
            view.count, view.target, view.progress_pct
        ),
    }
}
