//! End-to-end tests driving a whole challenge session through the
//! controller, the way a presentation layer would.

use std::cell::Cell;
use std::time::Duration;

use chrono::NaiveTime;
use rouse_core::challenge::{Mark, MathView, MoveOutcome, TicTacToeView};
use rouse_core::{
    AlarmRef, ChallengeController, ChallengeInput, ChallengeKind, Difficulty, Event,
    FailureReason, PuzzleView, SessionConfig, SessionState, Verdict,
};

fn alarm(kind: ChallengeKind) -> AlarmRef {
    AlarmRef::new(
        "alarm-1",
        NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
        "Morning run",
        kind,
    )
}

fn seeded(seed: u64) -> SessionConfig {
    SessionConfig {
        seed: Some(seed),
        ..SessionConfig::default()
    }
}

fn math_view<F: FnOnce()>(controller: &ChallengeController<F>) -> MathView {
    match controller.snapshot().challenge.map(|c| c.view) {
        Some(PuzzleView::Math(view)) => view,
        other => panic!("expected math view, got {other:?}"),
    }
}

fn tictactoe_view<F: FnOnce()>(controller: &ChallengeController<F>) -> TicTacToeView {
    match controller.snapshot().challenge.map(|c| c.view) {
        Some(PuzzleView::TicTacToe(view)) => view,
        other => panic!("expected tic-tac-toe view, got {other:?}"),
    }
}

#[test]
fn math_failing_twice_presents_hard_problem() {
    let mut controller = ChallengeController::new(alarm(ChallengeKind::Math), seeded(1), || {});
    controller.begin();
    assert_eq!(controller.difficulty(), Difficulty::Easy);

    // First attempt: a wrong answer.
    let wrong = math_view(&controller).expr.evaluate() + 1;
    assert_eq!(
        controller.submit(ChallengeInput::Answer(wrong.to_string())),
        Verdict::Failure(FailureReason::WrongAnswer)
    );
    assert_eq!(controller.difficulty(), Difficulty::Medium);

    // Second attempt: let the clock run out.
    assert_eq!(
        controller.advance(Duration::from_secs(30)),
        Verdict::Failure(FailureReason::TimedOut)
    );

    assert_eq!(controller.attempts(), 2);
    assert_eq!(controller.difficulty(), Difficulty::Hard);
    let view = math_view(&controller);
    assert!(view.question.starts_with('('), "hard question: {}", view.question);
    assert_eq!(controller.snapshot().challenge.unwrap().remaining_secs, 45);
}

#[test]
fn non_numeric_answer_changes_nothing() {
    let mut controller = ChallengeController::new(alarm(ChallengeKind::Math), seeded(2), || {});
    controller.begin();
    let question = math_view(&controller).question;
    assert_eq!(
        controller.submit(ChallengeInput::Answer("seven".into())),
        Verdict::Pending
    );
    assert_eq!(controller.attempts(), 0);
    assert_eq!(math_view(&controller).question, question);
}

#[test]
fn solved_math_dismisses_once_after_settle() {
    let dismissals = Cell::new(0);
    let mut controller = ChallengeController::new(alarm(ChallengeKind::Math), seeded(3), || {
        dismissals.set(dismissals.get() + 1)
    });
    controller.begin();
    let answer = math_view(&controller).expr.evaluate();
    assert_eq!(
        controller.submit(ChallengeInput::Answer(answer.to_string())),
        Verdict::Success
    );

    // The finished challenge's countdown must not fire later.
    for _ in 0..60 {
        assert_eq!(controller.advance(Duration::from_secs(1)), Verdict::Pending);
    }
    assert_eq!(dismissals.get(), 1);
    assert_eq!(controller.state(), SessionState::Succeeded);
    assert_eq!(controller.attempts(), 0);

    let events = controller.drain_events();
    let completed = events
        .iter()
        .filter(|e| matches!(e, Event::SessionCompleted { .. }))
        .count();
    assert_eq!(completed, 1);
}

/// X strategy: win, block, corners, center, anything.
fn player_move(board: &[Option<Mark>]) -> usize {
    const LINES: [[usize; 3]; 8] = [
        [0, 1, 2],
        [3, 4, 5],
        [6, 7, 8],
        [0, 3, 6],
        [1, 4, 7],
        [2, 5, 8],
        [0, 4, 8],
        [2, 4, 6],
    ];
    let completing = |mark: Mark| {
        LINES.iter().find_map(|line| {
            let owned = line.iter().filter(|&&i| board[i] == Some(mark)).count();
            let empty: Vec<usize> = line.iter().copied().filter(|&i| board[i].is_none()).collect();
            (owned == 2 && empty.len() == 1).then(|| empty[0])
        })
    };
    completing(Mark::X)
        .or_else(|| completing(Mark::O))
        .or_else(|| [0, 8, 2, 6, 4].into_iter().find(|&i| board[i].is_none()))
        .or_else(|| (0..9).find(|&i| board[i].is_none()))
        .expect("board has an empty cell while the round is running")
}

#[test]
fn tictactoe_medium_needs_two_net_wins() {
    let mut controller =
        ChallengeController::new(alarm(ChallengeKind::TicTacToe), seeded(7), || {});
    controller.begin();

    // Escalate to Medium through a timeout.
    controller.submit(ChallengeInput::Cell(4));
    assert_eq!(
        controller.advance(Duration::from_secs(120)),
        Verdict::Failure(FailureReason::TimedOut)
    );
    assert_eq!(controller.difficulty(), Difficulty::Medium);
    assert_eq!(tictactoe_view(&controller).games_needed, 2);

    let mut succeeded = false;
    for _ in 0..2000 {
        let before = tictactoe_view(&controller);
        let verdict = controller.submit(ChallengeInput::Cell(player_move(&before.board)));
        let after = tictactoe_view(&controller);
        if verdict == Verdict::Success {
            assert_eq!(after.wins, 2);
            assert_eq!(after.last_round, Some(MoveOutcome::Win(Mark::X)));
            succeeded = true;
            break;
        }
        assert_eq!(verdict, Verdict::Pending);
        assert!(after.wins < 2, "two wins must end the challenge");
    }
    assert!(succeeded, "X strategy never reached two wins");
    assert_eq!(controller.state(), SessionState::Succeeded);
    assert_eq!(controller.attempts(), 1);
}

/// Play strategy moves until a round is won. Returns the verdict of the
/// winning move.
fn play_until_win<F: FnOnce()>(controller: &mut ChallengeController<F>) -> Verdict {
    for _ in 0..2000 {
        let before = tictactoe_view(controller);
        let verdict = controller.submit(ChallengeInput::Cell(player_move(&before.board)));
        if verdict != Verdict::Pending {
            return verdict;
        }
        if tictactoe_view(controller).wins > before.wins {
            return verdict;
        }
    }
    panic!("X strategy never won a round");
}

#[test]
fn tictactoe_lost_round_between_wins_resets_streak() {
    let mut controller =
        ChallengeController::new(alarm(ChallengeKind::TicTacToe), seeded(11), || {});
    controller.begin();
    controller.submit(ChallengeInput::Cell(4));
    controller.advance(Duration::from_secs(120));
    assert_eq!(controller.difficulty(), Difficulty::Medium);

    assert_eq!(play_until_win(&mut controller), Verdict::Pending);
    assert_eq!(tictactoe_view(&controller).wins, 1);

    // O takes the center, blocks the top row, then completes 2-4-6.
    for cell in [0, 1, 3] {
        assert_eq!(controller.submit(ChallengeInput::Cell(cell)), Verdict::Pending);
    }
    let view = tictactoe_view(&controller);
    assert_eq!(view.last_round, Some(MoveOutcome::Win(Mark::O)));
    assert_eq!((view.wins, view.losses), (0, 1));
    assert!(view.board.iter().all(Option::is_none));

    assert_eq!(play_until_win(&mut controller), Verdict::Pending);
    assert_eq!(tictactoe_view(&controller).wins, 1);
    assert_eq!(controller.state(), SessionState::Active);

    assert_eq!(play_until_win(&mut controller), Verdict::Success);
    assert_eq!(controller.state(), SessionState::Succeeded);
    assert_eq!(controller.attempts(), 1);
}

#[test]
fn memory_reveal_pending_at_timeout_never_leaks() {
    let mut controller = ChallengeController::new(alarm(ChallengeKind::Memory), seeded(5), || {});
    controller.begin();

    controller.submit(ChallengeInput::Card(0));
    controller.submit(ChallengeInput::Card(1));
    assert_eq!(
        controller.advance(Duration::from_millis(89_500)),
        Verdict::Pending
    );

    // Flip a second pair so its reveal is still pending when time runs out.
    controller.submit(ChallengeInput::Card(2));
    controller.submit(ChallengeInput::Card(3));
    assert_eq!(
        controller.advance(Duration::from_millis(500)),
        Verdict::Failure(FailureReason::TimedOut)
    );

    // The replacement deck starts face down and stays that way.
    controller.advance(Duration::from_secs(2));
    let Some(PuzzleView::Memory(view)) = controller.snapshot().challenge.map(|c| c.view) else {
        panic!("expected memory view");
    };
    assert_eq!(view.pairs, 8);
    assert_eq!(view.matches, 0);
    assert!(view.cards.iter().all(|c| c.face.is_none()));
}

#[test]
fn abort_tears_down_without_dismissing() {
    let dismissals = Cell::new(0);
    let mut controller = ChallengeController::new(alarm(ChallengeKind::Pattern), seeded(9), || {
        dismissals.set(dismissals.get() + 1)
    });
    controller.begin();
    assert!(controller.abort());
    assert_eq!(controller.submit(ChallengeInput::Color(0)), Verdict::Pending);
    assert_eq!(controller.advance(Duration::from_secs(600)), Verdict::Pending);
    assert_eq!(controller.attempts(), 0);
    assert_eq!(dismissals.get(), 0);
    assert!(controller
        .drain_events()
        .iter()
        .any(|e| matches!(e, Event::SessionAborted { .. })));
}

#[test]
fn difficulty_caps_at_hard() {
    let mut controller = ChallengeController::new(alarm(ChallengeKind::Sequence), seeded(4), || {});
    controller.begin();
    for _ in 0..5 {
        controller.submit(ChallengeInput::Answer("-999999".into()));
    }
    assert_eq!(controller.attempts(), 5);
    assert_eq!(controller.difficulty(), Difficulty::Hard);
    assert_eq!(controller.snapshot().progress_pct, 80);

    let escalations = controller
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, Event::DifficultyEscalated { .. }))
        .count();
    assert_eq!(escalations, 2);
}
