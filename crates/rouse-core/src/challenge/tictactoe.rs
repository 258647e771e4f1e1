//! Tic-tac-toe against a heuristic opponent.
//!
//! The player is always X and moves first. The challenge is passed by
//! winning `games_needed` rounds in a row (1/2/3 by difficulty); a lost
//! round resets the streak, a draw leaves it alone. Rounds restart
//! silently. The only failure is the 120s session timer running out,
//! which starts with the first move.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::{
    ChallengeInput, ChallengeMachine, ChallengeRng, ChallengeSnapshot, FailureReason, PuzzleView,
    Status, Verdict,
};
use crate::alarm::ChallengeKind;
use crate::difficulty::Difficulty;
use crate::timer::Countdown;

const SESSION_SECS: u32 = 120;
const CENTER: usize = 4;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Mark {
    X,
    O,
}

/// Nine cells, row-major.
pub type Board = [Option<Mark>; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "mark", rename_all = "lowercase")]
pub enum MoveOutcome {
    Win(Mark),
    Draw,
    Continue,
}

/// The mark owning a complete line, if any.
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|&[a, b, c]| match board[a] {
        Some(mark) if board[b] == Some(mark) && board[c] == Some(mark) => Some(mark),
        _ => None,
    })
}

pub fn outcome(board: &Board) -> MoveOutcome {
    match winner(board) {
        Some(mark) => MoveOutcome::Win(mark),
        None if board.iter().all(Option::is_some) => MoveOutcome::Draw,
        None => MoveOutcome::Continue,
    }
}

/// Whose turn it is, given that X always opens.
pub fn to_move(board: &Board) -> Mark {
    let xs = board.iter().filter(|c| **c == Some(Mark::X)).count();
    let os = board.iter().filter(|c| **c == Some(Mark::O)).count();
    if xs > os {
        Mark::O
    } else {
        Mark::X
    }
}

fn empty_cells(board: &Board) -> Vec<usize> {
    (0..board.len()).filter(|&i| board[i].is_none()).collect()
}

fn completing_cell(board: &Board, empty: &[usize], mark: Mark) -> Option<usize> {
    empty.iter().copied().find(|&cell| {
        let mut trial = *board;
        trial[cell] = Some(mark);
        winner(&trial) == Some(mark)
    })
}

/// Pick the opponent's (O) cell.
///
/// Priority: take a win, block X's win, take the center, pick uniformly
/// among empty cells. At `Easy` the first two steps are skipped.
/// Returns `None` when it is not O's turn or the round is already over.
pub fn opponent_move<R: Rng + ?Sized>(
    board: &Board,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<usize> {
    if to_move(board) != Mark::O || outcome(board) != MoveOutcome::Continue {
        return None;
    }
    let empty = empty_cells(board);

    if difficulty >= Difficulty::Medium {
        if let Some(cell) = completing_cell(board, &empty, Mark::O) {
            return Some(cell);
        }
        if let Some(cell) = completing_cell(board, &empty, Mark::X) {
            return Some(cell);
        }
    }
    if board[CENTER].is_none() {
        return Some(CENTER);
    }
    empty.choose(rng).copied()
}

#[derive(Debug, Clone, Serialize)]
pub struct TicTacToeView {
    pub board: Vec<Option<Mark>>,
    pub wins: u32,
    pub games_needed: u32,
    pub losses: u32,
    pub draws: u32,
    /// Result of the round that ended most recently.
    pub last_round: Option<MoveOutcome>,
}

#[derive(Debug, Clone)]
pub struct TicTacToeChallenge {
    difficulty: Difficulty,
    board: Board,
    win_streak: u32,
    games_needed: u32,
    losses: u32,
    draws: u32,
    last_round: Option<MoveOutcome>,
    countdown: Countdown,
    rng: ChallengeRng,
    status: Status,
}

impl TicTacToeChallenge {
    pub fn new(difficulty: Difficulty, rng: ChallengeRng) -> Self {
        Self {
            difficulty,
            board: [None; 9],
            win_streak: 0,
            games_needed: Self::games_needed(difficulty),
            losses: 0,
            draws: 0,
            last_round: None,
            countdown: Countdown::new(SESSION_SECS),
            rng,
            status: Status::Playing,
        }
    }

    pub fn games_needed(difficulty: Difficulty) -> u32 {
        difficulty.pick(1, 2, 3)
    }

    /// One budget for the whole session, whatever the difficulty.
    pub fn time_budget(_difficulty: Difficulty) -> u32 {
        SESSION_SECS
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn win_streak(&self) -> u32 {
        self.win_streak
    }

    /// Close the current round and clear the board for the next one.
    fn finish_round(&mut self, result: MoveOutcome) -> Verdict {
        self.last_round = Some(result);
        self.board = [None; 9];
        match result {
            MoveOutcome::Win(Mark::X) => {
                self.win_streak += 1;
                debug!(streak = self.win_streak, needed = self.games_needed, "round won");
                if self.win_streak >= self.games_needed {
                    self.countdown.cancel();
                    return self.status.record(Verdict::Success);
                }
            }
            MoveOutcome::Win(Mark::O) => {
                debug!("round lost, streak reset");
                self.win_streak = 0;
                self.losses += 1;
            }
            MoveOutcome::Draw => self.draws += 1,
            MoveOutcome::Continue => {}
        }
        Verdict::Pending
    }
}

impl ChallengeMachine for TicTacToeChallenge {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::TicTacToe
    }

    fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn status(&self) -> Status {
        self.status
    }

    fn start(&mut self) {}

    fn submit(&mut self, input: ChallengeInput) -> Verdict {
        if !self.status.is_playing() {
            return Verdict::Pending;
        }
        let ChallengeInput::Cell(cell) = input else {
            return Verdict::Pending;
        };
        if cell >= self.board.len() || self.board[cell].is_some() {
            debug!(cell, "move ignored");
            return Verdict::Pending;
        }

        self.countdown.start();
        self.board[cell] = Some(Mark::X);
        match outcome(&self.board) {
            MoveOutcome::Continue => {}
            finished => return self.finish_round(finished),
        }

        if let Some(reply) = opponent_move(&self.board, self.difficulty, &mut self.rng) {
            self.board[reply] = Some(Mark::O);
        }
        match outcome(&self.board) {
            MoveOutcome::Continue => Verdict::Pending,
            finished => self.finish_round(finished),
        }
    }

    fn advance(&mut self, dt: Duration) -> Verdict {
        if self.status.is_playing() && self.countdown.advance(dt) {
            return self.status.record(Verdict::Failure(FailureReason::TimedOut));
        }
        Verdict::Pending
    }

    fn teardown(&mut self) {
        self.countdown.cancel();
        if self.status.is_playing() {
            self.status = Status::Discarded;
        }
    }

    fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    fn snapshot(&self) -> ChallengeSnapshot {
        ChallengeSnapshot {
            kind: ChallengeKind::TicTacToe,
            difficulty: self.difficulty,
            difficulty_label: self.difficulty.label().to_string(),
            status: self.status,
            timer: self.countdown.state(),
            remaining_secs: self.countdown.remaining_secs(),
            view: PuzzleView::TicTacToe(TicTacToeView {
                board: self.board.to_vec(),
                wins: self.win_streak,
                games_needed: self.games_needed,
                losses: self.losses,
                draws: self.draws,
                last_round: self.last_round,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    fn rng() -> ChallengeRng {
        ChallengeRng::seed_from_u64(3)
    }

    #[test]
    fn detects_rows_columns_and_diagonals() {
        assert_eq!(winner(&[X, X, X, E, O, O, E, E, E]), Some(Mark::X));
        assert_eq!(winner(&[O, X, E, O, X, E, O, E, X]), Some(Mark::O));
        assert_eq!(winner(&[X, O, E, O, X, E, E, E, X]), Some(Mark::X));
        assert_eq!(winner(&[E, E, O, X, O, X, O, X, E]), Some(Mark::O));
        assert_eq!(winner(&[E; 9]), None);
    }

    #[test]
    fn full_board_without_line_is_a_draw() {
        let board = [X, O, X, X, O, O, O, X, X];
        assert_eq!(outcome(&board), MoveOutcome::Draw);
    }

    #[test]
    fn opponent_waits_for_player_turn() {
        let board = [X, X, E, E, O, E, E, E, E];
        assert_eq!(to_move(&board), Mark::X);
        assert_eq!(opponent_move(&board, Difficulty::Medium, &mut rng()), None);
    }

    #[test]
    fn opponent_takes_win_over_block_and_center() {
        // O completes 2-5-8 even though X threatens 0-3-6 and the center is free.
        let board = [X, E, O, X, E, O, E, X, E];
        assert_eq!(to_move(&board), Mark::O);
        assert_eq!(opponent_move(&board, Difficulty::Medium, &mut rng()), Some(8));
        assert_eq!(opponent_move(&board, Difficulty::Hard, &mut rng()), Some(8));
    }

    #[test]
    fn opponent_blocks_when_it_cannot_win() {
        let board = [X, X, E, E, O, E, E, E, E];
        assert_eq!(opponent_move(&board, Difficulty::Medium, &mut rng()), Some(2));
    }

    #[test]
    fn opponent_takes_free_center() {
        let board = [X, E, E, E, E, E, E, E, E];
        assert_eq!(opponent_move(&board, Difficulty::Hard, &mut rng()), Some(CENTER));
    }

    #[test]
    fn easy_opponent_ignores_threats_but_prefers_center() {
        let board = [X, X, E, E, E, E, E, O, E];
        assert_eq!(opponent_move(&board, Difficulty::Easy, &mut rng()), Some(CENTER));
        assert_eq!(opponent_move(&board, Difficulty::Medium, &mut rng()), Some(2));
    }

    #[test]
    fn easy_opponent_moves_to_an_empty_cell() {
        let board = [X, E, E, E, O, E, E, E, X];
        for seed in 0..20 {
            let mut rng = ChallengeRng::seed_from_u64(seed);
            let cell = opponent_move(&board, Difficulty::Easy, &mut rng).unwrap();
            assert!(board[cell].is_none());
        }
    }

    #[test]
    fn timer_starts_with_first_move() {
        let mut challenge = TicTacToeChallenge::new(Difficulty::Easy, rng());
        challenge.start();
        assert_eq!(challenge.advance(Duration::from_secs(500)), Verdict::Pending);
        assert_eq!(challenge.remaining_secs(), 120);

        challenge.submit(ChallengeInput::Cell(0));
        assert_eq!(
            challenge.advance(Duration::from_secs(120)),
            Verdict::Failure(FailureReason::TimedOut)
        );
    }

    #[test]
    fn occupied_cell_is_ignored() {
        let mut challenge = TicTacToeChallenge::new(Difficulty::Hard, rng());
        challenge.submit(ChallengeInput::Cell(0));
        let before = *challenge.board();
        assert_eq!(challenge.submit(ChallengeInput::Cell(0)), Verdict::Pending);
        assert_eq!(challenge.submit(ChallengeInput::Cell(9)), Verdict::Pending);
        assert_eq!(challenge.board(), &before);
    }

    #[test]
    fn losing_a_round_resets_the_streak() {
        let mut challenge = TicTacToeChallenge::new(Difficulty::Medium, rng());
        challenge.win_streak = 1;
        assert_eq!(challenge.finish_round(MoveOutcome::Win(Mark::O)), Verdict::Pending);
        assert_eq!(challenge.win_streak(), 0);
        assert!(challenge.board().iter().all(Option::is_none));
    }
}
