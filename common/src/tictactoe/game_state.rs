use crate::tictactoe::board::{Board, CellIndex};
use crate::tictactoe::player::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Waiting,
    InProgress,
    Completed,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("Game is not in progress (status: {0:?})")]
    NotInProgress(Status),
    #[error("Player {0} is not seated in this room")]
    NotSeated(PlayerId),
    #[error("It is not {mover}'s turn, waiting on {current}")]
    NotYourTurn { mover: PlayerId, current: PlayerId },
    #[error("Cell {0} is already occupied")]
    CellOccupied(CellIndex),
}

// winner is always serialized, as null for a draw or an unfinished game
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) current_player: PlayerId,
    pub(crate) status: Status,
    pub(crate) winner: Option<PlayerId>,
}

impl GameState {
    pub fn new(first_player: PlayerId, status: Status) -> Self {
        GameState {
            board: Board::default(),
            current_player: first_player,
            status,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> &PlayerId {
        &self.current_player
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn outcome_for(&self, player: &PlayerId) -> Option<Outcome> {
        if !self.is_over() {
            return None;
        }
        Some(match &self.winner {
            None => Outcome::Draw,
            Some(winner) if winner == player => Outcome::Win,
            Some(_) => Outcome::Lose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_for() {
        let alice = PlayerId::new("alice");
        let bob = PlayerId::new("bob");
        let mut state = GameState::new(alice.clone(), Status::InProgress);
        assert_eq!(state.outcome_for(&alice), None);

        state.status = Status::Completed;
        assert_eq!(state.outcome_for(&alice), Some(Outcome::Draw));

        state.winner = Some(bob.clone());
        assert_eq!(state.outcome_for(&alice), Some(Outcome::Lose));
        assert_eq!(state.outcome_for(&bob), Some(Outcome::Win));
    }

    #[test]
    fn test_explicit_null_winner() {
        let state = GameState::new(PlayerId::new("alice"), Status::Waiting);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["winner"], serde_json::Value::Null);
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["currentPlayer"], "alice");
    }
}
