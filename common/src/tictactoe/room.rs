use crate::tictactoe::board::{CellIndex, Mark};
use crate::tictactoe::bot::{self, MoveRng};
use crate::tictactoe::game_state::{GameState, MoveError, Outcome, Status};
use crate::tictactoe::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

pub const MAX_PLAYERS: usize = 2;
pub const BOT_ROOM_ID: &str = "bot";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        RoomId(id.into())
    }

    pub fn bot() -> Self {
        RoomId(BOT_ROOM_ID.to_string())
    }

    // The reserved id selects a local game against the bot instead of a
    // lookup in the lobby
    pub fn is_bot(&self) -> bool {
        self.0 == BOT_ROOM_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room {0} not found")]
    NotFound(RoomId),
    #[error("Room {0} is full")]
    Full(RoomId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(Mark),
    AlreadySeated,
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    pub is_private: bool,
    pub max_players: usize,
}

impl RoomSettings {
    pub fn new(is_private: bool) -> Self {
        RoomSettings {
            is_private,
            max_players: MAX_PLAYERS,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: RoomId,
    pub owner_name: String,
    pub player_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: RoomId,
    players: Vec<Player>,
    game_state: GameState,
    settings: RoomSettings,
    owner: PlayerId,
    created_at: DateTime<Utc>,
}

impl Room {
    // The creator takes X and the first turn, and waits for an opponent
    pub fn new(
        id: RoomId,
        owner: PlayerId,
        owner_name: String,
        is_private: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Room {
            id,
            players: vec![Player::new(owner.clone(), owner_name, Mark::X)],
            game_state: GameState::new(owner.clone(), Status::Waiting),
            settings: RoomSettings::new(is_private),
            owner,
            created_at,
        }
    }

    // A private game against the bot that starts immediately with the human's turn
    pub fn bot(human: PlayerId, human_name: String, created_at: DateTime<Utc>) -> Self {
        Room {
            id: RoomId::bot(),
            players: vec![
                Player::new(human.clone(), human_name, Mark::X),
                Player::bot(Mark::O),
            ],
            game_state: GameState::new(human.clone(), Status::InProgress),
            settings: RoomSettings::new(true),
            owner: human,
            created_at,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn owner(&self) -> &PlayerId {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn is_member(&self, id: &PlayerId) -> bool {
        self.player(id).is_some()
    }

    pub fn is_owner(&self, id: &PlayerId) -> bool {
        &self.owner == id
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.settings.max_players
    }

    pub fn is_public_and_waiting(&self) -> bool {
        !self.settings.is_private && self.game_state.status() == Status::Waiting
    }

    pub fn outcome_for(&self, id: &PlayerId) -> Option<Outcome> {
        self.game_state.outcome_for(id)
    }

    pub fn summary(&self) -> RoomSummary {
        let owner_name = self
            .player(&self.owner)
            .map(|p| p.name().to_string())
            .unwrap_or_default();
        RoomSummary {
            id: self.id.clone(),
            owner_name,
            player_count: self.players.len(),
            created_at: self.created_at,
        }
    }

    // Seat a second player with the remaining mark. Re-entering as an existing
    // member changes nothing.
    pub fn join(&mut self, id: PlayerId, name: String) -> Result<JoinOutcome, RoomError> {
        if self.is_member(&id) {
            return Ok(JoinOutcome::AlreadySeated);
        }
        if self.is_full() {
            return Err(RoomError::Full(self.id.clone()));
        }
        let mark = self
            .players
            .first()
            .map(|p| p.mark().other())
            .unwrap_or(Mark::X);
        self.players.push(Player::new(id, name, mark));
        if self.players.len() == MAX_PLAYERS && self.game_state.status == Status::Waiting {
            self.game_state.status = Status::InProgress;
        }
        Ok(JoinOutcome::Joined(mark))
    }

    // A rejected move leaves the room untouched
    pub fn apply_move(&mut self, mover: &PlayerId, cell: CellIndex) -> Result<&GameState, MoveError> {
        let state = &self.game_state;
        if state.status != Status::InProgress {
            return Err(MoveError::NotInProgress(state.status));
        }
        let mark = self
            .player(mover)
            .map(Player::mark)
            .ok_or_else(|| MoveError::NotSeated(mover.clone()))?;
        if &state.current_player != mover {
            return Err(MoveError::NotYourTurn {
                mover: mover.clone(),
                current: state.current_player.clone(),
            });
        }
        if !state.board.is_empty_at(cell) {
            return Err(MoveError::CellOccupied(cell));
        }

        let next_player = self
            .players
            .iter()
            .find(|p| p.id() != mover)
            .map(|p| p.id().clone());
        let state = &mut self.game_state;
        state.board.place(cell, mark);
        if let Some(winning_mark) = state.board.detect_winner() {
            state.status = Status::Completed;
            state.winner = self
                .players
                .iter()
                .find(|p| p.mark() == winning_mark)
                .map(|p| p.id().clone());
        } else if state.board.is_draw() {
            state.status = Status::Completed;
            state.winner = None;
        } else if let Some(next_player) = next_player {
            state.current_player = next_player;
        }
        debug!("Board after move by {} at {}:\n{}", mover, cell, state.board);
        Ok(&self.game_state)
    }

    // Plays a random empty cell when it is the bot's turn
    pub fn play_bot_move<R: MoveRng>(&mut self, rng: &mut R) -> Option<CellIndex> {
        let bot_id = self.game_state.current_player.clone();
        if !bot_id.is_bot() || self.game_state.status != Status::InProgress {
            return None;
        }
        let cell = bot::choose_move(&self.game_state.board, rng)?;
        self.apply_move(&bot_id, cell).ok()?;
        Some(cell)
    }
}
