mod board;
mod bot;
mod game_state;
mod player;
mod room;

pub use board::{Board, Cell, CellIndex, CellIndexError, Mark, BOARD_SIZE, WINNING_LINES};
pub use bot::{choose_move, BotRng, MoveRng};
pub use game_state::{GameState, MoveError, Outcome, Status};
pub use player::{display_name, Player, PlayerId, BOT_NAME, BOT_PLAYER_ID};
pub use room::{
    JoinOutcome, Room, RoomError, RoomId, RoomSettings, RoomSummary, BOT_ROOM_ID, MAX_PLAYERS,
};
