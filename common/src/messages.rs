use crate::tictactoe::{CellIndex, Outcome, PlayerId, Room, RoomError, RoomId};
use serde::{Deserialize, Serialize};

// Sent by a client over its websocket
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Open { room_id: RoomId },
    Move { cell: CellIndex },
    Leave,
    Delete,
}

// Sent by the server over a client's websocket
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Room { room: Room },
    GameEnd { outcome: Outcome },
    RoomClosed { room_id: RoomId },
    Error { kind: ErrorKind, message: String },
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RoomNotFound,
    RoomFull,
    AuthenticationFailed,
}

impl From<&RoomError> for ErrorKind {
    fn from(err: &RoomError) -> Self {
        match err {
            RoomError::NotFound(_) => ErrorKind::RoomNotFound,
            RoomError::Full(_) => ErrorKind::RoomFull,
        }
    }
}

impl Response {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterResponse {
    pub player_id: PlayerId,
    pub name: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateRoomRequest {
    pub owner: PlayerId,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateRoomResponse {
    pub room_id: RoomId,
    pub share_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JoinRoomRequest {
    pub player: PlayerId,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeleteRoomRequest {
    pub requester: PlayerId,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requests() {
        let open: Request = serde_json::from_str("{\"type\":\"open\",\"room_id\":\"bot\"}").unwrap();
        assert_eq!(open, Request::Open { room_id: RoomId::bot() });

        let mv: Request = serde_json::from_str("{\"type\":\"move\",\"cell\":4}").unwrap();
        assert!(matches!(mv, Request::Move { cell } if cell.get() == 4));

        assert!(serde_json::from_str::<Request>("{\"type\":\"move\",\"cell\":9}").is_err());
        assert_eq!(
            serde_json::from_str::<Request>("{\"type\":\"leave\"}").unwrap(),
            Request::Leave
        );
    }

    #[test]
    fn test_error_kind_from_room_error() {
        let id = RoomId::new("abc");
        assert_eq!(ErrorKind::from(&RoomError::NotFound(id.clone())), ErrorKind::RoomNotFound);
        assert_eq!(ErrorKind::from(&RoomError::Full(id)), ErrorKind::RoomFull);
    }

    #[test]
    fn test_serialize_responses() {
        let msg = serde_json::to_string(&Response::GameEnd {
            outcome: Outcome::Draw,
        })
        .unwrap();
        assert_eq!(msg, "{\"type\":\"game_end\",\"outcome\":\"draw\"}");

        let msg = serde_json::to_string(&Response::RoomClosed {
            room_id: RoomId::new("abc"),
        })
        .unwrap();
        assert_eq!(msg, "{\"type\":\"room_closed\",\"room_id\":\"abc\"}");
    }
}
