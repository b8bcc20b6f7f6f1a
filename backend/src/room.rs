use common::{CellIndex, JoinOutcome, MoveError, PlayerId, Room, RoomError, RoomId};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};

const COMMAND_QUEUE_SIZE: usize = 32;

#[derive(Debug)]
enum Command {
    Join {
        player: PlayerId,
        name: String,
        reply: oneshot::Sender<Result<Room, RoomError>>,
    },
    Move {
        player: PlayerId,
        cell: CellIndex,
        reply: oneshot::Sender<Result<Room, MoveError>>,
    },
    Delete {
        requester: PlayerId,
        reply: oneshot::Sender<bool>,
    },
}

// Handle to a room actor. The actor task owns the Room and applies commands
// one at a time, so moves on the same room never interleave. Every committed
// state is published on the watch channel; None means the room is gone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: RoomId,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<Option<Room>>,
}

impl RoomHandle {
    pub fn spawn(room: Room) -> Self {
        let id = room.id().clone();
        let (commands, command_rcv) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let (state_sender, state) = watch::channel(Some(room.clone()));
        tokio::task::spawn(run(room, command_rcv, state_sender));
        RoomHandle {
            id,
            commands,
            state,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn snapshot(&self) -> Option<Room> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Room>> {
        self.state.clone()
    }

    pub async fn join(&self, player: PlayerId, name: String) -> Result<Room, RoomError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Join {
            player,
            name,
            reply,
        })
        .await?;
        response.await.map_err(|_| self.not_found())?
    }

    pub async fn submit_move(&self, player: PlayerId, cell: CellIndex) -> Result<Room, RoomError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Move {
            player: player.clone(),
            cell,
            reply,
        })
        .await?;
        match response.await.map_err(|_| self.not_found())? {
            Ok(room) => Ok(room),
            // Rejected moves are no-ops, so hand back the unchanged room
            Err(err) => {
                warn!("Rejected move by {} in room {}: {}", player, self.id, err);
                self.snapshot().ok_or_else(|| self.not_found())
            }
        }
    }

    // Returns whether the room was deleted
    pub async fn delete(&self, requester: PlayerId) -> bool {
        let (reply, response) = oneshot::channel();
        if self.send(Command::Delete { requester, reply }).await.is_err() {
            return false;
        }
        response.await.unwrap_or(false)
    }

    async fn send(&self, command: Command) -> Result<(), RoomError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| self.not_found())
    }

    fn not_found(&self) -> RoomError {
        RoomError::NotFound(self.id.clone())
    }
}

async fn run(
    mut room: Room,
    mut commands: mpsc::Receiver<Command>,
    state: watch::Sender<Option<Room>>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            Command::Join {
                player,
                name,
                reply,
            } => {
                let result = room.join(player.clone(), name).map(|outcome| {
                    if let JoinOutcome::Joined(mark) = outcome {
                        info!("{} joined room {} as {}", player, room.id(), mark);
                        state.send_replace(Some(room.clone()));
                    }
                    room.clone()
                });
                let _ = reply.send(result);
            }
            Command::Move {
                player,
                cell,
                reply,
            } => {
                let result = room.apply_move(&player, cell).map(|_| ());
                if result.is_ok() {
                    info!("{} played {} in room {}", player, cell, room.id());
                    state.send_replace(Some(room.clone()));
                }
                let _ = reply.send(result.map(|()| room.clone()));
            }
            Command::Delete { requester, reply } => {
                if !room.is_owner(&requester) {
                    warn!(
                        "{} tried to delete room {} owned by {}",
                        requester,
                        room.id(),
                        room.owner()
                    );
                    let _ = reply.send(false);
                    continue;
                }
                info!("Room {} deleted by its owner", room.id());
                state.send_replace(None);
                let _ = reply.send(true);
                break;
            }
        }
    }
}
