use crate::room::RoomHandle;
use async_trait::async_trait;
use chrono::Utc;
use common::{BotRng, CellIndex, MoveError, MoveRng, PlayerId, Room, RoomError, RoomId, Status};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Move(#[from] MoveError),
}

// Where a viewed room lives. Both kinds share the same move rules; they differ
// in who owns the authoritative state.
#[async_trait]
pub trait RoomBackend: Send + Sync {
    fn room_id(&self) -> &RoomId;

    // Every committed state, in commit order. None means the room is gone.
    fn subscribe(&self) -> watch::Receiver<Option<Room>>;

    async fn submit_move(&self, mover: &PlayerId, cell: CellIndex) -> Result<Room, SyncError>;
}

// A room registered in the lobby and owned by its actor
pub struct SharedRoom {
    handle: RoomHandle,
}

impl SharedRoom {
    pub fn new(handle: RoomHandle) -> Self {
        SharedRoom { handle }
    }
}

#[async_trait]
impl RoomBackend for SharedRoom {
    fn room_id(&self) -> &RoomId {
        self.handle.id()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Room>> {
        self.handle.subscribe()
    }

    async fn submit_move(&self, mover: &PlayerId, cell: CellIndex) -> Result<Room, SyncError> {
        Ok(self.handle.submit_move(mover.clone(), cell).await?)
    }
}

// A game against the bot, owned by the connection that opened it. Nothing is
// registered in the lobby and the state is dropped with the connection.
pub struct BotRoom<R: MoveRng + Default + Send + 'static = BotRng> {
    id: RoomId,
    state: Arc<watch::Sender<Option<Room>>>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    rng: PhantomData<fn() -> R>,
}

impl<R: MoveRng + Default + Send + 'static> BotRoom<R> {
    pub fn new(human: PlayerId, human_name: String, delay: Duration) -> Self {
        let room = Room::bot(human, human_name, Utc::now());
        let (state, _) = watch::channel(Some(room));
        BotRoom {
            id: RoomId::bot(),
            state: Arc::new(state),
            delay,
            pending: Mutex::new(None),
            rng: PhantomData,
        }
    }

    // The bot answers only after the human move has been committed
    fn schedule_bot_move(&self) {
        let state = self.state.clone();
        let delay = self.delay;
        let task = tokio::task::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut rng = R::default();
            state.send_if_modified(|room| {
                let cell = room.as_mut().and_then(|room| room.play_bot_move(&mut rng));
                if let Some(cell) = cell {
                    info!("Bot played {}", cell);
                }
                cell.is_some()
            });
        });
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }
}

#[async_trait]
impl<R: MoveRng + Default + Send + 'static> RoomBackend for BotRoom<R> {
    fn room_id(&self) -> &RoomId {
        &self.id
    }

    fn subscribe(&self) -> watch::Receiver<Option<Room>> {
        self.state.subscribe()
    }

    async fn submit_move(&self, mover: &PlayerId, cell: CellIndex) -> Result<Room, SyncError> {
        let mut result = Ok(());
        self.state.send_if_modified(|room| match room {
            Some(room) => {
                result = room.apply_move(mover, cell).map(|_| ()).map_err(SyncError::from);
                result.is_ok()
            }
            None => {
                result = Err(SyncError::Room(RoomError::NotFound(self.id.clone())));
                false
            }
        });
        if let Err(err) = &result {
            warn!("Rejected move by {} against the bot: {}", mover, err);
        }
        let room = self
            .state
            .borrow()
            .clone()
            .ok_or_else(|| RoomError::NotFound(self.id.clone()))?;
        if result.is_ok() && room.game_state().status() == Status::InProgress {
            self.schedule_bot_move();
        }
        Ok(room)
    }
}

impl<R: MoveRng + Default + Send + 'static> Drop for BotRoom<R> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobby;
    use common::{Mark, Outcome};
    use hashbrown::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    struct MockRng;

    impl MoveRng for MockRng {
        fn choose<T, I: Iterator<Item = T> + Sized>(&mut self, mut iter: I) -> Option<T> {
            iter.next()
        }
    }

    const DELAY: Duration = Duration::from_millis(500);

    fn cell(idx: usize) -> CellIndex {
        CellIndex::new(idx).unwrap()
    }

    fn human() -> PlayerId {
        PlayerId::new("human")
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_answers_after_delay() {
        let bot = BotRoom::<MockRng>::new(human(), "You".to_string(), DELAY);
        let mut updates = bot.subscribe();

        let room = bot.submit_move(&human(), cell(4)).await.unwrap();
        assert_eq!(room.game_state().current_player(), &PlayerId::bot());
        updates.borrow_and_update();

        // Still the bot's turn, so the human cannot move again
        let room = bot.submit_move(&human(), cell(0)).await.unwrap();
        assert_eq!(room.game_state().board().cell(cell(0)), None);

        tokio::time::sleep(DELAY / 2).await;
        assert!(!updates.has_changed().unwrap());

        updates.changed().await.unwrap();
        let room = updates.borrow_and_update().clone().unwrap();
        let board = room.game_state().board();
        assert_eq!(board.cell(cell(0)), Some(Mark::O));
        assert_eq!(board.cell(cell(4)), Some(Mark::X));
        assert_eq!(room.game_state().current_player(), &human());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bot_does_not_move_after_human_wins() {
        let bot = BotRoom::<MockRng>::new(human(), "You".to_string(), DELAY);
        // The mock bot always takes the lowest empty cell, so it answers 0 then 1
        for human_cell in [3, 4] {
            bot.submit_move(&human(), cell(human_cell)).await.unwrap();
            tokio::time::sleep(DELAY * 2).await;
        }
        let room = bot.submit_move(&human(), cell(5)).await.unwrap();
        assert_eq!(room.game_state().status(), Status::Completed);
        assert_eq!(room.outcome_for(&human()), Some(Outcome::Win));

        tokio::time::sleep(DELAY * 2).await;
        let after = bot.subscribe().borrow().clone().unwrap();
        assert_eq!(after, room);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_bot_room_cancels_pending_move() {
        let bot = BotRoom::<MockRng>::new(human(), "You".to_string(), DELAY);
        let updates = bot.subscribe();
        bot.submit_move(&human(), cell(4)).await.unwrap();
        drop(bot);
        tokio::time::sleep(DELAY * 2).await;
        let room = updates.borrow().clone().unwrap();
        assert_eq!(room.game_state().board().empty_cells().count(), 8);
    }

    #[tokio::test]
    async fn test_shared_room_backend() {
        let rooms: lobby::Rooms = Arc::new(RwLock::new(HashMap::new()));
        let room_id = lobby::create_room(&rooms, PlayerId::new("alice"), "alice".to_string(), true).await;
        let (handle, _) = lobby::join_room(&rooms, &room_id, PlayerId::new("bob"), "bob".to_string())
            .await
            .unwrap();
        let backend: Box<dyn RoomBackend> = Box::new(SharedRoom::new(handle));
        assert_eq!(backend.room_id(), &room_id);

        let room = backend.submit_move(&PlayerId::new("alice"), cell(0)).await.unwrap();
        assert_eq!(room.game_state().board().cell(cell(0)), Some(Mark::X));
        assert_eq!(backend.subscribe().borrow().as_ref(), Some(&room));

        // Rejections are no-ops that return the current room
        let unchanged = backend.submit_move(&PlayerId::new("alice"), cell(1)).await.unwrap();
        assert_eq!(unchanged, room);
    }
}
