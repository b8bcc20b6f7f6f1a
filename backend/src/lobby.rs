use crate::room::RoomHandle;
use chrono::Utc;
use common::{PlayerId, Room, RoomError, RoomId, RoomSummary};
use hashbrown::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

pub type Rooms = Arc<RwLock<HashMap<RoomId, RoomHandle>>>;

pub async fn create_room(
    rooms: &Rooms,
    owner: PlayerId,
    owner_name: String,
    is_private: bool,
) -> RoomId {
    let room_id = RoomId::new(Uuid::new_v4().as_simple().to_string());
    let room = Room::new(room_id.clone(), owner.clone(), owner_name, is_private, Utc::now());
    insert_room(rooms, room).await;
    info!(
        "{} created {} room {}",
        owner,
        if is_private { "private" } else { "public" },
        room_id
    );
    room_id
}

pub(crate) async fn insert_room(rooms: &Rooms, room: Room) -> RoomHandle {
    let handle = RoomHandle::spawn(room);
    rooms
        .write()
        .await
        .insert(handle.id().clone(), handle.clone());
    handle
}

pub async fn get_room(rooms: &Rooms, room_id: &RoomId) -> Option<RoomHandle> {
    rooms.read().await.get(room_id).cloned()
}

// Seats the joiner, or returns the room unchanged if they already have a seat
pub async fn join_room(
    rooms: &Rooms,
    room_id: &RoomId,
    joiner: PlayerId,
    name: String,
) -> Result<(RoomHandle, Room), RoomError> {
    let handle = get_room(rooms, room_id)
        .await
        .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
    let room = handle.join(joiner, name).await?;
    Ok((handle, room))
}

// Only the owner can delete a room. Anyone else is ignored.
pub async fn delete_room(rooms: &Rooms, room_id: &RoomId, requester: PlayerId) {
    let handle = match get_room(rooms, room_id).await {
        Some(handle) => handle,
        None => {
            warn!("Delete requested for unknown room {}", room_id);
            return;
        }
    };
    if handle.delete(requester).await {
        rooms.write().await.remove(room_id);
    }
}

// Newest first
pub async fn list_public_waiting_rooms(rooms: &Rooms) -> Vec<RoomSummary> {
    let mut summaries: Vec<RoomSummary> = rooms
        .read()
        .await
        .values()
        .filter_map(RoomHandle::snapshot)
        .filter(Room::is_public_and_waiting)
        .map(|room| room.summary())
        .collect();
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    summaries
}
