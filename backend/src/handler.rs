use crate::{
    client::{self, Client, Clients},
    config::Config,
    lobby::{self, Rooms},
    ws,
};
use common::messages::{
    CreateRoomRequest, CreateRoomResponse, DeleteRoomRequest, ErrorKind, ErrorResponse,
    JoinRoomRequest, RegisterRequest, RegisterResponse,
};
use common::{display_name, PlayerId, RoomId};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use warp::{http::StatusCode, reply::json, Rejection, Reply};

type Result<T> = std::result::Result<T, Rejection>;

// Issues a new identity, or hands back the existing one for a known email
pub async fn register_handler(
    body: RegisterRequest,
    clients: Clients,
    config: Arc<Config>,
) -> Result<impl Reply> {
    let email = body.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    if let Some(email) = email {
        if let Some((player_id, name)) = client::find_by_email(&clients, email).await {
            info!("{} signed in again", player_id);
            return Ok(json(&RegisterResponse {
                url: config.socket_url(player_id.as_str()),
                player_id,
                name,
            }));
        }
    }

    let player_id = PlayerId::new(Uuid::new_v4().as_simple().to_string());
    let name = display_name(body.name.as_deref(), email, &mut rand::thread_rng());
    register_client(player_id.clone(), name.clone(), email.map(String::from), clients).await;
    info!("registered {} as {}", player_id, name);
    Ok(json(&RegisterResponse {
        url: config.socket_url(player_id.as_str()),
        player_id,
        name,
    }))
}

async fn register_client(id: PlayerId, name: String, email: Option<String>, clients: Clients) {
    clients.write().await.insert(
        id,
        Client { name, email },
    );
}

pub async fn unregister_handler(id: String, clients: Clients) -> Result<impl Reply> {
    clients.write().await.remove(&PlayerId::new(id));
    Ok(StatusCode::OK)
}

pub async fn ws_handler(
    ws: warp::ws::Ws,
    id: String,
    clients: Clients,
    rooms: Rooms,
    config: Arc<Config>,
) -> Result<impl Reply> {
    let id = PlayerId::new(id);
    let client = clients.read().await.get(&id).cloned();
    match client {
        Some(c) => Ok(ws.on_upgrade(move |socket| {
            ws::client_connection(socket, id, c, rooms, config)
        })),
        None => Err(warp::reject::not_found()),
    }
}

pub async fn health_handler() -> Result<impl Reply> {
    Ok(StatusCode::OK)
}

pub async fn list_rooms_handler(rooms: Rooms) -> Result<impl Reply> {
    Ok(json(&lobby::list_public_waiting_rooms(&rooms).await))
}

pub async fn create_room_handler(
    body: CreateRoomRequest,
    clients: Clients,
    rooms: Rooms,
    config: Arc<Config>,
) -> Result<impl Reply> {
    let name = match client::display_name(&clients, &body.owner).await {
        Some(name) => name,
        None => return Ok(unauthorized(&body.owner)),
    };
    let room_id = lobby::create_room(&rooms, body.owner, name, body.is_private).await;
    let response = CreateRoomResponse {
        share_url: config.share_url(room_id.as_str()),
        room_id,
    };
    Ok(warp::reply::with_status(json(&response), StatusCode::CREATED))
}

pub async fn join_room_handler(
    room_id: String,
    body: JoinRoomRequest,
    clients: Clients,
    rooms: Rooms,
) -> Result<impl Reply> {
    let name = match client::display_name(&clients, &body.player).await {
        Some(name) => name,
        None => return Ok(unauthorized(&body.player)),
    };
    let room_id = RoomId::new(room_id);
    match lobby::join_room(&rooms, &room_id, body.player, name).await {
        Ok((_, room)) => Ok(warp::reply::with_status(json(&room), StatusCode::OK)),
        Err(err) => {
            warn!("join of room {} failed: {}", room_id, err);
            let status = match ErrorKind::from(&err) {
                ErrorKind::RoomFull => StatusCode::CONFLICT,
                _ => StatusCode::NOT_FOUND,
            };
            let body = ErrorResponse {
                kind: ErrorKind::from(&err),
                message: err.to_string(),
            };
            Ok(warp::reply::with_status(json(&body), status))
        }
    }
}

// Succeeds whether or not the requester owns the room
pub async fn delete_room_handler(
    room_id: String,
    body: DeleteRoomRequest,
    rooms: Rooms,
) -> Result<impl Reply> {
    lobby::delete_room(&rooms, &RoomId::new(room_id), body.requester).await;
    Ok(StatusCode::NO_CONTENT)
}

fn unauthorized(id: &PlayerId) -> warp::reply::WithStatus<warp::reply::Json> {
    warn!("unknown identity {}", id);
    let body = ErrorResponse {
        kind: ErrorKind::AuthenticationFailed,
        message: format!("Unknown player {}", id),
    };
    warp::reply::with_status(json(&body), StatusCode::UNAUTHORIZED)
}
