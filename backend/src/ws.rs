use crate::client::{Client, SendMsg, Sender};
use crate::config::Config;
use crate::lobby::{self, Rooms};
use crate::sync::{BotRoom, RoomBackend, SharedRoom};
use crate::util::send_message;
use common::messages::{ErrorKind, Request, Response};
use common::{BotRng, PlayerId, Room, RoomError, RoomId};
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

// The room a connection is currently viewing, if any
#[derive(Default)]
struct Session {
    backend: Option<Box<dyn RoomBackend>>,
    forwarder: Option<JoinHandle<()>>,
}

impl Session {
    fn open<S: SendMsg + Send + 'static>(
        &mut self,
        backend: Box<dyn RoomBackend>,
        viewer: PlayerId,
        sender: S,
    ) {
        self.close();
        let updates = backend.subscribe();
        self.forwarder = Some(forward_updates(
            updates,
            backend.room_id().clone(),
            viewer,
            sender,
        ));
        self.backend = Some(backend);
    }

    // Stop delivering updates for the current room
    fn close(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
        self.backend = None;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

pub async fn client_connection(
    ws: WebSocket,
    id: PlayerId,
    client: Client,
    rooms: Rooms,
    config: Arc<Config>,
) {
    let (client_ws_sender, mut client_ws_rcv) = ws.split();
    let (client_sender, client_rcv) = mpsc::unbounded_channel();

    let client_rcv = UnboundedReceiverStream::new(client_rcv);
    tokio::task::spawn(client_rcv.forward(client_ws_sender).map(|result| {
        if let Err(e) = result {
            error!("error sending websocket msg: {}", e);
        }
    }));

    let sender = Sender(client_sender);
    let name = client.name;

    info!("{} connected", id);

    let mut session = Session::default();
    while let Some(result) = client_ws_rcv.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                error!("error receiving ws message for id: {}): {}", id, e);
                break;
            }
        };
        client_msg(&id, &name, msg, &sender, &mut session, &rooms, &config).await;
    }

    // The identity stays registered so a reconnect can resume its rooms
    session.close();
    info!("{} disconnected", id);
}

#[tracing::instrument(skip(sender, session, rooms, config))]
async fn client_msg(
    id: &PlayerId,
    name: &str,
    msg: Message,
    sender: &Sender,
    session: &mut Session,
    rooms: &Rooms,
    config: &Config,
) {
    let message = match msg.to_str() {
        Ok(v) => v.trim(),
        Err(_) => return,
    };

    if message == "ping" {
        return;
    }
    info!("received message from {}: {}", id, message);

    let request: Request = match serde_json::from_str(message) {
        Ok(request) => request,
        Err(err) => {
            warn!("Failed to deserialize client request: {}", err);
            return;
        }
    };

    match request {
        Request::Open { room_id } => open_room(id, name, room_id, sender, session, rooms, config).await,
        Request::Move { cell } => match &session.backend {
            Some(backend) => {
                if let Err(err) = backend.submit_move(id, cell).await {
                    warn!("Move by {} failed: {}", id, err);
                }
            }
            None => warn!("{} sent a move without an open room", id),
        },
        Request::Leave => session.close(),
        Request::Delete => {
            let room_id = session.backend.as_ref().map(|b| b.room_id().clone());
            match room_id {
                Some(room_id) if !room_id.is_bot() => {
                    lobby::delete_room(rooms, &room_id, id.clone()).await
                }
                _ => warn!("{} asked to delete without an open shared room", id),
            }
        }
    }
}

async fn open_room(
    id: &PlayerId,
    name: &str,
    room_id: RoomId,
    sender: &Sender,
    session: &mut Session,
    rooms: &Rooms,
    config: &Config,
) {
    if room_id.is_bot() {
        info!("{} started a game against the bot", id);
        let backend = BotRoom::<BotRng>::new(id.clone(), name.to_string(), config.bot_delay());
        session.open(Box::new(backend), id.clone(), sender.clone());
        return;
    }

    match lobby::join_room(rooms, &room_id, id.clone(), name.to_string()).await {
        Ok((handle, _)) => {
            session.open(Box::new(SharedRoom::new(handle)), id.clone(), sender.clone());
        }
        Err(err) => {
            warn!("{} could not open room {}: {}", id, room_id, err);
            send_message(sender, &Response::error(ErrorKind::from(&err), err.to_string()));
            // The viewer navigates away from a room that does not exist. Any
            // room it already has open stays open, as with a full room.
            if let RoomError::NotFound(room_id) = err {
                send_message(sender, &Response::RoomClosed { room_id });
            }
        }
    }
}

// Push the latest committed state of the room to the viewer until the room
// goes away or the task is aborted. States committed in quick succession are
// coalesced by the watch channel.
fn forward_updates<S: SendMsg + Send + 'static>(
    mut updates: watch::Receiver<Option<Room>>,
    room_id: RoomId,
    viewer: PlayerId,
    sender: S,
) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        loop {
            let room = updates.borrow_and_update().clone();
            match room {
                Some(room) => push_room(&sender, &viewer, room),
                None => break,
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
        info!("Room {} closed for {}", room_id, viewer);
        send_message(&sender, &Response::RoomClosed { room_id });
    })
}

fn push_room(sender: &impl SendMsg, viewer: &PlayerId, room: Room) {
    let outcome = room.outcome_for(viewer);
    send_message(sender, &Response::Room { room });
    if let Some(outcome) = outcome {
        send_message(sender, &Response::GameEnd { outcome });
    }
}
