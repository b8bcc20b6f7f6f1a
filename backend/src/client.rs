use common::PlayerId;
use hashbrown::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use warp::ws::Message;

#[derive(Error, Debug)]
#[error("Error sending message")]
pub struct SendError;

pub type Clients = Arc<RwLock<HashMap<PlayerId, Client>>>;

#[derive(Debug, Clone)]
pub struct Sender(pub mpsc::UnboundedSender<Result<Message, warp::Error>>);

// A registered identity
#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub email: Option<String>,
}

pub trait SendMsg {
    fn send(&self, msg: &str) -> Result<(), SendError>;
}

impl SendMsg for Sender {
    fn send(&self, msg: &str) -> Result<(), SendError> {
        self.0.send(Ok(Message::text(msg))).map_err(|_| SendError)
    }
}

pub async fn display_name(clients: &Clients, id: &PlayerId) -> Option<String> {
    clients.read().await.get(id).map(|c| c.name.clone())
}

// Registered identity with the given email, if any
pub async fn find_by_email(clients: &Clients, email: &str) -> Option<(PlayerId, String)> {
    clients
        .read()
        .await
        .iter()
        .find(|(_, c)| c.email.as_deref() == Some(email))
        .map(|(id, c)| (id.clone(), c.name.clone()))
}
