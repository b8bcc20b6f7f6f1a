use crate::tictactoe::board::Mark;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BOT_PLAYER_ID: &str = "bot";
pub const BOT_NAME: &str = "Bot";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn bot() -> Self {
        PlayerId(BOT_PLAYER_ID.to_string())
    }

    pub fn is_bot(&self) -> bool {
        self.0 == BOT_PLAYER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        PlayerId::new(id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    mark: Mark,
    ready: bool,
}

impl Player {
    // There is no ready/unready negotiation, so every seated player is ready
    pub fn new(id: PlayerId, name: String, mark: Mark) -> Self {
        Player {
            id,
            name,
            mark,
            ready: true,
        }
    }

    pub fn bot(mark: Mark) -> Self {
        Player::new(PlayerId::bot(), BOT_NAME.to_string(), mark)
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mark(&self) -> Mark {
        self.mark
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

// Pick a display name: the explicit name if there is one, then the local part
// of the email address, then a random "Player N".
pub fn display_name<R: Rng>(name: Option<&str>, email: Option<&str>, rng: &mut R) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    if let Some(name) = name {
        return name.to_string();
    }
    let local_part = email
        .and_then(|e| e.split('@').next())
        .map(str::trim)
        .filter(|l| !l.is_empty());
    match local_part {
        Some(local_part) => local_part.to_string(),
        None => format!("Player {}", rng.gen_range(0..1000)),
    }
}
