use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "tictactoe-web", about = "Tic-tac-toe room server")]
pub struct Config {
    #[arg(long, env = "TICTACTOE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    #[arg(long, env = "TICTACTOE_PORT", default_value_t = 8000)]
    pub port: u16,

    // Base of the join links handed out for sharing a room
    #[arg(long, env = "TICTACTOE_PUBLIC_URL", default_value = "http://127.0.0.1:8000")]
    pub public_url: String,

    #[arg(long, env = "TICTACTOE_WS_URL", default_value = "ws://127.0.0.1:8000")]
    pub ws_url: String,

    #[arg(long, env = "TICTACTOE_LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    #[arg(long, env = "TICTACTOE_BOT_DELAY_MS", default_value_t = 500)]
    pub bot_delay_ms: u64,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn bot_delay(&self) -> Duration {
        Duration::from_millis(self.bot_delay_ms)
    }

    pub fn share_url(&self, room_id: &str) -> String {
        format!("{}/game/{}", self.public_url.trim_end_matches('/'), room_id)
    }

    pub fn socket_url(&self, player_id: &str) -> String {
        format!("{}/ws/{}", self.ws_url.trim_end_matches('/'), player_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::parse_from(["tictactoe-web"])
    }
}
