use crate::client::Clients;
use crate::config::Config;
use crate::lobby::Rooms;
use clap::Parser;
use hashbrown::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warp::{
    http::{header, Method},
    Filter,
};

mod client;
mod config;
mod handler;
mod lobby;
mod room;
mod sync;
mod util;
mod ws;

#[tracing::instrument]
#[tokio::main]
async fn main() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let config = Arc::new(Config::parse());

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "server.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(non_blocking)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let clients: Clients = Arc::new(RwLock::new(HashMap::new()));
    let rooms: Rooms = Arc::new(RwLock::new(HashMap::new()));
    info!("created clients and rooms maps");

    let health_route = warp::path!("health").and_then(handler::health_handler);

    let register = warp::path("register");
    let register_routes = register
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_clients(clients.clone()))
        .and(with_config(config.clone()))
        .and_then(handler::register_handler)
        .or(register
            .and(warp::delete())
            .and(warp::path::param())
            .and(warp::path::end())
            .and(with_clients(clients.clone()))
            .and_then(handler::unregister_handler));

    let list_rooms = warp::path!("rooms")
        .and(warp::get())
        .and(with_rooms(rooms.clone()))
        .and_then(handler::list_rooms_handler);
    let create_room = warp::path!("rooms")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_clients(clients.clone()))
        .and(with_rooms(rooms.clone()))
        .and(with_config(config.clone()))
        .and_then(handler::create_room_handler);
    let join_room = warp::path!("rooms" / String / "join")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_clients(clients.clone()))
        .and(with_rooms(rooms.clone()))
        .and_then(handler::join_room_handler);
    let delete_room = warp::path!("rooms" / String)
        .and(warp::delete())
        .and(warp::body::json())
        .and(with_rooms(rooms.clone()))
        .and_then(handler::delete_room_handler);
    let room_routes = list_rooms.or(create_room).or(join_room).or(delete_room);

    let ws_route = warp::path("ws")
        .and(warp::ws())
        .and(warp::path::param())
        .and(with_clients(clients.clone()))
        .and(with_rooms(rooms.clone()))
        .and(with_config(config.clone()))
        .and_then(handler::ws_handler);

    let routes = health_route
        .or(register_routes)
        .or(room_routes)
        .or(ws_route)
        .with(
            warp::cors()
                .allow_credentials(true)
                .allow_methods(&[
                    Method::OPTIONS,
                    Method::GET,
                    Method::POST,
                    Method::DELETE,
                    Method::PUT,
                ])
                .allow_headers(vec![
                    header::CONTENT_TYPE,
                    header::ACCEPT,
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                ])
                .expose_headers(vec![header::LINK])
                .max_age(300)
                .allow_any_origin(),
        );

    info!("listening on {}", config.addr());
    warp::serve(routes).run(config.addr()).await;
    Ok(())
}

fn with_clients(clients: Clients) -> impl Filter<Extract = (Clients,), Error = Infallible> + Clone {
    warp::any().map(move || clients.clone())
}

fn with_rooms(rooms: Rooms) -> impl Filter<Extract = (Rooms,), Error = Infallible> + Clone {
    warp::any().map(move || rooms.clone())
}

fn with_config(config: Arc<Config>) -> impl Filter<Extract = (Arc<Config>,), Error = Infallible> + Clone {
    warp::any().map(move || config.clone())
}
