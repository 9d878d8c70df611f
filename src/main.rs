#![cfg_attr(not(feature = "dump-schema"), deny(unused_crate_dependencies))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod cache;
mod config;
mod error;
mod fetch;
mod menu;
mod parse;
mod schema;
mod scrape_menus;
mod sources;
#[cfg(test)]
mod test_server;

#[cfg(not(feature = "dump-schema"))]
use std::{env, sync::Arc};

#[cfg(not(feature = "dump-schema"))]
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, on, MethodFilter},
    Extension, Router,
};
#[cfg(not(feature = "dump-schema"))]
use juniper_axum::{graphiql, graphql, playground};
#[cfg(not(feature = "dump-schema"))]
use tokio::net::TcpListener;
#[cfg(not(feature = "dump-schema"))]
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

#[cfg(not(feature = "dump-schema"))]
use crate::{cache::Multithreaded, config::Config, schema::Schema};

pub use error::Result;

#[cfg(not(feature = "dump-schema"))]
async fn refresh(State(cache): State<Arc<Multithreaded>>) -> impl IntoResponse {
    cache.refresh().await;
    let c = cache.get().await;
    (
        StatusCode::CREATED,
        format!(
            "Last refresh: {}\nNext refresh: {}\n{}",
            c.time_since_refresh(),
            c.time_until_refresh(),
            c.report(),
        ),
    )
}

#[cfg(not(feature = "dump-schema"))]
async fn menu_json(State(cache): State<Arc<Multithreaded>>) -> impl IntoResponse {
    let c = cache.get().await;
    match serde_json::to_string(c.menu()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        ),
        Err(e) => {
            log::error!("Error serializing menu: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                e.to_string(),
            )
        }
    }
}

/// Scrapes once and prints the week as JSON, without starting the server.
#[cfg(not(feature = "dump-schema"))]
async fn print_json(config: Config) -> Result<()> {
    let client = fetch::make_client(config.fetch_timeout)?;
    let cache = cache::MenuCache::load(&client, &config).await;
    eprint!("{}", cache.report());
    println!("{}", serde_json::to_string_pretty(cache.menu())?);
    Ok(())
}

#[cfg(not(feature = "dump-schema"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> core::result::Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let config = Config::from_env()?;
    if env::args().skip(1).any(|arg| arg == "--json") {
        print_json(config).await?;
        return Ok(());
    }

    let addr = config.addr()?;
    let refresh_interval = config.refresh_interval;
    let cache = Arc::new(Multithreaded::new(config)?);
    log::debug!("{cache:?}");
    let schema = schema::schema(Arc::clone(&cache));
    let compression_layer: CompressionLayer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true);
    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST]) // intentionally excludes request-refresh/PUT
        .allow_origin(Any);

    let app = Router::new()
        .route(
            "/graphql",
            on(
                MethodFilter::GET.or(MethodFilter::POST),
                graphql::<Arc<Schema>>,
            ),
        )
        .route("/graphiql", get(graphiql("/graphql", None)))
        .route("/playground", get(playground("/graphql", None)))
        .route("/menu.json", get(menu_json))
        .route("/request-refresh", on(MethodFilter::PUT, refresh))
        .with_state(Arc::clone(&cache))
        .layer(cors_layer)
        .layer(Extension(Arc::new(schema)))
        .layer(compression_layer);
    Arc::clone(&cache).spawn_refresh_loop(refresh_interval);

    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(feature = "dump-schema")]
fn main() {
    let cache = std::sync::Arc::new(
        cache::Multithreaded::new(config::Config::default()).expect("client should build"),
    );
    std::fs::write("rice_menu.graphql", schema::schema(cache).as_sdl().as_bytes())
        .expect("error writing schema to file");
}
