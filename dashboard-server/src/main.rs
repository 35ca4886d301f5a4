//--------------------------------------------------------------------------
// (C) Copyright Travis Sharp <travis@kuipersys.com>.  All rights reserved.
//--------------------------------------------------------------------------

use std::sync::Arc;
use std::thread;
use actix_web::{web, App, HttpServer};
use actix_web::middleware::{DefaultHeaders, Logger};
use actors::models::ServerMessage;
use clap::Parser;
use commands::observer::CreatedRunObserver;
use config::ServerArgs;
use dashmap::DashMap;
use runboard_runtime::RunboardRuntimeBuilder;
use tokio::sync::mpsc::UnboundedSender;

mod actors;
mod commands;
mod config;
mod handlers;
mod logging;
mod middleware;
mod routing;


type ClientId = String;
type SubscriberMap = Arc<DashMap<ClientId, UnboundedSender<ServerMessage>>>;

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((idx, _)) => &s[..idx],
    }
}

fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-XSS-Protection", "1; mode=block"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
        .add(("X-Version", env!("CARGO_PKG_VERSION")))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    logging::init(&args.log);
    tracing::info!(">> Starting dashboard-server service...");

    let count = match args.workers {
        Some(workers) => workers.max(1),
        None => thread::available_parallelism()?.get(),
    };
    tracing::info!(">> Number of Threads: {}", count);

    let config = args.runboard_config();
    let client = Arc::new(config.api_client()?);
    let subscribers: SubscriberMap = Arc::new(DashMap::new());

    let mut builder = RunboardRuntimeBuilder::new(client, config);
    builder.register_handler("create", Arc::new(CreatedRunObserver::new(subscribers.clone())))?;
    let runtime = Arc::new(builder.build());

    let ip = args.bind.clone();
    let port = args.port;

    let server = HttpServer::new(move || App::new()
        .app_data(web::Data::new(runtime.clone()))
        .app_data(web::Data::new(subscribers.clone()))
        .wrap(security_headers())
        .wrap(Logger::default())
        .wrap(middleware::catch_panic::CatchPanic)
        .configure(handlers::configure)
    )
    .workers(count)
    .bind((ip.as_str(), port))?;

    tracing::warn!(">> Number of Workers: {}", count);
    tracing::info!(">> {} v{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), truncate(env!("VERGEN_GIT_SHA"), 8));
    tracing::info!(">> Build Time: {}", env!("VERGEN_BUILD_TIMESTAMP"));
    tracing::info!(">> Upstream API: {}", args.api_server);
    tracing::info!(">> Starting Server On {}:{}", ip, port);
    tracing::info!(">> Press Ctrl-C to stop the server.");

    server.run().await?;

    Ok(())
}
