pub mod adapters;
mod app;
pub mod broadcast;
pub mod config;
pub mod ports;
pub mod scheduler;
mod state;
pub mod types;

pub use app::app;

use adapters::{FcmGateway, SupabaseDirectory, TokioTimeProvider};
use broadcast::Broadcaster;
use scheduler::CronScheduler;
use types::Slot;

use std::net::SocketAddr;

type BroadcastScheduler =
    CronScheduler<TokioTimeProvider, Broadcaster<SupabaseDirectory, FcmGateway>>;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) {
    let mut scheduler = start_broadcast_scheduler(&config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Teardown has begun; no further trigger may fire. In-flight
    // broadcasts finish on their own tasks.
    if let Some(scheduler) = scheduler.as_mut() {
        scheduler.stop();
    }
}

/// Builds the dispatch client and directory once, wires them into the
/// scheduler, and starts it. A bad slot table is a programming error and
/// aborts startup; missing collaborator configuration only disables the
/// scheduler.
fn start_broadcast_scheduler(config: &config::AppConfig) -> Option<BroadcastScheduler> {
    let Some(fcm) = config.fcm.as_ref() else {
        eprintln!("broadcast scheduler disabled: FCM server key missing");
        return None;
    };
    let Some(supabase) = config.supabase.as_ref() else {
        eprintln!("broadcast scheduler disabled: recipient store not configured");
        return None;
    };
    let gateway = match FcmGateway::new(fcm) {
        Ok(gateway) => gateway,
        Err(err) => {
            eprintln!("broadcast scheduler disabled: failed to build FCM client ({err})");
            return None;
        }
    };
    let directory = match SupabaseDirectory::new(supabase) {
        Ok(directory) => directory,
        Err(err) => {
            eprintln!("broadcast scheduler disabled: failed to build store client ({err})");
            return None;
        }
    };

    let mut scheduler =
        CronScheduler::new(TokioTimeProvider, Broadcaster::new(directory, gateway));
    scheduler
        .configure(Slot::daily_table())
        .unwrap_or_else(|err| panic!("invalid broadcast schedule: {err}"));
    scheduler.start();
    println!(
        "broadcast scheduler running with {} slots",
        scheduler.slots().len()
    );
    Some(scheduler)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
