use mimalloc::MiMalloc;
use pulsedash::providers::{HabitReader, HabitScorer, Providers, TaskReader};
use pulsedash::server::{DashState, ShutdownReason, dash_router, shutdown_signal};
use pulsedash::sync::{HabitSyncEngine, TaskSyncEngine};
use pulsedash::widget::WidgetService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &pulsedash::config::CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let inbound_key = if cfg.basic.inbound_key.is_some() {
        "<set>"
    } else {
        "<none>"
    };
    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        inbound_key,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        "Basic config loaded"
    );

    let db = pulsedash::db::spawn(&cfg.basic.database_url).await?;

    let providers = match Providers::spawn(cfg).await {
        Ok(providers) => providers,
        Err(e) => {
            error!("provider bootstrap failed: {e}");
            std::process::exit(1);
        }
    };

    let rules: Arc<dyn pulsedash::db::RuleStore> = Arc::new(db.clone());
    let scorer: Arc<dyn HabitScorer> = providers.habitica.clone();
    let habit_reader: Arc<dyn HabitReader> = providers.habitica.clone();
    let task_reader: Arc<dyn TaskReader> = providers.todoist.clone();
    let todoist_cfg = cfg.todoist();

    let fatal = providers
        .fitbit
        .as_ref()
        .map(|client| client.manager().fatal_signal());

    let state = DashState {
        habit_sync: HabitSyncEngine::new(rules.clone(), scorer.clone()),
        task_sync: TaskSyncEngine::new(rules, scorer),
        widget: WidgetService::new(
            habit_reader,
            task_reader,
            &todoist_cfg.task_query,
            todoist_cfg.task_limit,
        ),
        fitbit: providers.fitbit,
        db,
        inbound_key: cfg.basic.inbound_key.as_deref().map(Arc::from),
    };
    let app = dash_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    let (reason_tx, reason_rx) = oneshot::channel();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = reason_tx.send(shutdown_signal(fatal).await);
        })
        .await?;
    info!("Server has shut down gracefully.");

    let code = reason_rx.await.map_or(0, ShutdownReason::exit_code);
    if code != 0 {
        error!(code, "exiting with failure status");
        std::process::exit(code);
    }
    Ok(())
}
