use std::{error::Error, fs::OpenOptions, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, AuthConfig, PaginationConfig, build_router, graceful_shutdown, logging_middleware,
    seed_test_user,
};

/// Requests that take longer than this are aborted.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The REST API server for expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH", default_value = "expenses.db")]
    db_path: String,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// The secret used to sign bearer tokens.
    #[arg(long, env = "JWT_KEY", hide_env_values = true)]
    jwt_key: Option<String>,

    /// The issuer written to and required of bearer tokens.
    #[arg(long, env = "JWT_ISSUER")]
    jwt_issuer: Option<String>,

    /// The audience written to and required of bearer tokens.
    #[arg(long, env = "JWT_AUDIENCE")]
    jwt_audience: Option<String>,

    /// Create the `test` user when the database has no users.
    #[arg(long)]
    seed_test_user: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging()?;

    let args = Args::parse();
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));

    let auth_config = AuthConfig::resolve(args.jwt_key, args.jwt_issuer, args.jwt_audience);

    tracing::info!("Opening database at {}", args.db_path);
    let connection = Connection::open(&args.db_path)?;
    let state = AppState::new(connection, &auth_config, PaginationConfig::default())?;

    if args.seed_test_user {
        let connection = state
            .db_connection
            .lock()
            .map_err(|error| format!("could not acquire database lock: {error}"))?;

        match seed_test_user(&connection, state.password_cost)? {
            Some(user) => tracing::info!("Created test user \"{}\"", user.username),
            None => tracing::info!("Skipped creating the test user, users already exist"),
        }
    }

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

/// Log INFO and above to stdout and DEBUG and above to `debug.log`.
///
/// `RUST_LOG` overrides both levels.
fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    let stdout_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let debug_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(stdout_filter))
        .with(debug_log.with_filter(debug_filter))
        .try_init()?;

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are converted into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
