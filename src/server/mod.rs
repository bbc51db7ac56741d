//! HTTP surface for the diary service.
//!
//! # Routes
//!
//! | Method | Path      | Operation                         |
//! |--------|-----------|-----------------------------------|
//! | GET    | `/`       | banner                            |
//! | POST   | `/signup` | register a member                 |
//! | POST   | `/login`  | check credentials, issue a token  |
//! | POST   | `/detail` | write an entry (alias `/text`)    |
//! | GET    | `/detail` | read entries for a date           |
//! | DELETE | `/delete` | delete entries for a date         |

pub mod error;
pub mod handlers;
pub mod state;

use crate::constants::{TRACING_REQUEST_SPAN_NAME, TRACING_SERVICE_NAME};
use crate::errors::{AppError, AppResult};
use axum::{
    extract::Request,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};
use uuid::Uuid;

pub use error::ApiError;
pub use state::AppState;

fn cors_layer(origins: &[String]) -> AppResult<CorsLayer> {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::from(Any)
    } else {
        let parsed = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| AppError::Config(format!("Invalid CORS origin: {}", origin)))
            })
            .collect::<AppResult<Vec<_>>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60)))
}

/// Builds the application router.
///
/// # Errors
///
/// Returns `AppError::Config` if a CORS origin is not a valid header value.
pub fn build_router(state: AppState, cors_origins: &[String]) -> AppResult<Router> {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        info_span!(
            TRACING_REQUEST_SPAN_NAME,
            service = TRACING_SERVICE_NAME,
            request_id = %Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Ok(Router::new()
        .route("/", get(handlers::root))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route(
            "/detail",
            post(handlers::write_detail).get(handlers::read_detail),
        )
        .route("/text", post(handlers::write_detail))
        .route("/delete", delete(handlers::delete_detail))
        .layer(trace)
        .layer(cors_layer(cors_origins)?)
        .with_state(state))
}

/// Binds `addr` and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: AppState, addr: SocketAddr, cors_origins: &[String]) -> AppResult<()> {
    let app = build_router(state, cors_origins)?;

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
