//! A personal finance tracker.
//!
//! This library provides a JSON REST API for recording expenses against
//! budget categories and payment sources, and for summarising spending by day,
//! week, month and category. Users register with an email address, verify it
//! and authenticate with bearer tokens.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod charts;
mod database_id;
mod db;
pub mod endpoints;
mod email;
mod error;
mod ledger_date;
mod logging;
mod period;
mod profile;
mod routing;
mod source;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, ValidatedPassword};
pub use category::{
    CategoryName, CreateCategoryOutcome, CreateCategoryRequest, CreationDuration, PeriodType,
    create_category,
};
pub use db::initialize as initialize_db;
pub use email::{LogMailer, Mailer, Message};
pub use error::Error;
pub use logging::{logging_middleware, redact_uri};
pub use routing::build_router;
pub use source::{SourceName, create_source};
pub use transaction::{NewTransaction, create_transaction};
pub use user::{NewUser, User, UserID, create_user, parse_email};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
