use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use shared::api::{
    error::ServerError, payloads::EvaluationRunResponse, response_errors::AuthError, CRON_SECRET_HEADER,
};
use tracing::{info, instrument, warn};

use crate::{cli::Cli, db::DatabaseConnection, engine};

/// Runs every due weekly evaluation. Callers must present the configured cron secret; with no secret
/// configured the trigger is closed.
#[instrument(skip_all)]
pub async fn weekly_evaluation(
    State(args): State<Arc<Cli>>,
    headers: HeaderMap,
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<EvaluationRunResponse>, ServerError> {
    let presented = headers.get(CRON_SECRET_HEADER).and_then(|v| v.to_str().ok());
    match (args.cron_secret.as_deref(), presented) {
        (Some(expected), Some(presented)) if expected == presented => {}
        _ => {
            warn!("Rejected cron trigger");
            return Err(AuthError::InvalidCronSecret.into());
        }
    }

    let summary = conn
        .interact(move |conn| engine::run_weekly_evaluation(conn, Utc::now()))
        .await??;
    info!(
        evaluated = summary.evaluated_teams,
        disbanded = summary.disbanded_teams,
        failed = summary.failed_teams,
        "Weekly evaluation finished"
    );
    Ok(Json(summary))
}
