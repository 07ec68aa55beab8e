use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    activity::repo::{self, ActivityRecord},
    auth::jwt::AuthUser,
    error::ApiResult,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/activity", get(list_activity))
}

/// The authenticated user's own audit trail.
#[instrument(skip(state))]
pub async fn list_activity(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<ActivityRecord>>> {
    let records = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(records))
}
