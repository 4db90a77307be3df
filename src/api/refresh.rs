use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{error::Error, server::AppState, warning};

#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub refresh_token: Option<String>,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<Value>, Error> {
    let refresh_token = params
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or(Error::MissingParameter("refresh_token"))?;

    let token = state
        .spotify
        .refresh_access_token(&refresh_token)
        .await
        .inspect_err(|e| warning!("Token refresh failed: {}", e))?;

    Ok(Json(json!({ "access_token": token.access_token })))
}
