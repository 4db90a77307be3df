use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    aggregation::Pipeline,
    error::Error,
    management::TokenManager,
    server::AppState,
    types::{AggregateResponse, TimeRange},
};

#[derive(Debug, Deserialize)]
pub struct DataParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// `short_term`, `medium_term` or `long_term`.
    pub time_range: Option<String>,
}

pub async fn data(
    State(state): State<AppState>,
    Query(params): Query<DataParams>,
) -> Result<Json<AggregateResponse>, Error> {
    let access_token = params
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(Error::MissingParameter("access_token"))?;
    let refresh_token = params.refresh_token.filter(|t| !t.is_empty());
    let time_range = params
        .time_range
        .filter(|r| !r.is_empty())
        .map(|r| r.parse::<TimeRange>())
        .transpose()?;

    let tokens = TokenManager::new(access_token, refresh_token);
    let response = Pipeline::new(&state.spotify, tokens)
        .with_time_range(time_range)
        .run()
        .await?;

    Ok(Json(response))
}
