use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::{api::STATE_COOKIE, server::AppState, utils, warning};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Spotify when the user declined, e.g. `access_denied`.
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let stored_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());

    let matches = matches!(
        (params.state.as_deref(), stored_state.as_deref()),
        (Some(returned), Some(stored)) if returned == stored
    );
    if !matches {
        warning!("Callback rejected: state missing or not matching the cookie");
        return (jar, error_redirect("state_mismatch"));
    }

    let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));

    if let Some(error) = params.error {
        warning!("Authorization declined: {}", error);
        return (jar, error_redirect(&error));
    }

    let Some(code) = params.code else {
        return (jar, error_redirect("invalid_token"));
    };

    match state.spotify.exchange_code(&code).await {
        Ok(token) => {
            let refresh_token = token.refresh_token.unwrap_or_default();
            let location = utils::fragment_redirect(&[
                ("access_token", &token.access_token),
                ("refresh_token", &refresh_token),
            ]);
            (jar, Redirect::to(&location))
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            (jar, error_redirect("invalid_token"))
        }
    }
}

fn error_redirect(code: &str) -> Redirect {
    Redirect::to(&utils::fragment_redirect(&[("error", code)]))
}
