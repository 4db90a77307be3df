use axum::{extract::State, response::Redirect};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{error::Error, server::AppState, utils};

/// Cookie carrying the anti-forgery `state` between `/login` and `/callback`.
pub const STATE_COOKIE: &str = "spotify_auth_state";

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), Error> {
    let auth_state = utils::generate_state();
    let url = state.spotify.authorize_url(&auth_state)?;

    let cookie = Cookie::build((STATE_COOKIE, auth_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Redirect::to(&url)))
}
