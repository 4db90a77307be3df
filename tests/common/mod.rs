#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Instant,
};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use tastegraph::config::{Config, Credentials};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const INITIAL_TOKEN: &str = "access-initial";
pub const REFRESHED_TOKEN: &str = "access-refreshed";
pub const REFRESH_TOKEN: &str = "refresh-1";

pub const TOP_ARTISTS_PATH: &str = "/v1/me/top/artists";
pub const RECENTLY_PLAYED_PATH: &str = "/v1/me/player/recently-played";
pub const ARTISTS_PATH: &str = "/v1/artists";
pub const AUDIO_FEATURES_PATH: &str = "/v1/audio-features";

/// Canned upstream behavior for one test.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Top artists per `offset`.
    pub top_pages: HashMap<u32, Vec<Value>>,
    /// Recently played pages per `before` cursor; `""` is the first page.
    pub recent_pages: HashMap<String, Value>,
    /// Genres returned by the several-artists lookup, per artist id.
    pub genres: HashMap<String, Vec<String>>,
    pub valences: HashMap<String, f64>,
    /// Related artists per artist id.
    pub related: HashMap<String, Vec<Value>>,
    /// Paths answering 429 with the given `Retry-After` on their first hit.
    pub rate_limit_once: HashMap<String, u64>,
    /// Artist ids whose related-artists lookup rejects the initial token.
    pub reject_initial_token_for: HashSet<String>,
    /// Paths that always answer with the given status.
    pub fail_with: HashMap<String, u16>,
    /// Status of the token endpoint; 200 when `None`.
    pub token_status: Option<u16>,
}

impl Script {
    pub fn top_page(mut self, offset: u32, artists: Vec<Value>) -> Self {
        self.top_pages.insert(offset, artists);
        self
    }

    pub fn recent_page(mut self, before: &str, page: Value) -> Self {
        self.recent_pages.insert(before.to_string(), page);
        self
    }

    pub fn genres(mut self, artist_id: &str, genres: &[&str]) -> Self {
        self.genres.insert(
            artist_id.to_string(),
            genres.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    pub fn valence(mut self, track_id: &str, valence: f64) -> Self {
        self.valences.insert(track_id.to_string(), valence);
        self
    }

    pub fn related(mut self, artist_id: &str, artists: Vec<Value>) -> Self {
        self.related.insert(artist_id.to_string(), artists);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub query: String,
    pub bearer: Option<String>,
    pub status: u16,
    pub at: Instant,
}

#[derive(Debug, Clone)]
pub struct TokenCall {
    pub grant_type: String,
    pub authorization: Option<String>,
    pub form: HashMap<String, String>,
}

#[derive(Default)]
struct MockState {
    script: Script,
    calls: Vec<Call>,
    token_calls: Vec<TokenCall>,
}

type Shared = Arc<Mutex<MockState>>;

/// In-process stand-in for the Spotify Web API and accounts service.
pub struct MockSpotify {
    pub addr: SocketAddr,
    state: Shared,
}

impl MockSpotify {
    pub async fn start(script: Script) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            script,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/token", post(token))
            .fallback(resource)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::with_credentials(Credentials::new(CLIENT_ID, CLIENT_SECRET));
        config.api_url = format!("http://{}/v1", self.addr);
        config.auth_url = format!("http://{}/authorize", self.addr);
        config.token_url = format!("http://{}/api/token", self.addr);
        config.static_dir = std::env::temp_dir().join("tastegraph-test-static");
        config
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }

    pub fn token_calls(&self) -> Vec<TokenCall> {
        self.state.lock().unwrap().token_calls.clone()
    }
}

pub fn artist(id: &str, name: &str, genres: &[&str]) -> Value {
    json!({ "id": id, "name": name, "genres": genres })
}

pub fn play(track_id: &str, track_name: &str, artist_id: &str, artist_name: &str, played_at: &str) -> Value {
    json!({
        "played_at": played_at,
        "track": {
            "id": track_id,
            "name": track_name,
            "artists": [{ "id": artist_id, "name": artist_name }]
        }
    })
}

/// A play of a local file: neither the track nor its artist has an id.
pub fn local_play(track_name: &str, artist_name: &str, played_at: &str) -> Value {
    json!({
        "played_at": played_at,
        "track": {
            "id": null,
            "name": track_name,
            "artists": [{ "id": null, "name": artist_name }]
        }
    })
}

pub fn recent_page(items: Vec<Value>, before: Option<&str>) -> Value {
    let cursors = before.map(|b| json!({ "after": "0", "before": b }));
    json!({ "items": items, "next": null, "cursors": cursors })
}

async fn resource(
    State(state): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let path = uri.path().to_string();
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    let mut guard = state.lock().unwrap();
    let (status, response) = answer(&mut guard.script, &path, &query, bearer.as_deref());
    guard.calls.push(Call {
        path,
        query: uri.query().unwrap_or("").to_string(),
        bearer,
        status,
        at: Instant::now(),
    });
    response
}

fn answer(
    script: &mut Script,
    path: &str,
    query: &HashMap<String, String>,
    bearer: Option<&str>,
) -> (u16, Response) {
    if let Some(status) = script.fail_with.get(path) {
        let status = StatusCode::from_u16(*status).unwrap();
        return (status.as_u16(), status.into_response());
    }

    if let Some(secs) = script.rate_limit_once.remove(path) {
        let response = (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, secs.to_string())],
            "",
        )
            .into_response();
        return (429, response);
    }

    if !matches!(bearer, Some(INITIAL_TOKEN) | Some(REFRESHED_TOKEN)) {
        return (401, StatusCode::UNAUTHORIZED.into_response());
    }

    let body = match path {
        TOP_ARTISTS_PATH => {
            let offset = query
                .get("offset")
                .and_then(|o| o.parse::<u32>().ok())
                .unwrap_or(0);
            let items = script.top_pages.get(&offset).cloned().unwrap_or_default();
            let total = items.len();
            json!({ "items": items, "next": null, "total": total })
        }
        RECENTLY_PLAYED_PATH => {
            let before = query.get("before").cloned().unwrap_or_default();
            script
                .recent_pages
                .get(&before)
                .cloned()
                .unwrap_or_else(|| recent_page(Vec::new(), None))
        }
        ARTISTS_PATH => {
            let artists: Vec<Value> = ids(query)
                .map(|id| match script.genres.get(id) {
                    Some(genres) => json!({ "id": id, "name": format!("{} (full)", id), "genres": genres }),
                    None => Value::Null,
                })
                .collect();
            json!({ "artists": artists })
        }
        AUDIO_FEATURES_PATH => {
            let features: Vec<Value> = ids(query)
                .map(|id| match script.valences.get(id) {
                    Some(valence) => json!({ "id": id, "valence": valence }),
                    None => Value::Null,
                })
                .collect();
            json!({ "audio_features": features })
        }
        _ => {
            let Some(artist_id) = path
                .strip_prefix("/v1/artists/")
                .and_then(|rest| rest.strip_suffix("/related-artists"))
            else {
                return (404, StatusCode::NOT_FOUND.into_response());
            };

            if bearer == Some(INITIAL_TOKEN) && script.reject_initial_token_for.contains(artist_id) {
                return (401, StatusCode::UNAUTHORIZED.into_response());
            }

            let artists = script.related.get(artist_id).cloned().unwrap_or_default();
            json!({ "artists": artists })
        }
    };

    (200, Json(body).into_response())
}

fn ids(query: &HashMap<String, String>) -> impl Iterator<Item = &str> {
    query
        .get("ids")
        .map(String::as_str)
        .unwrap_or("")
        .split(',')
        .filter(|id| !id.is_empty())
}

async fn token(
    State(state): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut guard = state.lock().unwrap();
    let grant_type = form.get("grant_type").cloned().unwrap_or_default();
    guard.token_calls.push(TokenCall {
        grant_type: grant_type.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        form: form.clone(),
    });

    if let Some(status) = guard.script.token_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, Json(json!({ "error": "invalid_grant" }))).into_response();
    }

    let body = match grant_type.as_str() {
        "authorization_code" => json!({
            "access_token": INITIAL_TOKEN,
            "refresh_token": REFRESH_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "user-top-read user-read-recently-played"
        }),
        _ => json!({
            "access_token": REFRESHED_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600
        }),
    };
    Json(body).into_response()
}

/// What the raw server does to one accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Read the request, then close without answering.
    Drop,
    /// Answer 200 but close after half of the announced body.
    Truncate,
}

/// Bare TCP stand-in for the Web API that misbehaves on chosen connections.
///
/// Every response carries `Connection: close`, so each request arrives on a
/// fresh connection and `faults[n]` applies to the n-th request; `None`
/// and requests past the end of `faults` are answered normally. Top artists
/// always answer with artist `a1`; every other endpoint answers empty.
pub struct FlakySpotify {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FlakySpotify {
    pub async fn start(faults: Vec<Option<Fault>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            let mut faults = faults.into_iter();
            while let Ok((socket, _)) = listener.accept().await {
                serve_raw(socket, faults.next().flatten(), &log).await;
            }
        });

        Self { addr, requests }
    }

    pub fn config(&self) -> Config {
        let mut config = Config::with_credentials(Credentials::new(CLIENT_ID, CLIENT_SECRET));
        config.api_url = format!("http://{}/v1", self.addr);
        config.token_url = format!("http://{}/api/token", self.addr);
        config
    }

    /// Request lines (`GET /v1/... HTTP/1.1`) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_raw(mut socket: TcpStream, fault: Option<Fault>, log: &Mutex<Vec<String>>) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head).to_string();
    let request_line = head.lines().next().unwrap_or("").to_string();
    let path = request_line
        .split(' ')
        .nth(1)
        .and_then(|target| target.split('?').next())
        .unwrap_or("")
        .to_string();
    log.lock().unwrap().push(request_line);

    let body = match path.as_str() {
        TOP_ARTISTS_PATH => json!({ "items": [artist("a1", "Artist 1", &["rock"])], "next": null, "total": 1 }),
        RECENTLY_PLAYED_PATH => recent_page(Vec::new(), None),
        _ => json!({ "artists": [] }),
    }
    .to_string();

    let header = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );

    match fault {
        Some(Fault::Drop) => {}
        Some(Fault::Truncate) => {
            let _ = socket.write_all(header.as_bytes()).await;
            let _ = socket.write_all(&body.as_bytes()[..body.len() / 2]).await;
        }
        None => {
            let _ = socket.write_all(header.as_bytes()).await;
            let _ = socket.write_all(body.as_bytes()).await;
        }
    }
    let _ = socket.shutdown().await;
}
