//! In-process stand-in for the artwork recommendation API

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Artwork id whose detail is answered with `404 {"error": ...}`
pub const MISSING_ARTWORK_ID: u64 = 404;

/// Artwork id whose detail is answered with `200` and a body of the wrong shape
pub const MALFORMED_ARTWORK_ID: u64 = 999;

/// Username the stub refuses to register, with field errors
pub const TAKEN_USERNAME: &str = "taken";

/// Password the stub refuses at login
pub const WRONG_PASSWORD: &str = "wrong";

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct StubState {
    catalogue_size: u64,
    likes: Mutex<HashMap<String, BTreeSet<u64>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    stats_broken: AtomicBool,
}

/// Handle to a running stub; the server lives until the test runtime shuts down
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubServer {
    /// Starts a stub serving `catalogue_size` artworks on an ephemeral port
    pub async fn start(catalogue_size: u64) -> Self {
        let state = Arc::new(StubState {
            catalogue_size,
            ..StubState::default()
        });

        let api = Router::new()
            .route("/users/register/", post(register))
            .route("/users/login/", post(login))
            .route("/users/profile/me/", get(current_user))
            .route("/users/profile/like_artwork/", post(like_artwork))
            .route("/users/profile/unlike_artwork/", delete(unlike_artwork))
            .route("/users/profile/liked_artworks/", get(liked_artworks))
            .route("/artworks/", get(list_artworks))
            .route("/artworks/{id}/", get(artwork_detail))
            .route("/artworks/{id}/image/", get(artwork_image))
            .route("/recommendations/", post(recommendations))
            .route("/model-stats/", get(model_stats));

        let router = Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Stub server has no address");

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Stub server failed");
        });

        Self { addr, state }
    }

    /// Base URL including the `/api` prefix
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Last request received for `path` (relative to `/api`)
    pub fn last_request_to(&self, path: &str) -> Option<RecordedRequest> {
        let full_path = format!("/api{path}");
        self.requests()
            .into_iter()
            .rev()
            .find(|request| request.path == full_path)
    }

    /// Artworks liked under `token`
    pub fn likes_of(&self, token: &str) -> BTreeSet<u64> {
        self.state
            .likes
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes `/model-stats/` answer with a non-JSON server error
    pub fn break_model_stats(&self) {
        self.state.stats_broken.store(true, Ordering::SeqCst);
    }
}

async fn record(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: header_text(request.headers(), &header::AUTHORIZATION),
        content_type: header_text(request.headers(), &header::CONTENT_TYPE),
    };
    state.requests.lock().unwrap().push(recorded);

    next.run(request).await
}

fn header_text(headers: &HeaderMap, name: &header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn token_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Token ")
        .map(str::to_owned)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Authentication credentials were not provided." })),
    )
        .into_response()
}

fn user_json(username: &str) -> Value {
    json!({
        "id": 1,
        "username": username,
        "email": format!("{username}@example.com"),
        "first_name": "",
        "last_name": "",
        "bio": "",
        "location": "",
        "birth_date": null,
        "avatar": null,
        "liked_count": 0,
        "liked_artworks": [],
        "date_joined": "2025-01-01T00:00:00Z"
    })
}

fn artwork_json(id: u64) -> Value {
    json!({
        "id": id,
        "title": format!("Artwork {id}"),
        "artist": id % 5,
        "artist_name": format!("Artist_{}", id % 5),
        "style": id % 3,
        "style_name": format!("Style_{}", id % 3),
        "genre": id % 2,
        "genre_name": format!("Genre_{}", id % 2),
        "image_url": null,
        "placeholder_url": format!("https://via.placeholder.com/400x300/4A5568/FFFFFF?text=Artwork+{id}")
    })
}

async fn register(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();

    if body["password"] != body["password_confirm"] {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "non_field_errors": ["Passwords don't match"] })),
        )
            .into_response();
    }
    if username == TAKEN_USERNAME {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "username": ["A user with that username already exists."],
                "email": ["Enter a valid email address."]
            })),
        )
            .into_response();
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "user": user_json(username),
            "token": format!("token-{username}"),
            "message": "User created successfully"
        })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();

    if body["password"] == WRONG_PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "non_field_errors": ["Invalid credentials"] })),
        )
            .into_response();
    }

    Json(json!({
        "user": user_json(username),
        "token": format!("token-{username}"),
        "message": "Login successful"
    }))
    .into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
    match token_of(&headers) {
        Some(token) => {
            let username = token.trim_start_matches("token-").to_string();
            Json(user_json(&username)).into_response()
        }
        None => unauthorized(),
    }
}

#[derive(Deserialize)]
struct LikeBody {
    artwork_id: u64,
}

async fn like_artwork(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<LikeBody>,
) -> Response {
    let Some(token) = token_of(&headers) else {
        return unauthorized();
    };

    let created = state
        .likes
        .lock()
        .unwrap()
        .entry(token)
        .or_default()
        .insert(body.artwork_id);

    let like = json!({ "id": body.artwork_id, "artwork_id": body.artwork_id, "liked_at": "2025-01-01T00:00:00Z" });
    if created {
        (
            StatusCode::CREATED,
            Json(json!({ "message": "Artwork liked", "like": like })),
        )
            .into_response()
    } else {
        Json(json!({ "message": "Artwork already liked", "like": like })).into_response()
    }
}

async fn unlike_artwork(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<LikeBody>,
) -> Response {
    let Some(token) = token_of(&headers) else {
        return unauthorized();
    };

    let removed = state
        .likes
        .lock()
        .unwrap()
        .entry(token)
        .or_default()
        .remove(&body.artwork_id);

    if removed {
        Json(json!({ "message": "Artwork unliked" })).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Like not found" })),
        )
            .into_response()
    }
}

async fn liked_artworks(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let Some(token) = token_of(&headers) else {
        return unauthorized();
    };

    let liked = state
        .likes
        .lock()
        .unwrap()
        .get(&token)
        .cloned()
        .unwrap_or_default();
    let likes: Vec<Value> = liked
        .iter()
        .map(|id| json!({ "id": id, "artwork_id": id, "liked_at": "2025-01-01T00:00:00Z" }))
        .collect();

    Json(json!({ "count": likes.len(), "likes": likes })).into_response()
}

#[derive(Deserialize)]
struct ListQuery {
    page: u64,
    page_size: u64,
    include_images: bool,
}

async fn list_artworks(
    State(state): State<Arc<StubState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let start = query.page.saturating_sub(1) * query.page_size;
    let end = (start + query.page_size).min(state.catalogue_size);
    let artworks: Vec<Value> = (start..end)
        .map(|id| {
            let mut artwork = artwork_json(id);
            if query.include_images {
                artwork["image_url"] = json!(format!("https://images.test/{id}.jpg"));
            }
            artwork
        })
        .collect();

    Json(json!({
        "artworks": artworks,
        "page": query.page,
        "page_size": query.page_size,
        "total": state.catalogue_size,
        "has_next": end < state.catalogue_size
    }))
    .into_response()
}

async fn artwork_detail(State(state): State<Arc<StubState>>, Path(id): Path<u64>) -> Response {
    match id {
        MALFORMED_ARTWORK_ID => Json(json!({ "artworks": "not an artwork" })).into_response(),
        id if id >= state.catalogue_size => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Artwork not found" })),
        )
            .into_response(),
        id => Json(json!({ "artwork": artwork_json(id) })).into_response(),
    }
}

async fn artwork_image(Path(id): Path<u64>) -> Response {
    Json(json!({ "artwork_id": id, "image_url": format!("https://images.test/{id}.jpg") }))
        .into_response()
}

#[derive(Deserialize)]
struct RecommendationBody {
    artwork_id: u64,
    user_likes: Vec<u64>,
    n_recommendations: u64,
}

async fn recommendations(
    State(state): State<Arc<StubState>>,
    Json(body): Json<RecommendationBody>,
) -> Response {
    let recommendations: Vec<Value> = (0..state.catalogue_size)
        .filter(|id| *id != body.artwork_id && !body.user_likes.contains(id))
        .take(usize::try_from(body.n_recommendations).unwrap())
        .map(|id| {
            let mut artwork = artwork_json(id);
            artwork["similarity_score"] = json!(0.75);
            artwork
        })
        .collect();

    Json(json!({
        "source_artwork": artwork_json(body.artwork_id),
        "recommendations": recommendations,
        "count": recommendations.len()
    }))
    .into_response()
}

async fn model_stats(State(state): State<Arc<StubState>>) -> Response {
    if state.stats_broken.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "<h1>Server Error (500)</h1>",
        )
            .into_response();
    }

    Json(json!({
        "model_stats": { "n_artworks": state.catalogue_size, "n_features": 128 }
    }))
    .into_response()
}
