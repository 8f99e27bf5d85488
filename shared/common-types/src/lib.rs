//! Wire types exchanged with the artwork recommendation API
//!
//! Every type here mirrors a JSON document sent to or received from the remote
//! service. Optional fields default when absent so that older or partial
//! payloads still decode.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder image service used when an artwork carries no image at all
const PLACEHOLDER_BASE_URL: &str = "https://via.placeholder.com/400x300/4A5568/FFFFFF";

/// Profile of an account as returned by the users endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account identifier
    pub id: u64,
    /// Unique login name
    pub username: String,
    /// Contact email
    #[serde(default)]
    pub email: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
    /// Free-form biography
    #[serde(default)]
    pub bio: String,
    /// Free-form location
    #[serde(default)]
    pub location: String,
    /// Date of birth, if the user provided one
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
    /// Number of liked artworks at the time the profile was produced
    #[serde(default)]
    pub liked_count: u64,
    /// Identifiers of liked artworks at the time the profile was produced
    #[serde(default)]
    pub liked_artworks: Vec<u64>,
    /// Account creation time
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

/// Sign-up form submitted to `POST /users/register/`
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Requested login name
    pub username: String,
    /// Contact email
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Must repeat `password`; the server rejects mismatches
    pub password_confirm: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Free-form biography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Free-form location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Date of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
}

impl Registration {
    /// Whether the password and its confirmation agree
    #[must_use]
    pub fn passwords_match(&self) -> bool {
        self.password == self.password_confirm
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("password_confirm", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish_non_exhaustive()
    }
}

/// Login form submitted to `POST /users/login/`
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Login name
    pub username: String,
    /// Account password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Profile of the authenticated account
    pub user: User,
    /// Credential for authenticated requests
    pub token: String,
    /// Human-readable outcome
    #[serde(default)]
    pub message: Option<String>,
}

/// Artist, style or genre as sent by the service: a numeric id or a textual id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// Numeric identifier
    Id(u64),
    /// Textual identifier
    Name(String),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Artwork metadata as listed, detailed or recommended by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "artist_id")]
    pub artist: Option<Reference>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default, alias = "style_id")]
    pub style: Option<Reference>,
    #[serde(default)]
    pub style_name: Option<String>,
    #[serde(default, alias = "genre_id")]
    pub genre: Option<Reference>,
    #[serde(default)]
    pub genre_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub placeholder_url: Option<String>,
    /// Similarity to the source artwork, in `[0, 1]`; only set on recommendations
    #[serde(default)]
    pub similarity_score: Option<f64>,
}

impl Artwork {
    /// Title to show, falling back to `Artwork #<id>`
    #[must_use]
    pub fn display_title(&self) -> String {
        non_empty(self.title.as_deref())
            .map_or_else(|| format!("Artwork #{}", self.id), str::to_owned)
    }

    /// Artist name, falling back to `Artist <id>`
    #[must_use]
    pub fn artist_label(&self) -> String {
        label("Artist", self.artist_name.as_deref(), self.artist.as_ref())
    }

    /// Style name, falling back to `Style <id>`
    #[must_use]
    pub fn style_label(&self) -> String {
        label("Style", self.style_name.as_deref(), self.style.as_ref())
    }

    /// Genre name, falling back to `Genre <id>`
    #[must_use]
    pub fn genre_label(&self) -> String {
        label("Genre", self.genre_name.as_deref(), self.genre.as_ref())
    }

    /// Image to display: the image URL, else the placeholder URL, else a generated placeholder
    #[must_use]
    pub fn image_source(&self) -> String {
        non_empty(self.image_url.as_deref())
            .or_else(|| non_empty(self.placeholder_url.as_deref()))
            .map_or_else(
                || format!("{PLACEHOLDER_BASE_URL}?text=Artwork+{}", self.id),
                str::to_owned,
            )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn label(kind: &str, name: Option<&str>, reference: Option<&Reference>) -> String {
    match (non_empty(name), reference) {
        (Some(name), _) => name.to_owned(),
        (None, Some(reference)) => format!("{kind} {reference}"),
        (None, None) => format!("{kind} unknown"),
    }
}

/// One page of `GET /artworks/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkPage {
    pub artworks: Vec<Artwork>,
    /// Number of artworks across all pages
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub has_next: Option<bool>,
}

impl ArtworkPage {
    /// Number of pages needed to show `total` artworks, `page_size` at a time
    #[must_use]
    pub fn total_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(page_size))
    }
}

/// Body of `GET /artworks/{id}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtworkDetail {
    pub artwork: Artwork,
}

/// Body of like and unlike requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeRequest {
    pub artwork_id: u64,
}

/// A recorded like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    #[serde(default)]
    pub id: Option<u64>,
    pub artwork_id: u64,
    #[serde(default)]
    pub liked_at: Option<DateTime<Utc>>,
}

/// Response of like and unlike calls
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikeResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Present on like, absent on unlike
    #[serde(default)]
    pub like: Option<Like>,
}

/// Body of `GET /users/profile/liked_artworks/`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LikedArtworks {
    pub likes: Vec<Like>,
    #[serde(default)]
    pub count: u64,
}

impl LikedArtworks {
    /// Identifiers of every liked artwork
    #[must_use]
    pub fn artwork_ids(&self) -> BTreeSet<u64> {
        self.likes.iter().map(|like| like.artwork_id).collect()
    }
}

/// Body of `POST /recommendations/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub artwork_id: u64,
    pub user_likes: Vec<u64>,
    pub n_recommendations: u32,
}

/// Response of `POST /recommendations/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub recommendations: Vec<Artwork>,
    #[serde(default)]
    pub source_artwork: Option<Artwork>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Body of `GET /model-stats/`; the statistics themselves are opaque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub model_stats: serde_json::Map<String, serde_json::Value>,
}

impl ModelStats {
    /// Number of artworks the model was trained on, when reported
    #[must_use]
    pub fn n_artworks(&self) -> Option<u64> {
        self.model_stats
            .get("n_artworks")
            .and_then(serde_json::Value::as_u64)
    }
}
