//! HTTP gateway to the artwork recommendation API
//!
//! [`ApiGateway`] is the only component that talks to the remote service. It
//! attaches the session credential where an operation asks for it, decodes
//! successful bodies into typed results and collapses every failure into an
//! [`ApiError::RequestFailed`] message.

pub mod endpoint;
pub mod normalize;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::sync::Arc;

use common_types::{
    ArtworkDetail, ArtworkPage, AuthResponse, Credentials, LikeRequest, LikeResponse,
    LikedArtworks, ModelStats, RecommendationRequest, Recommendations, Registration, User,
};
use reqwest::{
    header::{self, HeaderValue},
    Client,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::session::SessionStore;
use crate::types::ApiError;
use endpoint::{Auth, Endpoint};
use normalize::normalize_error;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Scheme of the `Authorization` header expected by the service
const TOKEN_SCHEME: &str = "Token";

/// Operations offered by the artwork recommendation API
#[async_trait::async_trait]
pub trait ArtworkApi: Send + Sync {
    /// Creates an account and starts a session for it
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError>;

    /// Starts a session for existing credentials
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError>;

    /// Ends the current session locally
    fn logout(&self) -> Result<(), ApiError>;

    /// Profile of the logged-in user
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Marks an artwork as liked
    async fn like_artwork(&self, artwork_id: u64) -> Result<LikeResponse, ApiError>;

    /// Removes a like
    async fn unlike_artwork(&self, artwork_id: u64) -> Result<LikeResponse, ApiError>;

    /// Artworks liked by the logged-in user
    async fn liked_artworks(&self) -> Result<LikedArtworks, ApiError>;

    /// One page of the catalogue; pages start at 1
    async fn list_artworks(
        &self,
        page: u32,
        page_size: u32,
        include_images: bool,
    ) -> Result<ArtworkPage, ApiError>;

    /// Metadata of a single artwork
    async fn artwork_detail(&self, artwork_id: u64) -> Result<ArtworkDetail, ApiError>;

    /// Image payload of a single artwork, passed through as returned
    async fn artwork_image(&self, artwork_id: u64) -> Result<serde_json::Value, ApiError>;

    /// Artworks similar to `artwork_id`, biased towards `liked_ids`
    async fn recommendations(
        &self,
        artwork_id: u64,
        liked_ids: &[u64],
        count: u32,
    ) -> Result<Recommendations, ApiError>;

    /// Statistics of the recommendation model
    async fn model_stats(&self) -> Result<ModelStats, ApiError>;
}

/// Implements [`ArtworkApi`] over HTTP
pub struct ApiGateway {
    base_url: String,
    http_client: ClientWithMiddleware,
    session: Arc<SessionStore>,
}

impl ApiGateway {
    /// Creates a gateway for the API rooted at `base_url` (including the `/api` prefix)
    ///
    /// No request timeout is configured; the transport default applies.
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let reqwest_client = Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .user_agent(format!("gallery-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Self::with_client(base_url, session, http_client)
    }

    /// Creates a gateway on top of an existing HTTP client
    #[must_use]
    pub fn with_client(
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        http_client: ClientWithMiddleware,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
            session,
        }
    }

    /// Session consulted for credentials and updated on login
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// `Authorization` header for `endpoint`, if it requires one and a token is held
    #[must_use]
    pub fn credential_header(&self, endpoint: &Endpoint) -> Option<HeaderValue> {
        if endpoint.auth == Auth::Anonymous {
            return None;
        }

        let token = self.session.token()?;
        match HeaderValue::from_str(&format!("{TOKEN_SCHEME} {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(_) => {
                tracing::warn!("Session token is not a valid header value, sending without it");
                None
            }
        }
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| ApiError::RequestFailed(format!("Invalid request URL: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    /// Sends one request and normalizes the outcome
    async fn send<T>(
        &self,
        endpoint: &Endpoint,
        path: &str,
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.url(path, query)?;
        let credential = self.credential_header(endpoint);

        tracing::debug!(
            method = %endpoint.method,
            path,
            authenticated = credential.is_some(),
            "Sending API request"
        );

        let mut request = self.http_client.request(endpoint.method.clone(), url);
        if let Some(value) = credential {
            request = request.header(header::AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(path, "API request could not be sent: {e}");
            ApiError::RequestFailed(format!("Network error: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| {
                ApiError::RequestFailed(format!("Failed to read response body: {e}"))
            })?;
            return serde_json::from_slice(&bytes).map_err(|e| {
                tracing::warn!(path, %status, "Unexpected response body: {e}");
                ApiError::RequestFailed(format!("Unexpected response from server: {e}"))
            });
        }

        // A body that cannot be read degrades to the status-based message
        let body = response.bytes().await.ok();
        let message = normalize_error(status, body.as_deref());
        tracing::warn!(path, %status, error = %message, "API request failed");

        Err(ApiError::RequestFailed(message))
    }

    /// Stores the session returned by login or registration
    fn start_session(&self, response: &AuthResponse) -> Result<(), ApiError> {
        if response.token.is_empty() {
            tracing::warn!("Authentication response carried no token, session unchanged");
            return Ok(());
        }

        self.session
            .set_session(response.token.clone(), response.user.clone())?;
        Ok(())
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(body)
        .map_err(|e| ApiError::RequestFailed(format!("Failed to encode request: {e}")))
}

#[async_trait::async_trait]
impl ArtworkApi for ApiGateway {
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        tracing::debug!(username = %registration.username, "Registering account");

        let response: AuthResponse = self
            .send(
                &endpoint::REGISTER,
                endpoint::REGISTER.path,
                &[],
                Some(encode(registration)?),
            )
            .await?;

        self.start_session(&response)?;
        tracing::info!(username = %response.user.username, "Registered and logged in");
        Ok(response)
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self
            .send(
                &endpoint::LOGIN,
                endpoint::LOGIN.path,
                &[],
                Some(encode(credentials)?),
            )
            .await?;

        self.start_session(&response)?;
        tracing::info!(username = %response.user.username, "Logged in");
        Ok(response)
    }

    fn logout(&self) -> Result<(), ApiError> {
        self.session.clear()?;
        tracing::info!("Logged out");
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.send(&endpoint::CURRENT_USER, endpoint::CURRENT_USER.path, &[], None)
            .await
    }

    async fn like_artwork(&self, artwork_id: u64) -> Result<LikeResponse, ApiError> {
        let body = encode(&LikeRequest { artwork_id })?;
        self.send(
            &endpoint::LIKE_ARTWORK,
            endpoint::LIKE_ARTWORK.path,
            &[],
            Some(body),
        )
        .await
    }

    async fn unlike_artwork(&self, artwork_id: u64) -> Result<LikeResponse, ApiError> {
        let body = encode(&LikeRequest { artwork_id })?;
        self.send(
            &endpoint::UNLIKE_ARTWORK,
            endpoint::UNLIKE_ARTWORK.path,
            &[],
            Some(body),
        )
        .await
    }

    async fn liked_artworks(&self) -> Result<LikedArtworks, ApiError> {
        self.send(
            &endpoint::LIKED_ARTWORKS,
            endpoint::LIKED_ARTWORKS.path,
            &[],
            None,
        )
        .await
    }

    async fn list_artworks(
        &self,
        page: u32,
        page_size: u32,
        include_images: bool,
    ) -> Result<ArtworkPage, ApiError> {
        let query = [
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("include_images", include_images.to_string()),
        ];
        self.send(
            &endpoint::LIST_ARTWORKS,
            endpoint::LIST_ARTWORKS.path,
            &query,
            None,
        )
        .await
    }

    async fn artwork_detail(&self, artwork_id: u64) -> Result<ArtworkDetail, ApiError> {
        let path = endpoint::ARTWORK_DETAIL.path_for(artwork_id);
        self.send(&endpoint::ARTWORK_DETAIL, &path, &[], None).await
    }

    async fn artwork_image(&self, artwork_id: u64) -> Result<serde_json::Value, ApiError> {
        let path = endpoint::ARTWORK_IMAGE.path_for(artwork_id);
        self.send(&endpoint::ARTWORK_IMAGE, &path, &[], None).await
    }

    async fn recommendations(
        &self,
        artwork_id: u64,
        liked_ids: &[u64],
        count: u32,
    ) -> Result<Recommendations, ApiError> {
        let body = encode(&RecommendationRequest {
            artwork_id,
            user_likes: liked_ids.to_vec(),
            n_recommendations: count,
        })?;
        self.send(
            &endpoint::RECOMMENDATIONS,
            endpoint::RECOMMENDATIONS.path,
            &[],
            Some(body),
        )
        .await
    }

    async fn model_stats(&self) -> Result<ModelStats, ApiError> {
        self.send(&endpoint::MODEL_STATS, endpoint::MODEL_STATS.path, &[], None)
            .await
    }
}
