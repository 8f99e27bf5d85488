//! In-memory [`ArtworkApi`] for tests

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use common_types::{
    Artwork, ArtworkDetail, ArtworkPage, AuthResponse, Credentials, Like, LikeResponse,
    LikedArtworks, ModelStats, RecommendationRequest, Recommendations, Registration, User,
};

use super::{ApiError, ArtworkApi};

/// In-memory stand-in for the remote API
///
/// Likes behave like the real service: liking twice succeeds, unliking an
/// artwork that is not liked fails with `Like not found`.
pub struct MockArtworkApi {
    catalogue: Vec<Artwork>,
    liked: Mutex<BTreeSet<u64>>,
    like_failure: Mutex<Option<String>>,
    recommendation_requests: Mutex<Vec<RecommendationRequest>>,
}

impl MockArtworkApi {
    /// Mock serving `catalogue`, with nothing liked
    #[must_use]
    pub const fn new(catalogue: Vec<Artwork>) -> Self {
        Self {
            catalogue,
            liked: Mutex::new(BTreeSet::new()),
            like_failure: Mutex::new(None),
            recommendation_requests: Mutex::new(Vec::new()),
        }
    }

    /// Catalogue of `size` artworks with ids `0..size`
    #[must_use]
    pub fn with_catalogue_size(size: u64) -> Self {
        let catalogue = (0..size)
            .map(|id| Artwork {
                id,
                title: Some(format!("Artwork {id}")),
                artist: None,
                artist_name: Some(format!("Artist_{}", id % 3)),
                style: None,
                style_name: None,
                genre: None,
                genre_name: None,
                image_url: None,
                placeholder_url: None,
                similarity_score: None,
            })
            .collect();
        Self::new(catalogue)
    }

    /// Currently liked artwork ids
    #[must_use]
    pub fn liked_ids(&self) -> BTreeSet<u64> {
        self.liked.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Marks an artwork liked behind the caller's back
    pub fn seed_like(&self, artwork_id: u64) {
        self.liked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(artwork_id);
    }

    /// Makes every subsequent like and unlike fail with `message`
    pub fn fail_likes_with(&self, message: impl Into<String>) {
        *self
            .like_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    /// Every recommendation request received so far
    #[must_use]
    pub fn recommendation_requests(&self) -> Vec<RecommendationRequest> {
        self.recommendation_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_like_failure(&self) -> Result<(), ApiError> {
        match self
            .like_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(message) => Err(ApiError::RequestFailed(message)),
            None => Ok(()),
        }
    }

    fn find(&self, artwork_id: u64) -> Option<&Artwork> {
        self.catalogue.iter().find(|artwork| artwork.id == artwork_id)
    }

    fn user(username: &str) -> User {
        User {
            id: 1,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            location: String::new(),
            birth_date: None,
            avatar: None,
            liked_count: 0,
            liked_artworks: Vec::new(),
            date_joined: None,
        }
    }
}

#[async_trait::async_trait]
impl ArtworkApi for MockArtworkApi {
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            user: Self::user(&registration.username),
            token: "mock-token".to_string(),
            message: Some("User created successfully".to_string()),
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            user: Self::user(&credentials.username),
            token: "mock-token".to_string(),
            message: Some("Login successful".to_string()),
        })
    }

    fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        Ok(Self::user("mock"))
    }

    async fn like_artwork(&self, artwork_id: u64) -> Result<LikeResponse, ApiError> {
        self.check_like_failure()?;

        let created = self
            .liked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(artwork_id);
        let message = if created {
            "Artwork liked"
        } else {
            "Artwork already liked"
        };

        Ok(LikeResponse {
            message: Some(message.to_string()),
            like: Some(Like {
                id: None,
                artwork_id,
                liked_at: None,
            }),
        })
    }

    async fn unlike_artwork(&self, artwork_id: u64) -> Result<LikeResponse, ApiError> {
        self.check_like_failure()?;

        let removed = self
            .liked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&artwork_id);
        if !removed {
            return Err(ApiError::RequestFailed("Like not found".to_string()));
        }

        Ok(LikeResponse {
            message: Some("Artwork unliked".to_string()),
            like: None,
        })
    }

    async fn liked_artworks(&self) -> Result<LikedArtworks, ApiError> {
        let likes: Vec<Like> = self
            .liked_ids()
            .into_iter()
            .map(|artwork_id| Like {
                id: None,
                artwork_id,
                liked_at: None,
            })
            .collect();

        Ok(LikedArtworks {
            count: likes.len() as u64,
            likes,
        })
    }

    async fn list_artworks(
        &self,
        page: u32,
        page_size: u32,
        _include_images: bool,
    ) -> Result<ArtworkPage, ApiError> {
        let start = page.saturating_sub(1) as usize * page_size as usize;
        let artworks: Vec<Artwork> = self
            .catalogue
            .iter()
            .skip(start)
            .take(page_size as usize)
            .cloned()
            .collect();

        Ok(ArtworkPage {
            has_next: Some(start + artworks.len() < self.catalogue.len()),
            artworks,
            total: self.catalogue.len() as u64,
            page: Some(page),
            page_size: Some(page_size),
        })
    }

    async fn artwork_detail(&self, artwork_id: u64) -> Result<ArtworkDetail, ApiError> {
        self.find(artwork_id)
            .cloned()
            .map(|artwork| ArtworkDetail { artwork })
            .ok_or_else(|| ApiError::RequestFailed("Artwork not found".to_string()))
    }

    async fn artwork_image(&self, artwork_id: u64) -> Result<serde_json::Value, ApiError> {
        let artwork = self
            .find(artwork_id)
            .ok_or_else(|| ApiError::RequestFailed("Artwork not found".to_string()))?;
        Ok(serde_json::json!({ "image_url": artwork.image_source() }))
    }

    async fn recommendations(
        &self,
        artwork_id: u64,
        liked_ids: &[u64],
        count: u32,
    ) -> Result<Recommendations, ApiError> {
        self.recommendation_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecommendationRequest {
                artwork_id,
                user_likes: liked_ids.to_vec(),
                n_recommendations: count,
            });

        let recommendations: Vec<Artwork> = self
            .catalogue
            .iter()
            .filter(|artwork| artwork.id != artwork_id)
            .take(count as usize)
            .cloned()
            .map(|mut artwork| {
                artwork.similarity_score = Some(0.5);
                artwork
            })
            .collect();

        Ok(Recommendations {
            count: Some(recommendations.len() as u64),
            recommendations,
            source_artwork: self.find(artwork_id).cloned(),
        })
    }

    async fn model_stats(&self) -> Result<ModelStats, ApiError> {
        let mut model_stats = serde_json::Map::new();
        model_stats.insert(
            "n_artworks".to_string(),
            serde_json::Value::from(self.catalogue.len() as u64),
        );
        Ok(ModelStats { model_stats })
    }
}
