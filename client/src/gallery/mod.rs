//! Gallery page state: the current catalogue page, the user's likes and the
//! recommendations for the selected artwork
//!
//! [`Gallery`] holds no presentation logic. It drives any [`ArtworkApi`], so
//! it runs the same against the HTTP gateway and the in-memory mock.

use std::collections::BTreeSet;
use std::sync::Arc;

use common_types::Artwork;

use crate::gateway::ArtworkApi;
use crate::types::ApiError;

/// Artworks shown per catalogue page
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Recommendations requested for a selected artwork
pub const DEFAULT_RECOMMENDATION_COUNT: u32 = 8;

/// State behind the gallery page, driven through an [`ArtworkApi`]
pub struct Gallery<A: ArtworkApi + ?Sized> {
    api: Arc<A>,
    page_size: u32,
    recommendation_count: u32,
    current_page: u32,
    total_pages: u64,
    artworks: Vec<Artwork>,
    liked: BTreeSet<u64>,
    selected: Option<Artwork>,
    recommendations: Vec<Artwork>,
}

impl<A: ArtworkApi + ?Sized> Gallery<A> {
    /// Empty gallery on page 1 with the default page size and recommendation count
    #[must_use]
    pub const fn new(api: Arc<A>) -> Self {
        Self {
            api,
            page_size: DEFAULT_PAGE_SIZE,
            recommendation_count: DEFAULT_RECOMMENDATION_COUNT,
            current_page: 1,
            total_pages: 0,
            artworks: Vec::new(),
            liked: BTreeSet::new(),
            selected: None,
            recommendations: Vec::new(),
        }
    }

    /// Overrides the page size; zero is treated as one
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Overrides the number of recommendations requested per selection
    #[must_use]
    pub const fn with_recommendation_count(mut self, count: u32) -> Self {
        self.recommendation_count = count;
        self
    }

    /// Fetches catalogue page `page` (1-based) without image payloads
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previously loaded page stays in place
    pub async fn load_page(&mut self, page: u32) -> Result<(), ApiError> {
        let page = page.max(1);
        let listing = self.api.list_artworks(page, self.page_size, false).await?;

        self.total_pages = listing.total_pages(self.page_size);
        self.artworks = listing.artworks;
        self.current_page = page;

        tracing::debug!(
            page,
            total_pages = self.total_pages,
            shown = self.artworks.len(),
            "Loaded gallery page"
        );
        Ok(())
    }

    /// Replaces the liked set with the server's view
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the liked set is left unchanged
    pub async fn load_likes(&mut self) -> Result<(), ApiError> {
        self.liked = self.api.liked_artworks().await?.artwork_ids();
        Ok(())
    }

    /// Selects `artwork_id` and loads its recommendations
    ///
    /// The liked set is sent along so recommendations lean towards the user's taste.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the previous selection stays in place
    pub async fn select(&mut self, artwork_id: u64) -> Result<(), ApiError> {
        let liked_ids: Vec<u64> = self.liked.iter().copied().collect();
        let response = self
            .api
            .recommendations(artwork_id, &liked_ids, self.recommendation_count)
            .await?;

        self.selected = response.source_artwork.or_else(|| {
            self.artworks
                .iter()
                .find(|artwork| artwork.id == artwork_id)
                .cloned()
        });
        self.recommendations = response.recommendations;
        Ok(())
    }

    /// Likes `artwork_id` if it is not liked, unlikes it otherwise
    ///
    /// Returns whether the artwork is liked afterwards. When the remote call
    /// fails the liked set is reloaded; if the artwork already ended up in the
    /// requested state the toggle counts as done.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the artwork is not in the requested state
    pub async fn toggle_like(&mut self, artwork_id: u64) -> Result<bool, ApiError> {
        let like = !self.liked.contains(&artwork_id);
        let outcome = if like {
            self.api.like_artwork(artwork_id).await
        } else {
            self.api.unlike_artwork(artwork_id).await
        };

        match outcome {
            Ok(_) if like => {
                self.liked.insert(artwork_id);
            }
            Ok(_) => {
                self.liked.remove(&artwork_id);
            }
            Err(err) => {
                tracing::warn!(artwork_id, like, error = %err, "Like toggle failed, resyncing likes");
                if self.load_likes().await.is_err() || self.liked.contains(&artwork_id) != like {
                    return Err(err);
                }
            }
        }

        self.refresh_recommendations().await;
        Ok(like)
    }

    /// Whether `artwork_id` is in the liked set
    #[must_use]
    pub fn is_liked(&self, artwork_id: u64) -> bool {
        self.liked.contains(&artwork_id)
    }

    /// Page shown, starting at 1
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Number of catalogue pages as of the last load
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Artworks requested per page
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Artworks on the current page
    #[must_use]
    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    /// Liked artwork ids
    #[must_use]
    pub const fn liked(&self) -> &BTreeSet<u64> {
        &self.liked
    }

    /// Artwork whose recommendations are shown
    #[must_use]
    pub const fn selected(&self) -> Option<&Artwork> {
        self.selected.as_ref()
    }

    /// Recommendations for the selected artwork
    #[must_use]
    pub fn recommendations(&self) -> &[Artwork] {
        &self.recommendations
    }

    // Likes feed into recommendations, so a changed liked set re-ranks them
    async fn refresh_recommendations(&mut self) {
        let Some(selected_id) = self.selected.as_ref().map(|artwork| artwork.id) else {
            return;
        };

        if let Err(err) = self.select(selected_id).await {
            tracing::warn!(selected_id, error = %err, "Failed to refresh recommendations");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockArtworkApi;
    use pretty_assertions::assert_eq;

    fn gallery(catalogue_size: u64) -> (Arc<MockArtworkApi>, Gallery<MockArtworkApi>) {
        let api = Arc::new(MockArtworkApi::with_catalogue_size(catalogue_size));
        (api.clone(), Gallery::new(api))
    }

    #[tokio::test]
    async fn test_load_page_counts_pages() {
        let (_, mut gallery) = gallery(25);

        gallery.load_page(3).await.unwrap();

        assert_eq!(gallery.total_pages(), 3);
        assert_eq!(gallery.current_page(), 3);
        let ids: Vec<u64> = gallery.artworks().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![24]);
    }

    #[tokio::test]
    async fn test_load_page_zero_means_first_page() {
        let (_, mut gallery) = gallery(5);

        gallery.load_page(0).await.unwrap();

        assert_eq!(gallery.current_page(), 1);
        assert_eq!(gallery.artworks().len(), 5);
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let (api, mut gallery) = gallery(4);

        assert!(gallery.toggle_like(2).await.unwrap());
        assert!(gallery.is_liked(2));
        assert_eq!(api.liked_ids(), BTreeSet::from([2]));

        assert!(!gallery.toggle_like(2).await.unwrap());
        assert!(!gallery.is_liked(2));
        assert!(api.liked_ids().is_empty());
    }

    #[tokio::test]
    async fn test_stale_unlike_resyncs_and_succeeds() {
        let (api, mut gallery) = gallery(4);
        gallery.toggle_like(1).await.unwrap();

        // Removed elsewhere: the server answers "Like not found"
        api.unlike_artwork(1).await.unwrap();

        assert!(!gallery.toggle_like(1).await.unwrap());
        assert!(gallery.liked().is_empty());
    }

    #[tokio::test]
    async fn test_failed_toggle_propagates_when_state_unchanged() {
        let (api, mut gallery) = gallery(4);
        api.fail_likes_with("Service unavailable");

        let err = gallery.toggle_like(3).await.unwrap_err();

        assert_eq!(err, ApiError::RequestFailed("Service unavailable".to_string()));
        assert!(!gallery.is_liked(3));
    }

    #[tokio::test]
    async fn test_failed_like_succeeds_when_already_liked_remotely() {
        let (api, mut gallery) = gallery(4);
        api.seed_like(3);
        api.fail_likes_with("Service unavailable");

        assert!(gallery.toggle_like(3).await.unwrap());
        assert!(gallery.is_liked(3));
    }

    #[tokio::test]
    async fn test_select_sends_likes_and_stores_recommendations() {
        let (api, mut gallery) = gallery(20);
        gallery.load_page(1).await.unwrap();
        gallery.toggle_like(4).await.unwrap();

        gallery.select(7).await.unwrap();

        assert_eq!(gallery.selected().map(|a| a.id), Some(7));
        assert_eq!(gallery.recommendations().len(), 8);
        assert!(gallery.recommendations().iter().all(|a| a.id != 7));

        let request = api.recommendation_requests().pop().unwrap();
        assert_eq!(request.artwork_id, 7);
        assert_eq!(request.user_likes, vec![4]);
        assert_eq!(request.n_recommendations, DEFAULT_RECOMMENDATION_COUNT);
    }

    #[tokio::test]
    async fn test_toggle_refreshes_selected_recommendations() {
        let (api, mut gallery) = gallery(10);
        gallery.select(0).await.unwrap();

        gallery.toggle_like(5).await.unwrap();

        let requests = api.recommendation_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].artwork_id, 0);
        assert_eq!(requests[1].user_likes, vec![5]);
    }
}
