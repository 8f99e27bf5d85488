//! Static description of every remote operation

use reqwest::Method;

/// Whether an operation sends the session credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach `Authorization: Token <token>` when a token is held
    Required,
    /// Never attach the credential
    Anonymous,
}

/// Method, path template and credential policy of one operation
///
/// Paths are relative to the API base URL and may contain an `{id}`
/// placeholder.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// HTTP method
    pub method: Method,
    /// Path template, relative to the base URL
    pub path: &'static str,
    /// Credential policy
    pub auth: Auth,
}

impl Endpoint {
    /// Path with `{id}` replaced by `id`
    #[must_use]
    pub fn path_for(&self, id: u64) -> String {
        self.path.replace("{id}", &id.to_string())
    }
}

/// Create an account
pub const REGISTER: Endpoint = Endpoint {
    method: Method::POST,
    path: "/users/register/",
    auth: Auth::Anonymous,
};

/// Exchange credentials for a token
pub const LOGIN: Endpoint = Endpoint {
    method: Method::POST,
    path: "/users/login/",
    auth: Auth::Anonymous,
};

/// Profile of the token's owner
pub const CURRENT_USER: Endpoint = Endpoint {
    method: Method::GET,
    path: "/users/profile/me/",
    auth: Auth::Required,
};

/// Like an artwork; liking twice is not an error
pub const LIKE_ARTWORK: Endpoint = Endpoint {
    method: Method::POST,
    path: "/users/profile/like_artwork/",
    auth: Auth::Required,
};

/// Remove a like
pub const UNLIKE_ARTWORK: Endpoint = Endpoint {
    method: Method::DELETE,
    path: "/users/profile/unlike_artwork/",
    auth: Auth::Required,
};

/// Likes of the token's owner
pub const LIKED_ARTWORKS: Endpoint = Endpoint {
    method: Method::GET,
    path: "/users/profile/liked_artworks/",
    auth: Auth::Required,
};

/// One page of the catalogue
pub const LIST_ARTWORKS: Endpoint = Endpoint {
    method: Method::GET,
    path: "/artworks/",
    auth: Auth::Anonymous,
};

/// Metadata of one artwork
pub const ARTWORK_DETAIL: Endpoint = Endpoint {
    method: Method::GET,
    path: "/artworks/{id}/",
    auth: Auth::Anonymous,
};

/// Image payload of one artwork
pub const ARTWORK_IMAGE: Endpoint = Endpoint {
    method: Method::GET,
    path: "/artworks/{id}/image/",
    auth: Auth::Anonymous,
};

/// Artworks similar to a source artwork
pub const RECOMMENDATIONS: Endpoint = Endpoint {
    method: Method::POST,
    path: "/recommendations/",
    auth: Auth::Anonymous,
};

/// Statistics of the recommendation model
pub const MODEL_STATS: Endpoint = Endpoint {
    method: Method::GET,
    path: "/model-stats/",
    auth: Auth::Anonymous,
};
