//! Command-line surface of the gallery client

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use common_types::{Credentials, Registration};
use serde_json::{json, Value};

use crate::gallery::{Gallery, DEFAULT_PAGE_SIZE, DEFAULT_RECOMMENDATION_COUNT};
use crate::gateway::ArtworkApi;

/// Browse artworks, manage likes and get recommendations
#[derive(Parser, Debug)]
#[command(name = "gallery", version, about, long_about = None)]
pub struct Cli {
    /// Action to run
    #[command(subcommand)]
    pub command: Command,
}

/// One `gallery` subcommand
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and log in
    Register {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Contact email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Must repeat --password
        #[arg(long)]
        password_confirm: String,

        /// Given name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Family name
        #[arg(long, default_value = "")]
        last_name: String,

        /// Short biography
        #[arg(long)]
        bio: Option<String>,

        /// Where you live
        #[arg(long)]
        location: Option<String>,
    },

    /// Log in with existing credentials
    Login {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user's profile
    Whoami,

    /// List one page of the catalogue
    Artworks {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Artworks per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Ask the server to inline image data
        #[arg(long)]
        include_images: bool,
    },

    /// Show one artwork
    Show {
        /// Artwork identifier
        #[arg(value_name = "ARTWORK_ID")]
        artwork_id: u64,
    },

    /// Fetch the image payload of one artwork
    Image {
        /// Artwork identifier
        #[arg(value_name = "ARTWORK_ID")]
        artwork_id: u64,
    },

    /// Like an artwork
    Like {
        /// Artwork identifier
        #[arg(value_name = "ARTWORK_ID")]
        artwork_id: u64,
    },

    /// Remove a like
    Unlike {
        /// Artwork identifier
        #[arg(value_name = "ARTWORK_ID")]
        artwork_id: u64,
    },

    /// List liked artworks
    Likes,

    /// Recommend artworks similar to one, biased by your likes when logged in
    Recommend {
        /// Artwork identifier
        #[arg(value_name = "ARTWORK_ID")]
        artwork_id: u64,

        /// Number of recommendations
        #[arg(short = 'n', long, default_value_t = DEFAULT_RECOMMENDATION_COUNT)]
        count: u32,
    },

    /// Show recommendation model statistics
    Stats,
}

/// Runs `command` against `api` and returns the document to print
///
/// # Errors
///
/// Returns the normalized API error, or a local validation error before any request is sent
pub async fn execute<A>(command: Command, api: Arc<A>, authenticated: bool) -> Result<Value>
where
    A: ArtworkApi + ?Sized,
{
    let output = match command {
        Command::Register {
            username,
            email,
            password,
            password_confirm,
            first_name,
            last_name,
            bio,
            location,
        } => {
            let registration = Registration {
                username,
                email,
                password,
                password_confirm,
                first_name,
                last_name,
                bio,
                location,
                birth_date: None,
            };
            if !registration.passwords_match() {
                bail!("Passwords don't match");
            }

            let response = api.register(&registration).await?;
            json!({ "message": response.message, "user": response.user })
        }
        Command::Login { username, password } => {
            let response = api.login(&Credentials { username, password }).await?;
            json!({ "message": response.message, "user": response.user })
        }
        Command::Logout => {
            api.logout()?;
            json!({ "message": "Logged out" })
        }
        Command::Whoami => serde_json::to_value(api.current_user().await?)?,
        Command::Artworks {
            page,
            page_size,
            include_images,
        } => {
            if include_images {
                serde_json::to_value(api.list_artworks(page, page_size, true).await?)?
            } else {
                let mut gallery = Gallery::new(api).with_page_size(page_size);
                gallery.load_page(page).await?;
                json!({
                    "page": gallery.current_page(),
                    "total_pages": gallery.total_pages(),
                    "artworks": gallery.artworks().iter().map(summary).collect::<Vec<_>>(),
                })
            }
        }
        Command::Show { artwork_id } => {
            serde_json::to_value(api.artwork_detail(artwork_id).await?.artwork)?
        }
        Command::Image { artwork_id } => api.artwork_image(artwork_id).await?,
        Command::Like { artwork_id } => serde_json::to_value(api.like_artwork(artwork_id).await?)?,
        Command::Unlike { artwork_id } => {
            serde_json::to_value(api.unlike_artwork(artwork_id).await?)?
        }
        Command::Likes => serde_json::to_value(api.liked_artworks().await?)?,
        Command::Recommend { artwork_id, count } => {
            let mut gallery = Gallery::new(api).with_recommendation_count(count);
            if authenticated {
                gallery.load_likes().await?;
            }
            gallery.select(artwork_id).await?;
            json!({
                "source_artwork": gallery.selected().map(summary),
                "recommendations": gallery.recommendations().iter().map(summary).collect::<Vec<_>>(),
            })
        }
        Command::Stats => serde_json::to_value(api.model_stats().await?)?,
    };

    Ok(output)
}

fn summary(artwork: &common_types::Artwork) -> Value {
    json!({
        "id": artwork.id,
        "title": artwork.display_title(),
        "artist": artwork.artist_label(),
        "style": artwork.style_label(),
        "genre": artwork.genre_label(),
        "image": artwork.image_source(),
        "similarity_score": artwork.similarity_score,
    })
}
