//! Bearer session against the Graph API.
//!
//! Reads the user's profile, photos and videos, publishes posts, and
//! extends the session's token through [`TokenRefresh`].

use crate::http_util::ProviderHttp;
use credgate_auth::TokenRefresh;
use credgate_types::{
    BearerCredential, Fault, FacebookPhoto, FacebookUser, FacebookVideo, Outcome, ProviderId,
    PublishRequest, PublishType, Published,
};
use rquest::RequestBuilder;
use rquest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;

const USER_FIELDS: &str = "first_name,last_name,middle_name,gender,name,verified";

/// One page of a Graph edge. A missing `data` array is an empty page.
#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct PhotoNode {
    id: String,
    #[serde(default)]
    images: Vec<ImageNode>,
}

#[derive(Deserialize)]
struct ImageNode {
    source: Option<String>,
    height: Option<u32>,
    width: Option<u32>,
}

#[derive(Deserialize)]
struct VideoNode {
    id: String,
    source: Option<String>,
}

#[derive(Deserialize)]
struct PostCreated {
    id: String,
}

impl From<PhotoNode> for FacebookPhoto {
    /// The first image rendition is the largest.
    fn from(node: PhotoNode) -> Self {
        let first = node.images.into_iter().next();
        Self {
            id: node.id,
            url: first.as_ref().and_then(|i| i.source.clone()),
            height: first.as_ref().and_then(|i| i.height),
            width: first.and_then(|i| i.width),
        }
    }
}

impl From<VideoNode> for FacebookVideo {
    fn from(node: VideoNode) -> Self {
        Self {
            id: node.id,
            url: node.source,
        }
    }
}

/// Calls made on behalf of one user holding a [`BearerCredential`].
pub struct BearerProviderSession {
    provider: ProviderId,
    ph: ProviderHttp,
    graph_url: String,
    credential: BearerCredential,
    refresh: Arc<TokenRefresh>,
}

impl BearerProviderSession {
    pub fn new(
        provider: ProviderId,
        ph: ProviderHttp,
        graph_url: impl Into<String>,
        credential: BearerCredential,
        refresh: Arc<TokenRefresh>,
    ) -> Self {
        let graph_url: String = graph_url.into();
        Self {
            provider,
            ph,
            graph_url: graph_url.trim_end_matches('/').to_string(),
            credential,
            refresh,
        }
    }

    #[must_use]
    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    #[must_use]
    pub fn credential(&self) -> &BearerCredential {
        &self.credential
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(
            "authorization",
            format!("Bearer {}", self.credential.access_token),
        )
    }

    fn get(&self, edge: &str) -> RequestBuilder {
        self.authorized(self.ph.client().get(format!("{}/{edge}", self.graph_url)))
    }

    fn post(&self, edge: &str) -> RequestBuilder {
        self.authorized(self.ph.client().post(format!("{}/{edge}", self.graph_url)))
    }

    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider refuses the token.
    pub async fn user(&self) -> Outcome<FacebookUser> {
        self.ph
            .json(self.get("me").query(&[("fields", USER_FIELDS)]))
            .await
    }

    /// Photos the user uploaded. Only metadata; the bytes are not downloaded.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider refuses the token.
    pub async fn photos(&self) -> Outcome<Vec<FacebookPhoto>> {
        let page: Page<PhotoNode> = self
            .ph
            .json(
                self.get("me/photos")
                    .query(&[("type", "uploaded"), ("fields", "id,images")]),
            )
            .await?;
        Ok(page.data.into_iter().map(FacebookPhoto::from).collect())
    }

    /// Videos the user uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider refuses the token.
    pub async fn videos(&self) -> Outcome<Vec<FacebookVideo>> {
        let page: Page<VideoNode> = self
            .ph
            .json(
                self.get("me/videos")
                    .query(&[("type", "uploaded"), ("fields", "id,source")]),
            )
            .await?;
        Ok(page.data.into_iter().map(FacebookVideo::from).collect())
    }

    /// Posts text to the feed, or uploads a photo or video.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] if a media post carries no file and
    /// [`Fault::ProviderRejected`] if the provider refuses the post.
    pub async fn publish(&self, request: &PublishRequest) -> Outcome<Published> {
        let builder = match request.kind {
            PublishType::Text => {
                let message = request.message.clone().unwrap_or_default();
                self.post("me/feed").form(&[("message", message)])
            }
            PublishType::Photo => {
                let mut form = Form::new().part("source", media_part(request)?);
                if let Some(message) = &request.message {
                    form = form.text("message", message.clone());
                }
                self.post("me/photos").multipart(form)
            }
            PublishType::Video => {
                let mut form = Form::new().part("source", media_part(request)?);
                if let Some(message) = &request.message {
                    form = form.text("description", message.clone());
                }
                if let Some(title) = &request.title {
                    form = form.text("title", title.clone());
                }
                self.post("me/videos").multipart(form)
            }
        };
        let created: PostCreated = self.ph.json(builder).await?;
        tracing::info!(provider = %self.provider, kind = %request.kind, id = %created.id, "published");
        Ok(Published { id: created.id })
    }

    /// Exchanges this session's token for a long-lived one.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider reports the token
    /// invalid.
    pub async fn extend(&self) -> Outcome<BearerCredential> {
        self.refresh.extend(&self.credential).await
    }
}

fn media_part(request: &PublishRequest) -> Outcome<Part> {
    let media = request
        .media
        .as_ref()
        .ok_or_else(|| Fault::invalid("a file is required to publish a photo or video"))?;
    Ok(Part::bytes(media.bytes.clone()).file_name(media.file_name.clone()))
}
