//! Provider payload records and the success payload of every operation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AuthorizationRequest, BearerCredential, Fault, Outcome, ThreeLeggedCredential};

/// Profile of a user on the bearer provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacebookUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// A photo the user uploaded. Only metadata; the bytes are never downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacebookPhoto {
    pub id: String,
    pub url: Option<String>,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// A video the user uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacebookVideo {
    pub id: String,
    pub url: Option<String>,
}

/// Profile of a user on the three-legged provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterUser {
    pub id: u64,
    pub favourites_count: u64,
    pub followers_count: u64,
    pub created_at: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
    pub screen_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub verified: bool,
}

/// What a publish request posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishType {
    Text,
    Photo,
    Video,
}

impl fmt::Display for PublishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for PublishType {
    type Err = Fault;

    /// Case-insensitive parse of `text`, `photo` or `video`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "photo" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            _ => Err(Fault::invalid(
                "the 'type' parameter must be either 'photo', 'video', or 'text'",
            )),
        }
    }
}

impl PublishType {
    #[must_use]
    pub fn needs_media(self) -> bool {
        matches!(self, Self::Photo | Self::Video)
    }
}

/// A file attached to a publish request.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Everything needed to publish one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub kind: PublishType,
    pub message: Option<String>,
    /// Video title; ignored for other kinds.
    pub title: Option<String>,
    pub media: Option<MediaUpload>,
}

impl PublishRequest {
    /// A text-only post.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            kind: PublishType::Text,
            message: Some(message.into()),
            title: None,
            media: None,
        }
    }

    /// Checks that the request carries what its kind requires.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] if a media post has no file or a text
    /// post has no message.
    pub fn validate(&self) -> Outcome<()> {
        if self.kind.needs_media() && self.media.is_none() {
            return Err(Fault::invalid("a file is required to publish a photo or video"));
        }
        if self.kind == PublishType::Text && self.message.as_deref().is_none_or(str::is_empty) {
            return Err(Fault::invalid(
                "posting a text message requires the 'message' parameter",
            ));
        }
        Ok(())
    }
}

/// Identifier of a post created by a publish operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Published {
    pub id: String,
}

/// Success payload of a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    FacebookUser(FacebookUser),
    TwitterUser(TwitterUser),
    Photos(Vec<FacebookPhoto>),
    Videos(Vec<FacebookVideo>),
    Published(Published),
    Extended(BearerCredential),
    Authorization(AuthorizationRequest),
    AccessToken(ThreeLeggedCredential),
    Url(String),
}
