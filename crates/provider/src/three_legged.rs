//! OAuth 1.0a signed session against the microblogging API.
//!
//! Every request carries an `Authorization: OAuth ...` header signed with
//! the consumer secret and the user's access secret. Media posts upload the
//! file first and attach the returned media id to the status update.

use crate::http_util::ProviderHttp;
use credgate_auth::{Signer, TokenPair};
use credgate_types::{
    Fault, MediaUpload, Outcome, ProviderId, PublishRequest, Published, ThreeLeggedCredential,
    TwitterUser,
};
use rquest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
struct MediaUploaded {
    media_id_string: String,
}

#[derive(Deserialize)]
struct StatusCreated {
    id_str: String,
}

/// Calls made on behalf of one user holding a [`ThreeLeggedCredential`].
pub struct ThreeLeggedProviderSession {
    provider: ProviderId,
    ph: ProviderHttp,
    signer: Arc<Signer>,
    api_url: String,
    upload_url: String,
    credential: ThreeLeggedCredential,
}

impl ThreeLeggedProviderSession {
    pub fn new(
        provider: ProviderId,
        ph: ProviderHttp,
        signer: Arc<Signer>,
        api_url: &str,
        upload_url: &str,
        credential: ThreeLeggedCredential,
    ) -> Self {
        Self {
            provider,
            ph,
            signer,
            api_url: api_url.trim_end_matches('/').to_string(),
            upload_url: upload_url.trim_end_matches('/').to_string(),
            credential,
        }
    }

    #[must_use]
    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    fn token(&self) -> TokenPair<'_> {
        TokenPair::new(&self.credential.access_token, &self.credential.access_secret)
    }

    fn sign(&self, method: &str, url: &str, params: &[(&str, &str)]) -> String {
        self.signer
            .authorize(method, url, params, Some(self.token()), &[])
    }

    /// Profile of the user the credential belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::ProviderRejected`] if the provider refuses the
    /// signature or the access pair.
    pub async fn user(&self) -> Outcome<TwitterUser> {
        let url = format!("{}/1.1/account/verify_credentials.json", self.api_url);
        let header = self.sign("GET", &url, &[]);
        self.ph
            .json(self.ph.client().get(&url).header("Authorization", header))
            .await
    }

    /// Posts a status, uploading the attached media first for photo and
    /// video posts.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::InvalidInput`] if a media post carries no file and
    /// [`Fault::ProviderRejected`] if the upload or the status update fails.
    pub async fn publish(&self, request: &PublishRequest) -> Outcome<Published> {
        let media_id = if request.kind.needs_media() {
            let media = request
                .media
                .as_ref()
                .ok_or_else(|| Fault::invalid("a file is required to publish a photo or video"))?;
            Some(self.upload(media).await?)
        } else {
            None
        };

        let status = request.message.as_deref().unwrap_or_default();
        let mut params = vec![("status", status)];
        if let Some(id) = media_id.as_deref() {
            params.push(("media_ids", id));
        }

        let url = format!("{}/1.1/statuses/update.json", self.api_url);
        let header = self.sign("POST", &url, &params);
        let created: StatusCreated = self
            .ph
            .json(
                self.ph
                    .client()
                    .post(&url)
                    .header("Authorization", header)
                    .form(&params),
            )
            .await?;
        tracing::info!(provider = %self.provider, kind = %request.kind, id = %created.id_str, "published");
        Ok(Published {
            id: created.id_str,
        })
    }

    /// Multipart bodies are not part of the signature base string.
    async fn upload(&self, media: &MediaUpload) -> Outcome<String> {
        let url = format!("{}/1.1/media/upload.json", self.upload_url);
        let header = self.sign("POST", &url, &[]);
        let form = Form::new().part(
            "media",
            Part::bytes(media.bytes.clone()).file_name(media.file_name.clone()),
        );
        let uploaded: MediaUploaded = self
            .ph
            .json(
                self.ph
                    .client()
                    .post(&url)
                    .header("Authorization", header)
                    .multipart(form),
            )
            .await?;
        Ok(uploaded.media_id_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Form as AxumForm, Multipart, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    use credgate_auth::oauth1::{base_string, sign};
    use credgate_types::PublishType;
    use serde_json::json;
    use std::collections::HashMap;

    const CONSUMER_SECRET: &str = "cs";
    const ACCESS_SECRET: &str = "AS1";

    fn oauth_fields(headers: &HeaderMap) -> HashMap<String, String> {
        let header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        header
            .strip_prefix("OAuth ")
            .unwrap_or_default()
            .split(", ")
            .filter_map(|f| f.split_once('='))
            .map(|(k, v)| {
                let v = percent_encoding::percent_decode_str(v.trim_matches('"'))
                    .decode_utf8()
                    .unwrap()
                    .into_owned();
                (k.to_string(), v)
            })
            .collect()
    }

    /// Recomputes the signature the way the provider does.
    fn verify(method: &str, url: &str, headers: &HeaderMap, body: &[(String, String)]) -> bool {
        let fields = oauth_fields(headers);
        let Some(signature) = fields.get("oauth_signature") else {
            return false;
        };
        let params: Vec<(&str, &str)> = fields
            .iter()
            .filter(|(k, _)| k.as_str() != "oauth_signature")
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(body.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect();
        let base = base_string(method, url, &params);
        sign(&base, CONSUMER_SECRET, ACCESS_SECRET) == *signature
    }

    fn unauthorized() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"errors": [{"code": 32, "message": "Could not authenticate you."}]})),
        )
            .into_response()
    }

    async fn verify_credentials(State(base): State<String>, headers: HeaderMap) -> Response {
        let url = format!("{base}/1.1/account/verify_credentials.json");
        if !verify("GET", &url, &headers, &[]) {
            return unauthorized();
        }
        Json(json!({
            "id": 42,
            "screen_name": "ada",
            "followers_count": 7,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018"
        }))
        .into_response()
    }

    async fn update(
        State(base): State<String>,
        headers: HeaderMap,
        AxumForm(form): AxumForm<Vec<(String, String)>>,
    ) -> Response {
        let url = format!("{base}/1.1/statuses/update.json");
        if !verify("POST", &url, &headers, &form) {
            return unauthorized();
        }
        let media = form
            .iter()
            .find(|(k, _)| k == "media_ids")
            .map_or("none", |(_, v)| v.as_str());
        Json(json!({"id": 1001, "id_str": format!("1001-{media}")})).into_response()
    }

    async fn upload(
        State(base): State<String>,
        headers: HeaderMap,
        mut multipart: Multipart,
    ) -> Response {
        let url = format!("{base}/1.1/media/upload.json");
        if !verify("POST", &url, &headers, &[]) {
            return unauthorized();
        }
        while let Some(field) = multipart.next_field().await.unwrap() {
            if field.name() == Some("media") {
                return Json(json!({"media_id": 77, "media_id_string": "77"})).into_response();
            }
        }
        (StatusCode::BAD_REQUEST, "no media").into_response()
    }

    async fn session(secret: &str) -> ThreeLeggedProviderSession {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let router = Router::new()
            .route("/1.1/account/verify_credentials.json", get(verify_credentials))
            .route("/1.1/statuses/update.json", post(update))
            .route("/1.1/media/upload.json", post(upload))
            .with_state(base.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        ThreeLeggedProviderSession::new(
            ProviderId::Twitter,
            ProviderHttp::new(rquest::Client::new()),
            Arc::new(Signer::new("ck", CONSUMER_SECRET)),
            &base,
            &base,
            ThreeLeggedCredential::new("A1", secret),
        )
    }

    #[tokio::test]
    async fn test_user_with_valid_signature() {
        let user = session(ACCESS_SECRET).await.user().await.unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.screen_name.as_deref(), Some("ada"));
        assert_eq!(user.favourites_count, 0);
    }

    #[tokio::test]
    async fn test_wrong_secret_is_provider_rejected() {
        let err = session("stolen").await.user().await.unwrap_err();
        let Fault::ProviderRejected(reason) = err else {
            panic!("expected provider rejection, got {err:?}");
        };
        assert!(reason.contains("Could not authenticate you."));
    }

    #[tokio::test]
    async fn test_publish_text_signs_form_params() {
        let s = session(ACCESS_SECRET).await;
        let out = s
            .publish(&PublishRequest::text("Hello Ladies + Gentlemen!"))
            .await
            .unwrap();
        assert_eq!(out.id, "1001-none");
    }

    #[tokio::test]
    async fn test_publish_photo_uploads_then_updates() {
        let s = session(ACCESS_SECRET).await;
        let req = PublishRequest {
            kind: PublishType::Photo,
            message: Some("look".into()),
            title: None,
            media: Some(MediaUpload {
                file_name: "pic.png".into(),
                bytes: vec![0x89, 0x50],
            }),
        };
        assert_eq!(s.publish(&req).await.unwrap().id, "1001-77");
    }
}
