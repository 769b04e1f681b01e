//! HTTP implementation of [`ShareApi`] against the SFS v2 (Manila) API.

mod error;
mod types;

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ApiError, ApiFuture, CreateShareRequest, ShareApi};
use crate::config::SfsConfig;
use crate::lifecycle::ShareManager;
use crate::session::Session;
use crate::share::Share;
use types::{CreateShareEnvelope, ExtendEnvelope, ShareEnvelope, ShareListEnvelope};

pub use error::SetupError;

/// Client for the share endpoints of the SFS API.
#[derive(Clone, Debug)]
pub struct SfsClient {
    session: Session,
}

struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl SfsClient {
    /// Wraps an established session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Returns the session used for requests.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.session
            .http()
            .request(method, url)
            .header("X-Auth-Token", self.session.auth_token())
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder, resource: &str) -> Result<Reply, ApiError> {
        let response = builder.send().await.map_err(|err| error::transport(&err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| error::transport(&err))?
            .to_vec();
        debug!(resource, status = status.as_u16(), "SFS response received");

        if status.is_success() {
            Ok(Reply { status, body })
        } else {
            Err(error::classify(status, &body, resource))
        }
    }

    fn parse<T: DeserializeOwned>(reply: &Reply) -> Result<T, ApiError> {
        serde_json::from_slice(&reply.body).map_err(|err| error::decode(&err))
    }

    /// Addresses one share. Identifiers that would name a collection route
    /// instead of a share cannot exist, so they read as absent.
    fn share_url(&self, share_id: &str, action: Option<&str>) -> Result<Url, ApiError> {
        if matches!(share_id.trim(), "" | "." | ".." | "detail") {
            return Err(ApiError::NotFound {
                resource: share_id.to_owned(),
            });
        }
        Ok(match action {
            Some(action) => self.session.shares_url(&[share_id, action]),
            None => self.session.shares_url(&[share_id]),
        })
    }
}

impl ShareApi for SfsClient {
    fn create_share<'a>(&'a self, request: &'a CreateShareRequest) -> ApiFuture<'a, Share> {
        Box::pin(async move {
            let url = self.session.shares_url(&[]);
            let builder = self
                .request(Method::POST, url)
                .json(&CreateShareEnvelope::from(request));
            let reply = self.send(builder, &request.name).await?;
            let envelope: ShareEnvelope = Self::parse(&reply)?;
            Share::try_from(envelope.share)
        })
    }

    fn get_share<'a>(&'a self, share_id: &'a str) -> ApiFuture<'a, Share> {
        Box::pin(async move {
            let url = self.share_url(share_id, None)?;
            let reply = self.send(self.request(Method::GET, url), share_id).await?;
            let envelope: ShareEnvelope = Self::parse(&reply)?;
            Share::try_from(envelope.share)
        })
    }

    fn list_shares_by_name<'a>(&'a self, name: &'a str) -> ApiFuture<'a, Vec<Share>> {
        Box::pin(async move {
            let url = self.session.shares_url(&["detail"]);
            let builder = self.request(Method::GET, url).query(&[("name", name)]);
            let reply = self.send(builder, name).await?;
            let envelope: ShareListEnvelope = Self::parse(&reply)?;
            envelope
                .shares
                .into_iter()
                .map(Share::try_from)
                .collect::<Result<Vec<_>, _>>()
        })
    }

    fn expand_share<'a>(&'a self, share_id: &'a str, new_size_gib: u32) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.share_url(share_id, Some("action"))?;
            let builder = self
                .request(Method::POST, url)
                .json(&ExtendEnvelope::new(new_size_gib));
            let reply = self.send(builder, share_id).await?;
            debug!(share_id, status = reply.status.as_u16(), "expand accepted");
            Ok(())
        })
    }

    fn delete_share<'a>(&'a self, share_id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = self.share_url(share_id, None)?;
            let reply = self.send(self.request(Method::DELETE, url), share_id).await?;
            debug!(share_id, status = reply.status.as_u16(), "delete accepted");
            Ok(())
        })
    }
}

impl ShareManager<SfsClient> {
    /// Builds a manager talking to SFS from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::Config`] when validation fails and
    /// [`SetupError::Session`] when the session cannot be established.
    pub fn from_config(config: &SfsConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let session = Session::new(
            &config.endpoint_url(),
            &config.project_id,
            config.credentials(),
        )?;
        Ok(Self::new(SfsClient::new(session), config.settings()))
    }
}
