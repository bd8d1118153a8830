//! HTTP gateway to a remote civicpulse API server.

use std::time::Duration;

use async_trait::async_trait;
use civicpulse_common::{
    AppError, AppResult,
    config::{BackendConfig, BackendEndpoint},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::gateway::{ReportFilters, ReportGateway};
use crate::model::{
    CommunityReport, PersonalReport, Report, ReportDraft, ReportUpdate, UpvoteState,
};
use crate::services::{Session, SigninInput, SignupInput};

/// Header carrying the deployment's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// [`ReportGateway`] over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    api_key: String,
    token: Option<String>,
}

impl HttpGateway {
    /// Gateway for one backend endpoint.
    pub fn new(endpoint: &BackendEndpoint, timeout: Duration) -> AppResult<Self> {
        let mut base_url = Url::parse(&endpoint.url)
            .map_err(|e| AppError::Config(format!("Invalid backend URL {}: {e}", endpoint.url)))?;
        // Relative joins must append to the API prefix, not replace it
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key: endpoint.api_key.clone(),
            token: None,
        })
    }

    /// Gateway for the configured environment.
    pub fn from_config(config: &BackendConfig) -> AppResult<Self> {
        tracing::info!(
            environment = ?config.environment,
            url = %config.active().url,
            "Using backend"
        );
        Self::new(config.active(), Duration::from_secs(config.timeout_secs))
    }

    /// Use `token` as the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Replace or clear the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Create an account and keep its token.
    pub async fn signup(&mut self, input: &SignupInput) -> AppResult<Session> {
        let session: Session = self
            .send(self.request(Method::POST, "auth/signup")?.json(input))
            .await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    /// Sign in and keep the token.
    pub async fn signin(&mut self, input: &SigninInput) -> AppResult<Session> {
        let session: Session = self
            .send(self.request(Method::POST, "auth/signin")?.json(input))
            .await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid request path {path}: {e}")))?;

        let mut request = self.client.request(method, url);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AppResult<T> {
        let response = self.execute(request).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Malformed response body: {e}")))?;
        Ok(envelope.data)
    }

    async fn send_empty(&self, request: RequestBuilder) -> AppResult<()> {
        self.execute(request).await?;
        Ok(())
    }

    async fn execute(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Backend request failed");
            AppError::Network(e.to_string())
        })?;

        if response.status().is_success() {
            return Ok(response);
        }
        Err(error_from(response).await)
    }
}

async fn error_from(response: Response) -> AppError {
    let status = response.status();
    tracing::debug!(status = %status, url = %response.url(), "Backend returned an error");

    if status == StatusCode::UNAUTHORIZED {
        return AppError::Unauthorized;
    }

    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => AppError::from_code(&envelope.error.code, envelope.error.message),
        Err(_) if status.is_server_error() => {
            AppError::Network(format!("Backend unavailable ({status})"))
        }
        Err(_) => AppError::Internal(format!("Unexpected backend response ({status})")),
    }
}

#[async_trait]
impl ReportGateway for HttpGateway {
    async fn fetch_personal(&self, user_id: &str) -> AppResult<Vec<PersonalReport>> {
        self.send(self.request(Method::GET, &format!("users/{user_id}/reports"))?)
            .await
    }

    async fn fetch_community(&self, filters: &ReportFilters) -> AppResult<Vec<CommunityReport>> {
        self.send(
            self.request(Method::GET, "reports/community")?
                .query(filters),
        )
        .await
    }

    async fn create_personal(&self, draft: &ReportDraft) -> AppResult<PersonalReport> {
        self.send(self.request(Method::POST, "reports/personal")?.json(draft))
            .await
    }

    async fn create_community(&self, draft: &ReportDraft) -> AppResult<CommunityReport> {
        self.send(self.request(Method::POST, "reports/community")?.json(draft))
            .await
    }

    async fn toggle_upvote(&self, report_id: &str, user_id: &str) -> AppResult<UpvoteState> {
        tracing::debug!(report_id = %report_id, user_id = %user_id, "Toggling upvote");
        self.send(self.request(Method::POST, &format!("reports/{report_id}/upvote"))?)
            .await
    }

    async fn update_report(&self, report_id: &str, update: &ReportUpdate) -> AppResult<Report> {
        self.send(
            self.request(Method::PATCH, &format!("reports/{report_id}"))?
                .json(update),
        )
        .await
    }

    async fn delete_report(&self, report_id: &str) -> AppResult<()> {
        self.send_empty(self.request(Method::DELETE, &format!("reports/{report_id}"))?)
            .await
    }
}
