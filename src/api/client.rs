use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use super::error::ApiError;
use super::types::{
    decode_payload, ClassReportQuery, ErrorBody, LoginRequest, LoginResponse, LookupOutcome,
    LookupQuery, LookupRequest, PublishedExam,
};
use crate::config::ApiConfig;
use crate::scoring::StudentExamResult;

const USER_AGENT: &str = concat!("exam-results/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the school results API.
///
/// Every call is a single request: nothing is retried or cached.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client from the API config, optionally authenticated with a bearer token
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self, ApiError> {
        let timeout = config.timeout_duration().map_err(ApiError::Config)?;
        Self::with_timeout(&config.base_url, timeout, token)
    }

    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        token: Option<String>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `GET /exams/published`
    pub async fn list_published_exams(&self) -> Result<Vec<PublishedExam>, ApiError> {
        let url = self.url("exams/published");
        debug!(%url, "listing published exams");
        let request = self.authorize(self.http.get(&url));
        let exams: Option<Vec<PublishedExam>> = send(request).await?;
        Ok(exams.unwrap_or_default())
    }

    /// `POST /results/lookup`. An empty answer means no student matched.
    pub async fn lookup_result(&self, query: &LookupQuery) -> Result<LookupOutcome, ApiError> {
        let url = self.url("results/lookup");
        debug!(%url, exam_id = query.exam_id, "looking up result");
        let request = self.http.post(&url).json(&LookupRequest::from(query));
        let result: Option<StudentExamResult> = send(request).await?;
        Ok(match result {
            Some(result) => LookupOutcome::Found(Box::new(result)),
            None => LookupOutcome::NotFound,
        })
    }

    /// `GET /results/class-report`, ranked by the server
    pub async fn class_report(
        &self,
        query: &ClassReportQuery,
    ) -> Result<Vec<StudentExamResult>, ApiError> {
        let url = self.url("results/class-report");
        debug!(
            %url,
            exam_id = query.exam_id,
            class_id = query.class_id,
            section_id = query.section_id,
            session_id = query.session_id,
            "fetching class report"
        );
        let request = self.authorize(self.http.get(&url).query(query));
        let results: Option<Vec<StudentExamResult>> = send(request).await?;
        Ok(results.unwrap_or_default())
    }

    /// `POST /auth/login`, returning the issued token
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let url = self.url("auth/login");
        debug!(%url, username, "signing in");
        let request = self.http.post(&url).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });
        let response: Option<LoginResponse> = send(request).await?;
        response
            .map(|r| r.token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Decode("login response did not contain a token".to_string()))
    }
}

/// Send a request and decode its body. Non-2xx responses become
/// `ApiError::Server` carrying the server's message when it sent one.
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<Option<T>, ApiError> {
    let response = request.send().await.map_err(ApiError::Transport)?;
    let status = response.status();
    let body = response.text().await?;
    trace!(status = status.as_u16(), bytes = body.len(), "response received");

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    decode_payload(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout: None,
        }
    }

    #[test]
    fn test_url_join() {
        let client = ApiClient::new(&config("http://localhost:8000/api/"), None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/exams/published"), "http://localhost:8000/api/exams/published");
        assert_eq!(client.url("results/lookup"), "http://localhost:8000/api/results/lookup");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = ApiClient::new(&config("localhost:8000"), None).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_timeout() {
        let cfg = ApiConfig {
            base_url: "http://localhost".to_string(),
            timeout: Some("soon".to_string()),
        };
        assert!(matches!(ApiClient::new(&cfg, None), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_authenticated_flag() {
        let anonymous = ApiClient::new(&config("http://localhost"), None).unwrap();
        assert!(!anonymous.is_authenticated());
        let signed_in = ApiClient::new(&config("http://localhost"), Some("t".to_string())).unwrap();
        assert!(signed_in.is_authenticated());
    }

    /// Address of a port that was just released, so nothing is listening
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    /// Serve `body` with a 200 on every endpoint the client calls
    async fn serve_body(body: &'static str) -> String {
        let app = axum::Router::new()
            .route("/results/lookup", axum::routing::post(move || async move { body }))
            .route("/exams/published", axum::routing::get(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn query() -> LookupQuery {
        LookupQuery {
            exam_id: 1,
            roll_number: "R045".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(2010, 5, 12).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client =
            ApiClient::with_timeout(&closed_port_url(), Duration::from_secs(2), None).unwrap();
        let err = client.list_published_exams().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn test_failure_envelope_is_not_a_missing_result() {
        let base = serve_body(r#"{"success": false, "message": "Database unavailable"}"#).await;
        let client = ApiClient::with_timeout(&base, Duration::from_secs(5), None).unwrap();

        let err = client.lookup_result(&query()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        let err = client.list_published_exams().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_envelope_is_a_missing_result() {
        let base = serve_body(r#"{"data": null}"#).await;
        let client = ApiClient::with_timeout(&base, Duration::from_secs(5), None).unwrap();
        assert_eq!(client.lookup_result(&query()).await.unwrap(), LookupOutcome::NotFound);
    }
}
