// API client module: builds the authenticated requests for the expense
// endpoints and sends them through a `Transport`. The transport is a trait so
// tests can count and inspect requests without touching the network.

use crate::config::{AuthContext, Settings};
use crate::expense::{ExpenseCreateRequest, ExpenseDeleteRequest, ExpenseListQuery};
use crate::outcome::UnexpectedBody;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Request};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_LENGTH, COOKIE};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
pub const X_CSRF_TOKEN: &str = "x-csrf-token";
pub const X_REQUESTED_WITH: &str = "x-requested-with";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error, status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response is not valid JSON: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    #[error(transparent)]
    UnexpectedBody(#[from] UnexpectedBody),
    #[error("{0} contains characters not allowed in an HTTP header")]
    InvalidHeader(&'static str),
    #[error("invalid API base URL `{0}`")]
    BaseUrl(String),
}

/// Status and raw body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

/// Performs exactly one HTTP exchange per call.
pub trait Transport {
    fn execute(&self, request: Request) -> Result<Reply, ApiError>;
}

/// The real transport: reqwest's blocking client, with a spinner on stderr
/// while the call is in flight.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: Request) -> Result<Reply, ApiError> {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("{} {}", request.method(), request.url().path()));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.client.execute(request);
        spinner.finish_and_clear();

        let res = result?;
        let status = res.status();
        let body = res.text()?;
        Ok(Reply { status, body })
    }
}

/// Builds requests against the expense API. Holds the reqwest client used to
/// assemble requests, the base URL and the credentials attached to every call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: AuthContext,
}

impl ApiClient {
    pub fn new(client: Client, base_url: impl Into<String>, auth: AuthContext) -> Self {
        ApiClient {
            client,
            base_url: base_url.into(),
            auth,
        }
    }

    /// Build a client from loaded settings with a default reqwest client.
    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self::new(
            client,
            settings.api_url.clone(),
            settings.auth.clone(),
        ))
    }

    /// Underlying reqwest client, shared with `HttpTransport`.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Headers every request carries.
    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(
            HeaderName::from_static(X_CSRF_TOKEN),
            HeaderValue::from_str(&self.auth.csrf_token)
                .map_err(|_| ApiError::InvalidHeader("X_CSRF_TOKEN"))?,
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&self.auth.cookie_header())
                .map_err(|_| ApiError::InvalidHeader("session cookie"))?,
        );
        headers.insert(
            HeaderName::from_static(X_REQUESTED_WITH),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        Ok(headers)
    }

    /// Base URL with `segments` appended as individually encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let bad = || ApiError::BaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| bad())?;
        url.path_segments_mut()
            .map_err(|_| bad())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `POST create_expense` with a form-url-encoded body.
    pub fn create_expense(&self, expense: &ExpenseCreateRequest) -> Result<Request, ApiError> {
        let url = self.endpoint(&["create_expense"])?;
        let req = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .form(&expense.form())
            .build()?;
        Ok(req)
    }

    /// `POST delete_expense/{id}`. The API deletes through POST, not DELETE.
    pub fn delete_expense(&self, expense: &ExpenseDeleteRequest) -> Result<Request, ApiError> {
        let url = self.endpoint(&["delete_expense", &expense.id])?;
        let req = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .header(CONTENT_LENGTH, HeaderValue::from_static("0"))
            .build()?;
        Ok(req)
    }

    /// `GET get_expenses` with the query appended to the URL.
    pub fn list_expenses(&self, query: &ExpenseListQuery) -> Result<Request, ApiError> {
        let url = self.endpoint(&["get_expenses"])?;
        let req = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(query)
            .build()?;
        Ok(req)
    }
}

/// Send one request and parse its body as JSON. A non-success status fails
/// before the body is looked at.
pub fn send_json(transport: &dyn Transport, request: Request) -> Result<Value, ApiError> {
    debug!(method = %request.method(), url = %request.url(), "sending request");
    let reply = transport.execute(request)?;
    if !reply.status.is_success() {
        warn!(status = %reply.status, "request rejected");
        return Err(ApiError::Status(reply.status));
    }
    let data = serde_json::from_str(&reply.body)?;
    Ok(data)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::args::FlagArgs;
    use chrono::NaiveDate;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Method;

    fn header<'a>(req: &'a Request, name: &str) -> &'a str {
        req.headers().get(name).unwrap().to_str().unwrap()
    }

    fn assert_auth_headers(req: &Request) {
        assert_eq!(header(req, "accept"), ACCEPT_JSON);
        assert_eq!(header(req, "x-csrf-token"), "csrf-abc");
        assert_eq!(
            header(req, "cookie"),
            "user_credentials=cred; swdid=dev; _splitwise_session=sess"
        );
        assert_eq!(header(req, "x-requested-with"), "XMLHttpRequest");
    }

    fn create_args(extra: &[&str]) -> FlagArgs {
        let mut tokens = vec![
            "--cost", "22", "--currency_code", "CAD", "--group_id", "0",
            "--user_id1", "16073027", "--paid_share1", "22.00", "--owed_share1", "11.00",
            "--user_id2", "22088182", "--paid_share2", "0.00", "--owed_share2", "11.00",
            "--description", "Test lunch",
        ];
        tokens.extend_from_slice(extra);
        FlagArgs::new(tokens)
    }

    #[test]
    fn create_request_has_form_body_in_field_order() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        let expense = ExpenseCreateRequest::from_args(&create_args(&[]), day).unwrap();
        let req = client().create_expense(&expense).unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.url().as_str(), "https://api.test/api/v3.0/create_expense");
        assert_auth_headers(&req);
        assert_eq!(
            header(&req, CONTENT_TYPE.as_str()),
            "application/x-www-form-urlencoded"
        );

        let body = pairs(&body_of(&req));
        let keys: Vec<&str> = body.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "cost",
                "currency_code",
                "group_id",
                "description",
                "creation_method",
                "date",
                "users__0__user_id",
                "users__0__paid_share",
                "users__0__owed_share",
                "users__1__user_id",
                "users__1__paid_share",
                "users__1__owed_share",
            ]
        );
        assert!(body.contains(&("description".into(), "Test lunch".into())));
        assert!(body.contains(&("creation_method".into(), "equal".into())));
        assert!(body.contains(&("date".into(), "2024-12-29".into())));
        assert!(body.contains(&("users__1__owed_share".into(), "11.00".into())));
    }

    #[test]
    fn create_request_appends_category() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 29).unwrap();
        let expense =
            ExpenseCreateRequest::from_args(&create_args(&["--category_id", "18"]), day).unwrap();
        let body = pairs(&body_of(&client().create_expense(&expense).unwrap()));
        assert_eq!(body.last(), Some(&("category_id".into(), "18".into())));
    }

    #[test]
    fn delete_request_puts_id_in_path() {
        let req = client()
            .delete_expense(&ExpenseDeleteRequest { id: "3503931874".into() })
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.url().as_str(),
            "https://api.test/api/v3.0/delete_expense/3503931874"
        );
        assert_eq!(header(&req, "content-length"), "0");
        assert!(req.body().is_none());
        assert_auth_headers(&req);
    }

    #[test]
    fn delete_id_is_one_encoded_segment() {
        let req = client()
            .delete_expense(&ExpenseDeleteRequest { id: "1/../2".into() })
            .unwrap();
        assert_eq!(
            req.url().path(),
            "/api/v3.0/delete_expense/1%2F..%2F2"
        );
    }

    #[test]
    fn list_request_query() {
        let req = client()
            .list_expenses(&ExpenseListQuery::new("22088182", "25"))
            .unwrap();
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.url().path(), "/api/v3.0/get_expenses");
        assert_eq!(
            req.url().query(),
            Some("visible=true&order=date&friend_id=22088182&limit=25&group_id=0")
        );
        assert!(req.body().is_none());
        assert_auth_headers(&req);
    }

    #[test]
    fn trailing_slash_in_base_url() {
        let api = ApiClient::new(Client::new(), "http://localhost:9000/api/", auth());
        let req = api.list_expenses(&ExpenseListQuery::new("1", "2")).unwrap();
        assert_eq!(req.url().path(), "/api/get_expenses");
    }

    #[test]
    fn bad_credentials_and_base_url_are_errors() {
        let mut creds = auth();
        creds.csrf_token = "line\nbreak".into();
        let api = ApiClient::new(Client::new(), "https://api.test", creds);
        let err = api.list_expenses(&ExpenseListQuery::new("1", "2")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(_)));

        let api = ApiClient::new(Client::new(), "not a url", auth());
        let err = api.list_expenses(&ExpenseListQuery::new("1", "2")).unwrap_err();
        assert!(matches!(err, ApiError::BaseUrl(_)));
    }

    #[test]
    fn send_json_fails_on_status_without_parsing() {
        let transport = MockTransport::new(503, "<html>down</html>");
        let req = client().list_expenses(&ExpenseListQuery::new("1", "2")).unwrap();
        let err = send_json(&transport, req).unwrap_err();
        assert!(matches!(err, ApiError::Status(s) if s.as_u16() == 503));
        assert!(err.to_string().contains("503"));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn send_json_parses_or_reports_malformed_body() {
        let transport = MockTransport::new(200, r#"{"expenses": []}"#);
        let req = client().list_expenses(&ExpenseListQuery::new("1", "2")).unwrap();
        let data = send_json(&transport, req).unwrap();
        assert_eq!(data["expenses"], serde_json::json!([]));

        let transport = MockTransport::new(200, "not json");
        let req = client().list_expenses(&ExpenseListQuery::new("1", "2")).unwrap();
        let err = send_json(&transport, req).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }
}
