//! UptimeRobot v2 API client
//!
//! Every method is a form-encoded `POST {base_url}/{method}` carrying the
//! API key. Responses share an envelope with `stat` set to `ok` or `fail`.

use crate::error::{Result, UptimeRobotError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.uptimerobot.com/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`UptimeRobotClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Form parameters for one API call
///
/// Empty strings and zero numbers are dropped; the API treats a missing
/// parameter as "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(&'static str, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.push((key, value.into()));
        self
    }

    pub fn insert_if_set(self, key: &'static str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.insert(key, value)
        }
    }

    pub fn insert_if_nonzero(self, key: &'static str, value: i64) -> Self {
        if value == 0 {
            self
        } else {
            self.insert(key, value.to_string())
        }
    }

    /// Join ids with `-`, the list separator the API uses.
    pub fn insert_ids(self, key: &'static str, ids: &[String]) -> Self {
        self.insert_if_set(key, &ids.join("-"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    stat: String,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: String,
}

/// UptimeRobot API client
#[derive(Clone)]
pub struct UptimeRobotClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for UptimeRobotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UptimeRobotClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UptimeRobotClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(UptimeRobotError::InvalidConfig(
                "API key must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Call one API method and decode the `ok` response body.
    pub async fn request<R: DeserializeOwned>(&self, method: &str, params: Params) -> Result<R> {
        let url = format!("{}/{}", self.base_url, method);

        let mut form: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("format", "json".to_string()),
        ];
        form.extend(params.0);

        tracing::debug!(method, "UptimeRobot API request");

        let response = self
            .client
            .post(&url)
            .header("cache-control", "no-cache")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(UptimeRobotError::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(e) => return Err(UptimeRobotError::Json(e)),
        };

        match envelope.stat.as_str() {
            "ok" => Ok(serde_json::from_str(&body)?),
            "fail" => {
                let error = envelope.error.unwrap_or(ApiErrorBody {
                    error_type: String::new(),
                    message: body.clone(),
                });
                tracing::debug!(method, error_type = %error.error_type, "UptimeRobot API failure");
                if error.error_type == "not_found" {
                    Err(UptimeRobotError::NotFound(error.message))
                } else {
                    Err(UptimeRobotError::Api {
                        error_type: error.error_type,
                        message: error.message,
                    })
                }
            }
            other => Err(UptimeRobotError::InvalidResponse(format!(
                "{}: unexpected stat {:?}",
                method, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Ack {
        stat: String,
    }

    async fn client_for(server: &MockServer) -> UptimeRobotClient {
        UptimeRobotClient::new(ClientConfig::new("u123-secret").with_base_url(server.uri())).unwrap()
    }

    #[test]
    fn test_params_skip_empty() {
        let params = Params::new()
            .insert("id", "1")
            .insert_if_set("friendly_name", "")
            .insert_if_nonzero("interval", 0)
            .insert_ids("alert_contacts", &["7".to_string(), "9".to_string()]);

        assert_eq!(params.get("id"), Some("1"));
        assert_eq!(params.get("friendly_name"), None);
        assert_eq!(params.get("interval"), None);
        assert_eq!(params.get("alert_contacts"), Some("7-9"));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = UptimeRobotClient::new(ClientConfig::new("  ")).unwrap_err();
        assert!(matches!(err, UptimeRobotError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_sends_api_key_and_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getAccountDetails"))
            .and(body_string_contains("api_key=u123-secret"))
            .and(body_string_contains("format=json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stat": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let ack: Ack = client
            .request("getAccountDetails", Params::new())
            .await
            .unwrap();
        assert_eq!(ack.stat, "ok");
    }

    #[tokio::test]
    async fn test_not_found_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/deleteMonitor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stat": "fail",
                "error": {"type": "not_found", "message": "monitor not found."}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .request::<Ack>("deleteMonitor", Params::new().insert("id", "1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_other_failures_keep_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/newMonitor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stat": "fail",
                "error": {
                    "type": "invalid_parameter",
                    "parameter_name": "url",
                    "message": "url is not valid"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .request::<Ack>("newMonitor", Params::new())
            .await
            .unwrap_err();
        match err {
            UptimeRobotError::Api { error_type, .. } => assert_eq!(error_type, "invalid_parameter"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client
            .request::<Ack>("getMonitors", Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UptimeRobotError::HttpStatus { status: 502, .. }));
    }
}
