use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::api::client::AttendanceApi;
use crate::api::types::{RecognitionRequest, RecognitionResponse, RosterResponse, ToggleResponse};
use crate::config::{ClientConfig, EndpointConfig};
use crate::error::{AttendanceError, Result};
use crate::model::{AttendanceId, SessionKey};

/// `AttendanceApi` over HTTP with JSON bodies.
///
/// The client keeps a cookie store so a login performed through the same
/// client carries over to attendance requests.
pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
    endpoints: EndpointConfig,
}

impl HttpAttendanceApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .cookie_store(true)
            .build()
            .map_err(|e| AttendanceError::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    fn url(&self, template: &str, params: &[(&str, &str)]) -> String {
        format!("{}{}", self.base_url, fill_template(template, params))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AttendanceError::Transport(format!(
                "server returned HTTP {status}"
            )));
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AttendanceError::Transport(format!("malformed response: {e}")))
    }
}

/// Replace `{name}` placeholders with URL-encoded values.
pub fn fill_template(template: &str, params: &[(&str, &str)]) -> String {
    params
        .iter()
        .fold(template.to_string(), |path, (name, value)| {
            path.replace(&format!("{{{name}}}"), &urlencoding::encode(value))
        })
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn toggle_attendance(
        &self,
        id: &AttendanceId,
        present: bool,
    ) -> Result<ToggleResponse> {
        let state = if present { "1" } else { "0" };
        let url = self.url(
            &self.endpoints.toggle,
            &[("record_id", id.as_str()), ("state", state)],
        );
        tracing::debug!("POST {url}");
        self.send(
            self.client
                .post(&url)
                .header(CONTENT_TYPE, "application/json"),
        )
        .await
    }

    async fn fetch_roster(&self, session: &SessionKey) -> Result<RosterResponse> {
        let url = self.url(&self.endpoints.roster, &[("session_key", session.as_str())]);
        tracing::debug!("GET {url}");
        self.send(self.client.get(&url)).await
    }

    async fn submit_capture(
        &self,
        session: &SessionKey,
        image_data: String,
    ) -> Result<RecognitionResponse> {
        let url = self.url(
            &self.endpoints.recognize,
            &[("session_key", session.as_str())],
        );
        tracing::debug!("POST {url} ({} bytes of image data)", image_data.len());
        self.send(
            self.client
                .post(&url)
                .json(&RecognitionRequest { image_data }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response and report the request head and body.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
        delay: Duration,
    ) -> (String, oneshot::Receiver<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 4096];
            let head_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    return;
                }
                raw.extend_from_slice(&chunk[..n]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&raw[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let lower = l.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            while raw.len() < head_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&raw[head_end..]).to_string();
            let _ = tx.send((head, request_body));

            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        (format!("http://{addr}"), rx)
    }

    fn api_for(base_url: String, timeout_secs: u64) -> HttpAttendanceApi {
        HttpAttendanceApi::new(&ClientConfig {
            base_url,
            request_timeout_secs: timeout_secs,
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn fill_template_encodes_values() {
        let path = fill_template(
            "/toggle-attendance/{record_id}/{state}",
            &[("record_id", "a/b c"), ("state", "1")],
        );
        assert_eq!(path, "/toggle-attendance/a%2Fb%20c/1");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = api_for("http://host:5000/".to_string(), 5);
        assert_eq!(
            api.url("/roster/{session_key}", &[("session_key", "9")]),
            "http://host:5000/roster/9"
        );
    }

    #[tokio::test]
    async fn toggle_posts_to_record_path() {
        let (base, rx) = serve_once(
            "200 OK",
            r#"{"success":true,"message":"Marked absent","is_present":false}"#,
            Duration::ZERO,
        )
        .await;
        let api = api_for(base, 5);

        let resp = api
            .toggle_attendance(&AttendanceId::new("42"), false)
            .await
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.is_present, Some(false));

        let (head, _) = rx.await.unwrap();
        assert!(head.starts_with("POST /toggle-attendance/42/0 HTTP/1.1"), "{head}");
    }

    #[tokio::test]
    async fn submit_capture_sends_image_data_body() {
        let (base, rx) = serve_once(
            "200 OK",
            r#"{"success":true,"recognized_students":[]}"#,
            Duration::ZERO,
        )
        .await;
        let api = api_for(base, 5);

        let resp = api
            .submit_capture(&SessionKey::new("17"), "data:image/jpeg;base64,QQ==".into())
            .await
            .unwrap();
        assert!(resp.success);
        assert!(resp.recognized_students.is_empty());

        let (head, body) = rx.await.unwrap();
        assert!(head.starts_with("POST /auto-attendance/17 "), "{head}");
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["image_data"], "data:image/jpeg;base64,QQ==");
    }

    #[tokio::test]
    async fn non_json_body_is_transport_error() {
        let (base, _rx) = serve_once("200 OK", "<html>login</html>", Duration::ZERO).await;
        let err = api_for(base, 5)
            .fetch_roster(&SessionKey::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Transport(ref m) if m.contains("malformed")));
    }

    #[tokio::test]
    async fn http_error_status_is_transport_error() {
        let (base, _rx) = serve_once("404 Not Found", "{}", Duration::ZERO).await;
        let err = api_for(base, 5)
            .fetch_roster(&SessionKey::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Transport(ref m) if m.contains("404")));
    }

    #[tokio::test]
    async fn hung_request_times_out() {
        let (base, _rx) = serve_once("200 OK", "{}", Duration::from_secs(5)).await;
        let err = api_for(base, 1)
            .fetch_roster(&SessionKey::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Transport(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = api_for(format!("http://{addr}"), 2)
            .fetch_roster(&SessionKey::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Transport(_)));
    }
}
