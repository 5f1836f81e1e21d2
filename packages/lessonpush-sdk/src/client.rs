use crate::error::*;
use lessonpush_core::DeviceRegistrationRequest;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Clone)]
pub struct LessonPushClient {
    client: Client,
    pub base_url: String,
    pub timeout: Duration,
}

impl LessonPushClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> SdkResult<Url> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&url)?)
    }

    /// 注册设备推送 token
    ///
    /// Any 2xx status counts as success; every other status is reported as
    /// [`SdkError::Rejected`].
    pub async fn register_device(
        &self,
        auth_token: &str,
        request: &DeviceRegistrationRequest,
    ) -> SdkResult<()> {
        let url = self.endpoint("devices/register")?;
        debug!(%url, platform = %request.platform, "registering device token");

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", auth_token))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one connection, answers with `status_line` and returns the raw request text.
    async fn one_shot_server(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn sample_request() -> DeviceRegistrationRequest {
        DeviceRegistrationRequest {
            token: "tokenA".to_string(),
            platform: "ios".to_string(),
            user_type: "client".to_string(),
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = LessonPushClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_client_url_trimming() {
        let client = LessonPushClient::new("http://localhost:3000///");
        assert_eq!(client.base_url, "http://localhost:3000");
        assert_eq!(
            client.endpoint("/devices/register").unwrap().as_str(),
            "http://localhost:3000/devices/register"
        );
    }

    #[tokio::test]
    async fn test_timeout_configuration() {
        let client = LessonPushClient::new("http://localhost:3000")
            .with_timeout(Duration::from_millis(500));
        assert_eq!(client.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_base_url() {
        let client = LessonPushClient::new("not a url");
        assert!(matches!(
            client.endpoint("devices/register"),
            Err(SdkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_sdk_error_display() {
        let error = SdkError::Rejected { status: 409 };
        assert_eq!(error.to_string(), "Server rejected request with status 409");
    }

    #[tokio::test]
    async fn test_register_device_posts_body_and_bearer() {
        let (base_url, server) = one_shot_server("HTTP/1.1 201 Created").await;
        let client = LessonPushClient::new(&base_url);

        client
            .register_device("secret-jwt", &sample_request())
            .await
            .unwrap();

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /devices/register HTTP/1.1"));
        assert!(raw.to_lowercase().contains("authorization: bearer secret-jwt"));

        let body = raw.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "token": "tokenA", "platform": "ios", "userType": "client" })
        );
    }

    #[tokio::test]
    async fn test_register_device_non_success_is_rejected() {
        let (base_url, server) = one_shot_server("HTTP/1.1 401 Unauthorized").await;
        let client = LessonPushClient::new(&base_url);

        let result = client.register_device("expired", &sample_request()).await;
        assert!(matches!(result, Err(SdkError::Rejected { status: 401 })));
        server.await.unwrap();
    }
}
