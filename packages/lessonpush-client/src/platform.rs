use async_trait::async_trait;
use lessonpush_core::PermissionStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("push service unavailable: {0}")]
    Unavailable(String),

    #[error("token request failed: {0}")]
    TokenRequest(String),
}

/// Host push runtime: OS permission dialog and the push provider's token.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Platform tag sent with registrations, e.g. `ios` or `android`.
    fn platform_name(&self) -> &str;

    async fn permission_status(&self) -> PermissionStatus;

    /// Shows the OS permission dialog.
    async fn request_permission(&self) -> PermissionStatus;

    async fn fetch_token(&self) -> Result<String, PlatformError>;
}

/// Platform with a fixed, pre-granted token. Used by desktop harnesses where
/// no OS push runtime exists.
pub struct StaticPushPlatform {
    platform: String,
    token: Option<String>,
}

impl StaticPushPlatform {
    pub fn new(platform: impl Into<String>, token: Option<String>) -> Self {
        Self {
            platform: platform.into(),
            token,
        }
    }
}

#[async_trait]
impl PushPlatform for StaticPushPlatform {
    fn platform_name(&self) -> &str {
        &self.platform
    }

    async fn permission_status(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn request_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn fetch_token(&self) -> Result<String, PlatformError> {
        self.token
            .clone()
            .ok_or_else(|| PlatformError::Unavailable("no static token configured".to_string()))
    }
}
