use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 学员端课程列表页面
pub const SCREEN_LESSON_SEARCH: &str = "LessonSearch";
/// 教练端课程管理页面
pub const SCREEN_COACH_LESSONS: &str = "CoachLessons";

/// 安全存储中使用的固定键
pub mod keys {
    pub const PUSH_TOKEN: &str = "lessonpush.push_token";
    pub const PERMISSION_PROMPTED: &str = "lessonpush.permission_prompted";
    pub const LAST_REGISTRATION: &str = "lessonpush.last_registration";
    pub const AUTH_TOKEN: &str = "lessonpush.auth_token";
    pub const USER_ID: &str = "lessonpush.user_id";
}

/// 通知的目标角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetRole {
    Client,
    Coach,
}

impl TargetRole {
    /// Only the exact wire spellings are accepted.
    pub fn from_wire(text: &str) -> Option<Self> {
        match text {
            "CLIENT" => Some(Self::Client),
            "COACH" => Some(Self::Coach),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Coach => "COACH",
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// 规范化后的推送通知事件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub kind: String,
    pub route_hint: Option<String>,
    pub target_role: Option<TargetRole>,
    pub lesson_id: Option<i64>,
    pub client_id: Option<String>,
    pub open_modal: bool,
    pub focus_hint: Option<String>,
    pub highlight_lesson_id: Option<i64>,
    pub role_hint: Option<String>,
}

impl NotificationEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }
}

/// 当前登录会话快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub user_id: Option<String>,
    pub user_type: Option<String>,
}

impl AuthSnapshot {
    pub fn signed_in(user_id: impl Into<String>, user_type: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            user_type: Some(user_type.into()),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.user_type.is_some()
    }
}

/// 发往导航层的跳转指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationCommand {
    pub screen: String,
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl NavigationCommand {
    pub fn new(screen: impl Into<String>) -> Self {
        Self {
            screen: screen.into(),
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// 已成功注册到后端的 (用户, 设备 token) 记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistrationRecord {
    pub user_id: String,
    pub token: String,
    pub registered_at: DateTime<Utc>,
}

impl DeviceRegistrationRecord {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
            registered_at: Utc::now(),
        }
    }

    /// Identity is the (user, token) pair; the timestamp is informational.
    pub fn matches(&self, user_id: &str, token: &str) -> bool {
        self.user_id == user_id && self.token == token
    }
}

/// 设备注册请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistrationRequest {
    pub token: String,
    pub platform: String,
    pub user_type: String,
}

/// 系统通知权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// 推送子系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    pub server_url: String,
    pub platform: String,
    pub token_fetch_timeout_ms: u64,
    pub request_timeout_secs: u64,
}

impl PushConfig {
    pub fn token_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.token_fetch_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            platform: "android".to_string(),
            token_fetch_timeout_ms: 3500,
            request_timeout_secs: 30,
        }
    }
}
