//! Push token acquisition and idempotent device registration.
//!
//! Every operation here degrades to `None` / `false` on failure. Running
//! without push for a session is an acceptable state, so errors are logged
//! and absorbed instead of being handed back to the caller.

use crate::platform::PushPlatform;
use crate::store::SecureStore;
use async_trait::async_trait;
use lessonpush_core::{
    DeviceRegistrationRecord, DeviceRegistrationRequest, PushConfig, keys,
};
use lessonpush_sdk::{LessonPushClient, SdkResult};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Backend side of device registration.
#[async_trait]
pub trait DeviceRegistrar: Send + Sync {
    async fn register(
        &self,
        auth_token: &str,
        request: &DeviceRegistrationRequest,
    ) -> SdkResult<()>;
}

#[async_trait]
impl DeviceRegistrar for LessonPushClient {
    async fn register(
        &self,
        auth_token: &str,
        request: &DeviceRegistrationRequest,
    ) -> SdkResult<()> {
        self.register_device(auth_token, request).await
    }
}

pub struct DeviceTokenManager {
    store: Arc<dyn SecureStore>,
    platform: Arc<dyn PushPlatform>,
    registrar: Arc<dyn DeviceRegistrar>,
    token_fetch_timeout: Duration,
    listeners: Mutex<Vec<oneshot::Sender<String>>>,
    acquire_lock: tokio::sync::Mutex<()>,
    register_lock: tokio::sync::Mutex<()>,
}

impl DeviceTokenManager {
    pub fn new(
        store: Arc<dyn SecureStore>,
        platform: Arc<dyn PushPlatform>,
        registrar: Arc<dyn DeviceRegistrar>,
        config: &PushConfig,
    ) -> Self {
        Self {
            store,
            platform,
            registrar,
            token_fetch_timeout: config.token_fetch_timeout(),
            listeners: Mutex::new(Vec::new()),
            acquire_lock: tokio::sync::Mutex::new(()),
            register_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the push token, prompting for permission at most once per
    /// install.
    ///
    /// A token that arrives after `token_fetch_timeout` is dropped, not
    /// cached.
    pub async fn acquire_token(&self) -> Option<String> {
        let _guard = self.acquire_lock.lock().await;

        if let Some(token) = self.read(keys::PUSH_TOKEN).await {
            return Some(token);
        }

        if !self.platform.permission_status().await.is_granted() {
            if self.permission_prompted().await {
                debug!("notification permission previously declined, not prompting again");
                return None;
            }
            let status = self.platform.request_permission().await;
            self.write(keys::PERMISSION_PROMPTED, "true").await;
            if !status.is_granted() {
                info!(?status, "notification permission not granted");
                return None;
            }
        }

        let token = match tokio::time::timeout(self.token_fetch_timeout, self.platform.fetch_token()).await {
            Ok(Ok(token)) if !token.is_empty() => token,
            Ok(Ok(_)) => {
                warn!("push platform returned an empty token");
                return None;
            }
            Ok(Err(err)) => {
                warn!(error = %err, "failed to fetch push token");
                return None;
            }
            Err(_) => {
                warn!(timeout_ms = self.token_fetch_timeout.as_millis() as u64, "push token fetch timed out");
                return None;
            }
        };

        self.write(keys::PUSH_TOKEN, &token).await;
        self.notify_listeners(&token);
        Some(token)
    }

    /// Registers a one-shot listener, fired by the next successful token
    /// fetch and then discarded.
    pub fn on_token(&self) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    fn notify_listeners(&self, token: &str) {
        let listeners = std::mem::take(&mut *self.listeners.lock().unwrap_or_else(|e| e.into_inner()));
        for listener in listeners {
            // 监听方已放弃等待
            let _ = listener.send(token.to_string());
        }
    }

    /// Registers `token` for the signed-in user unless that exact
    /// (user, token) pair is already on record. `force` skips the record
    /// check.
    pub async fn register_if_needed(&self, token: &str, user_type: &str, force: bool) -> bool {
        let _guard = self.register_lock.lock().await;

        let Some(auth_token) = self.read(keys::AUTH_TOKEN).await else {
            debug!("no auth token, skipping device registration");
            return false;
        };
        let Some(user_id) = self.read(keys::USER_ID).await else {
            debug!("no user id, skipping device registration");
            return false;
        };

        if !force
            && self
                .last_registration()
                .await
                .is_some_and(|record| record.matches(&user_id, token))
        {
            debug!(%user_id, "device already registered");
            return true;
        }

        let request = DeviceRegistrationRequest {
            token: token.to_string(),
            platform: self.platform.platform_name().to_string(),
            user_type: user_type.to_string(),
        };
        if let Err(err) = self.registrar.register(&auth_token, &request).await {
            warn!(error = %err, %user_id, "device registration failed");
            return false;
        }

        let record = DeviceRegistrationRecord::new(user_id, token);
        match serde_json::to_string(&record) {
            Ok(text) => {
                self.write(keys::LAST_REGISTRATION, &text).await;
            }
            Err(err) => warn!(error = %err, "failed to encode registration record"),
        }
        info!(user_id = %record.user_id, %user_type, "device registered");
        true
    }

    /// Sign-in flow: acquire a token, then register it.
    pub async fn sync_after_sign_in(&self, user_type: &str, force: bool) -> bool {
        match self.acquire_token().await {
            Some(token) => self.register_if_needed(&token, user_type, force).await,
            None => false,
        }
    }

    /// Drops the registration record, e.g. on sign-out or account deletion.
    pub async fn forget_registration(&self) {
        if let Err(err) = self.store.remove(keys::LAST_REGISTRATION).await {
            warn!(error = %err, "failed to clear registration record");
        }
    }

    pub async fn cached_token(&self) -> Option<String> {
        self.read(keys::PUSH_TOKEN).await
    }

    pub async fn permission_prompted(&self) -> bool {
        self.read(keys::PERMISSION_PROMPTED).await.as_deref() == Some("true")
    }

    pub async fn last_registration(&self) -> Option<DeviceRegistrationRecord> {
        let text = self.read(keys::LAST_REGISTRATION).await?;
        match serde_json::from_str(&text) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable registration record");
                None
            }
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, key, "secure store read failed");
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value).await {
            warn!(error = %err, key, "secure store write failed");
        }
    }
}
