use anyhow::{Context, Result};
use clap::Subcommand;
use lessonpush_client::{DeviceTokenManager, JsonFileStore, SecureStore, StaticPushPlatform};
use lessonpush_core::{PushConfig, keys};
use lessonpush_sdk::LessonPushClient;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Subcommand)]
pub enum DeviceAction {
    /// Register a push token with the backend
    Register {
        /// Push token to register
        #[arg(long)]
        push_token: String,
        /// Session role (client or coach)
        #[arg(long, default_value = "client")]
        user_type: String,
        /// Register even if this pair is already on record
        #[arg(long)]
        force: bool,
        /// Bearer token to store before registering
        #[arg(long)]
        auth_token: Option<String>,
        /// User id to store before registering
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Run the sign-in flow: acquire a token, then register it
    Sync {
        /// Token handed out by the static push platform
        #[arg(long)]
        push_token: String,
        /// Session role (client or coach)
        #[arg(long, default_value = "client")]
        user_type: String,
        /// Register even if this pair is already on record
        #[arg(long)]
        force: bool,
    },
    /// Show the persisted push state
    Show,
    /// Forget the last registration record
    Forget,
}

fn build_manager(
    config: &PushConfig,
    store: Arc<JsonFileStore>,
    push_token: Option<String>,
) -> DeviceTokenManager {
    let platform = Arc::new(StaticPushPlatform::new(config.platform.clone(), push_token));
    let client = LessonPushClient::new(&config.server_url).with_timeout(config.request_timeout());
    DeviceTokenManager::new(store, platform, Arc::new(client), config)
}

pub async fn handle_device_command(
    config: &PushConfig,
    store_path: PathBuf,
    action: DeviceAction,
) -> Result<()> {
    let store = Arc::new(JsonFileStore::new(store_path));

    match action {
        DeviceAction::Register {
            push_token,
            user_type,
            force,
            auth_token,
            user_id,
        } => {
            if let Some(auth_token) = auth_token {
                store
                    .set(keys::AUTH_TOKEN, &auth_token)
                    .await
                    .context("failed to store auth token")?;
            }
            if let Some(user_id) = user_id {
                store
                    .set(keys::USER_ID, &user_id)
                    .await
                    .context("failed to store user id")?;
            }

            println!("📱 Registering device with {}", config.server_url);
            let manager = build_manager(config, store, None);
            if manager.register_if_needed(&push_token, &user_type, force).await {
                println!("✅ Device registered");
            } else {
                eprintln!("❌ Device registration failed");
                std::process::exit(1);
            }
        }
        DeviceAction::Sync {
            push_token,
            user_type,
            force,
        } => {
            let manager = build_manager(config, store, Some(push_token));
            if manager.sync_after_sign_in(&user_type, force).await {
                println!("✅ Push token synced");
            } else {
                eprintln!("❌ Push token sync failed");
                std::process::exit(1);
            }
        }
        DeviceAction::Show => {
            println!("📦 Store: {}", store.path().display());
            let manager = build_manager(config, store, None);
            match manager.cached_token().await {
                Some(token) => println!("   Push token: {}", token),
                None => println!("   Push token: (none)"),
            }
            println!("   Permission prompted: {}", manager.permission_prompted().await);
            match manager.last_registration().await {
                Some(record) => println!(
                    "   Last registration: user {} token {} at {}",
                    record.user_id,
                    record.token,
                    record.registered_at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => println!("   Last registration: (none)"),
            }
        }
        DeviceAction::Forget => {
            let manager = build_manager(config, store, None);
            manager.forget_registration().await;
            println!("🗑️  Registration record cleared");
        }
    }
    Ok(())
}
