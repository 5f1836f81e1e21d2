pub mod device;
pub mod parser;
pub mod platform;
pub mod policy;
pub mod readiness;
pub mod router;
pub mod slot;
pub mod store;

pub use device::{DeviceRegistrar, DeviceTokenManager};
pub use parser::parse_payload;
pub use platform::{PlatformError, PushPlatform, StaticPushPlatform};
pub use policy::{Decision, SessionRole};
pub use readiness::{AuthSnapshotProvider, NavigationGate, NavigationSink, SessionAuth};
pub use router::{DispatchRouter, Outcome, RouterState};
pub use slot::PendingEventSlot;
pub use store::{JsonFileStore, MemoryStore, SecureStore, StoreError, StoreResult};

use lessonpush_core::NavigationCommand;

/// 格式化导航指令显示
pub fn describe_command(command: &NavigationCommand) -> String {
    if command.params.is_empty() {
        return format!("→ {}", command.screen);
    }
    let params: Vec<String> = command
        .params
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    format!("→ {} ({})", command.screen, params.join(", "))
}

/// 格式化路由结果显示
pub fn describe_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Ignored => "ignored: not an actionable notification".to_string(),
        Outcome::Held => "held: waiting for session and navigation".to_string(),
        Outcome::Routed(Decision::Navigate(command)) => describe_command(command),
        Outcome::Routed(Decision::RoleFiltered) => "dropped: addressed to another role".to_string(),
        Outcome::Routed(Decision::NotForRole) => "no-op: not handled for this role".to_string(),
        Outcome::Routed(Decision::NoRoute) => "no-op: unknown kind without route".to_string(),
    }
}
