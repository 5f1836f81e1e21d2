use anyhow::{Context, Result};
use clap::Args;
use lessonpush_client::{
    DispatchRouter, Outcome, RouterState, SessionAuth, describe_command, describe_outcome,
};
use serde_json::Value;
use tokio::sync::mpsc;

#[derive(Args)]
pub struct RouteArgs {
    /// Raw notification payload as JSON
    #[arg(long)]
    pub payload: String,
    /// User id to sign in with after delivery
    #[arg(long)]
    pub user_id: Option<String>,
    /// Session role (client or coach)
    #[arg(long)]
    pub user_type: Option<String>,
    /// Leave the navigation surface unmounted
    #[arg(long)]
    pub nav_not_ready: bool,
    /// Replay the payload as the notification that launched the app
    #[arg(long)]
    pub cold_start: bool,
}

/// Delivers the payload first, then signs in, then mounts navigation, printing
/// what the router does at every step.
pub fn handle_route_command(args: RouteArgs) -> Result<()> {
    let payload: Value =
        serde_json::from_str(&args.payload).context("payload is not valid JSON")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let auth = SessionAuth::new();
    let mut router = DispatchRouter::new();
    router.install_auth_provider(auth.clone());
    router.attach_navigator(tx);

    let outcome = if args.cold_start {
        router.handle_cold_start(Some(&payload))
    } else {
        router.handle_notification(&payload)
    };
    println!("📨 Delivered: {}", describe_outcome(&outcome));

    if let (Some(user_id), Some(user_type)) = (args.user_id, args.user_type) {
        println!("🔐 Signing in as {} ({})", user_id, user_type);
        auth.sign_in(user_id, user_type);
        if let Some(decision) = router.auth_changed() {
            println!("   {}", describe_outcome(&Outcome::Routed(decision)));
        }
    }

    if !args.nav_not_ready {
        println!("🧭 Navigation ready");
        if let Some(decision) = router.navigation_ready() {
            println!("   {}", describe_outcome(&Outcome::Routed(decision)));
        }
    }

    let mut issued = 0;
    while let Ok(command) = rx.try_recv() {
        issued += 1;
        println!("✅ {}", describe_command(&command));
        println!("{}", serde_json::to_string_pretty(&command)?);
    }
    if issued == 0 {
        println!("❌ No navigation command issued");
    }

    if router.state() == RouterState::Held {
        if let Some(event) = router.pending() {
            println!("⏳ Still pending: kind '{}'", event.kind);
        }
    }
    Ok(())
}
