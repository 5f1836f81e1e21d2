use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod device_commands;
mod route_command;

#[derive(Parser)]
#[command(name = "lessonpush-cli")]
#[command(about = "Lessonpush notification routing CLI")]
struct Cli {
    /// Backend base URL (defaults to LESSONPUSH_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Path of the JSON store file (defaults to LESSONPUSH_STORE)
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a notification payload through the router
    Route(route_command::RouteArgs),
    /// Device token management
    Device {
        #[command(subcommand)]
        action: device_commands::DeviceAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Route(args) => route_command::handle_route_command(args)?,
        Commands::Device { action } => {
            let push_config = config::push_config_from_env(cli.server)?;
            let store_path = config::store_path(cli.store);
            debug!(server = %push_config.server_url, store = %store_path.display(), "loaded push config");
            device_commands::handle_device_command(&push_config, store_path, action).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_commands::DeviceAction;

    #[test]
    fn test_cli_parsing_route() {
        let args = vec![
            "lessonpush-cli",
            "route",
            "--payload",
            r#"{"type":"LESSON_UPDATED","lessonId":"42"}"#,
            "--user-id",
            "7",
            "--user-type",
            "client",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Route(route) => {
                assert_eq!(route.user_id.as_deref(), Some("7"));
                assert_eq!(route.user_type.as_deref(), Some("client"));
                assert!(!route.nav_not_ready);
                assert!(!route.cold_start);
            }
            _ => panic!("Expected route command"),
        }
    }

    #[test]
    fn test_cli_parsing_device_register() {
        let args = vec![
            "lessonpush-cli",
            "--server",
            "http://localhost:8080",
            "device",
            "register",
            "--push-token",
            "tokenA",
            "--force",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.server.as_deref(), Some("http://localhost:8080"));

        match cli.command {
            Commands::Device {
                action:
                    DeviceAction::Register {
                        push_token,
                        user_type,
                        force,
                        ..
                    },
            } => {
                assert_eq!(push_token, "tokenA");
                assert_eq!(user_type, "client");
                assert!(force);
            }
            _ => panic!("Expected device register command"),
        }
    }

    #[test]
    fn test_cli_parsing_device_group() {
        for (name, expect_show) in [("show", true), ("forget", false)] {
            let cli = Cli::try_parse_from(["lessonpush-cli", "device", name]).unwrap();
            match cli.command {
                Commands::Device { action: DeviceAction::Show } => assert!(expect_show),
                Commands::Device { action: DeviceAction::Forget } => assert!(!expect_show),
                _ => panic!("Expected device {name} command"),
            }
        }

        let cli = Cli::try_parse_from([
            "lessonpush-cli", "device", "sync", "--push-token", "tokenA", "--user-type", "coach",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Device { action: DeviceAction::Sync { ref user_type, force: false, .. } }
                if user_type == "coach"
        ));

        // the device actions are not top-level commands
        assert!(Cli::try_parse_from(["lessonpush-cli", "register", "--push-token", "t"]).is_err());
        assert!(Cli::try_parse_from(["lessonpush-cli", "store"]).is_err());
    }

    #[test]
    fn test_cli_requires_payload() {
        let args = vec!["lessonpush-cli", "route"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_route_command_runs() {
        let args = route_command::RouteArgs {
            payload: r#"{"type":"UNKNOWN_KIND","route":"Analytics"}"#.to_string(),
            user_id: Some("7".to_string()),
            user_type: Some("client".to_string()),
            nav_not_ready: false,
            cold_start: true,
        };
        assert!(route_command::handle_route_command(args).is_ok());
    }

    #[test]
    fn test_route_command_rejects_bad_json() {
        let args = route_command::RouteArgs {
            payload: "{not json".to_string(),
            user_id: None,
            user_type: None,
            nav_not_ready: true,
            cold_start: false,
        };
        assert!(route_command::handle_route_command(args).is_err());
    }
}
