//! Kind-to-destination routing policy.
//!
//! Pure functions over an event and a session snapshot; the router decides
//! *when* to call [`resolve`], this module decides *what* it yields.

use lessonpush_core::{
    AuthSnapshot, NavigationCommand, NotificationEvent, SCREEN_COACH_LESSONS,
    SCREEN_LESSON_SEARCH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRole {
    Client,
    Coach,
}

impl SessionRole {
    pub fn from_user_type(user_type: &str) -> Option<Self> {
        if user_type.eq_ignore_ascii_case("client") {
            Some(Self::Client)
        } else if user_type.eq_ignore_ascii_case("coach") {
            Some(Self::Coach)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Destination {
    /// Client lesson search, registered tab.
    RegisteredLessons,
    /// Coach lesson management.
    CoachLessons,
}

struct KindPolicy {
    kind: &'static str,
    role: SessionRole,
    destination: Destination,
}

const POLICY_TABLE: &[KindPolicy] = &[
    KindPolicy {
        kind: "LESSON_DELETED",
        role: SessionRole::Client,
        destination: Destination::RegisteredLessons,
    },
    KindPolicy {
        kind: "LESSON_UPDATED",
        role: SessionRole::Client,
        destination: Destination::RegisteredLessons,
    },
    KindPolicy {
        kind: "CLIENT_REGISTERED",
        role: SessionRole::Coach,
        destination: Destination::CoachLessons,
    },
    KindPolicy {
        kind: "CLIENT_UNREGISTERED",
        role: SessionRole::Coach,
        destination: Destination::CoachLessons,
    },
];

/// Outcome of routing one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Navigate(NavigationCommand),
    /// `targetRole` addressed someone else.
    RoleFiltered,
    /// Known kind, but not meant for this session's role.
    NotForRole,
    /// Unknown kind and no route hint.
    NoRoute,
}

impl Decision {
    pub fn into_command(self) -> Option<NavigationCommand> {
        match self {
            Decision::Navigate(command) => Some(command),
            _ => None,
        }
    }
}

pub fn resolve(event: &NotificationEvent, snapshot: &AuthSnapshot) -> Decision {
    // Session roles compare case-insensitively everywhere: "Coach" is "coach".
    if let Some(target) = event.target_role {
        let addressed = target.as_wire().to_lowercase();
        let session = snapshot.user_type.as_deref().map(str::to_lowercase);
        if session.as_deref() != Some(addressed.as_str()) {
            return Decision::RoleFiltered;
        }
    }

    let Some(policy) = POLICY_TABLE.iter().find(|p| p.kind == event.kind) else {
        return match &event.route_hint {
            Some(route) => Decision::Navigate(NavigationCommand::new(route.clone())),
            None => Decision::NoRoute,
        };
    };

    let role = snapshot
        .user_type
        .as_deref()
        .and_then(SessionRole::from_user_type);
    if role != Some(policy.role) {
        return Decision::NotForRole;
    }

    Decision::Navigate(build_command(policy.destination, event))
}

fn build_command(destination: Destination, event: &NotificationEvent) -> NavigationCommand {
    let screen = match destination {
        Destination::RegisteredLessons => SCREEN_LESSON_SEARCH,
        Destination::CoachLessons => SCREEN_COACH_LESSONS,
    };
    let mut command = with_hints(NavigationCommand::new(screen), event);

    match destination {
        Destination::RegisteredLessons => {
            if let Some(lesson_id) = event.lesson_id {
                command = command.with_param("scrollToLessonId", lesson_id);
            }
            command.with_param("focusRegistered", true)
        }
        Destination::CoachLessons => match event.lesson_id {
            Some(lesson_id) => command
                .with_param("lessonId", lesson_id)
                .with_param("openLessonModal", true),
            None => command,
        },
    }
}

fn with_hints(mut command: NavigationCommand, event: &NotificationEvent) -> NavigationCommand {
    if let Some(focus) = &event.focus_hint {
        command = command.with_param("focus", focus.as_str());
    }
    if let Some(highlight) = event.highlight_lesson_id {
        command = command.with_param("highlightLessonId", highlight);
    }
    if let Some(role) = &event.role_hint {
        command = command.with_param("role", role.as_str());
    }
    if let Some(client_id) = &event.client_id {
        command = command.with_param("clientId", client_id.as_str());
    }
    if event.open_modal {
        command = command.with_param("openModal", true);
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonpush_core::TargetRole;
    use serde_json::json;

    fn client() -> AuthSnapshot {
        AuthSnapshot::signed_in("7", "client")
    }

    fn coach() -> AuthSnapshot {
        AuthSnapshot::signed_in("3", "coach")
    }

    fn event(kind: &str, lesson_id: Option<i64>) -> NotificationEvent {
        NotificationEvent {
            lesson_id,
            ..NotificationEvent::new(kind)
        }
    }

    #[test]
    fn test_lesson_updated_for_client() {
        let command = resolve(&event("LESSON_UPDATED", Some(42)), &client())
            .into_command()
            .unwrap();
        assert_eq!(command.screen, SCREEN_LESSON_SEARCH);
        assert_eq!(
            serde_json::Value::Object(command.params),
            json!({ "scrollToLessonId": 42, "focusRegistered": true })
        );
    }

    #[test]
    fn test_lesson_deleted_without_lesson_id() {
        let command = resolve(&event("LESSON_DELETED", None), &client())
            .into_command()
            .unwrap();
        assert_eq!(
            serde_json::Value::Object(command.params),
            json!({ "focusRegistered": true })
        );
    }

    #[test]
    fn test_client_kinds_are_noop_for_coach() {
        for kind in ["LESSON_DELETED", "LESSON_UPDATED"] {
            assert_eq!(resolve(&event(kind, Some(1)), &coach()), Decision::NotForRole);
        }
    }

    #[test]
    fn test_coach_kinds() {
        for kind in ["CLIENT_REGISTERED", "CLIENT_UNREGISTERED"] {
            let command = resolve(&event(kind, Some(9)), &coach())
                .into_command()
                .unwrap();
            assert_eq!(command.screen, SCREEN_COACH_LESSONS);
            assert_eq!(
                serde_json::Value::Object(command.params),
                json!({ "lessonId": 9, "openLessonModal": true })
            );

            assert_eq!(resolve(&event(kind, Some(9)), &client()), Decision::NotForRole);
        }
    }

    #[test]
    fn test_coach_kind_without_lesson_id_has_no_modal() {
        let command = resolve(&event("CLIENT_REGISTERED", None), &coach())
            .into_command()
            .unwrap();
        assert_eq!(command.screen, SCREEN_COACH_LESSONS);
        assert!(command.params.is_empty());
    }

    #[test]
    fn test_session_role_is_case_insensitive() {
        let snapshot = AuthSnapshot::signed_in("3", "Coach");
        assert!(matches!(
            resolve(&event("CLIENT_REGISTERED", Some(1)), &snapshot),
            Decision::Navigate(_)
        ));
    }

    #[test]
    fn test_role_filter_drops_mismatched_target() {
        let mut addressed = event("CLIENT_REGISTERED", Some(9));
        addressed.target_role = Some(TargetRole::Coach);
        assert_eq!(resolve(&addressed, &client()), Decision::RoleFiltered);

        // matching target passes through
        assert!(matches!(resolve(&addressed, &coach()), Decision::Navigate(_)));
    }

    #[test]
    fn test_role_checks_agree_on_mixed_case_session() {
        let snapshot = AuthSnapshot::signed_in("3", "Coach");
        let untargeted = event("CLIENT_REGISTERED", Some(9));
        let mut targeted = untargeted.clone();
        targeted.target_role = Some(TargetRole::Coach);

        assert_eq!(resolve(&untargeted, &snapshot), resolve(&targeted, &snapshot));
        assert!(matches!(resolve(&targeted, &snapshot), Decision::Navigate(_)));

        targeted.target_role = Some(TargetRole::Client);
        assert_eq!(resolve(&targeted, &snapshot), Decision::RoleFiltered);
    }

    #[test]
    fn test_role_filter_applies_to_every_kind() {
        for kind in ["LESSON_DELETED", "LESSON_UPDATED", "CLIENT_REGISTERED", "CLIENT_UNREGISTERED", "ANYTHING", ""] {
            let mut addressed = event(kind, Some(1));
            addressed.route_hint = Some("Analytics".to_string());

            addressed.target_role = Some(TargetRole::Client);
            assert_eq!(resolve(&addressed, &coach()), Decision::RoleFiltered);

            addressed.target_role = Some(TargetRole::Coach);
            assert_eq!(resolve(&addressed, &client()), Decision::RoleFiltered);
        }
    }

    #[test]
    fn test_unknown_kind_with_route_hint() {
        let mut unknown = event("UNKNOWN_KIND", Some(5));
        unknown.route_hint = Some("Analytics".to_string());
        unknown.focus_hint = Some("ignored".to_string());

        let command = resolve(&unknown, &client()).into_command().unwrap();
        assert_eq!(command, NavigationCommand::new("Analytics"));
    }

    #[test]
    fn test_unknown_kind_without_route_hint() {
        assert_eq!(resolve(&event("UNKNOWN_KIND", None), &client()), Decision::NoRoute);
        assert_eq!(resolve(&event("", None), &coach()), Decision::NoRoute);
    }

    #[test]
    fn test_table_kind_ignores_route_hint() {
        let mut updated = event("LESSON_UPDATED", None);
        updated.route_hint = Some("Elsewhere".to_string());
        let command = resolve(&updated, &client()).into_command().unwrap();
        assert_eq!(command.screen, SCREEN_LESSON_SEARCH);
    }

    #[test]
    fn test_hints_are_forwarded() {
        let mut hinted = event("LESSON_UPDATED", Some(4));
        hinted.focus_hint = Some("registered".to_string());
        hinted.highlight_lesson_id = Some(4);
        hinted.role_hint = Some("client".to_string());
        hinted.client_id = Some("c-1".to_string());
        hinted.open_modal = true;

        let command = resolve(&hinted, &client()).into_command().unwrap();
        assert_eq!(
            serde_json::Value::Object(command.params),
            json!({
                "focus": "registered",
                "highlightLessonId": 4,
                "role": "client",
                "clientId": "c-1",
                "openModal": true,
                "scrollToLessonId": 4,
                "focusRegistered": true,
            })
        );
    }
}
