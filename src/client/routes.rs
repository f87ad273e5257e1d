use crate::{auth::Session, models::users::Role};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

/// Role owning the area `path` lies in, if any.
fn required_role(path: &str) -> Option<Role> {
    let area = path.trim_start_matches('/').split('/').next().unwrap_or("");
    match area {
        "admin" => Some(Role::Admin),
        "student" => Some(Role::Student),
        "frontdesk" => Some(Role::FrontDesk),
        _ => None,
    }
}

/// Whether `session` may open `path`. Anonymous visitors of a protected area
/// go to the login page, users of another role go home.
pub fn guard(path: &str, session: Option<&Session>) -> RouteDecision {
    let role = match required_role(path) {
        Some(role) => role,
        None => return RouteDecision::Allow,
    };
    match session {
        None => RouteDecision::Redirect(LOGIN_PATH),
        Some(session) if session.role == role => RouteDecision::Allow,
        Some(_) => RouteDecision::Redirect(HOME_PATH),
    }
}

/// Landing page after login.
pub fn home_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin/dashboard",
        Role::Student => "/student/dashboard",
        Role::FrontDesk => "/frontdesk/appointments",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            token: "t".to_string(),
            user_id: 1,
            username: "u".to_string(),
            name: "U".to_string(),
            role,
        }
    }

    #[test]
    fn anonymous_users_are_sent_to_login() {
        assert_eq!(guard("/admin/appointments", None), RouteDecision::Redirect("/login"));
        assert_eq!(guard("/student", None), RouteDecision::Redirect("/login"));
        assert_eq!(guard("/login", None), RouteDecision::Allow);
        assert_eq!(guard("/", None), RouteDecision::Allow);
    }

    #[test]
    fn wrong_role_goes_home() {
        let student = session(Role::Student);
        assert_eq!(guard("/admin/records", Some(&student)), RouteDecision::Redirect("/"));
        assert_eq!(guard("/frontdesk", Some(&student)), RouteDecision::Redirect("/"));
        assert_eq!(guard("/student/pds", Some(&student)), RouteDecision::Allow);
    }

    #[test]
    fn area_is_matched_by_whole_segment() {
        let admin = session(Role::Admin);
        assert_eq!(guard("/administrator", None), RouteDecision::Allow);
        assert_eq!(guard("/admin/", Some(&admin)), RouteDecision::Allow);
    }

    #[test]
    fn every_home_passes_its_own_guard() {
        for role in [Role::Admin, Role::Student, Role::FrontDesk] {
            assert_eq!(guard(home_for(role), Some(&session(role))), RouteDecision::Allow);
        }
    }
}
