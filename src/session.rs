use crate::error::{ReconcilerError, Result};
use crate::schema::UserRecord;
use log::info;

/// Who is signed in. Starts empty; `logout` returns it to empty.
#[derive(Debug, Clone, Default)]
pub struct Session {
    active_user: Option<UserRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact match on `User` and `Password` against the users table.
    /// A failed attempt leaves any current user in place.
    pub fn login(&mut self, users: &[UserRecord], user: &str, password: &str) -> Result<&UserRecord> {
        if user.is_empty() || password.is_empty() {
            return Err(ReconcilerError::MissingCredentials);
        }

        let found = users
            .iter()
            .find(|u| u.user == user && u.password == password)
            .ok_or(ReconcilerError::InvalidCredentials)?;

        info!("User '{}' signed in", found.user);
        Ok(self.active_user.insert(found.clone()))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.active_user.take() {
            info!("User '{}' signed out", user.user);
        }
    }

    pub fn active_user(&self) -> Option<&UserRecord> {
        self.active_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.active_user.is_some()
    }

    /// Guard for pages that need a signed-in user.
    pub fn require_user(&self) -> Result<&UserRecord> {
        self.active_user.as_ref().ok_or(ReconcilerError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<UserRecord> {
        vec![
            UserRecord {
                name: Some("Ana".to_string()),
                user: "ana".to_string(),
                password: "1234".to_string(),
            },
            UserRecord {
                name: None,
                user: "bruno".to_string(),
                password: "abcd".to_string(),
            },
        ]
    }

    #[test]
    fn test_login_lifecycle() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_user(), Err(ReconcilerError::NotAuthenticated)));

        let user = session.login(&users(), "bruno", "abcd").unwrap();
        assert_eq!(user.user, "bruno");
        assert!(session.is_authenticated());
        assert_eq!(session.require_user().unwrap().user, "bruno");

        session.logout();
        assert!(session.active_user().is_none());
    }

    #[test]
    fn test_login_rejections() {
        let mut session = Session::new();
        assert!(matches!(
            session.login(&users(), "", "1234"),
            Err(ReconcilerError::MissingCredentials)
        ));
        assert!(matches!(
            session.login(&users(), "ana", "abcd"),
            Err(ReconcilerError::InvalidCredentials)
        ));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_with_leading_zero_password() {
        let users = crate::schema::parse_users("Name,User,Password\nAna,ana,0123\n", "Users").unwrap();
        let mut session = Session::new();
        assert_eq!(session.login(&users, "ana", "0123").unwrap().user, "ana");
        assert!(matches!(
            session.login(&users, "ana", "123"),
            Err(ReconcilerError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_last_login_wins() {
        let mut session = Session::new();
        session.login(&users(), "ana", "1234").unwrap();
        session.login(&users(), "bruno", "abcd").unwrap();
        assert_eq!(session.active_user().unwrap().user, "bruno");

        assert!(session.login(&users(), "ana", "wrong").is_err());
        assert_eq!(session.active_user().unwrap().user, "bruno");
    }
}
