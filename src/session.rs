//! Signed-in session, passed explicitly to the views that need it

use crate::models::User;

/// Capability: "is there a current user"
pub trait SessionProvider {
    fn current_user(&self) -> Option<&User>;

    fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn new(user: Option<User>) -> Self {
        Self { user }
    }

    /// Sign in with a display name. Blank names are rejected.
    pub fn sign_in(&mut self, name: &str, email: &str) -> Result<&User, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Please enter your name".to_string());
        }
        let email = email.trim();
        if !email.is_empty() && !email.contains('@') {
            return Err("Please enter a valid email".to_string());
        }

        log::info!("Signed in as {}", name);
        Ok(self.user.insert(User {
            name: name.to_string(),
            email: email.to_string(),
            signed_in_at: chrono::Utc::now(),
        }))
    }

    pub fn sign_out(&mut self) -> Option<User> {
        let user = self.user.take();
        if let Some(ref u) = user {
            log::info!("Signed out {}", u.name);
        }
        user
    }
}

impl SessionProvider for Session {
    fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// User to persist in config: the current one when "remember me" is on
pub fn remembered_user(session: &dyn SessionProvider, remember: bool) -> Option<User> {
    if remember {
        session.current_user().cloned()
    } else {
        None
    }
}
