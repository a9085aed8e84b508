use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a platform user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: Option<String>,
    pub global_name: Option<String>,
    pub is_bot: bool,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: None,
            global_name: None,
            is_bot: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = Some(name.into());
        self
    }

    pub fn as_bot(mut self) -> Self {
        self.is_bot = true;
        self
    }

    pub fn display_name(&self) -> String {
        if let Some(ref name) = self.global_name {
            name.clone()
        } else if let Some(ref username) = self.username {
            username.clone()
        } else {
            self.id.clone()
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_global_name() {
        let user = User::new("42").with_username("herald").with_global_name("Herald");
        assert_eq!(user.display_name(), "Herald");

        let user = User::new("42").with_username("herald");
        assert_eq!(user.to_string(), "herald");

        assert_eq!(User::new("42").display_name(), "42");
    }
}
