//! Credential records and portal roles.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Portal role. Each role has its own dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Teacher,
    /// Head of department.
    Hod,
    Admin,
}

impl Role {
    /// All roles in the order the login form lists them.
    pub const ALL: [Role; 4] = [Role::Student, Role::Teacher, Role::Hod, Role::Admin];

    /// Lowercase identifier used in data files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Hod => "hod",
            Role::Admin => "admin",
        }
    }

    /// Label shown on the role selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Hod => "HOD",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Case-insensitive; accepts the selector labels as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "hod" | "head of department" => Ok(Role::Hod),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A directory entry as seen by the login gate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialRecord {
    /// User ID.
    pub id: i64,
    /// Login email (lookup key).
    pub email: String,
    /// Recorded role.
    pub role: Role,
    /// Stored password digest (SHA-256 hex or Argon2id PHC string).
    pub password_hash: String,
    /// Whether the account may log in.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CredentialRecord {
    /// Create an active record.
    pub fn new(
        id: i64,
        email: impl Into<String>,
        role: Role,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            password_hash: password_hash.into(),
            is_active: true,
        }
    }

    /// Set the active flag.
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!("Student".parse::<Role>(), Ok(Role::Student));
        assert_eq!("TEACHER".parse::<Role>(), Ok(Role::Teacher));
        assert_eq!("HOD".parse::<Role>(), Ok(Role::Hod));
        assert_eq!(" admin ".parse::<Role>(), Ok(Role::Admin));
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
            assert_eq!(role.display_name().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_record_builder() {
        let record = CredentialRecord::new(7, "x@test.com", Role::Hod, "abc").with_active(false);
        assert_eq!(record.id, 7);
        assert_eq!(record.role, Role::Hod);
        assert!(!record.is_active);
    }

    #[test]
    fn test_record_deserialize_defaults_active() {
        let record: CredentialRecord = toml::from_str(
            r#"
id = 9
email = "new@test.com"
role = "Teacher"
password_hash = "abc"
"#,
        )
        .unwrap();
        assert!(record.is_active);
        assert_eq!(record.role, Role::Teacher);
    }
}
