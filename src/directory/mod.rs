//! User directory.
//!
//! The login gate only needs `lookup`. `MemoryDirectory` is the in-memory
//! stand-in for a real account store: it holds the demo accounts and any
//! accounts loaded from a TOML users file.

mod record;

pub use record::{CredentialRecord, Role};

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::auth::hash_password;
use crate::config::DirectoryConfig;
use crate::{Result, SchoolError};

/// Password shared by the demo accounts.
pub const DEMO_PASSWORD: &str = "test123";

/// Source of credential records for the login gate.
pub trait UserDirectory: Send + Sync {
    /// Find the record for an email address.
    fn lookup(&self, email: &str) -> Option<CredentialRecord>;
}

impl<D: UserDirectory + ?Sized> UserDirectory for std::sync::Arc<D> {
    fn lookup(&self, email: &str) -> Option<CredentialRecord> {
        (**self).lookup(email)
    }
}

/// Layout of a users file.
#[derive(Debug, Deserialize)]
struct UsersFile {
    #[serde(default, rename = "user")]
    users: Vec<CredentialRecord>,
}

/// In-memory user directory keyed by email.
///
/// Emails are matched exactly, as the login form submits them.
#[derive(Debug, Default, Clone)]
pub struct MemoryDirectory {
    records: HashMap<String, CredentialRecord>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding the demo accounts.
    ///
    /// One active account per role plus an inactive student, all with the
    /// password [`DEMO_PASSWORD`].
    pub fn with_demo_users() -> Self {
        let digest = hash_password(DEMO_PASSWORD);
        let mut directory = Self::new();
        for record in [
            CredentialRecord::new(1, "student@test.com", Role::Student, digest.clone()),
            CredentialRecord::new(2, "teacher@test.com", Role::Teacher, digest.clone()),
            CredentialRecord::new(3, "hod@test.com", Role::Hod, digest.clone()),
            CredentialRecord::new(4, "admin@test.com", Role::Admin, digest.clone()),
            CredentialRecord::new(5, "inactive@test.com", Role::Student, digest).with_active(false),
        ] {
            directory.insert(record);
        }
        directory
    }

    /// Build the directory described by the configuration.
    pub fn from_config(config: &DirectoryConfig) -> Result<Self> {
        let mut directory = if config.seed_demo_users {
            Self::with_demo_users()
        } else {
            Self::new()
        };

        if let Some(path) = &config.users_file {
            let loaded = directory.load_file(path)?;
            info!(path = %path, count = loaded, "Loaded users file");
        }

        Ok(directory)
    }

    /// Parse a users file and add its records.
    ///
    /// ```toml
    /// [[user]]
    /// id = 10
    /// email = "jane@school.edu"
    /// role = "teacher"
    /// password_hash = "<sha-256 hex>"
    /// is_active = true
    /// ```
    pub fn load_str(&mut self, content: &str) -> Result<usize> {
        let file: UsersFile = toml::from_str(content)
            .map_err(|e| SchoolError::Validation(format!("users file parse error: {e}")))?;

        let count = file.users.len();
        for record in file.users {
            if record.email.trim().is_empty() {
                return Err(SchoolError::Validation(format!(
                    "user {} has an empty email",
                    record.id
                )));
            }
            self.insert(record);
        }
        Ok(count)
    }

    /// Read a users file from disk and add its records.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let content = std::fs::read_to_string(path)?;
        self.load_str(&content)
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, record: CredentialRecord) -> Option<CredentialRecord> {
        debug!(email = %record.email, role = %record.role, "Directory record added");
        self.records.insert(record.email.clone(), record)
    }

    /// All records ordered by ID.
    pub fn list(&self) -> Vec<&CredentialRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of active records.
    pub fn count_active(&self) -> usize {
        self.records.values().filter(|r| r.is_active).count()
    }
}

impl UserDirectory for MemoryDirectory {
    fn lookup(&self, email: &str) -> Option<CredentialRecord> {
        self.records.get(email).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use std::io::Write;

    #[test]
    fn test_demo_users() {
        let directory = MemoryDirectory::with_demo_users();
        assert_eq!(directory.len(), 5);
        assert_eq!(directory.count_active(), 4);

        let student = directory.lookup("student@test.com").unwrap();
        assert_eq!(student.id, 1);
        assert_eq!(student.role, Role::Student);
        assert!(verify_password(DEMO_PASSWORD, &student.password_hash).is_ok());

        let inactive = directory.lookup("inactive@test.com").unwrap();
        assert!(!inactive.is_active);
    }

    #[test]
    fn test_lookup_unknown() {
        let directory = MemoryDirectory::with_demo_users();
        assert!(directory.lookup("nobody@test.com").is_none());
    }

    #[test]
    fn test_list_sorted_by_id() {
        let directory = MemoryDirectory::with_demo_users();
        let ids: Vec<i64> = directory.list().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_load_str() {
        let mut directory = MemoryDirectory::new();
        let content = format!(
            r#"
[[user]]
id = 10
email = "jane@school.edu"
role = "teacher"
password_hash = "{}"

[[user]]
id = 11
email = "old@school.edu"
role = "student"
password_hash = "{}"
is_active = false
"#,
            hash_password("pw1"),
            hash_password("pw2")
        );

        assert_eq!(directory.load_str(&content).unwrap(), 2);
        assert_eq!(directory.lookup("jane@school.edu").unwrap().role, Role::Teacher);
        assert!(!directory.lookup("old@school.edu").unwrap().is_active);
    }

    #[test]
    fn test_load_str_rejects_unknown_role() {
        let mut directory = MemoryDirectory::new();
        let result = directory.load_str(
            r#"
[[user]]
id = 1
email = "x@school.edu"
role = "janitor"
password_hash = "abc"
"#,
        );
        assert!(matches!(result, Err(SchoolError::Validation(_))));
    }

    #[test]
    fn test_load_str_rejects_empty_email() {
        let mut directory = MemoryDirectory::new();
        let result = directory.load_str(
            r#"
[[user]]
id = 1
email = " "
role = "admin"
password_hash = "abc"
"#,
        );
        assert!(matches!(result, Err(SchoolError::Validation(_))));
    }

    #[test]
    fn test_from_config_with_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[[user]]\nid = 20\nemail = \"extra@school.edu\"\nrole = \"hod\"\npassword_hash = \"{}\"\n",
            hash_password("pw")
        )
        .unwrap();

        let config = DirectoryConfig {
            users_file: Some(file.path().to_string_lossy().into_owned()),
            seed_demo_users: false,
        };
        let directory = MemoryDirectory::from_config(&config).unwrap();

        assert_eq!(directory.len(), 1);
        assert!(directory.lookup("extra@school.edu").is_some());
        assert!(directory.lookup("student@test.com").is_none());
    }

    #[test]
    fn test_from_config_missing_file() {
        let config = DirectoryConfig {
            users_file: Some("does/not/exist.toml".to_string()),
            seed_demo_users: true,
        };
        assert!(matches!(
            MemoryDirectory::from_config(&config),
            Err(SchoolError::Io(_))
        ));
    }
}
