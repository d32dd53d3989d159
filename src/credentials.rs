//! Random names and passwords for a test run.

use std::fmt;

use rand::Rng;
use rand::distributions::Alphanumeric;

const SUFFIX_LEN: usize = 5;
const PASSWORD_LEN: usize = 12;

/// `len` random lowercase alphanumeric characters.
pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// `<prefix>-xxxxx`.
pub fn append_random_string(prefix: &str) -> String {
    format!("{prefix}-{}", random_suffix(SUFFIX_LEN))
}

/// Names and login for one generated cluster and its RBAC test user.
#[derive(Clone)]
pub struct Credentials {
    pub cluster_name: String,
    pub pool_name: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn random() -> Self {
        let password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PASSWORD_LEN)
            .map(char::from)
            .collect();

        Self {
            cluster_name: append_random_string("tfp"),
            pool_name: append_random_string("pool"),
            username: append_random_string("testuser"),
            password: format!("testpass-{password}"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cluster_name", &self.cluster_name)
            .field("pool_name", &self.pool_name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_suffix_is_lowercase() {
        let suffix = random_suffix(32);
        assert_eq!(suffix.len(), 32);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_random_credentials_shape() {
        let creds = Credentials::random();
        assert!(creds.cluster_name.starts_with("tfp-"));
        assert_eq!(creds.cluster_name.len(), "tfp-".len() + SUFFIX_LEN);
        assert!(creds.pool_name.starts_with("pool-"));
        assert!(creds.username.starts_with("testuser-"));
        assert_eq!(creds.password.len(), "testpass-".len() + PASSWORD_LEN);
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::random();
        let debug = format!("{creds:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&creds.password));
    }
}
