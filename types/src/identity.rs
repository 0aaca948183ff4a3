use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Opaque token for an externally managed account.
///
/// Identity resolution happens upstream; this crate never looks inside the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalIdentity(String);

impl ExternalIdentity {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExternalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExternalIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ExternalIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}
