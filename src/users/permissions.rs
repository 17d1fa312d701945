use std::collections::BTreeSet;
use std::fmt;

/// Stored on a user when the create request leaves `permissions` empty.
pub const DEFAULT_PERMISSIONS: &str = "PUT,DELETE";

/// An action a user record can allow against itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Put,
    Delete,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Put => "PUT",
            Capability::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed form of the comma-separated `permissions` column.
///
/// Tokens are trimmed and matched exactly, so `"PUTX"` does not grant `PUT`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.0.contains(capability.as_str())
    }
}
