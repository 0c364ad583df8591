//! # Texture Role Classification
//!
//! Maps a texture file name to its semantic role. The role decides which
//! resolution limit applies to the file.
//!
//! Aliases are case-sensitive substrings. Roles are checked in a fixed order
//! (normal, glow, specular) and the first match wins; anything else is a
//! diffuse texture.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a texture, inferred from its file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Diffuse,
    Normal,
    Glow,
    Specular,
}

/// Ordered alias table. Earlier entries take priority.
const ROLE_ALIASES: &[(Role, &[&str])] = &[
    (Role::Normal, &["_n", "_nm", "bump", "-n", "_b", "_nrm", "normal"]),
    (Role::Glow, &["_gl", "glow"]),
    (Role::Specular, &["_spec", "_sp", "-spec", "specular"]),
];

impl Role {
    pub const ALL: [Role; 4] = [Role::Diffuse, Role::Normal, Role::Glow, Role::Specular];

    /// Classify a file name. Diffuse when no alias matches.
    pub fn classify(file_name: &str) -> Role {
        ROLE_ALIASES
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|alias| file_name.contains(alias)))
            .map(|(role, _)| *role)
            .unwrap_or(Role::Diffuse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Diffuse => "diffuse",
            Role::Normal => "normal",
            Role::Glow => "glow",
            Role::Specular => "specular",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
