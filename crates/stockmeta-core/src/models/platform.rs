use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{ADOBE_MAX_KEYWORDS, ISTOCK_MAX_KEYWORDS, SHUTTERSTOCK_MAX_KEYWORDS};

/// Marketplace keyword targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Adobe,
    Shutterstock,
    Istock,
}

impl Platform {
    /// Pipeline order
    pub const ALL: [Platform; 3] = [Platform::Adobe, Platform::Shutterstock, Platform::Istock];

    pub fn max_keywords(&self) -> usize {
        match self {
            Platform::Adobe => ADOBE_MAX_KEYWORDS,
            Platform::Shutterstock => SHUTTERSTOCK_MAX_KEYWORDS,
            Platform::Istock => ISTOCK_MAX_KEYWORDS,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Platform::Adobe => "adobe",
            Platform::Shutterstock => "shutterstock",
            Platform::Istock => "istock",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Adobe => "Adobe Stock",
            Platform::Shutterstock => "Shutterstock",
            Platform::Istock => "iStock",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adobe" | "adobe stock" => Ok(Platform::Adobe),
            "shutterstock" | "shutter" => Ok(Platform::Shutterstock),
            "istock" | "getty" => Ok(Platform::Istock),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}
