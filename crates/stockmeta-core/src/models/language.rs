use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Record languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Tr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
        }
    }

    /// Name used inside translation instructions
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Tr => "Türkçe",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "tr" | "turkish" | "türkçe" => Ok(Language::Tr),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}
