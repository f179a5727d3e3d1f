use chrono::{Local, NaiveDateTime, Timelike};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::asset::MediaAsset;
use super::keywords::KeywordSet;
use super::language::Language;
use super::platform::Platform;

/// A text value in both record languages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Localized {
    pub en: String,
    pub tr: String,
}

impl Localized {
    pub fn new(en: impl Into<String>, tr: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            tr: tr.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Tr => &self.tr,
        }
    }

    pub fn set(&mut self, language: Language, value: impl Into<String>) {
        match language {
            Language::En => self.en = value.into(),
            Language::Tr => self.tr = value.into(),
        }
    }
}

/// One platform's keyword sets in both languages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedKeywords {
    pub en: KeywordSet,
    pub tr: KeywordSet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordsByPlatform {
    pub adobe: LocalizedKeywords,
    pub shutterstock: LocalizedKeywords,
    pub istock: LocalizedKeywords,
}

impl KeywordsByPlatform {
    pub fn get(&self, platform: Platform) -> &LocalizedKeywords {
        match platform {
            Platform::Adobe => &self.adobe,
            Platform::Shutterstock => &self.shutterstock,
            Platform::Istock => &self.istock,
        }
    }

    pub fn get_mut(&mut self, platform: Platform) -> &mut LocalizedKeywords {
        match platform {
            Platform::Adobe => &mut self.adobe,
            Platform::Shutterstock => &mut self.shutterstock,
            Platform::Istock => &mut self.istock,
        }
    }
}

/// Title and description as returned by the vision model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleDescription {
    pub title_en: String,
    pub title_tr: String,
    pub description_en: String,
    pub description_tr: String,
}

/// Full metadata for one asset, keyed by its absolute path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub path: String,
    pub file_name: String,
    pub created_at: NaiveDateTime,
    pub title: Localized,
    pub description: Localized,
    pub keywords: KeywordsByPlatform,
}

impl MetadataRecord {
    pub fn new(asset: &MediaAsset, text: TitleDescription, keywords: KeywordsByPlatform) -> Self {
        Self {
            path: asset.key(),
            file_name: asset.file_name(),
            created_at: current_minute(),
            title: Localized::new(text.title_en, text.title_tr),
            description: Localized::new(text.description_en, text.description_tr),
            keywords,
        }
    }

    /// Stamp the record with the current time, as every operator save does
    pub fn touch(&mut self) {
        self.created_at = current_minute();
    }

    /// Case-insensitive literal find & replace across every text field.
    /// Returns how many fields changed.
    pub fn replace_all(&mut self, find: &str, replacement: &str) -> usize {
        let find = find.trim();
        if find.is_empty() {
            return 0;
        }
        let Ok(pattern) = RegexBuilder::new(&regex::escape(find))
            .case_insensitive(true)
            .build()
        else {
            return 0;
        };

        let mut changed = 0;
        for text in [
            &mut self.title.en,
            &mut self.title.tr,
            &mut self.description.en,
            &mut self.description.tr,
        ] {
            if replace_in(&pattern, text, replacement) {
                changed += 1;
            }
        }

        for platform in Platform::ALL {
            let sets = self.keywords.get_mut(platform);
            for set in [&mut sets.en, &mut sets.tr] {
                let mut terms = set.terms().to_vec();
                for term in terms.iter_mut() {
                    if replace_in(&pattern, term, replacement) {
                        changed += 1;
                    }
                }
                *set = KeywordSet::unbounded(terms);
            }
        }

        changed
    }
}

fn replace_in(pattern: &Regex, text: &mut String, replacement: &str) -> bool {
    let replaced = pattern.replace_all(text, NoExpand(replacement));
    if replaced == text.as_str() {
        return false;
    }
    *text = replaced.into_owned();
    true
}

/// Local time truncated to the minute, the precision the record table keeps
fn current_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
