// SPDX-License-Identifier: MPL-2.0
//! The closed set of locales the application ships translations for.

use crate::error::{Error, Result};
use unic_langid::LanguageIdentifier;

/// Normalizes a locale tag for comparison: ASCII-lowercased, with `_`
/// treated as `-`.
///
/// ```
/// use bunker_i18n::i18n::locale::normalize_tag;
///
/// assert_eq!(normalize_tag("zh_CN"), "zh-cn");
/// assert_eq!(normalize_tag(" EN-us "), "en-us");
/// ```
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .chars()
        .map(|c| if c == '_' { '-' } else { c.to_ascii_lowercase() })
        .collect()
}

/// Returns the primary language subtag (`en` for `en-US` or `en_US`).
pub fn primary_subtag(tag: &str) -> &str {
    let tag = tag.trim();
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Ordered, non-empty list of supported locale tags.
///
/// The first entry is the system-wide default. Order does not influence
/// matching priority except in the primary-subtag pass, where the first
/// configured entry sharing the subtag wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLocales {
    tags: Vec<String>,
}

impl SupportedLocales {
    /// Validates and wraps a list of locale tags.
    ///
    /// Every tag must parse as a language identifier, the list must not be
    /// empty and no two tags may be equal after normalization.
    pub fn new<I, S>(tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen: Vec<String> = Vec::new();
        let mut out = Vec::new();
        for tag in tags {
            let tag: String = tag.into();
            let tag = tag.trim().to_string();
            tag.parse::<LanguageIdentifier>()
                .map_err(|e| Error::Locale(format!("invalid locale tag '{}': {}", tag, e)))?;
            let normalized = normalize_tag(&tag);
            if seen.contains(&normalized) {
                return Err(Error::Locale(format!("duplicate locale tag '{}'", tag)));
            }
            seen.push(normalized);
            out.push(tag);
        }
        if out.is_empty() {
            return Err(Error::Locale("no supported locales configured".to_string()));
        }
        Ok(Self { tags: out })
    }

    pub fn default_locale(&self) -> &str {
        &self.tags[0]
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns the configured spelling of the entry equal to `tag` after
    /// normalization.
    pub fn find_exact(&self, tag: &str) -> Option<&str> {
        let wanted = normalize_tag(tag);
        self.iter().find(|candidate| normalize_tag(candidate) == wanted)
    }

    /// Returns the first entry whose primary subtag equals the primary
    /// subtag of `tag`.
    pub fn find_primary(&self, tag: &str) -> Option<&str> {
        let wanted = primary_subtag(tag);
        if wanted.is_empty() {
            return None;
        }
        self.iter()
            .find(|candidate| primary_subtag(candidate).eq_ignore_ascii_case(wanted))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.find_exact(tag).is_some()
    }
}
