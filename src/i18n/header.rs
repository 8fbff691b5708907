// SPDX-License-Identifier: MPL-2.0
//! Weighted language-preference header parsing and matching.
//!
//! Parses `Accept-Language`-style values such as `zh-CN,zh;q=0.9,en;q=0.8`
//! into a [`PreferenceList`] and picks the best supported locale for it.
//! Parsing is lenient: malformed weights become `1.0`, unsupported tags and
//! the `*` wildcard are skipped, and an empty value short-circuits to the
//! caller's fallback.

use super::locale::SupportedLocales;

/// Weight assigned to entries without a usable `q` parameter.
pub const DEFAULT_WEIGHT: f32 = 1.0;

const WILDCARD: &str = "*";

/// One `(tag, weight)` entry of a preference header.
#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    pub tag: String,
    pub weight: f32,
}

/// Preference entries ordered by descending weight, ties kept in header
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceList {
    entries: Vec<Preference>,
}

impl PreferenceList {
    pub fn parse(raw: &str) -> Self {
        let mut entries: Vec<Preference> = raw.split(',').filter_map(parse_segment).collect();
        // `sort_by` is stable, so equal weights keep their header order.
        entries.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the supported locale for the highest ranked entry that
    /// matches, trying an exact match before a primary-subtag match for
    /// each entry.
    pub fn best_match<'a>(&self, supported: &'a SupportedLocales) -> Option<&'a str> {
        self.entries.iter().find_map(|pref| {
            let found = supported
                .find_exact(&pref.tag)
                .or_else(|| supported.find_primary(&pref.tag));
            if found.is_none() {
                tracing::trace!(tag = %pref.tag, "preference not supported, skipping");
            }
            found
        })
    }
}

fn parse_segment(segment: &str) -> Option<Preference> {
    let mut parts = segment.split(';');
    let tag = parts.next().unwrap_or_default().trim();
    if tag.is_empty() || tag == WILDCARD {
        return None;
    }

    let mut weight = DEFAULT_WEIGHT;
    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("q") {
            weight = parse_weight(value);
        }
    }

    if weight == 0.0 {
        tracing::trace!(tag, "preference marked not acceptable (q=0), skipping");
        return None;
    }

    Some(Preference {
        tag: tag.to_string(),
        weight,
    })
}

fn parse_weight(value: &str) -> f32 {
    match value.trim().parse::<f32>() {
        Ok(w) if w.is_finite() && (0.0..=1.0).contains(&w) => w,
        _ => {
            tracing::trace!(value, "malformed preference weight, using default");
            DEFAULT_WEIGHT
        }
    }
}

/// Picks the supported locale that best satisfies `raw`, or `fallback` when
/// nothing in the header matches.
///
/// ```
/// use bunker_i18n::i18n::header::match_language;
/// use bunker_i18n::i18n::locale::SupportedLocales;
///
/// let supported = SupportedLocales::new(["en-US", "zh-CN"]).unwrap();
/// assert_eq!(match_language("zh;q=0.9, en;q=0.8", &supported, "en-US"), "zh-CN");
/// assert_eq!(match_language("", &supported, "en-US"), "en-US");
/// ```
pub fn match_language(raw: &str, supported: &SupportedLocales, fallback: &str) -> String {
    if raw.trim().is_empty() {
        return fallback.to_string();
    }
    PreferenceList::parse(raw)
        .best_match(supported)
        .unwrap_or(fallback)
        .to_string()
}
