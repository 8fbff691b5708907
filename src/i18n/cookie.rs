// SPDX-License-Identifier: MPL-2.0
//! Read-only lookup of a single value in a `Cookie` header string.

/// Returns the value of cookie `name` in a `name=value; other=value` string.
///
/// Pairs without `=` are ignored. Surrounding whitespace and one pair of
/// double quotes are stripped from the value; an empty value counts as
/// absent.
///
/// ```
/// use bunker_i18n::i18n::cookie::extract_cookie;
///
/// assert_eq!(extract_cookie("theme=dark; lang=zh-CN", "lang"), Some("zh-CN"));
/// assert_eq!(extract_cookie("theme=dark", "lang"), None);
/// ```
pub fn extract_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| unquote(value.trim()))
        .filter(|value| !value.is_empty())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
