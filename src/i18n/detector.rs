// SPDX-License-Identifier: MPL-2.0
//! Ordered locale detection.
//!
//! A [`Detector`] evaluates a list of [`Probe`]s strictly in order and keeps
//! the first candidate produced. The standard chain puts an explicit user
//! choice (the locale cookie, first as sent with the request, then as seen
//! by the client) ahead of passive negotiation signals (the request's
//! `Accept-Language` header, then the client's own language list), so a
//! returning user's choice is never overridden by browser defaults.
//!
//! Probes only read the [`ProbeContext`] they are handed. A missing or
//! malformed cookie or header is "no candidate", never an error.

use super::cookie::extract_cookie;
use super::header::{match_language, PreferenceList};
use super::locale::SupportedLocales;
use std::sync::Arc;

/// Ambient inputs available to probes for a single request or session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeContext<'a> {
    /// Raw `Cookie` header of the inbound request.
    pub request_cookies: Option<&'a str>,
    /// Cookie string visible to the client (`document.cookie`).
    pub client_cookies: Option<&'a str>,
    /// Raw `Accept-Language` header of the inbound request.
    pub accept_language: Option<&'a str>,
    /// Languages reported by the client, most preferred first.
    pub client_languages: &'a [String],
}

impl<'a> ProbeContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_cookies(mut self, header: &'a str) -> Self {
        self.request_cookies = Some(header);
        self
    }

    pub fn with_client_cookies(mut self, cookies: &'a str) -> Self {
        self.client_cookies = Some(cookies);
        self
    }

    pub fn with_accept_language(mut self, header: &'a str) -> Self {
        self.accept_language = Some(header);
        self
    }

    pub fn with_client_languages(mut self, languages: &'a [String]) -> Self {
        self.client_languages = languages;
        self
    }
}

/// A single source of a candidate locale.
pub trait Probe: Send + Sync {
    /// Short label used in log output.
    fn name(&self) -> &str {
        "custom"
    }

    fn probe(&self, ctx: &ProbeContext<'_>) -> Option<String>;
}

impl<F> Probe for F
where
    F: Fn(&ProbeContext<'_>) -> Option<String> + Send + Sync,
{
    fn probe(&self, ctx: &ProbeContext<'_>) -> Option<String> {
        self(ctx)
    }
}

/// Where a [`CookieProbe`] reads its cookie string from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSource {
    Request,
    Client,
}

/// Reads an explicit locale choice from a cookie.
///
/// The value must name a supported locale; the configured spelling is
/// returned so `zh_cn` yields `zh-CN`.
#[derive(Debug, Clone)]
pub struct CookieProbe {
    source: CookieSource,
    cookie_name: String,
    supported: Arc<SupportedLocales>,
}

impl CookieProbe {
    pub fn request(cookie_name: impl Into<String>, supported: Arc<SupportedLocales>) -> Self {
        Self {
            source: CookieSource::Request,
            cookie_name: cookie_name.into(),
            supported,
        }
    }

    pub fn client(cookie_name: impl Into<String>, supported: Arc<SupportedLocales>) -> Self {
        Self {
            source: CookieSource::Client,
            cookie_name: cookie_name.into(),
            supported,
        }
    }
}

impl Probe for CookieProbe {
    fn name(&self) -> &str {
        match self.source {
            CookieSource::Request => "request-cookie",
            CookieSource::Client => "client-cookie",
        }
    }

    fn probe(&self, ctx: &ProbeContext<'_>) -> Option<String> {
        let cookies = match self.source {
            CookieSource::Request => ctx.request_cookies,
            CookieSource::Client => ctx.client_cookies,
        }?;
        let value = extract_cookie(cookies, &self.cookie_name)?;
        let found = self.supported.find_exact(value);
        if found.is_none() {
            tracing::trace!(probe = self.name(), value, "cookie names an unsupported locale");
        }
        found.map(str::to_string)
    }
}

/// Where a [`HeaderProbe`] reads its preference list from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSource {
    AcceptLanguage,
    ClientLanguages,
}

/// Negotiates a locale from a weighted preference header.
///
/// Yields nothing only when the header (or client list) is absent or blank.
/// Otherwise the match falls back to the default locale, so later probes are
/// not consulted once a preference header is present.
#[derive(Debug, Clone)]
pub struct HeaderProbe {
    source: HeaderSource,
    supported: Arc<SupportedLocales>,
}

impl HeaderProbe {
    pub fn accept_language(supported: Arc<SupportedLocales>) -> Self {
        Self {
            source: HeaderSource::AcceptLanguage,
            supported,
        }
    }

    pub fn client_languages(supported: Arc<SupportedLocales>) -> Self {
        Self {
            source: HeaderSource::ClientLanguages,
            supported,
        }
    }
}

impl Probe for HeaderProbe {
    fn name(&self) -> &str {
        match self.source {
            HeaderSource::AcceptLanguage => "accept-language",
            HeaderSource::ClientLanguages => "client-languages",
        }
    }

    fn probe(&self, ctx: &ProbeContext<'_>) -> Option<String> {
        let header = match self.source {
            HeaderSource::AcceptLanguage => ctx.accept_language?.to_string(),
            HeaderSource::ClientLanguages => ctx.client_languages.join(", "),
        };
        if header.trim().is_empty() {
            return None;
        }
        Some(match_language(
            &header,
            &self.supported,
            self.supported.default_locale(),
        ))
    }
}

/// Yields a preset locale, such as a `--lang` flag or a configured
/// language, when it names a supported locale.
#[derive(Debug, Clone)]
pub struct FixedProbe {
    tag: Option<String>,
    supported: Arc<SupportedLocales>,
}

impl FixedProbe {
    pub fn new(tag: Option<String>, supported: Arc<SupportedLocales>) -> Self {
        Self { tag, supported }
    }
}

impl Probe for FixedProbe {
    fn name(&self) -> &str {
        "fixed"
    }

    fn probe(&self, _ctx: &ProbeContext<'_>) -> Option<String> {
        let tag = self.tag.as_deref()?;
        let found = self.supported.find_exact(tag);
        if found.is_none() {
            tracing::warn!(tag, "configured language is not supported, ignoring");
        }
        found.map(str::to_string)
    }
}

/// Uses the operating system locale when it matches a supported locale.
#[derive(Debug, Clone)]
pub struct SystemLocaleProbe {
    supported: Arc<SupportedLocales>,
}

impl SystemLocaleProbe {
    pub fn new(supported: Arc<SupportedLocales>) -> Self {
        Self { supported }
    }

    fn match_os_locale(&self, os_locale: &str) -> Option<String> {
        // POSIX values look like `zh_CN.UTF-8` or `de_DE@euro`.
        let tag = os_locale.split(['.', '@']).next().unwrap_or(os_locale);
        PreferenceList::parse(tag)
            .best_match(&self.supported)
            .map(str::to_string)
    }
}

impl Probe for SystemLocaleProbe {
    fn name(&self) -> &str {
        "system-locale"
    }

    fn probe(&self, _ctx: &ProbeContext<'_>) -> Option<String> {
        let os_locale = sys_locale::get_locale()?;
        self.match_os_locale(&os_locale)
    }
}

/// Returns the first non-empty candidate produced by `probes`, evaluated in
/// order, or `default_locale` when none produces one.
pub fn detect(probes: &[Box<dyn Probe>], ctx: &ProbeContext<'_>, default_locale: &str) -> String {
    for probe in probes {
        match probe.probe(ctx) {
            Some(candidate) if !candidate.is_empty() => {
                tracing::debug!(probe = probe.name(), locale = %candidate, "locale detected");
                return candidate;
            }
            _ => tracing::trace!(probe = probe.name(), "no candidate"),
        }
    }
    tracing::debug!(locale = default_locale, "no probe matched, using default locale");
    default_locale.to_string()
}

/// An ordered probe chain with its default locale.
pub struct Detector {
    probes: Vec<Box<dyn Probe>>,
    default_locale: String,
}

impl Detector {
    /// Creates a detector with no probes; it always returns `default_locale`
    /// until probes are added.
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            probes: Vec::new(),
            default_locale: default_locale.into(),
        }
    }

    /// Request cookie, client cookie, `Accept-Language`, client languages.
    pub fn standard(supported: Arc<SupportedLocales>, cookie_name: &str) -> Self {
        Self::new(supported.default_locale())
            .with_probe(CookieProbe::request(cookie_name, Arc::clone(&supported)))
            .with_probe(CookieProbe::client(cookie_name, Arc::clone(&supported)))
            .with_probe(HeaderProbe::accept_language(Arc::clone(&supported)))
            .with_probe(HeaderProbe::client_languages(supported))
    }

    /// Appends `probe` at the lowest priority.
    pub fn with_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// Inserts `probe` ahead of every existing probe.
    pub fn with_leading_probe(mut self, probe: impl Probe + 'static) -> Self {
        self.probes.insert(0, Box::new(probe));
        self
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn probe_names(&self) -> Vec<&str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn detect(&self, ctx: &ProbeContext<'_>) -> String {
        detect(&self.probes, ctx, &self.default_locale)
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("probes", &self.probe_names())
            .field("default_locale", &self.default_locale)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Arc<SupportedLocales> {
        Arc::new(SupportedLocales::new(["en-US", "zh-CN"]).expect("valid locales"))
    }

    fn fixed(tag: &'static str) -> Box<dyn Probe> {
        Box::new(move |_: &ProbeContext<'_>| Some(tag.to_string()))
    }

    fn nothing() -> Box<dyn Probe> {
        Box::new(|_: &ProbeContext<'_>| None)
    }

    #[test]
    fn detect_returns_first_candidate() {
        let probes = vec![nothing(), fixed("zh-CN"), fixed("en-US")];
        assert_eq!(detect(&probes, &ProbeContext::new(), "en-US"), "zh-CN");
    }

    #[test]
    fn detect_falls_back_to_default() {
        let probes = vec![nothing(), nothing()];
        assert_eq!(detect(&probes, &ProbeContext::new(), "en-US"), "en-US");
        assert_eq!(detect(&[], &ProbeContext::new(), "zh-CN"), "zh-CN");
    }

    #[test]
    fn detect_skips_empty_candidates() {
        let probes = vec![fixed(""), fixed("zh-CN")];
        assert_eq!(detect(&probes, &ProbeContext::new(), "en-US"), "zh-CN");
    }

    #[test]
    fn detect_does_not_validate_candidates() {
        let probes = vec![fixed("fr-FR")];
        assert_eq!(detect(&probes, &ProbeContext::new(), "en-US"), "fr-FR");
    }

    #[test]
    fn request_cookie_outranks_every_other_signal() {
        let detector = Detector::standard(supported(), "lang");
        let languages = vec!["en-US".to_string()];
        let ctx = ProbeContext::new()
            .with_request_cookies("lang=zh-CN")
            .with_client_cookies("lang=en-US")
            .with_accept_language("en-US")
            .with_client_languages(&languages);
        assert_eq!(detector.detect(&ctx), "zh-CN");
    }

    #[test]
    fn client_cookie_outranks_headers() {
        let detector = Detector::standard(supported(), "lang");
        let ctx = ProbeContext::new()
            .with_request_cookies("session=1")
            .with_client_cookies("lang=zh-CN")
            .with_accept_language("en-US");
        assert_eq!(detector.detect(&ctx), "zh-CN");
    }

    #[test]
    fn accept_language_used_without_cookie() {
        let detector = Detector::standard(supported(), "lang");
        let ctx = ProbeContext::new().with_accept_language("zh-TW,zh;q=0.9,en;q=0.8");
        assert_eq!(detector.detect(&ctx), "zh-CN");
    }

    #[test]
    fn client_languages_used_last() {
        let detector = Detector::standard(supported(), "lang");
        let languages = vec!["zh-CN".to_string(), "en".to_string()];
        let ctx = ProbeContext::new()
            .with_accept_language("  ")
            .with_client_languages(&languages);
        assert_eq!(detector.detect(&ctx), "zh-CN");
    }

    #[test]
    fn unmatched_accept_language_yields_default_and_stops_chain() {
        let detector = Detector::standard(supported(), "lang");
        let languages = vec!["zh-CN".to_string()];
        let ctx = ProbeContext::new()
            .with_accept_language("fr-FR")
            .with_client_languages(&languages);
        assert_eq!(detector.detect(&ctx), "en-US");
    }

    #[test]
    fn unsupported_cookie_is_ignored() {
        let detector = Detector::standard(supported(), "lang");
        let ctx = ProbeContext::new()
            .with_request_cookies("lang=fr-FR")
            .with_accept_language("zh");
        assert_eq!(detector.detect(&ctx), "zh-CN");
    }

    #[test]
    fn cookie_value_is_canonicalized() {
        let probe = CookieProbe::request("lang", supported());
        let ctx = ProbeContext::new().with_request_cookies("lang=zh_cn");
        assert_eq!(probe.probe(&ctx), Some("zh-CN".to_string()));
    }

    #[test]
    fn empty_context_yields_default() {
        let detector = Detector::standard(supported(), "lang");
        assert_eq!(detector.detect(&ProbeContext::new()), "en-US");
    }

    #[test]
    fn standard_chain_order() {
        let detector = Detector::standard(supported(), "lang");
        assert_eq!(
            detector.probe_names(),
            vec!["request-cookie", "client-cookie", "accept-language", "client-languages"]
        );
    }

    #[test]
    fn leading_probe_takes_priority() {
        let detector = Detector::standard(supported(), "lang")
            .with_leading_probe(FixedProbe::new(Some("en-us".to_string()), supported()));
        let ctx = ProbeContext::new().with_request_cookies("lang=zh-CN");
        assert_eq!(detector.detect(&ctx), "en-US");
    }

    #[test]
    fn fixed_probe_ignores_unsupported_or_missing() {
        let ctx = ProbeContext::new();
        assert_eq!(FixedProbe::new(Some("fr".into()), supported()).probe(&ctx), None);
        assert_eq!(FixedProbe::new(None, supported()).probe(&ctx), None);
    }

    #[test]
    fn system_locale_strips_posix_suffixes() {
        let probe = SystemLocaleProbe::new(supported());
        assert_eq!(probe.match_os_locale("zh_CN.UTF-8"), Some("zh-CN".to_string()));
        assert_eq!(probe.match_os_locale("en_GB@euro"), Some("en-US".to_string()));
        assert_eq!(probe.match_os_locale("de_DE.UTF-8"), None);
    }
}
