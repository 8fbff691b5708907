// SPDX-License-Identifier: MPL-2.0
//! Internationalization (i18n) support for the console.
//!
//! Picks a locale for each request or session and looks up dotted
//! translation keys in that locale's catalog.
//!
//! # Features
//!
//! - Ordered locale detection: locale cookie, then `Accept-Language`, then
//!   the client's language list, then the default locale
//! - Weighted `Accept-Language` matching with primary-subtag fallback
//! - Nested TOML catalogs, built in or loaded from a directory
//! - Visible `<MISSING: key>` markers for untranslated keys
//!
//! The [`Localizer`] holds everything loaded at startup and is shared
//! read-only between requests; [`Localizer::session`] produces the
//! per-request [`I18n`] handle.

pub mod catalog;
pub mod cookie;
pub mod detector;
pub mod header;
pub mod locale;

use crate::config::Config;
use crate::error::Result;
use catalog::LocaleCatalog;
use detector::{Detector, FixedProbe, ProbeContext, SystemLocaleProbe};
use locale::SupportedLocales;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable localization state shared by every request.
#[derive(Debug, Clone)]
pub struct Localizer {
    supported: Arc<SupportedLocales>,
    catalog: Arc<LocaleCatalog>,
    names: Arc<BTreeMap<String, String>>,
    detector: Arc<Detector>,
}

impl Localizer {
    pub fn new(
        supported: Arc<SupportedLocales>,
        catalog: Arc<LocaleCatalog>,
        names: BTreeMap<String, String>,
        detector: Detector,
    ) -> Self {
        Self {
            supported,
            catalog,
            names: Arc::new(names),
            detector: Arc::new(detector),
        }
    }

    /// Builds the localizer described by `config`.
    ///
    /// `cli_lang` and `[general] language`, in that order, outrank the
    /// standard detection chain. The operating system locale is consulted
    /// last when `use_system_locale` is set.
    pub fn from_config(cli_lang: Option<String>, config: &Config) -> Result<Self> {
        let supported = Arc::new(config.supported_locales()?);
        let catalog = match &config.locales.catalog_dir {
            Some(dir) => LocaleCatalog::load_dir(dir, &supported)?,
            None => LocaleCatalog::builtin(&supported)?,
        };

        let mut detector = Detector::standard(Arc::clone(&supported), &config.locales.cookie_name)
            .with_leading_probe(FixedProbe::new(
                config.general.language.clone(),
                Arc::clone(&supported),
            ))
            .with_leading_probe(FixedProbe::new(cli_lang, Arc::clone(&supported)));
        if config.locales.use_system_locale {
            detector = detector.with_probe(SystemLocaleProbe::new(Arc::clone(&supported)));
        }
        tracing::debug!(probes = ?detector.probe_names(), "locale detector ready");

        Ok(Self::new(
            supported,
            Arc::new(catalog),
            config.locales.names.clone(),
            detector,
        ))
    }

    pub fn supported(&self) -> &SupportedLocales {
        &self.supported
    }

    pub fn catalog(&self) -> &LocaleCatalog {
        &self.catalog
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Runs detection against `ctx` and returns a handle bound to the result.
    pub fn session(&self, ctx: &ProbeContext<'_>) -> I18n {
        self.for_locale(self.detector.detect(ctx))
    }

    /// Returns a handle bound to `locale` without running detection.
    pub fn for_locale(&self, locale: impl Into<String>) -> I18n {
        I18n {
            supported: Arc::clone(&self.supported),
            catalog: Arc::clone(&self.catalog),
            names: Arc::clone(&self.names),
            current_locale: locale.into(),
        }
    }
}

/// Translation handle for one request or session.
#[derive(Debug, Clone)]
pub struct I18n {
    supported: Arc<SupportedLocales>,
    catalog: Arc<LocaleCatalog>,
    names: Arc<BTreeMap<String, String>>,
    current_locale: String,
}

impl I18n {
    pub fn lang(&self) -> &str {
        &self.current_locale
    }

    /// Display name of the active locale, if one is configured.
    pub fn lang_name(&self) -> Option<&str> {
        self.names.get(&self.current_locale).map(String::as_str)
    }

    pub fn langs(&self) -> &[String] {
        self.supported.as_slice()
    }

    pub fn lang_names(&self) -> &BTreeMap<String, String> {
        &self.names
    }

    /// Switches the active locale; unsupported tags are ignored.
    pub fn set_locale(&mut self, locale: &str) {
        match self.supported.find_exact(locale) {
            Some(tag) => self.current_locale = tag.to_string(),
            None => tracing::debug!(locale, "ignoring switch to unsupported locale"),
        }
    }

    /// Translates `key` in the active locale.
    pub fn t(&self, key: &str) -> String {
        self.catalog.resolve(&self.current_locale, key)
    }
}
