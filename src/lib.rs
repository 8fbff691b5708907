// SPDX-License-Identifier: MPL-2.0
//! `bunker_i18n` selects a display locale for each console request and
//! resolves dotted translation keys for it.
//!
//! Locale detection walks an ordered chain of probes (locale cookie,
//! `Accept-Language` header, client language list) and falls back to the
//! default locale. Lookups of untranslated keys yield a visible
//! `<MISSING: key>` marker rather than an error.
//!
//! ```
//! use bunker_i18n::config::Config;
//! use bunker_i18n::i18n::detector::ProbeContext;
//! use bunker_i18n::i18n::Localizer;
//!
//! let localizer = Localizer::from_config(None, &Config::default()).unwrap();
//! let ctx = ProbeContext::new().with_accept_language("zh-CN,zh;q=0.9,en;q=0.8");
//! let i18n = localizer.session(&ctx);
//! assert_eq!(i18n.lang(), "zh-CN");
//! assert_eq!(i18n.t("servers.title"), "服务器管理");
//! ```

pub mod config;
pub mod error;
pub mod i18n;

pub use error::{Error, Result};
pub use i18n::{I18n, Localizer};
