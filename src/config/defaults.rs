// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.

// ==========================================================================
// Locale Defaults
// ==========================================================================

/// Locales shipped with the built-in catalogs. The first entry is the
/// default locale.
pub const DEFAULT_SUPPORTED_LOCALES: &[&str] = &["en-US", "zh-CN"];

/// Display names of the built-in locales, in their own language.
pub const DEFAULT_LOCALE_NAMES: &[(&str, &str)] = &[("en-US", "English"), ("zh-CN", "简体中文")];

/// Cookie carrying the user's explicit locale choice.
pub const DEFAULT_COOKIE_NAME: &str = "lang";

// ==========================================================================
// Logging Defaults
// ==========================================================================

/// Filter directive applied when `RUST_LOG` is unset, blank or invalid.
pub const DEFAULT_LOG_DIRECTIVE: &str = "bunker_i18n=info";
