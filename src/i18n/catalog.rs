// SPDX-License-Identifier: MPL-2.0
//! Translation trees and dotted-key resolution.
//!
//! Each locale owns a [`TranslationTree`]: nested tables whose leaves are
//! display strings. Keys such as `servers.title` walk the tree one segment
//! at a time. Lookups that cannot reach a string leaf resolve to a visible
//! `<MISSING: key>` marker instead of failing, so a catalog gap never stops
//! rendering.
//!
//! Catalogs are read once at startup from `<locale>.toml` files, either the
//! ones embedded in the binary or a directory chosen in the configuration,
//! and are never mutated afterwards.

use super::locale::{normalize_tag, SupportedLocales};
use crate::error::{Error, Result};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

const CATALOG_EXTENSION: &str = "toml";

/// Builds the marker returned for a key path that cannot be resolved.
pub fn missing_sentinel(key_path: &str) -> String {
    format!("<MISSING: {}>", key_path)
}

/// Recursive key to (string | subtree) mapping for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationTree {
    Leaf(String),
    Node(BTreeMap<String, TranslationTree>),
}

impl Default for TranslationTree {
    fn default() -> Self {
        TranslationTree::Node(BTreeMap::new())
    }
}

impl TranslationTree {
    /// Parses a TOML document; tables become nodes and strings leaves.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        parse_catalog(content).map_err(Error::Catalog)
    }

    /// Walks `key_path` segment by segment, returning the string leaf it
    /// names.
    pub fn lookup(&self, key_path: &str) -> Option<&str> {
        let mut current = self;
        for segment in key_path.split('.') {
            match current {
                TranslationTree::Node(children) => current = children.get(segment)?,
                TranslationTree::Leaf(_) => return None,
            }
        }
        match current {
            TranslationTree::Leaf(value) => Some(value.as_str()),
            TranslationTree::Node(_) => None,
        }
    }

    /// Dotted paths of every leaf, in key order.
    pub fn key_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let TranslationTree::Node(children) = self {
            collect_paths(children, &mut String::new(), &mut paths);
        }
        paths
    }
}

fn parse_catalog(content: &str) -> std::result::Result<TranslationTree, String> {
    toml::from_str::<BTreeMap<String, TranslationTree>>(content)
        .map(TranslationTree::Node)
        .map_err(|e| e.to_string())
}

/// Name of the embedded catalog for `locale`, matched on the normalized
/// tag so `zh_cn` finds `zh-CN.toml`.
fn find_builtin_asset(locale: &str) -> Option<String> {
    let wanted = normalize_tag(locale);
    Asset::iter()
        .find(|file| catalog_stem(file).is_some_and(|stem| normalize_tag(stem) == wanted))
        .map(|file| file.into_owned())
}

/// Path of `<locale>.toml` in `dir`; when the exact spelling is absent, a
/// file whose stem normalizes to the same tag is used.
fn find_catalog_file(dir: &Path, locale: &str) -> Result<PathBuf> {
    let exact = dir.join(format!("{}.{}", locale, CATALOG_EXTENSION));
    if exact.is_file() {
        return Ok(exact);
    }
    let wanted = normalize_tag(locale);
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::Catalog(format!("{}: {}", dir.display(), e)))?;
    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(catalog_stem)
                .is_some_and(|stem| normalize_tag(stem) == wanted)
        })
        .collect();
    matches.sort();
    matches
        .into_iter()
        .next()
        .ok_or_else(|| Error::Catalog(format!("{}: catalog not found", exact.display())))
}

fn catalog_stem(filename: &str) -> Option<&str> {
    filename
        .strip_suffix(CATALOG_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
}

fn collect_paths(
    children: &BTreeMap<String, TranslationTree>,
    prefix: &mut String,
    out: &mut Vec<String>,
) {
    for (key, child) in children {
        let len = prefix.len();
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(key);
        match child {
            TranslationTree::Leaf(_) => out.push(prefix.clone()),
            TranslationTree::Node(grandchildren) => collect_paths(grandchildren, prefix, out),
        }
        prefix.truncate(len);
    }
}

/// Resolves `key_path` in `tree`, returning the stored string unmodified or
/// the missing sentinel.
///
/// ```
/// use bunker_i18n::i18n::catalog::{resolve, TranslationTree};
///
/// let tree = TranslationTree::from_toml_str("[servers]\ntitle = \"Servers\"").unwrap();
/// assert_eq!(resolve(&tree, "servers.title"), "Servers");
/// assert_eq!(resolve(&tree, "servers.nonexistent"), "<MISSING: servers.nonexistent>");
/// ```
pub fn resolve(tree: &TranslationTree, key_path: &str) -> String {
    match tree.lookup(key_path) {
        Some(value) => value.to_string(),
        None => {
            tracing::debug!(key = key_path, "translation missing");
            missing_sentinel(key_path)
        }
    }
}

/// A key path that resolves in the reference locale but not in `locale`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub locale: String,
    pub key_path: String,
}

/// Translation trees for every loaded locale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocaleCatalog {
    trees: BTreeMap<String, TranslationTree>,
}

impl LocaleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(mut self, locale: impl Into<String>, tree: TranslationTree) -> Self {
        self.insert(locale, tree);
        self
    }

    /// Adds the tree for `locale`, replacing any tree stored under a tag
    /// that normalizes to the same value.
    pub fn insert(&mut self, locale: impl Into<String>, tree: TranslationTree) {
        let locale = locale.into();
        let normalized = normalize_tag(&locale);
        self.trees.retain(|tag, _| normalize_tag(tag) != normalized);
        self.trees.insert(locale, tree);
    }

    /// Returns the tree for `locale`, comparing tags case-insensitively and
    /// treating `_` as `-`.
    pub fn tree(&self, locale: &str) -> Option<&TranslationTree> {
        self.trees.get(locale).or_else(|| {
            let wanted = normalize_tag(locale);
            self.trees
                .iter()
                .find(|(tag, _)| normalize_tag(tag) == wanted)
                .map(|(_, tree)| tree)
        })
    }

    /// Loaded locale tags, sorted.
    pub fn locales(&self) -> Vec<&str> {
        self.trees.keys().map(String::as_str).collect()
    }

    /// Resolves `key_path` for `locale`; an unknown locale resolves every
    /// key to the missing sentinel.
    pub fn resolve(&self, locale: &str, key_path: &str) -> String {
        match self.tree(locale) {
            Some(tree) => resolve(tree, key_path),
            None => {
                tracing::debug!(locale, key = key_path, "no catalog for locale");
                missing_sentinel(key_path)
            }
        }
    }

    /// Loads the catalogs embedded in the binary for every supported locale.
    ///
    /// A supported locale without an embedded catalog is logged and left
    /// out.
    pub fn builtin(supported: &SupportedLocales) -> Result<Self> {
        let mut catalog = Self::new();
        for locale in supported.iter() {
            match find_builtin_asset(locale).and_then(|name| Asset::get(&name).map(|c| (name, c))) {
                Some((filename, content)) => {
                    let text = String::from_utf8_lossy(content.data.as_ref());
                    let tree = parse_catalog(&text)
                        .map_err(|e| Error::Catalog(format!("{}: {}", filename, e)))?;
                    catalog.insert(locale, tree);
                }
                None => tracing::warn!(locale, "no built-in catalog for supported locale"),
            }
        }
        catalog.log_coverage_gaps(supported.default_locale());
        Ok(catalog)
    }

    /// Loads `<locale>.toml` from `dir` for every supported locale.
    pub fn load_dir(dir: &Path, supported: &SupportedLocales) -> Result<Self> {
        let mut catalog = Self::new();
        for locale in supported.iter() {
            let path = find_catalog_file(dir, locale)?;
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))?;
            let tree = parse_catalog(&content)
                .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))?;
            catalog.insert(locale, tree);
        }
        catalog.log_coverage_gaps(supported.default_locale());
        Ok(catalog)
    }

    /// Lists key paths of `reference` that do not resolve in the other
    /// loaded locales.
    pub fn coverage_gaps(&self, reference: &str) -> Vec<CoverageGap> {
        let Some(reference_tree) = self.tree(reference) else {
            return Vec::new();
        };
        let reference_paths = reference_tree.key_paths();
        let mut gaps = Vec::new();
        for locale in self.locales() {
            if normalize_tag(locale) == normalize_tag(reference) {
                continue;
            }
            let Some(tree) = self.tree(locale) else {
                continue;
            };
            gaps.extend(
                reference_paths
                    .iter()
                    .filter(|path| tree.lookup(path).is_none())
                    .map(|path| CoverageGap {
                        locale: locale.to_string(),
                        key_path: path.clone(),
                    }),
            );
        }
        gaps
    }

    fn log_coverage_gaps(&self, reference: &str) {
        for gap in self.coverage_gaps(reference) {
            tracing::warn!(
                locale = %gap.locale,
                key = %gap.key_path,
                reference,
                "translation key missing from catalog"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EN: &str = r#"
lastwill = "Alive?"

[common]
username = "Username"
sign_in = "Sign In"

[servers]
title = "Servers"
add_update_server = "Add / Update Server"
"#;

    const ZH: &str = r#"
lastwill = "存活?"

[common]
username = "用户名"

[servers]
title = "<b>服务器管理</b>"
add_update_server = "添加 / 更新服务器"
"#;

    fn en() -> TranslationTree {
        TranslationTree::from_toml_str(EN).expect("valid catalog")
    }

    fn zh() -> TranslationTree {
        TranslationTree::from_toml_str(ZH).expect("valid catalog")
    }

    #[test]
    fn resolves_nested_and_top_level_keys() {
        let tree = en();
        assert_eq!(resolve(&tree, "servers.title"), "Servers");
        assert_eq!(resolve(&tree, "lastwill"), "Alive?");
    }

    #[test]
    fn every_stored_path_round_trips() {
        let tree = en();
        let paths = tree.key_paths();
        assert_eq!(paths.len(), 5);
        for path in paths {
            assert!(!resolve(&tree, &path).starts_with("<MISSING"), "{path}");
        }
    }

    #[test]
    fn missing_leaf_returns_sentinel() {
        assert_eq!(
            resolve(&en(), "servers.nonexistent"),
            "<MISSING: servers.nonexistent>"
        );
    }

    #[test]
    fn node_at_final_segment_returns_sentinel() {
        assert_eq!(resolve(&en(), "servers"), "<MISSING: servers>");
    }

    #[test]
    fn traversal_through_leaf_returns_sentinel() {
        assert_eq!(resolve(&en(), "lastwill.extra"), "<MISSING: lastwill.extra>");
    }

    #[test]
    fn empty_and_degenerate_paths_return_sentinel() {
        let tree = en();
        assert_eq!(resolve(&tree, ""), "<MISSING: >");
        assert_eq!(resolve(&tree, "servers."), "<MISSING: servers.>");
        assert_eq!(resolve(&tree, ".servers.title"), "<MISSING: .servers.title>");
    }

    #[test]
    fn markup_is_returned_verbatim() {
        assert_eq!(resolve(&zh(), "servers.title"), "<b>服务器管理</b>");
    }

    #[test]
    fn empty_leaf_is_returned_as_is() {
        let tree = TranslationTree::from_toml_str("blank = \"\"").expect("valid catalog");
        assert_eq!(resolve(&tree, "blank"), "");
    }

    #[test]
    fn non_string_values_are_rejected() {
        let err = TranslationTree::from_toml_str("count = 3").unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }

    #[test]
    fn catalog_lookup_normalizes_locale() {
        let catalog = LocaleCatalog::new().with_tree("zh-CN", zh());
        assert_eq!(catalog.resolve("zh_cn", "common.username"), "用户名");
    }

    #[test]
    fn unknown_locale_resolves_to_sentinel() {
        let catalog = LocaleCatalog::new().with_tree("en-US", en());
        assert_eq!(catalog.resolve("fr-FR", "common.username"), "<MISSING: common.username>");
    }

    #[test]
    fn coverage_gaps_report_missing_keys() {
        let catalog = LocaleCatalog::new()
            .with_tree("en-US", en())
            .with_tree("zh-CN", zh());
        let gaps = catalog.coverage_gaps("en-US");
        assert_eq!(
            gaps,
            vec![CoverageGap {
                locale: "zh-CN".to_string(),
                key_path: "common.sign_in".to_string(),
            }]
        );
    }

    #[test]
    fn builtin_catalogs_cover_each_other() {
        let supported = SupportedLocales::new(["en-US", "zh-CN"]).expect("valid locales");
        let catalog = LocaleCatalog::builtin(&supported).expect("built-in catalogs parse");
        assert_eq!(catalog.locales(), vec!["en-US", "zh-CN"]);
        assert!(catalog.coverage_gaps("en-US").is_empty());
        assert!(catalog.coverage_gaps("zh-CN").is_empty());
        assert_eq!(catalog.resolve("zh-CN", "common.sign_in"), "登录");
    }

    #[test]
    fn builtin_skips_locales_without_catalog() {
        let supported = SupportedLocales::new(["en-US", "fr-FR"]).expect("valid locales");
        let catalog = LocaleCatalog::builtin(&supported).expect("built-in catalogs parse");
        assert_eq!(catalog.locales(), vec!["en-US"]);
    }

    #[test]
    fn load_dir_reads_each_supported_locale() {
        let dir = tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join("en-US.toml"), EN).expect("write en");
        fs::write(dir.path().join("zh-CN.toml"), ZH).expect("write zh");
        let supported = SupportedLocales::new(["en-US", "zh-CN"]).expect("valid locales");

        let catalog = LocaleCatalog::load_dir(dir.path(), &supported).expect("load catalogs");
        assert_eq!(catalog.resolve("en-US", "common.sign_in"), "Sign In");
        assert_eq!(catalog.resolve("zh-CN", "common.sign_in"), "<MISSING: common.sign_in>");
    }

    #[test]
    fn builtin_finds_catalog_for_alternate_spelling() {
        let supported = SupportedLocales::new(["en-US", "zh_cn"]).expect("valid locales");
        let catalog = LocaleCatalog::builtin(&supported).expect("built-in catalogs parse");
        assert_eq!(catalog.locales(), vec!["en-US", "zh_cn"]);
        assert_eq!(catalog.resolve("zh_cn", "common.sign_in"), "登录");
    }

    #[test]
    fn load_dir_finds_catalog_for_alternate_spelling() {
        let dir = tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join("en-US.toml"), EN).expect("write en");
        fs::write(dir.path().join("zh-CN.toml"), ZH).expect("write zh");
        let supported = SupportedLocales::new(["en_us", "zh-cn"]).expect("valid locales");

        let catalog = LocaleCatalog::load_dir(dir.path(), &supported).expect("load catalogs");
        assert_eq!(catalog.resolve("en_us", "common.sign_in"), "Sign In");
        assert_eq!(catalog.resolve("zh-cn", "common.username"), "用户名");
    }

    #[test]
    fn insert_replaces_tree_with_same_normalized_tag() {
        let catalog = LocaleCatalog::new()
            .with_tree("en-US", en())
            .with_tree("en_us", zh());
        assert_eq!(catalog.locales(), vec!["en_us"]);
        for _ in 0..10 {
            assert_eq!(catalog.resolve("EN-us", "common.username"), "用户名");
        }
    }

    #[test]
    fn load_dir_fails_for_missing_file() {
        let dir = tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join("en-US.toml"), EN).expect("write en");
        let supported = SupportedLocales::new(["en-US", "zh-CN"]).expect("valid locales");

        let err = LocaleCatalog::load_dir(dir.path(), &supported).unwrap_err();
        match err {
            Error::Catalog(message) => assert!(message.contains("zh-CN.toml")),
            other => panic!("expected Catalog variant, got {other:?}"),
        }
    }
}
