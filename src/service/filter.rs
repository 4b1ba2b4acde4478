//! Query filters: pagination, the language code/name heuristic, and the listing page's filter precedence.

use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Offset/limit window. Limit defaults to 100 and is capped at 1000.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(0, Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Forces how a language token is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMatch {
    Code,
    Name,
}

/// Case folding is ASCII-only, as `lower()` and `ILIKE` behave under the C collation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageFilter {
    /// Match a key of the languages mapping, case-insensitively.
    Code(String),
    /// Match a value of the languages mapping by quoted substring of its serialized form.
    Name(String),
}

impl LanguageFilter {
    /// Tokens of at most three characters are codes, longer ones are names.
    /// A three-letter language name is therefore treated as a code.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.chars().count() <= 3 {
            LanguageFilter::Code(token.to_ascii_lowercase())
        } else {
            LanguageFilter::Name(token.to_string())
        }
    }

    pub fn with_mode(token: &str, mode: Option<LanguageMatch>) -> Self {
        match mode {
            Some(LanguageMatch::Code) => LanguageFilter::Code(token.trim().to_ascii_lowercase()),
            Some(LanguageMatch::Name) => LanguageFilter::Name(token.trim().to_string()),
            None => Self::from_token(token),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            LanguageFilter::Code(t) | LanguageFilter::Name(t) => t,
        }
    }

    /// In-process equivalent of the SQL predicate used by the Postgres store.
    pub fn matches(&self, languages: &BTreeMap<String, String>) -> bool {
        match self {
            LanguageFilter::Code(code) => languages.keys().any(|k| k.eq_ignore_ascii_case(code)),
            LanguageFilter::Name(name) => {
                let serialized = serde_json::to_string(languages)
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                serialized.contains(&format!("\"{}\"", name.to_ascii_lowercase()))
            }
        }
    }
}

/// The one filter applied by the listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListFilter {
    Name(String),
    Region(String),
    Language(LanguageFilter),
    All,
}

impl ListFilter {
    /// Name wins over region, region over language; blank values count as absent.
    pub fn resolve(name: Option<&str>, region: Option<&str>, language: Option<&str>) -> Self {
        fn given(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        if let Some(q) = given(name) {
            ListFilter::Name(q.to_string())
        } else if let Some(r) = given(region) {
            ListFilter::Region(r.to_string())
        } else if let Some(l) = given(language) {
            ListFilter::Language(LanguageFilter::from_token(l))
        } else {
            ListFilter::All
        }
    }
}

/// `%fragment%` for ILIKE with `\`, `%` and `_` matched literally.
pub fn contains_pattern(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    out.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
