//! Brand-name protection.
//!
//! Machine translation happily turns "Promptora AI" into "IA Promptora" or
//! splits the domain suffix. Before a unit goes to the backend every spelling
//! variant of the company name is swapped for an opaque placeholder, and the
//! canonical spelling is put back afterwards.

use crate::Result;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Placeholder substituted for the company name during translation.
pub const PLACEHOLDER_TOKEN: &str = "XCOMPANYX";

/// Canonical spelling written back after translation.
pub const CANONICAL_NAME: &str = "Promptora.ai";

/// Spelling variants of the company name, matched case-insensitively.
pub const COMPANY_NAME_PATTERNS: &[&str] = &[
    r"\bpromptor[a-z]*\.ai\b",
    r"\bpromptor[a-z]*\s*\.\s*ai\b",
    r"\bpromptor[a-z]*\s+ai\b",
];

static DEFAULT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    COMPANY_NAME_PATTERNS
        .iter()
        .map(|p| case_insensitive(p).unwrap())
        .collect()
});

static DEFAULT_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive(&regex::escape(PLACEHOLDER_TOKEN)).unwrap());

fn case_insensitive(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Swaps a brand name for a placeholder and back.
#[derive(Debug, Clone)]
pub struct BrandGuard {
    patterns: Vec<Regex>,
    placeholder: String,
    placeholder_regex: Regex,
    canonical: String,
}

impl Default for BrandGuard {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.clone(),
            placeholder: PLACEHOLDER_TOKEN.to_string(),
            placeholder_regex: DEFAULT_PLACEHOLDER.clone(),
            canonical: CANONICAL_NAME.to_string(),
        }
    }
}

impl BrandGuard {
    /// Create a guard for the default company name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a guard for another name.
    ///
    /// Patterns are compiled case-insensitively.
    pub fn with_patterns(
        patterns: &[&str],
        placeholder: impl Into<String>,
        canonical: impl Into<String>,
    ) -> Result<Self> {
        let placeholder = placeholder.into();
        let patterns = patterns
            .iter()
            .map(|p| case_insensitive(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let placeholder_regex = case_insensitive(&regex::escape(&placeholder))?;

        Ok(Self {
            patterns,
            placeholder,
            placeholder_regex,
            canonical: canonical.into(),
        })
    }

    /// The placeholder token.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// The canonical brand spelling.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Replace every brand-name variant with the placeholder.
    pub fn protect<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.trim().is_empty() {
            return Cow::Borrowed(text);
        }
        replace_all(&self.patterns, text, &self.placeholder)
    }

    /// Put the canonical spelling back in place of the placeholder and of any
    /// variant the backend produced on its own.
    ///
    /// A placeholder the backend mangled beyond a case change is not
    /// recovered.
    pub fn restore<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.is_empty() {
            return Cow::Borrowed(text);
        }
        let restored = self
            .placeholder_regex
            .replace_all(text, regex::NoExpand(&self.canonical));
        match restored {
            Cow::Borrowed(b) => self.restore_variants(b),
            Cow::Owned(o) => Cow::Owned(self.restore_variants(&o).into_owned()),
        }
    }

    /// Normalise brand-name variants without touching the placeholder.
    pub fn restore_variants<'a>(&self, text: &'a str) -> Cow<'a, str> {
        replace_all(&self.patterns, text, &self.canonical)
    }

    /// True when the protected text is nothing but the placeholder.
    pub fn is_brand_only(&self, protected: &str) -> bool {
        protected.trim() == self.placeholder
    }

    /// True when the source text already contains the placeholder token, in
    /// which case protecting it would be ambiguous.
    pub fn collides(&self, text: &str) -> bool {
        self.placeholder_regex.is_match(text)
    }
}

fn replace_all<'a>(patterns: &[Regex], text: &'a str, replacement: &str) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(text);
    for pattern in patterns {
        let replaced = match pattern.replace_all(&current, regex::NoExpand(replacement)) {
            Cow::Owned(replaced) => Some(replaced),
            Cow::Borrowed(_) => None,
        };
        if let Some(replaced) = replaced {
            current = Cow::Owned(replaced);
        }
    }
    current
}
