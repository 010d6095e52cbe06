//! Sensitive-information detection and free-text redaction.
//!
//! Redaction replaces matches with bracketed placeholders (`[URL:<host>]`,
//! `[URL]`, `[REDACTED]`, `[PATH]`). Every replacement pass skips text that
//! is already a placeholder, which makes [`SensitiveMatcher::sanitize_text`]
//! idempotent. A `[URL:<host>]` placeholder is only kept when its host is
//! one `sanitize_text` itself could have produced; anything else collapses
//! to `[URL]`.

use crate::error::Result;
use regex::{Captures, Regex};
use std::collections::HashSet;
use tracing::debug;
use url::{Host, Url};

/// Matches an existing placeholder; captured as `keep` so passes leave it alone.
const PLACEHOLDER: &str = r"(?P<keep>\[(?:URL(?::(?P<host>[^\]\s]*))?|REDACTED|PATH)\])";

/// Dot-separated DNS labels.
const DNS_HOST_PATTERN: &str =
    r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$";

const URL_PATTERN: &str = r"https?://[^\s\[\]]+";

/// Two or more slash/backslash separators inside one whitespace-free run.
const PATH_PATTERN: &str = r"[/\\]\S*[/\\]\S*";

/// Keywords, patterns and the language allow-list used for redaction.
#[derive(Debug, Clone)]
pub struct SensitiveTables {
    /// Lower-case substrings that mark text as sensitive
    pub keywords: Vec<String>,
    /// Regex sources, matched case-insensitively
    pub patterns: Vec<String>,
    /// Lower-case language names allowed into anonymized records
    pub known_languages: HashSet<String>,
}

impl Default for SensitiveTables {
    fn default() -> Self {
        let keywords = [
            "password",
            "passwd",
            "secret",
            "token",
            "key",
            "credential",
            "auth",
            "private",
            "confidential",
            "internal",
            "proprietary",
        ];

        let patterns = [
            // Email addresses
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            // IPv4 addresses
            r"\b(?:\d{1,3}\.){3}\d{1,3}\b",
            // Long opaque tokens
            r"\b[A-Za-z0-9]{32,}\b",
            // Provider key prefixes
            r"\bsk-[A-Za-z0-9]+\b",
            r"\bghp_[A-Za-z0-9]+\b",
            // Home directories
            r"/Users/[^/\s\[\]]+",
            r"/home/[^/\s\[\]]+",
            r"C:\\Users\\[^\\\s\[\]]+",
            // SSH public keys
            r"ssh-[a-z0-9]+ [A-Za-z0-9+/]+=*",
        ];

        let known_languages = [
            "python", "javascript", "typescript", "java", "c", "c++", "c#", "go", "rust",
            "php", "ruby", "swift", "kotlin", "scala", "r", "matlab", "shell", "bash",
            "powershell", "sql", "html", "css", "scss", "sass", "less", "vue", "jsx", "tsx",
            "dart", "lua", "perl", "haskell", "clojure", "erlang", "elixir", "f#",
            "objective-c", "assembly", "vb.net", "cobol", "fortran", "markdown", "json",
            "xml", "yaml", "toml", "other",
        ];

        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
            known_languages: known_languages.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Compiled form of [`SensitiveTables`].
#[derive(Debug, Clone)]
pub struct SensitiveMatcher {
    keywords: Vec<String>,
    known_languages: HashSet<String>,

    /// Detection patterns (case-insensitive)
    patterns: Vec<Regex>,

    /// Same patterns with the placeholder alternative in front
    redactors: Vec<Regex>,

    keyword_words: Option<Regex>,
    url: Regex,
    path: Regex,
    dns_host: Regex,
}

impl SensitiveMatcher {
    /// Matcher over the default tables.
    pub fn new() -> Self {
        Self::with_tables(SensitiveTables::default()).expect("default sensitive patterns are valid")
    }

    /// Compile custom tables.
    pub fn with_tables(tables: SensitiveTables) -> Result<Self> {
        let patterns = tables
            .patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let redactors = tables
            .patterns
            .iter()
            .map(|p| protected(&format!("(?i:{})", p)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let keywords: Vec<String> = tables.keywords.iter().map(|k| k.to_lowercase()).collect();
        let keyword_words = if keywords.is_empty() {
            None
        } else {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            Some(protected(&format!(r"(?i:[\w-]*(?:{})[\w-]*)", alternation))?)
        };

        Ok(Self {
            keywords,
            known_languages: tables
                .known_languages
                .iter()
                .map(|l| l.to_lowercase())
                .collect(),
            patterns,
            redactors,
            keyword_words,
            url: protected(URL_PATTERN)?,
            path: protected(PATH_PATTERN)?,
            dns_host: Regex::new(DNS_HOST_PATTERN)?,
        })
    }

    /// Whether `text` contains a sensitive keyword or matches a sensitive pattern.
    pub fn contains_sensitive_info(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
            || self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Whether `name` is on the language allow-list (case-insensitive).
    pub fn is_known_language(&self, name: &str) -> bool {
        self.known_languages.contains(&name.to_lowercase())
    }

    /// Redact URLs, sensitive patterns, keyword-bearing words and paths.
    pub fn sanitize_text(&self, text: &str) -> String {
        let mut out = self.replace_unprotected(&self.url, text, |url| self.url_placeholder(url));

        for redactor in &self.redactors {
            out = self.replace_unprotected(redactor, &out, |_| "[REDACTED]".to_string());
        }

        if let Some(words) = &self.keyword_words {
            out = self.replace_unprotected(words, &out, |_| "[REDACTED]".to_string());
        }

        self.replace_unprotected(&self.path, &out, |_| "[PATH]".to_string())
    }

    /// Whether `host` may appear as `[URL:<host>]`: DNS-shaped and free of
    /// sensitive patterns. Keywords alone do not disqualify a host.
    fn is_shareable_host(&self, host: &str) -> bool {
        self.dns_host.is_match(host) && !self.patterns.iter().any(|p| p.is_match(host))
    }

    /// Replace every match of `regex` that is not an existing placeholder.
    ///
    /// A `[URL:<host>]` lookalike whose host is not shareable becomes `[URL]`.
    fn replace_unprotected(
        &self,
        regex: &Regex,
        text: &str,
        mut replace: impl FnMut(&str) -> String,
    ) -> String {
        regex
            .replace_all(text, |caps: &Captures| {
                if caps.name("keep").is_none() {
                    return replace(&caps[0]);
                }
                match caps.name("host") {
                    Some(host) if !self.is_shareable_host(host.as_str()) => "[URL]".to_string(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn url_placeholder(&self, raw: &str) -> String {
        let host = match Url::parse(raw) {
            Ok(url) => match url.host() {
                Some(Host::Domain(domain)) if !domain.is_empty() => Some(domain.to_string()),
                _ => None,
            },
            Err(e) => {
                debug!("Unparseable URL in text: {}", e);
                None
            }
        };

        match host {
            Some(host) if self.is_shareable_host(&host) => format!("[URL:{}]", host),
            _ => "[URL]".to_string(),
        }
    }
}

impl Default for SensitiveMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile `pattern` with the placeholder alternative tried first.
fn protected(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("{}|(?:{})", PLACEHOLDER, pattern))
}
