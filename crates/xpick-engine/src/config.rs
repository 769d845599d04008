//! Engine Configuration
//!
//! [`EngineConfig`] is the plain, serializable form a host edits or loads
//! from TOML. [`CompiledConfig`] is what the engine runs on: the same
//! settings with every pattern compiled, built once and then shared
//! read-only.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classifier::DynamicClassifier;
use crate::context::NoiseFilter;

/// Engine configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Class/id prefixes owned by the selection tool or injected frameworks
    pub ignore_prefixes: Vec<String>,

    /// Transient UI-state tokens stripped from class lists and ids
    pub transient_tokens: Vec<String>,

    /// Id prefixes of overlay/wrapper elements the host injects into the page
    pub wrapper_id_prefixes: Vec<String>,

    /// Tags that make an ancestor a semantic container
    pub container_tags: Vec<String>,

    /// Pattern a class token must match to make an ancestor a semantic container
    pub container_class_pattern: String,

    /// How many ancestors to inspect for a semantic container
    pub container_depth: usize,

    /// Match-count cache capacity
    pub cache_capacity: usize,

    /// Regex families of the dynamic-value classifier
    pub dynamic_patterns: DynamicPatternSet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ignore_prefixes: vec!["xpath-".to_string()],
            transient_tokens: ["hover", "active", "selected", "focus", "highlight"]
                .into_iter()
                .map(String::from)
                .collect(),
            wrapper_id_prefixes: vec!["xpath-".to_string()],
            container_tags: ["article", "section", "main"].into_iter().map(String::from).collect(),
            container_class_pattern:
                r"(?i)(?:^|[-_])(?:content|article|post|entry|chapter|story|reader|main|text)(?:$|[-_])"
                    .to_string(),
            container_depth: 5,
            cache_capacity: 100,
            dynamic_patterns: DynamicPatternSet::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// Regex families of the dynamic-value classifier
///
/// `value_patterns` flag a literal (id, class token, attribute value) as
/// ephemeral; `content_patterns` flag free text that carries ephemeral
/// content. The two families are tuned independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicPatternSet {
    pub value_patterns: Vec<String>,
    pub content_patterns: Vec<String>,
}

impl Default for DynamicPatternSet {
    fn default() -> Self {
        let value_patterns = [
            // date-like
            r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}",
            r"\d{1,2}[-/.]\d{1,2}[-/.]\d{4}",
            // time-like
            r"\d{1,2}:\d{2}(?::\d{2})?",
            // long hex run
            r"(?i)(?:^|[^0-9a-z])[0-9a-f]{8,}(?:$|[^0-9a-z])",
            // md5 / sha1 / sha256
            r"(?i)^(?:[0-9a-f]{32}|[0-9a-f]{40}|[0-9a-f]{64})$",
            // word-dash-8digits
            r"[A-Za-z]+-\d{8}",
            // ephemeral keywords
            r"(?i)session|token|tmp|temp|random|cache|uuid|guid",
            // ISO timestamp
            r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}",
            // base64 run
            r"[A-Za-z0-9+/]{32,}={0,2}",
            // hashed build class names (css-in-js, css modules)
            r"^(?:css|sc|jsx|jss|emotion|styled|svelte)-[A-Za-z0-9_-]{4,}$",
            r"^[A-Za-z][A-Za-z0-9]*_[A-Za-z0-9]+__[A-Za-z0-9_-]{5}$",
            // underscore-prefixed random string
            r"^_[A-Za-z0-9]*\d[A-Za-z0-9]*$",
            // hashed static asset filename
            r"(?i)[._-][0-9a-f]{6,}\.(?:js|css|png|jpe?g|gif|svg|webp|woff2?|ico)",
            // bare digit run
            r"\d{6,}",
        ];
        let content_patterns = [
            // dates and clock times
            r"\d{4}[-/.年]\d{1,2}",
            r"\d{1,2}:\d{2}",
            // relative time
            r"(?i)\d+\s*(?:seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\s+ago",
            r"\d+\s*(?:秒|分钟|小时|天|周|个月|月|年)前",
            r"(?i)\b(?:yesterday|today|just now)\b",
            // ordinal chapter / episode
            r"(?i)\b(?:chapter|chap\.?|ch\.|episode|ep\.|part|vol\.?|volume)\s*\d+",
            r"第\s*[0-9零一二三四五六七八九十百千万]+\s*[章节话回集卷部]",
            // counts
            r"(?i)\d[\d,.]*\s*(?:characters?|chars|words?|people|persons?|views?|comments?|likes?|reads?|字|人|次)",
            // long digit run
            r"\d{5,}",
        ];
        Self {
            value_patterns: value_patterns.into_iter().map(String::from).collect(),
            content_patterns: content_patterns.into_iter().map(String::from).collect(),
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {family} pattern `{pattern}`: {source}")]
    Pattern {
        family: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cache capacity must be at least 1")]
    ZeroCapacity,
}

/// Compile one pattern, naming its family on failure
pub(crate) fn compile_pattern(family: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        family,
        pattern: pattern.to_string(),
        source,
    })
}

/// Configuration with every pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub(crate) classifier: DynamicClassifier,
    pub(crate) noise: NoiseFilter,
    pub(crate) wrapper_id_prefixes: Vec<String>,
    pub(crate) container_tags: Vec<String>,
    pub(crate) container_class: Regex,
    pub(crate) container_depth: usize,
    pub(crate) cache_capacity: usize,
}

impl CompiledConfig {
    /// Validate and compile a configuration
    pub fn compile(config: &EngineConfig) -> Result<Self, ConfigError> {
        if config.cache_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            classifier: DynamicClassifier::new(&config.dynamic_patterns)?,
            noise: NoiseFilter::new(&config.ignore_prefixes, &config.transient_tokens),
            wrapper_id_prefixes: config.wrapper_id_prefixes.clone(),
            container_tags: config.container_tags.iter().map(|t| t.to_ascii_lowercase()).collect(),
            container_class: compile_pattern("container-class", &config.container_class_pattern)?,
            container_depth: config.container_depth,
            cache_capacity: config.cache_capacity,
        })
    }

    /// The dynamic-value classifier
    pub fn classifier(&self) -> &DynamicClassifier {
        &self.classifier
    }

    /// The id/class noise filter
    pub fn noise(&self) -> &NoiseFilter {
        &self.noise
    }

    /// Configured match-count cache capacity
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Whether an element id marks a host-injected wrapper/overlay
    pub fn is_wrapper_id(&self, id: &str) -> bool {
        self.wrapper_id_prefixes.iter().any(|p| id.starts_with(p.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_compiles() {
        let compiled = CompiledConfig::compile(&EngineConfig::default()).expect("defaults compile");
        assert_eq!(compiled.cache_capacity(), 100);
        assert!(compiled.is_wrapper_id("xpath-overlay"));
        assert!(!compiled.is_wrapper_id("main"));
    }

    #[test]
    fn test_toml_overrides_keep_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            ignore_prefixes = ["xpath-", "ng-"]
            cache_capacity = 10

            [dynamic_patterns]
            content_patterns = ["(?i)updated"]
            "#,
        )
        .expect("parse");
        assert_eq!(config.ignore_prefixes, vec!["xpath-", "ng-"]);
        assert_eq!(config.cache_capacity, 10);
        assert_eq!(config.container_depth, 5);
        assert_eq!(config.dynamic_patterns.content_patterns, vec!["(?i)updated"]);
        assert_eq!(
            config.dynamic_patterns.value_patterns,
            DynamicPatternSet::default().value_patterns
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = EngineConfig::default();
        config.dynamic_patterns.value_patterns.push("(unclosed".to_string());
        let err = CompiledConfig::compile(&config).expect_err("bad regex");
        assert!(matches!(err, ConfigError::Pattern { family: "dynamic-value", .. }));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = EngineConfig {
            cache_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(CompiledConfig::compile(&config), Err(ConfigError::ZeroCapacity)));
    }
}
