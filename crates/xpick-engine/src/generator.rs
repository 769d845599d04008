//! Selector generation
//!
//! Runs the strategy bank for one target, validates every proposal against
//! the live document, and returns the survivors best first.

use tracing::{debug, trace, warn};

use crate::cache::MatchCountCache;
use crate::candidate::CandidatePath;
use crate::config::{CompiledConfig, ConfigError, EngineConfig};
use crate::context::{ContextAnalyzer, StructuralDescriptor};
use crate::query::{NodeQuery, QueryError};
use crate::rank::{rank, validate, validated_count};
use crate::strategies::{bank, StrategyContext};

/// Selector generator
///
/// Owns the compiled configuration and the match-count cache. The cache
/// assumes the document does not change between calls; call
/// [`clear_cache`](Self::clear_cache) after a mutation or when switching
/// documents.
#[derive(Debug)]
pub struct SelectorGenerator {
    config: CompiledConfig,
    cache: MatchCountCache,
}

impl SelectorGenerator {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_compiled(CompiledConfig::compile(config)?))
    }

    pub fn with_compiled(config: CompiledConfig) -> Self {
        let cache = MatchCountCache::new(config.cache_capacity());
        Self { config, cache }
    }

    pub fn config(&self) -> &CompiledConfig {
        &self.config
    }

    pub fn cache(&self) -> &MatchCountCache {
        &self.cache
    }

    /// Ranked, validated candidates for `target`
    ///
    /// Non-element targets yield nothing.
    pub fn generate<D: NodeQuery>(&mut self, doc: &D, target: D::Node) -> Vec<CandidatePath> {
        generate_candidates(doc, target, &self.config, &mut self.cache)
    }

    /// Same as [`generate`](Self::generate), with a per-call configuration
    pub fn generate_with<D: NodeQuery>(
        &mut self,
        doc: &D,
        target: D::Node,
        config: &CompiledConfig,
    ) -> Vec<CandidatePath> {
        generate_candidates(doc, target, config, &mut self.cache)
    }

    /// Structural summary the strategies see for `target`
    pub fn describe<D: NodeQuery>(&self, doc: &D, target: D::Node) -> Option<StructuralDescriptor<D::Node>> {
        ContextAnalyzer::new(&self.config).analyze(doc, target)
    }

    /// Cached match count of an arbitrary expression
    pub fn count_matches<D: NodeQuery>(&mut self, doc: &D, expression: &str) -> Result<usize, QueryError> {
        self.cache.count(doc, expression)
    }

    /// Whether `expression` selects `target`
    pub fn validate<D: NodeQuery>(&self, doc: &D, expression: &str, target: D::Node) -> bool {
        validate(doc, expression, target)
    }

    /// Forget every cached count
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Highest ranked candidate
pub fn best(candidates: &[CandidatePath]) -> Option<&CandidatePath> {
    candidates.first()
}

fn generate_candidates<D: NodeQuery>(
    doc: &D,
    target: D::Node,
    config: &CompiledConfig,
    cache: &mut MatchCountCache,
) -> Vec<CandidatePath> {
    let Some(descriptor) = ContextAnalyzer::new(config).analyze(doc, target) else {
        debug!("target {:?} is not an element, nothing to generate", target);
        return Vec::new();
    };

    let mut proposed = Vec::new();
    for strategy in bank::<D>() {
        let mut cx = StrategyContext::new(doc, target, &descriptor, config, cache);
        match strategy.generate(&mut cx) {
            Ok(candidates) => {
                trace!("{}: {} candidate(s)", strategy.name(), candidates.len());
                proposed.extend(candidates);
            }
            Err(err) => warn!("strategy {} failed: {}", strategy.name(), err),
        }
    }

    let total = proposed.len();
    let validated: Vec<CandidatePath> = proposed
        .into_iter()
        .filter_map(|c| {
            let count = validated_count(doc, &c.expression, target)?;
            Some(c.with_match_count(count))
        })
        .collect();
    let ranked = rank(validated);
    debug!(
        "<{}>: {} proposed, {} kept",
        descriptor.tag,
        total,
        ranked.len()
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_for_unique_button() {
        let doc = xpick_html::parse(
            r#"<form><button id="go" data-testid="go-button">Go</button></form>"#,
        )
        .expect("parse");
        let target = doc.get_element_by_id("go").expect("button");
        let mut generator = SelectorGenerator::new(&EngineConfig::default()).expect("config");
        let candidates = generator.generate(&doc, target);

        let top = best(&candidates).expect("candidates");
        assert_eq!(top.expression, r#"//*[@data-testid="go-button"]"#);
        assert!(candidates.iter().all(|c| generator.validate(&doc, &c.expression, target)));
        assert!(!generator.cache().is_empty());

        generator.clear_cache();
        assert!(generator.cache().is_empty());
    }

    #[test]
    fn test_non_element_target() {
        let doc = xpick_html::parse("<p>text</p>").expect("parse");
        let text = xpick_xpath::evaluate(&doc, "//p/text()").expect("eval")[0];
        let mut generator = SelectorGenerator::new(&EngineConfig::default()).expect("config");
        assert!(generator.generate(&doc, text).is_empty());
        assert!(generator.describe(&doc, text).is_none());
    }

    #[test]
    fn test_generate_with_override() {
        let doc = xpick_html::parse(r#"<div><span id="t" class="ng-x1">x</span></div>"#).expect("parse");
        let target = doc.get_element_by_id("t").expect("span");
        let mut generator = SelectorGenerator::new(&EngineConfig::default()).expect("config");

        let default = generator.generate(&doc, target);
        assert!(default.iter().any(|c| c.expression.contains("ng-x1")));

        let strict = CompiledConfig::compile(&EngineConfig {
            ignore_prefixes: vec!["xpath-".to_string(), "ng-".to_string()],
            ..EngineConfig::default()
        })
        .expect("config");
        let filtered = generator.generate_with(&doc, target, &strict);
        assert!(!filtered.is_empty());
        assert!(filtered.iter().all(|c| !c.expression.contains("ng-x1")));
    }
}
