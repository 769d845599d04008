//! Candidate strategies
//!
//! Each strategy looks at the target from one angle (test hooks, ids,
//! classes, structure, text, attributes) and proposes zero or more
//! candidates. Strategies only read: the document through [`NodeQuery`],
//! counts through the shared cache. They run in bank order and never see
//! each other's output.

mod attributes;
mod classes;
mod content;
mod structure;

use tracing::trace;

pub use attributes::{
    AttributeContains, AttributeStartsWith, DataAttribute, MultiAttribute, StableId, TestAttribute,
};
pub use classes::{MultiClass, SemanticClass};
pub use content::{FormField, LinkImage, TextContent};
pub use structure::{AbsolutePath, AncestorPath, Positional, SiblingRelation, Structural, TagOnly};

use crate::cache::MatchCountCache;
use crate::candidate::CandidatePath;
use crate::config::CompiledConfig;
use crate::context::{ContextAnalyzer, StructuralDescriptor};
use crate::query::{NodeQuery, QueryError};

/// Strategy error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("target is detached from the document root")]
    Detached,

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type StrategyResult = Result<Vec<CandidatePath>, StrategyError>;

/// A candidate generator
pub trait Strategy<D: NodeQuery> {
    /// Tag recorded on every candidate this strategy emits
    fn name(&self) -> &'static str;

    fn generate(&self, cx: &mut StrategyContext<'_, D>) -> StrategyResult;
}

/// Every strategy, in run order
pub fn bank<D: NodeQuery>() -> Vec<Box<dyn Strategy<D>>> {
    vec![
        Box::new(TestAttribute),
        Box::new(StableId),
        Box::new(SemanticClass),
        Box::new(Structural),
        Box::new(MultiAttribute),
        Box::new(Positional),
        Box::new(TextContent),
        Box::new(TagOnly),
        Box::new(AncestorPath),
        Box::new(AttributeContains),
        Box::new(AttributeStartsWith),
        Box::new(MultiClass),
        Box::new(FormField),
        Box::new(LinkImage),
        Box::new(AbsolutePath),
        Box::new(SiblingRelation),
        Box::new(DataAttribute),
    ]
}

/// What a strategy gets to work with
pub struct StrategyContext<'a, D: NodeQuery> {
    pub doc: &'a D,
    pub target: D::Node,
    pub descriptor: &'a StructuralDescriptor<D::Node>,
    pub config: &'a CompiledConfig,
    cache: &'a mut MatchCountCache,
}

impl<'a, D: NodeQuery> StrategyContext<'a, D> {
    pub fn new(
        doc: &'a D,
        target: D::Node,
        descriptor: &'a StructuralDescriptor<D::Node>,
        config: &'a CompiledConfig,
        cache: &'a mut MatchCountCache,
    ) -> Self {
        Self {
            doc,
            target,
            descriptor,
            config,
            cache,
        }
    }

    /// Cached match count; expressions that fail to evaluate count as zero
    pub fn match_count(&mut self, expression: &str) -> usize {
        match self.cache.count(self.doc, expression) {
            Ok(count) => count,
            Err(err) => {
                trace!("treating failed expression as empty: {}", err);
                0
            }
        }
    }

    /// Cached match count, evaluation errors included
    pub fn try_match_count(&mut self, expression: &str) -> Result<usize, QueryError> {
        self.cache.count(self.doc, expression)
    }

    pub fn is_dynamic(&self, value: &str) -> bool {
        self.config.classifier.is_dynamic_value(value)
    }

    pub fn has_dynamic_content(&self, text: &str) -> bool {
        self.config.classifier.contains_dynamic_content(text)
    }

    /// Cleaned classes that are also stable
    pub fn stable_classes(&self) -> Vec<&'a str> {
        let descriptor = self.descriptor;
        descriptor
            .classes
            .iter()
            .map(String::as_str)
            .filter(|c| !self.is_dynamic(c))
            .collect()
    }

    pub fn analyzer(&self) -> ContextAnalyzer<'a> {
        ContextAnalyzer::new(self.config)
    }

    /// `tag[pred]` step for an arbitrary element, by id, class or bare tag
    pub fn element_step(&self, node: D::Node) -> Option<String> {
        let tag = self.doc.tag_name(node)?;
        let noise = &self.config.noise;
        let id = self.doc.attribute(node, "id").and_then(|id| noise.filter_id(id));
        let classes = noise.filter_classes(self.doc.attribute(node, "class").unwrap_or_default().split_whitespace());
        Some(crate::expr::element_step(tag, id.as_deref(), &classes, &self.config.classifier))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use xpick_dom::{Document, NodeId};

    use super::*;
    use crate::config::EngineConfig;

    pub fn parse(html: &str) -> Document {
        xpick_html::parse(html).expect("fixture parses")
    }

    pub fn config() -> CompiledConfig {
        CompiledConfig::compile(&EngineConfig::default()).expect("defaults compile")
    }

    /// Run one strategy against the element with `id`
    pub fn run<S: Strategy<Document>>(strategy: S, doc: &Document, target: NodeId) -> Vec<CandidatePath> {
        let config = config();
        let mut cache = MatchCountCache::default();
        let descriptor = ContextAnalyzer::new(&config)
            .analyze(doc, target)
            .expect("target is an element");
        let mut cx = StrategyContext::new(doc, target, &descriptor, &config, &mut cache);
        strategy.generate(&mut cx).expect("strategy succeeds")
    }

    pub fn run_on<S: Strategy<Document>>(strategy: S, html: &str, id: &str) -> Vec<CandidatePath> {
        let doc = parse(html);
        let target = doc.get_element_by_id(id).expect("target id");
        run(strategy, &doc, target)
    }

    pub fn expressions(candidates: &[CandidatePath]) -> Vec<&str> {
        candidates.iter().map(|c| c.expression.as_str()).collect()
    }
}
