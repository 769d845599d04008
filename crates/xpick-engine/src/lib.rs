//! xpick Engine
//!
//! Synthesizes stable XPath selectors for an element a user picked on a
//! page. A bank of strategies proposes candidates from test hooks, ids,
//! classes, structure, text and attributes; every candidate is checked
//! against the live document and the survivors are ranked by confidence.
//!
//! # Example
//! ```rust,ignore
//! let doc = xpick_html::parse(html)?;
//! let target = doc.get_element_by_id("submit").unwrap();
//! let mut generator = SelectorGenerator::new(&EngineConfig::default())?;
//! for candidate in generator.generate(&doc, target) {
//!     println!("{:.2} {}", candidate.confidence, candidate.expression);
//! }
//! ```

pub mod cache;
pub mod candidate;
pub mod classifier;
pub mod config;
pub mod context;
pub mod expr;
pub mod generator;
pub mod query;
pub mod rank;
pub mod strategies;

pub use cache::{CacheStats, MatchCountCache};
pub use candidate::{adjust_confidence, CandidatePath};
pub use classifier::DynamicClassifier;
pub use config::{CompiledConfig, ConfigError, DynamicPatternSet, EngineConfig};
pub use context::{ContextAnalyzer, NoiseFilter, StructuralDescriptor};
pub use generator::{best, SelectorGenerator};
pub use query::{NodeQuery, QueryError};
pub use strategies::{Strategy, StrategyContext, StrategyError};
