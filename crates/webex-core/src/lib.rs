//! webex-core: Answer evaluation and section scoring for self-check quizzes.
//!
//! This crate defines the item data model, the stateless item evaluator,
//! the section aggregator, and the quiz document and report types the
//! rest of the webex tooling builds on.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod parser;
pub mod report;
pub mod section;

pub use aggregate::{aggregate, aggregate_with, DomainRow, SectionSummary};
pub use config::{GradingConfig, GradingRules};
pub use error::QuizError;
pub use evaluate::{evaluate_item, evaluate_radio_group, evaluate_select, evaluate_solveme};
pub use model::{
    AnswerSpec, DomainGroup, DomainRef, Item, ItemKind, ItemResult, ItemSpec, MatchFlags,
    RadioGroupSpec, RadioOption, Response, SectionConfig, SelectSpec, Verdict,
};
pub use section::{RevealChange, Section};
