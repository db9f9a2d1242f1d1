//! Hard negative caption generation.
//!
//! A caption is tagged, a couple of its verbs, adjectives or nouns are swapped
//! for words from static pools, and the distinct results are collected as
//! negatives for contrastive training.

pub mod dataset;
pub mod generator;
pub mod pools;
pub mod pos;
pub mod replace;
pub mod tagger;

pub use dataset::{process_file, read_records, write_records, Record, RunSummary};
pub use generator::{Generation, GeneratorConfig, NegativeGenerator, Outcome};
pub use pools::WordPools;
pub use pos::Pos;
pub use replace::{apply_replacement, choose_replacement};
pub use tagger::{Language, LexiconTagger, NlpruleTagger, Tagger, Token};
