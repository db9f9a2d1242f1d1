//! Hard negative generation for a single caption.
//!
//! Each attempt samples `k` eligible tokens (verbs, adjectives and nouns that
//! sit outside any protected phrase), swaps each for a pool word, and keeps
//! the result if it is new. Attempts repeat until `n` distinct negatives
//! exist, the caption has too few eligible tokens, or the attempt cap runs out.

use anyhow::Result;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::RegexBuilder;
use std::collections::HashSet;

use crate::pools::WordPools;
use crate::replace::{apply_replacement, choose_replacement};
use crate::tagger::{Tagger, Token};

pub const DEFAULT_NEGATIVES: usize = 10;
pub const DEFAULT_REPLACEMENTS: usize = 2;
/// Attempt cap per caption is this many times the requested negatives.
pub const ATTEMPTS_PER_NEGATIVE: usize = 10;

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Distinct negatives wanted per caption (`n`).
    pub negatives: usize,
    /// Tokens replaced per attempt (`k`).
    pub replacements: usize,
    /// Phrases whose first occurrence is never modified.
    pub protected_phrases: Vec<String>,
    /// Overrides the default cap of `ATTEMPTS_PER_NEGATIVE * negatives`.
    pub max_attempts: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            negatives: DEFAULT_NEGATIVES,
            replacements: DEFAULT_REPLACEMENTS,
            protected_phrases: vec!["in front of".to_string()],
            max_attempts: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.negatives == 0 {
            anyhow::bail!("negatives per caption must be at least 1");
        }
        if self.replacements == 0 {
            anyhow::bail!("replacements per attempt must be at least 1");
        }
        if self.max_attempts == Some(0) {
            anyhow::bail!("max attempts must be at least 1");
        }
        Ok(())
    }

    pub fn attempt_limit(&self) -> usize {
        self.max_attempts
            .unwrap_or_else(|| self.negatives.saturating_mul(ATTEMPTS_PER_NEGATIVE))
    }
}

/// How generation for one caption ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// All requested negatives were collected.
    Enough,
    /// Fewer than `k` eligible tokens; nothing can be sampled.
    Starved,
    /// The attempt cap was hit before collecting enough negatives.
    Exhausted { attempts: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Distinct negatives in the order they were found.
    pub negatives: Vec<String>,
    pub outcome: Outcome,
}

/// Half-open byte ranges of the first case-insensitive occurrence of each phrase.
pub fn protected_spans(caption: &str, phrases: &[String]) -> Vec<(usize, usize)> {
    phrases
        .iter()
        .filter(|phrase| !phrase.is_empty())
        .filter_map(|phrase| {
            let re = RegexBuilder::new(&regex::escape(phrase))
                .case_insensitive(true)
                .build()
                .ok()?;
            re.find(caption).map(|m| (m.start(), m.end()))
        })
        .collect()
}

/// True if `[start, end)` starts or ends inside any protected span.
pub fn is_protected(start: usize, end: usize, spans: &[(usize, usize)]) -> bool {
    spans
        .iter()
        .any(|&(ps, pe)| (ps <= start && start < pe) || (ps < end && end <= pe))
}

/// Tokens that may be replaced: content words outside protected spans.
pub fn eligible_tokens(tokens: Vec<Token>, spans: &[(usize, usize)]) -> Vec<Token> {
    tokens
        .into_iter()
        .filter(|t| t.pos.is_replaceable() && !is_protected(t.start, t.end, spans))
        .collect()
}

pub struct NegativeGenerator<'a, T: Tagger> {
    tagger: &'a T,
    pools: &'a WordPools,
    config: GeneratorConfig,
}

impl<'a, T: Tagger> NegativeGenerator<'a, T> {
    pub fn new(tagger: &'a T, pools: &'a WordPools, config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        pools.validate()?;
        Ok(Self {
            tagger,
            pools,
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate up to `n` distinct negatives for `caption`.
    pub fn generate<R: Rng>(&self, caption: &str, rng: &mut R) -> Generation {
        let k = self.config.replacements;
        let limit = self.config.attempt_limit();

        // Tagging depends only on the caption, so it is done once for all attempts.
        let tokens = match self.tagger.tag(caption) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("Tagging failed for caption {:?}: {:#}", caption, e);
                Vec::new()
            }
        };
        let spans = protected_spans(caption, &self.config.protected_phrases);
        let eligible = eligible_tokens(tokens, &spans);

        let mut negatives: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        if eligible.len() < k {
            debug!(
                "Only {} eligible tokens (need {}) in {:?}",
                eligible.len(),
                k,
                caption
            );
            return Generation {
                negatives,
                outcome: Outcome::Starved,
            };
        }

        let mut attempts = 0;
        while negatives.len() < self.config.negatives {
            if attempts >= limit {
                warn!(
                    "Gave up after {} attempts with {}/{} negatives for {:?}",
                    attempts,
                    negatives.len(),
                    self.config.negatives,
                    caption
                );
                return Generation {
                    negatives,
                    outcome: Outcome::Exhausted { attempts },
                };
            }
            attempts += 1;

            let modified = self.perturb(caption, &eligible, rng);
            if modified != caption && seen.insert(modified.clone()) {
                negatives.push(modified);
            }
        }

        debug!("Collected {} negatives in {} attempts", negatives.len(), attempts);
        Generation {
            negatives,
            outcome: Outcome::Enough,
        }
    }

    /// One attempt: replace up to `k` sampled tokens, each surface word at most once.
    fn perturb<R: Rng>(&self, caption: &str, eligible: &[Token], rng: &mut R) -> String {
        let mut modified = caption.to_string();
        let mut used: HashSet<String> = HashSet::new();

        for token in eligible.choose_multiple(rng, self.config.replacements) {
            let word = token.text.to_lowercase();
            if used.contains(&word) {
                continue;
            }
            if let Some(replacement) = choose_replacement(self.pools, &token.text, token.pos, rng) {
                modified = apply_replacement(&modified, &token.text, replacement);
                used.insert(word);
            }
        }
        modified
    }
}
