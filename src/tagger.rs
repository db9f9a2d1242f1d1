//! Tokenization and part-of-speech tagging.
//!
//! The generator only needs [`Tagger::tag`]. [`NlpruleTagger`] wraps the
//! nlprule English tokenizer; [`LexiconTagger`] tags by dictionary lookup and
//! works without any model files.

use anyhow::{Context, Result};
use nlprule::Tokenizer;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

use crate::pools::WordPools;
use crate::pos::Pos;

/// One tagged token. `start..end` is a byte range into the tagged sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub pos: Pos,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize, pos: Pos) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            pos,
        }
    }
}

/// Anything that can split a sentence into tagged tokens.
pub trait Tagger {
    /// Tag `sentence`, returning every token (not just content words) in order.
    fn tag(&self, sentence: &str) -> Result<Vec<Token>>;
}

/// Supported tagger languages
#[derive(Debug, Clone, Copy)]
pub enum Language {
    English,
}

impl Language {
    /// ISO 639-1 code
    fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
        }
    }

    fn tokenizer_filename(&self) -> String {
        format!("{}_tokenizer.bin", self.code())
    }
}

/// Tagger backed by an nlprule tokenizer binary.
pub struct NlpruleTagger {
    tokenizer: Tokenizer,
}

impl NlpruleTagger {
    pub fn from_path(tokenizer_path: &Path) -> Result<Self> {
        let tokenizer = Tokenizer::new(tokenizer_path)
            .with_context(|| format!("Failed to load tokenizer from {}", tokenizer_path.display()))?;
        Ok(Self { tokenizer })
    }

    /// Load the tokenizer for `language` from the first location that has it:
    /// /opt/nlprule-data/, /app/data/, data/, then the current directory.
    pub fn from_language(language: Language) -> Result<Self> {
        let filename = language.tokenizer_filename();
        let locations = ["/opt/nlprule-data/", "/app/data/", "data/", ""];

        for location in &locations {
            let path = format!("{}{}", location, filename);
            if Path::new(&path).exists() {
                return Self::from_path(Path::new(&path));
            }
        }

        Self::from_path(Path::new(&filename)).with_context(|| {
            format!(
                "Could not find {} in any of: /opt/nlprule-data/, /app/data/, data/, or the current directory",
                filename
            )
        })
    }
}

impl Tagger for NlpruleTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<Token>> {
        let mut tagged = Vec::new();
        for sent in self.tokenizer.pipe(sentence) {
            for token in sent.tokens() {
                let text = token.word().text().as_str();
                if text.trim().is_empty() {
                    continue;
                }
                // First tag nlprule knows how to map wins; unknown tags fall back to X.
                let pos = token
                    .word()
                    .tags()
                    .iter()
                    .find_map(|tag| Pos::from_penn(tag.pos().as_str()))
                    .unwrap_or(Pos::X)
                    .refine_auxiliary(text);
                tagged.push((text.to_string(), pos));
            }
        }
        align_tokens(sentence, tagged)
    }
}

/// Attach byte offsets to tagged words by scanning `sentence` left to right.
///
/// Offsets always come out relative to `sentence`, even when the tokenizer
/// split it into several sentences. Fails if a word does not occur at or
/// after the end of the previous one.
pub fn align_tokens(sentence: &str, tagged: Vec<(String, Pos)>) -> Result<Vec<Token>> {
    let mut cursor = 0;
    let mut tokens = Vec::with_capacity(tagged.len());
    for (text, pos) in tagged {
        let start = match sentence[cursor..].find(text.as_str()) {
            Some(offset) => cursor + offset,
            None => anyhow::bail!("token {text:?} not found in {sentence:?} after byte {cursor}"),
        };
        let end = start + text.len();
        cursor = end;
        tokens.push(Token::new(text, start, end, pos));
    }
    Ok(tokens)
}

/// Dictionary tagger: words are split by regex and tagged by lowercase lookup.
///
/// Unknown words are tagged `X`, punctuation `PUNCT`. The first category
/// registered for a word wins.
#[derive(Clone, Debug)]
pub struct LexiconTagger {
    words: HashMap<String, Pos>,
    word_re: Regex,
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconTagger {
    pub fn new() -> Self {
        Self {
            words: HashMap::new(),
            word_re: Regex::new(r"\w+(?:['’]\w+)*|[^\w\s]").expect("static token regex"),
        }
    }

    pub fn with_words(mut self, pos: Pos, words: &[&str]) -> Self {
        for word in words {
            self.words.entry(word.to_lowercase()).or_insert(pos);
        }
        self
    }

    /// A tagger that knows every pool word under its pool's category, plus
    /// the common function words found in captions.
    pub fn from_pools(pools: &WordPools) -> Self {
        let mut tagger = Self::new()
            .with_words(Pos::Det, &["a", "an", "the", "this", "that", "these", "those", "some", "each"])
            .with_words(
                Pos::Adp,
                &["in", "on", "at", "of", "near", "behind", "beside", "under", "with", "by", "from"],
            )
            .with_words(
                Pos::Aux,
                &["is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "can", "may"],
            )
            .with_words(Pos::Cconj, &["and", "or", "but"])
            .with_words(Pos::Pron, &["it", "its", "they", "their", "there"]);
        for (pos, word) in pools.entries() {
            tagger.words.entry(word.to_lowercase()).or_insert(pos);
        }
        tagger
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<Token>> {
        let tokens = self
            .word_re
            .find_iter(sentence)
            .map(|m| {
                let text = m.as_str();
                let pos = match self.words.get(&text.to_lowercase()) {
                    Some(pos) => *pos,
                    None if !text.chars().any(char::is_alphanumeric) => Pos::Punct,
                    None if text.chars().all(|c| c.is_ascii_digit()) => Pos::Num,
                    None => Pos::X,
                };
                Token::new(text, m.start(), m.end(), pos)
            })
            .collect();
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_tagger_reports_byte_spans() {
        let tagger = LexiconTagger::new()
            .with_words(Pos::Adj, &["red"])
            .with_words(Pos::Noun, &["car"]);
        let tokens = tagger.tag("A red car.").unwrap();

        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "red", "car", "."]);
        assert_eq!(tokens[1], Token::new("red", 2, 5, Pos::Adj));
        assert_eq!(tokens[2], Token::new("car", 6, 9, Pos::Noun));
        assert_eq!(tokens[3].pos, Pos::Punct);
        assert_eq!(tokens[0].pos, Pos::X);
    }

    #[test]
    fn lexicon_lookup_ignores_case() {
        let tagger = LexiconTagger::new().with_words(Pos::Noun, &["SUV"]);
        let tokens = tagger.tag("An suv").unwrap();
        assert_eq!(tokens[1].pos, Pos::Noun);
    }

    #[test]
    fn pool_tagger_knows_function_words_first() {
        let tagger = LexiconTagger::from_pools(&WordPools::default());
        let tokens = tagger.tag("A red car is parked near the building").unwrap();
        let tags: Vec<Pos> = tokens.iter().map(|t| t.pos).collect();
        assert_eq!(
            tags,
            vec![
                Pos::Det,
                Pos::Adj,
                Pos::Noun,
                Pos::Aux,
                Pos::Verb,
                Pos::Adp,
                Pos::Det,
                Pos::Noun
            ]
        );
    }

    #[test]
    fn aligned_offsets_follow_repeated_words() {
        let sentence = "The car passed the car. Then it stopped.";
        let tagged = vec![
            ("The".to_string(), Pos::Det),
            ("car".to_string(), Pos::Noun),
            ("passed".to_string(), Pos::Verb),
            ("the".to_string(), Pos::Det),
            ("car".to_string(), Pos::Noun),
            (".".to_string(), Pos::Punct),
            ("Then".to_string(), Pos::Adv),
            ("it".to_string(), Pos::Pron),
            ("stopped".to_string(), Pos::Verb),
            (".".to_string(), Pos::Punct),
        ];
        let tokens = align_tokens(sentence, tagged).unwrap();

        for token in &tokens {
            assert_eq!(&sentence[token.start..token.end], token.text);
        }
        assert_eq!(tokens[1], Token::new("car", 4, 7, Pos::Noun));
        assert_eq!(tokens[4], Token::new("car", 19, 22, Pos::Noun));
        assert_eq!((tokens[9].start, tokens[9].end), (39, 40));
    }

    #[test]
    fn aligned_offsets_are_byte_offsets() {
        let tokens = align_tokens(
            "Ein rotes Auto vor dem Gebäude",
            vec![("Gebäude".to_string(), Pos::Noun)],
        )
        .unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (23, 31));
    }

    #[test]
    fn alignment_fails_for_words_out_of_order() {
        let tagged = vec![("car".to_string(), Pos::Noun), ("red".to_string(), Pos::Adj)];
        assert!(align_tokens("a red car", tagged).is_err());
    }

    #[test]
    fn nlprule_tagger_tags_content_words() -> Result<()> {
        // Needs en_tokenizer.bin on disk
        let tagger = match NlpruleTagger::from_language(Language::English) {
            Ok(tagger) => tagger,
            Err(_) => return Ok(()),
        };

        let sentence = "A red car is parked near the building";
        let tokens = tagger.tag(sentence)?;
        for token in &tokens {
            assert_eq!(&sentence[token.start..token.end], token.text);
        }
        let car = tokens.iter().find(|t| t.text == "car").expect("car token");
        assert_eq!(car.pos, Pos::Noun);
        Ok(())
    }
}
