//! Picking a replacement word and splicing it into a sentence.

use rand::seq::SliceRandom;
use rand::Rng;
use regex::RegexBuilder;

use crate::pools::WordPools;
use crate::pos::Pos;

/// Pick a random pool word for `pos` that differs from `original`, ignoring case.
///
/// Returns `None` for categories without a pool, or when the pool holds
/// nothing but the original word.
pub fn choose_replacement<'p, R: Rng>(
    pools: &'p WordPools,
    original: &str,
    pos: Pos,
    rng: &mut R,
) -> Option<&'p str> {
    let pool = pools.lookup(pos)?;
    let original = original.to_lowercase();
    let options: Vec<&String> = pool.iter().filter(|w| w.to_lowercase() != original).collect();
    options.choose(rng).copied().map(String::as_str)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte range of the first case-insensitive, whole-word occurrence of `target`.
pub fn find_whole_word(sentence: &str, target: &str) -> Option<(usize, usize)> {
    if target.is_empty() {
        return None;
    }
    let re = RegexBuilder::new(&regex::escape(target))
        .case_insensitive(true)
        .build()
        .ok()?;

    let mut from = 0;
    while let Some(m) = re.find_at(sentence, from) {
        let before = sentence[..m.start()].chars().next_back();
        let after = sentence[m.end()..].chars().next();
        if !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char) {
            return Some((m.start(), m.end()));
        }
        // Retry one character further on; matches may overlap.
        from = m.start() + sentence[m.start()..].chars().next().map_or(1, char::len_utf8);
        if from > sentence.len() {
            break;
        }
    }
    None
}

/// Replace the first whole-word occurrence of `target` (case-insensitive) with
/// `replacement`, taken literally. Everything else is copied verbatim; if
/// `target` does not occur as a whole word the sentence comes back unchanged.
pub fn apply_replacement(sentence: &str, target: &str, replacement: &str) -> String {
    match find_whole_word(sentence, target) {
        Some((start, end)) => {
            let mut out = String::with_capacity(sentence.len() + replacement.len());
            out.push_str(&sentence[..start]);
            out.push_str(replacement);
            out.push_str(&sentence[end..]);
            out
        }
        None => sentence.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TEST_SEED: u64 = 42;

    #[test]
    fn never_returns_the_original_word() {
        let pools = WordPools::default();
        let mut rng = StdRng::seed_from_u64(TEST_SEED);
        for (pos, word) in pools.entries() {
            for candidate in [word.to_string(), word.to_uppercase()] {
                let replacement = choose_replacement(&pools, &candidate, pos, &mut rng)
                    .expect("every pool has more than one word");
                assert_ne!(replacement.to_lowercase(), word.to_lowercase());
            }
        }
    }

    #[test]
    fn exclusion_is_case_insensitive_against_pool_entries() {
        let pools = WordPools::new()
            .with_words(Pos::Noun, &["SUV", "van"])
            .with_words(Pos::Adj, &["red"])
            .with_words(Pos::Verb, &["parked"]);
        let mut rng = StdRng::seed_from_u64(TEST_SEED);
        for _ in 0..20 {
            assert_eq!(choose_replacement(&pools, "suv", Pos::Noun, &mut rng), Some("van"));
        }
    }

    #[test]
    fn single_word_pool_has_no_replacement_for_itself() {
        let pools = WordPools::new().with_words(Pos::Adj, &["Red"]);
        let mut rng = StdRng::seed_from_u64(TEST_SEED);
        assert_eq!(choose_replacement(&pools, "red", Pos::Adj, &mut rng), None);
        assert_eq!(choose_replacement(&pools, "blue", Pos::Adj, &mut rng), Some("Red"));
    }

    #[test]
    fn unsupported_category_has_no_replacement() {
        let pools = WordPools::default();
        let mut rng = StdRng::seed_from_u64(TEST_SEED);
        assert_eq!(choose_replacement(&pools, "the", Pos::Det, &mut rng), None);
    }

    #[test]
    fn replaces_whole_words_only() {
        let sentence = "A caravan passes the vans and a van.";
        assert_eq!(
            apply_replacement(sentence, "van", "truck"),
            "A caravan passes the vans and a truck."
        );
    }

    #[test]
    fn replaces_only_the_first_occurrence_ignoring_case() {
        assert_eq!(
            apply_replacement("The Car behind the car", "car", "van"),
            "The van behind the car"
        );
    }

    #[test]
    fn keeps_punctuation_around_the_word() {
        assert_eq!(
            apply_replacement("A red car, parked.", "parked", "idling"),
            "A red car, idling."
        );
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let sentence = "A caravan near the building";
        assert_eq!(apply_replacement(sentence, "van", "truck"), sentence);
        assert_eq!(apply_replacement(sentence, "", "truck"), sentence);
    }

    #[test]
    fn replacement_text_is_literal() {
        assert_eq!(apply_replacement("a red car", "red", "$0 ${1}"), "a $0 ${1} car");
    }

    #[test]
    fn targets_with_regex_metacharacters_are_escaped() {
        assert_eq!(apply_replacement("a c.r and a car", "c.r", "van"), "a van and a car");
        assert_eq!(apply_replacement("a car", "c.r", "van"), "a car");
    }

    #[test]
    fn word_boundaries_follow_unicode_letters() {
        assert_eq!(apply_replacement("the caféred red car", "red", "blue"), "the caféred blue car");
    }
}
