//! Coarse part-of-speech tagset.
//!
//! Tokens carry one of the Universal POS categories. Only [`Pos::Verb`],
//! [`Pos::Adj`] and [`Pos::Noun`] are ever replaced; everything else is kept
//! so token offsets stay complete.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl Pos {
    /// Categories that have a replacement pool.
    pub const REPLACEABLE: [Pos; 3] = [Pos::Verb, Pos::Adj, Pos::Noun];

    pub fn is_replaceable(self) -> bool {
        Self::REPLACEABLE.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
        }
    }

    /// Map a Penn Treebank tag (what nlprule emits for English) onto the coarse set.
    ///
    /// Proper nouns map to `Propn`, so names are never swapped for pool nouns.
    /// Forms of "be", "have" and "do" are tagged as verbs by Penn; callers that
    /// care about auxiliaries refine them with [`Pos::refine_auxiliary`].
    pub fn from_penn(tag: &str) -> Option<Pos> {
        let pos = match tag {
            "NN" | "NNS" => Pos::Noun,
            "NNP" | "NNPS" => Pos::Propn,
            "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" => Pos::Verb,
            "MD" => Pos::Aux,
            "JJ" | "JJR" | "JJS" => Pos::Adj,
            "RB" | "RBR" | "RBS" | "WRB" => Pos::Adv,
            "IN" => Pos::Adp,
            "DT" | "PDT" | "WDT" => Pos::Det,
            "CC" => Pos::Cconj,
            "PRP" | "PRP$" | "WP" | "WP$" | "EX" => Pos::Pron,
            "CD" => Pos::Num,
            "RP" | "TO" | "POS" => Pos::Part,
            "UH" => Pos::Intj,
            "SYM" | "$" | "#" => Pos::Sym,
            "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "PCT" => Pos::Punct,
            "FW" | "LS" => Pos::X,
            _ => return None,
        };
        Some(pos)
    }

    /// Forms of be/have/do are auxiliaries, not content verbs.
    pub fn refine_auxiliary(self, word: &str) -> Pos {
        if self != Pos::Verb {
            return self;
        }
        match word.to_lowercase().as_str() {
            "be" | "am" | "is" | "are" | "was" | "were" | "been" | "being" | "'s" | "'re" | "'m"
            | "have" | "has" | "had" | "'ve" | "do" | "does" | "did" => Pos::Aux,
            _ => self,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pos {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let pos = match s.to_ascii_uppercase().as_str() {
            "ADJ" => Pos::Adj,
            "ADP" => Pos::Adp,
            "ADV" => Pos::Adv,
            "AUX" => Pos::Aux,
            "CCONJ" => Pos::Cconj,
            "DET" => Pos::Det,
            "INTJ" => Pos::Intj,
            "NOUN" => Pos::Noun,
            "NUM" => Pos::Num,
            "PART" => Pos::Part,
            "PRON" => Pos::Pron,
            "PROPN" => Pos::Propn,
            "PUNCT" => Pos::Punct,
            "SCONJ" => Pos::Sconj,
            "SYM" => Pos::Sym,
            "VERB" => Pos::Verb,
            "X" => Pos::X,
            other => anyhow::bail!("unknown part-of-speech category: {other}"),
        };
        Ok(pos)
    }
}
