//! Replacement word pools, one per content category.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::pos::Pos;

const VERBS: &[&str] = &[
    "parked", "driving", "displayed", "speeds", "racing", "accelerating", "climbing",
    "towing", "passing", "overtaking", "braking", "gliding", "drifting", "idling",
    "positioned", "standing", "resting", "showcasing", "maneuvering", "stopping",
    "sliding", "zooming", "lurking", "posing", "revving", "charging", "skidding", "cruising",
];

const ADJECTIVES: &[&str] = &[
    "blue", "red", "green", "yellow", "white", "gray", "orange", "brown", "black", "gold",
    "purple", "pink", "bronze", "chrome", "matte", "graphite", "small", "compact", "tiny",
    "narrow", "slim", "mini", "bulky", "rugged", "spacious", "oversized", "sleek", "boxy",
    "plain", "dull", "bright", "dim", "shadowy", "faint", "foggy", "luxurious", "modern",
    "classic", "clean", "tinted", "shiny", "sporty", "aggressive", "soft", "hard", "sharp",
    "messy", "glossy", "decorated", "faded", "glowing", "dusty", "vintage", "elegant",
    "streamlined", "noisy", "silent", "colorful", "reflective", "angular", "dynamic", "curvy",
    "blocky", "striped", "powerful", "rounded", "sophisticated",
];

const NOUNS: &[&str] = &[
    "sedan", "SUV", "hatchback", "convertible", "pickup", "van", "wagon", "coupe", "minivan",
    "truck", "vehicle", "automobile", "car", "rims", "hubs", "tires", "spokes", "windows",
    "windshield", "glass", "panes", "screens", "grille", "bumper", "hood", "mesh", "lamps",
    "lights", "beams", "bulbs", "roof", "top", "canopy", "pipes", "vents", "outlets", "panel",
    "gate", "entrance", "registration", "plate", "tag", "taillights", "indicators", "signals",
    "headlights", "door", "mirror", "trunk", "engine", "dashboard", "seat", "steering",
    "sunroof", "wheelbase", "frame", "fender", "spoiler", "badge", "logo", "garage", "alley",
    "building", "sign", "highway", "road", "parking", "lot", "showroom", "background",
    "exhaust", "street", "lane", "trailer", "window", "light", "grill", "display", "hall",
    "event", "flag", "object", "surface", "ground", "intersection", "driveway", "asphalt",
    "terrain", "track", "interior", "skyline",
];

/// Static candidate lists for verbs, adjectives and nouns.
///
/// Entries are stored as written (so "SUV" stays upper case); comparisons
/// against the word being replaced are case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPools {
    pub verbs: Vec<String>,
    pub adjectives: Vec<String>,
    pub nouns: Vec<String>,
}

impl Default for WordPools {
    fn default() -> Self {
        Self::new()
            .with_words(Pos::Verb, VERBS)
            .with_words(Pos::Adj, ADJECTIVES)
            .with_words(Pos::Noun, NOUNS)
    }
}

impl WordPools {
    /// Empty pools; fill them with [`WordPools::with_words`].
    pub fn new() -> Self {
        Self {
            verbs: Vec::new(),
            adjectives: Vec::new(),
            nouns: Vec::new(),
        }
    }

    /// Append words to the pool for `pos`. Words for categories without a pool are ignored.
    pub fn with_words(mut self, pos: Pos, words: &[&str]) -> Self {
        if let Some(pool) = self.pool_mut(pos) {
            pool.extend(words.iter().map(|w| w.to_string()));
        }
        self
    }

    /// Load pools from a YAML (`.yaml` / `.yml`) or JSON file with
    /// `verbs`, `adjectives` and `nouns` lists.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word pools from {}", path.display()))?;
        let pools: WordPools = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .with_context(|| format!("Invalid YAML word pools in {}", path.display()))?,
            _ => serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON word pools in {}", path.display()))?,
        };
        pools.validate()?;
        Ok(pools)
    }

    /// Every pool must offer at least one candidate.
    pub fn validate(&self) -> Result<()> {
        for pos in Pos::REPLACEABLE {
            let empty = self.lookup(pos).map_or(true, |pool| pool.is_empty());
            if empty {
                anyhow::bail!("word pool for {pos} is empty");
            }
        }
        Ok(())
    }

    /// Candidate list for `pos`, or `None` if the category is never replaced.
    pub fn lookup(&self, pos: Pos) -> Option<&[String]> {
        match pos {
            Pos::Verb => Some(&self.verbs),
            Pos::Adj => Some(&self.adjectives),
            Pos::Noun => Some(&self.nouns),
            _ => None,
        }
    }

    fn pool_mut(&mut self, pos: Pos) -> Option<&mut Vec<String>> {
        match pos {
            Pos::Verb => Some(&mut self.verbs),
            Pos::Adj => Some(&mut self.adjectives),
            Pos::Noun => Some(&mut self.nouns),
            _ => None,
        }
    }

    /// Iterate `(category, word)` over every pool entry.
    pub fn entries(&self) -> impl Iterator<Item = (Pos, &str)> {
        Pos::REPLACEABLE.into_iter().flat_map(move |pos| {
            self.lookup(pos)
                .unwrap_or_default()
                .iter()
                .map(move |w| (pos, w.as_str()))
        })
    }
}
