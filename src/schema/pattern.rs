//! Labeled example windows and the collections that supply them.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Score conventionally given to a "good" example.
pub const GOOD_SCORE: i32 = 1;
/// Score conventionally given to a "bad" example.
pub const BAD_SCORE: i32 = -1;

/// A labeled example window: row-major binary cells plus a signed score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Flattened window cells, each 0 or 1.
    pub data: Vec<u8>,
    /// Evidence contributed by every window matching `data`.
    pub score: i32,
}

impl Pattern {
    pub fn new(data: Vec<u8>, score: i32) -> Self {
        Self { data, score }
    }

    /// Example of a neighborhood that should survive.
    pub fn good(data: Vec<u8>) -> Self {
        Self::new(data, GOOD_SCORE)
    }

    /// Example of a neighborhood that should be resampled.
    pub fn bad(data: Vec<u8>) -> Self {
        Self::new(data, BAD_SCORE)
    }

    /// Parse a compact bit string such as `"010111010"`. Whitespace is ignored.
    pub fn from_bits(bits: &str, score: i32) -> Option<Self> {
        let data = bits
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                '0' => Some(0),
                '1' => Some(1),
                _ => None,
            })
            .collect::<Option<Vec<u8>>>()?;
        Some(Self::new(data, score))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Anything able to hand out a snapshot of the current example set.
///
/// Called every time the trie has to be rebuilt.
pub trait PatternSource {
    fn patterns(&self) -> Vec<Pattern>;
}

impl PatternSource for [Pattern] {
    fn patterns(&self) -> Vec<Pattern> {
        self.to_vec()
    }
}

impl PatternSource for Vec<Pattern> {
    fn patterns(&self) -> Vec<Pattern> {
        self.clone()
    }
}

/// Ordered, serializable pattern collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSet {
    pub patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// Build from separate good and bad example lists. Good examples come first,
    /// so a bad example with the same cells overrides a good one.
    pub fn from_labeled(good: Vec<Vec<u8>>, bad: Vec<Vec<u8>>) -> Self {
        let patterns = good
            .into_iter()
            .map(Pattern::good)
            .chain(bad.into_iter().map(Pattern::bad))
            .collect();
        Self { patterns }
    }

    pub fn push(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    /// Remove the pattern at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<Pattern> {
        (index < self.patterns.len()).then(|| self.patterns.remove(index))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check that every pattern is binary and all share one length.
    ///
    /// Returns the shared length, or `None` for an empty set.
    pub fn validate(&self) -> Result<Option<usize>, ConfigError> {
        validate_patterns(&self.patterns)
    }
}

impl PatternSource for PatternSet {
    fn patterns(&self) -> Vec<Pattern> {
        self.patterns.clone()
    }
}

/// Validate a pattern slice, returning the common window length.
pub fn validate_patterns(patterns: &[Pattern]) -> Result<Option<usize>, ConfigError> {
    let mut expected = None;
    for (index, pattern) in patterns.iter().enumerate() {
        if pattern.is_empty() {
            return Err(ConfigError::EmptyPattern { index });
        }
        if let Some((position, &value)) = pattern.data.iter().enumerate().find(|&(_, &v)| v > 1) {
            return Err(ConfigError::NonBinarySymbol {
                index,
                position,
                value,
            });
        }
        match expected {
            None => expected = Some(pattern.len()),
            Some(len) if len != pattern.len() => {
                return Err(ConfigError::PatternLengthMismatch {
                    index,
                    expected: len,
                    found: pattern.len(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(expected)
}
