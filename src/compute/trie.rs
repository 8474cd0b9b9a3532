//! Binary pattern trie for exact window matching.
//!
//! Nodes live in a flat arena and reference children by index. A path from
//! the root spells out a window in row-major order; the node reached after
//! `window_len` symbols stores the pattern score.

use crate::schema::{ConfigError, MatchMode, Pattern, validate_patterns};

const NULL_NODE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct TrieNode {
    /// Child index for symbol 0 and symbol 1.
    children: [u32; 2],
    /// Set only on terminal nodes.
    score: Option<i32>,
}

impl TrieNode {
    const EMPTY: TrieNode = TrieNode {
        children: [NULL_NODE, NULL_NODE],
        score: None,
    };
}

/// Immutable prefix tree over fixed-length binary windows.
///
/// Built in one go from a pattern snapshot. Owners replace the whole trie
/// when patterns change instead of editing it.
#[derive(Debug, Clone)]
pub struct PatternTrie {
    nodes: Vec<TrieNode>,
    window_len: Option<usize>,
    pattern_count: usize,
}

impl Default for PatternTrie {
    fn default() -> Self {
        Self::empty()
    }
}

impl PatternTrie {
    /// Trie with no patterns. Every lookup scores 0.
    pub fn empty() -> Self {
        Self {
            nodes: vec![TrieNode::EMPTY],
            window_len: None,
            pattern_count: 0,
        }
    }

    /// Build a trie from patterns, inserted in collection order.
    ///
    /// Duplicate bit sequences keep the score of the last occurrence.
    pub fn build(patterns: &[Pattern]) -> Result<Self, ConfigError> {
        let window_len = validate_patterns(patterns)?;

        let mut trie = Self::empty();
        trie.window_len = window_len;
        for pattern in patterns {
            trie.insert(&pattern.data, pattern.score);
        }
        trie.pattern_count = patterns.len();
        Ok(trie)
    }

    fn insert(&mut self, data: &[u8], score: i32) {
        let mut node = 0usize;
        for &bit in data {
            let branch = bit as usize;
            let child = self.nodes[node].children[branch];
            node = if child == NULL_NODE {
                let next = self.nodes.len();
                self.nodes.push(TrieNode::EMPTY);
                self.nodes[node].children[branch] = next as u32;
                next
            } else {
                child as usize
            };
        }
        self.nodes[node].score = Some(score);
    }

    /// Follow `window` from the root, returning the terminal node if every branch exists.
    fn walk(&self, window: &[u8]) -> Option<&TrieNode> {
        let len = self.window_len?;
        assert_eq!(
            window.len(),
            len,
            "window length {} does not match trie window length {}",
            window.len(),
            len
        );

        let mut node = &self.nodes[0];
        for &bit in window {
            let child = node.children[bit as usize];
            if child == NULL_NODE {
                return None;
            }
            node = &self.nodes[child as usize];
        }
        Some(node)
    }

    /// Score of the pattern equal to `window`, or 0 when none was inserted.
    ///
    /// # Panics
    /// Panics if `window` is not exactly `window_len` long.
    pub fn lookup(&self, window: &[u8]) -> i32 {
        self.walk(window).and_then(|n| n.score).unwrap_or(0)
    }

    /// Whether a pattern equal to `window` was inserted, whatever its score.
    pub fn matches(&self, window: &[u8]) -> bool {
        self.walk(window).is_some_and(|n| n.score.is_some())
    }

    /// Evidence for `window` under the given mode: the score, or 1/0 for membership.
    #[inline]
    pub fn evaluate(&self, window: &[u8], mode: MatchMode) -> i32 {
        match mode {
            MatchMode::Scored => self.lookup(window),
            MatchMode::Membership => i32::from(self.matches(window)),
        }
    }

    /// Shared length of every indexed pattern. `None` for an empty trie.
    #[inline]
    pub fn window_len(&self) -> Option<usize> {
        self.window_len
    }

    /// Number of patterns the trie was built from, duplicates included.
    #[inline]
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Number of arena nodes, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pattern_count == 0
    }
}
