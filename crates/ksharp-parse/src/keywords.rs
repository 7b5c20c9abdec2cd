//! Keyword classification over a shared-prefix trie.
//!
//! The trie is built once from [`KEYWORDS`] and never mutated afterwards, so
//! one instance can serve any number of lexers by shared reference.

use std::sync::OnceLock;

pub const KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "for", "while", "do", "switch", "case", "default", "break",
    "continue", "return", "print", "input", "writeln", "readln", "begin", "end", "then", "of",
    "repeat", "until",
];

#[derive(Debug, Clone)]
pub struct TrieNode {
    ch: char,
    children: Vec<TrieNode>,
    terminal: bool,
}

impl TrieNode {
    fn new(ch: char) -> Self {
        Self {
            ch,
            children: Vec::new(),
            terminal: false,
        }
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn children(&self) -> &[TrieNode] {
        &self.children
    }

    /// True iff some inserted word ends exactly at this node.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeywordTrie {
    roots: Vec<TrieNode>,
}

impl KeywordTrie {
    /// Trie over the language keyword list.
    pub fn build() -> Self {
        Self::from_words(KEYWORDS.iter().copied())
    }

    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        let mut trie = Self::default();
        for w in words {
            trie.insert(w);
        }
        trie
    }

    /// Process-wide keyword trie, built on first use.
    pub fn shared() -> &'static KeywordTrie {
        static SHARED: OnceLock<KeywordTrie> = OnceLock::new();
        SHARED.get_or_init(KeywordTrie::build)
    }

    fn insert(&mut self, word: &str) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return;
        };
        // follow the existing prefix, then grow a fresh chain for the rest
        let mut node = child_or_insert(&mut self.roots, first);
        for ch in chars {
            node = child_or_insert(&mut node.children, ch);
        }
        node.terminal = true;
    }

    /// Exact membership. Proper prefixes of keywords do not match.
    pub fn matches(&self, word: &str) -> bool {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let Some(mut node) = self.roots.iter().find(|n| n.ch == first) else {
            return false;
        };
        for ch in chars {
            match node.children.iter().find(|n| n.ch == ch) {
                Some(next) => node = next,
                None => return false,
            }
        }
        node.terminal
    }

    pub fn roots(&self) -> &[TrieNode] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        fn count(n: &TrieNode) -> usize {
            1 + n.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }
}

fn child_or_insert(nodes: &mut Vec<TrieNode>, ch: char) -> &mut TrieNode {
    let idx = match nodes.iter().position(|n| n.ch == ch) {
        Some(i) => i,
        None => {
            nodes.push(TrieNode::new(ch));
            nodes.len() - 1
        }
    };
    &mut nodes[idx]
}
