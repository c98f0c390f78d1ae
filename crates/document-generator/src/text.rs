//! Free-text synthesis for the `content` attribute.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

const SYLLABLES: [&str; 32] = [
    "ka", "lo", "mi", "ren", "tas", "vo", "qui", "dor", "el", "an", "sur", "pe", "ti", "mar",
    "no", "bel", "ex", "ul", "ra", "sin", "to", "ver", "gi", "pla", "cor", "de", "fu", "ho",
    "li", "men", "os", "zi",
];

/// Sizes of the text caches and paragraph length bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentOptions {
    pub word_cache_size: usize,
    pub sentence_cache_size: usize,
    /// Lower sentence bound of every paragraph.
    pub min_sentences: usize,
    /// Range the per-paragraph upper sentence bound is drawn from.
    pub max_sentences: RangeInclusive<usize>,
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            word_cache_size: 10_000,
            sentence_cache_size: 100_000,
            min_sentences: 25,
            max_sentences: 100..=10_000,
        }
    }
}

impl ContentOptions {
    /// Small caches and short paragraphs, for tests and dry runs.
    pub fn small() -> Self {
        Self {
            word_cache_size: 200,
            sentence_cache_size: 500,
            min_sentences: 2,
            max_sentences: 3..=5,
        }
    }
}

/// Source of paragraph text.
pub trait TextGenerator {
    /// A paragraph of `min_sentences..=max_sentences` sentences.
    fn paragraph(&mut self, min_sentences: usize, max_sentences: usize) -> String;

    /// Rebuild any cached vocabulary.
    fn reset_caches(&mut self);
}

/// Text generator drawing sentences from pre-built word and sentence caches.
pub struct CachedTextGenerator {
    rng: StdRng,
    options: ContentOptions,
    words: Vec<String>,
    sentences: Vec<String>,
}

impl CachedTextGenerator {
    pub fn new(options: ContentOptions) -> Self {
        Self::with_rng(StdRng::from_os_rng(), options)
    }

    pub fn with_seed(seed: u64, options: ContentOptions) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), options)
    }

    fn with_rng(rng: StdRng, options: ContentOptions) -> Self {
        let mut generator = Self {
            rng,
            options,
            words: Vec::new(),
            sentences: Vec::new(),
        };
        generator.reset_caches();
        generator
    }

    pub fn options(&self) -> &ContentOptions {
        &self.options
    }

    pub fn word_cache_len(&self) -> usize {
        self.words.len()
    }

    pub fn sentence_cache_len(&self) -> usize {
        self.sentences.len()
    }

    fn word(&mut self) -> String {
        let syllables = self.rng.random_range(1..=4);
        (0..syllables)
            .filter_map(|_| SYLLABLES.choose(&mut self.rng).copied())
            .collect()
    }

    fn sentence(&mut self) -> String {
        let len = self.rng.random_range(4..=15);
        let words: Vec<&str> = (0..len)
            .filter_map(|_| self.words.choose(&mut self.rng).map(String::as_str))
            .collect();
        let mut sentence = capitalize(&words.join(" "));
        sentence.push('.');
        sentence
    }
}

impl TextGenerator for CachedTextGenerator {
    fn paragraph(&mut self, min_sentences: usize, max_sentences: usize) -> String {
        let count = self
            .rng
            .random_range(min_sentences..=max_sentences.max(min_sentences));
        let mut out = String::new();
        for i in 0..count {
            let Some(sentence) = self.sentences.choose(&mut self.rng) else {
                break;
            };
            if i > 0 {
                out.push(' ');
            }
            out.push_str(sentence);
        }
        out
    }

    fn reset_caches(&mut self) {
        let words = (0..self.options.word_cache_size.max(1))
            .map(|_| self.word())
            .collect();
        self.words = words;
        let sentences = (0..self.options.sentence_cache_size.max(1))
            .map(|_| self.sentence())
            .collect();
        self.sentences = sentences;
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
