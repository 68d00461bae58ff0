//! Text normalization for the product index.
//!
//! Implements a four-stage text analysis pipeline:
//! 1. `SimpleTokenizer` - splits on whitespace and punctuation
//! 2. `LowerCaser` - converts tokens to lowercase
//! 3. `RemoveLongFilter` - removes tokens longer than 40 bytes
//! 4. `Stemmer` - applies language-specific stemming
//!
//! The same [`TextNormalizer`] produces the terms stored at index time and the
//! terms required at query time, which is what makes term matching sound.

use std::collections::BTreeSet;

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer, TokenStream,
};

use crate::IndexError;

/// A set of normalized terms, ordered for deterministic iteration.
pub type TermSet = BTreeSet<String>;

/// Maximum token length in bytes before filtering.
const MAX_TOKEN_LENGTH: usize = 40;

/// Parses a stemmer language string into a Tantivy `Language`.
///
/// Supports lowercase language names matching Tantivy's `Language` enum.
/// Returns an error if the language is not recognized.
pub fn parse_language(name: &str) -> Result<Language, IndexError> {
    match name.to_lowercase().as_str() {
        "arabic" => Ok(Language::Arabic),
        "danish" => Ok(Language::Danish),
        "dutch" => Ok(Language::Dutch),
        "english" => Ok(Language::English),
        "finnish" => Ok(Language::Finnish),
        "french" => Ok(Language::French),
        "german" => Ok(Language::German),
        "greek" => Ok(Language::Greek),
        "hungarian" => Ok(Language::Hungarian),
        "italian" => Ok(Language::Italian),
        "norwegian" => Ok(Language::Norwegian),
        "portuguese" => Ok(Language::Portuguese),
        "romanian" => Ok(Language::Romanian),
        "russian" => Ok(Language::Russian),
        "spanish" => Ok(Language::Spanish),
        "swedish" => Ok(Language::Swedish),
        "tamil" => Ok(Language::Tamil),
        "turkish" => Ok(Language::Turkish),
        other => Err(IndexError::InvalidLanguage(other.to_string())),
    }
}

/// Turns free text into a canonical set of stemmed terms.
#[derive(Clone)]
pub struct TextNormalizer {
    /// Configured analysis pipeline; cloned per call since token streams need `&mut`.
    analyzer: TextAnalyzer,
}

impl TextNormalizer {
    /// Builds a normalizer stemming with the given language.
    pub fn new(language: Language) -> Self {
        let analyzer = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
            .filter(Stemmer::new(language))
            .build();
        Self { analyzer }
    }

    /// Builds a normalizer from a language name such as `"english"`.
    pub fn from_name(language_name: &str) -> Result<Self, IndexError> {
        let language = parse_language(language_name)?;
        Ok(Self::new(language))
    }

    /// Normalizes text into its set of terms. Duplicate tokens collapse.
    pub fn normalize(&self, text: &str) -> TermSet {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut terms = TermSet::new();
        while stream.advance() {
            terms.insert(stream.token().text.clone());
        }
        terms
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(Language::English)
    }
}
