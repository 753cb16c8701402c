/// Corpus statistics — determiner and preposition preferences mined from a
/// part-of-speech tagged reference corpus.
///
/// Every query re-scans the whole corpus with a sliding n-gram window, so a
/// batch pays O(corpus) per table it derives. The corpus itself is never
/// mutated and can be shared between generators.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("malformed token '{0}': expected word/TAG")]
    MalformedToken(String),
    #[error("unknown part-of-speech tag '{0}'")]
    UnknownTag(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Universal part-of-speech tagset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    Adj,
    Adp,
    Adv,
    Conj,
    Det,
    Noun,
    Num,
    Prt,
    Pron,
    Verb,
    Punct,
    Other,
}

impl PosTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Conj => "CONJ",
            Self::Det => "DET",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Prt => "PRT",
            Self::Pron => "PRON",
            Self::Verb => "VERB",
            Self::Punct => ".",
            Self::Other => "X",
        }
    }
}

impl FromStr for PosTag {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ADJ" => Self::Adj,
            "ADP" => Self::Adp,
            "ADV" => Self::Adv,
            "CONJ" => Self::Conj,
            "DET" => Self::Det,
            "NOUN" => Self::Noun,
            "NUM" => Self::Num,
            "PRT" => Self::Prt,
            "PRON" => Self::Pron,
            "VERB" => Self::Verb,
            "." => Self::Punct,
            "X" => Self::Other,
            other => return Err(CorpusError::UnknownTag(other.to_string())),
        })
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A corpus token with its tag. The lowercase form is cached for scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedWord {
    pub word: String,
    pub tag: PosTag,
    lower: String,
}

impl TaggedWord {
    pub fn new(word: impl Into<String>, tag: PosTag) -> Self {
        let word = word.into();
        let lower = word.to_lowercase();
        Self { word, tag, lower }
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }
}

/// A tagged reference corpus in original document order.
#[derive(Debug, Clone, Default)]
pub struct TaggedCorpus {
    words: Vec<TaggedWord>,
}

impl TaggedCorpus {
    /// Parse whitespace-separated `word/TAG` tokens. The tag follows the
    /// last slash, so words may themselves contain slashes.
    pub fn parse(text: &str) -> Result<TaggedCorpus, CorpusError> {
        let mut words = Vec::new();
        for token in text.split_whitespace() {
            let (word, tag) = token
                .rsplit_once('/')
                .filter(|(w, t)| !w.is_empty() && !t.is_empty())
                .ok_or_else(|| CorpusError::MalformedToken(token.to_string()))?;
            words.push(TaggedWord::new(word, tag.parse()?));
        }
        Ok(TaggedCorpus { words })
    }

    /// Load a corpus from a `word/TAG` text file.
    pub fn load(path: &Path) -> Result<TaggedCorpus, CorpusError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn words(&self) -> &[TaggedWord] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Preferred determiner per target word.
    ///
    /// Counts `DET word` bigrams whose determiner is in `determiners`.
    /// Targets never preceded by such a determiner are absent from the result.
    pub fn determiners_for(
        &self,
        targets: &FxHashSet<String>,
        determiners: &[String],
    ) -> FxHashMap<String, String> {
        if targets.is_empty() {
            return FxHashMap::default();
        }

        let mut counts = CandidateCounts::default();
        for window in self.words.windows(2) {
            let (det, head) = (&window[0], &window[1]);
            if targets.contains(head.lower())
                && det.tag == PosTag::Det
                && determiners.iter().any(|d| d == det.lower())
            {
                counts.add(head.lower(), det.lower());
            }
        }
        counts.winners()
    }

    /// Preferred preposition per target word.
    ///
    /// Counts `ADP DET word` trigrams; with `allowed`, only adpositions in
    /// that list are counted.
    pub fn prepositions_for(
        &self,
        targets: &FxHashSet<String>,
        allowed: Option<&[String]>,
    ) -> FxHashMap<String, String> {
        if targets.is_empty() {
            return FxHashMap::default();
        }

        let mut counts = CandidateCounts::default();
        for window in self.words.windows(3) {
            let (prep, det, head) = (&window[0], &window[1], &window[2]);
            if !targets.contains(head.lower()) {
                continue;
            }
            if let Some(allowed) = allowed {
                if !allowed.iter().any(|p| p == prep.lower()) {
                    continue;
                }
            }
            if det.tag == PosTag::Det && prep.tag == PosTag::Adp {
                counts.add(head.lower(), prep.lower());
            }
        }
        counts.winners()
    }
}

/// Frequency table of (head word, candidate) pairs in first-seen order.
#[derive(Debug, Default)]
struct CandidateCounts {
    entries: Vec<((String, String), u32)>,
    index: FxHashMap<(String, String), usize>,
}

impl CandidateCounts {
    fn add(&mut self, head: &str, candidate: &str) {
        let key = (head.to_string(), candidate.to_string());
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1 += 1;
        } else {
            self.index.insert(key.clone(), self.entries.len());
            self.entries.push((key, 1));
        }
    }

    /// Most frequent candidate per head. The sort is stable, so equal
    /// counts go to whichever pair the scan met first.
    fn winners(mut self) -> FxHashMap<String, String> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        let mut best = FxHashMap::default();
        for ((head, candidate), _) in self.entries {
            best.entry(head).or_insert(candidate);
        }
        best
    }
}
