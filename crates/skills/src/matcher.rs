//! Keyword matcher: scores a skill's trigger keywords against a message.
//!
//! Matching is literal and case-insensitive:
//!
//! | Keyword kind | Condition | Score |
//! |--------------|-----------|-------|
//! | Phrase (contains whitespace) | contiguous substring of the message | 4 |
//! | Single word | equals a message token | 2 |
//! | Single word | substring of a message token, no exact match | 1 |
//!
//! A single-word keyword with inner punctuation (`follow-up`, `q&a`) is
//! matched against the normalized message text: a standalone occurrence
//! scores as a word, one embedded in a longer word as a partial.
//!
//! No stemming, fuzzy or semantic matching. Duplicate keywords in one skill
//! each contribute their own score.

use notewise_core::skill::Skill;
use std::collections::HashSet;
use std::fmt;

pub const PHRASE_SCORE: u32 = 4;
pub const WORD_SCORE: u32 = 2;
pub const PARTIAL_SCORE: u32 = 1;

/// Why a keyword contributed to a skill's score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordMatch {
    Phrase(String),
    Word(String),
    Partial(String),
}

impl KeywordMatch {
    pub fn score(&self) -> u32 {
        match self {
            Self::Phrase(_) => PHRASE_SCORE,
            Self::Word(_) => WORD_SCORE,
            Self::Partial(_) => PARTIAL_SCORE,
        }
    }
}

impl fmt::Display for KeywordMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phrase(k) => write!(f, "phrase:\"{k}\""),
            Self::Word(k) => write!(f, "word:\"{k}\""),
            Self::Partial(k) => write!(f, "partial:\"{k}\""),
        }
    }
}

/// A normalized user message, tokenized once and reused for every skill.
#[derive(Debug, Clone)]
pub struct MessageIndex {
    text: String,
    tokens: Vec<String>,
    token_set: HashSet<String>,
}

impl MessageIndex {
    pub fn new(message: &str) -> Self {
        let text = message.to_lowercase().trim().to_string();
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        let token_set = tokens.iter().cloned().collect();
        Self {
            text,
            tokens,
            token_set,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Match one keyword. Empty keywords never match.
    pub fn match_keyword(&self, keyword: &str) -> Option<KeywordMatch> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return None;
        }

        if keyword.contains(char::is_whitespace) {
            return self
                .text
                .contains(&keyword)
                .then_some(KeywordMatch::Phrase(keyword));
        }

        // `follow-up`, `q&a`: the tokenizer splits these, so match them
        // against the normalized text instead of single tokens.
        if keyword.contains(|c: char| !c.is_alphanumeric()) {
            return if self.contains_bounded(&keyword) {
                Some(KeywordMatch::Word(keyword))
            } else if self.text.contains(&keyword) {
                Some(KeywordMatch::Partial(keyword))
            } else {
                None
            };
        }

        if self.token_set.contains(&keyword) {
            Some(KeywordMatch::Word(keyword))
        } else if self.tokens.iter().any(|t| t.contains(&keyword)) {
            Some(KeywordMatch::Partial(keyword))
        } else {
            None
        }
    }

    /// Whether `needle` occurs in the text with no alphanumeric character
    /// directly before or after it.
    fn contains_bounded(&self, needle: &str) -> bool {
        self.text.match_indices(needle).any(|(start, _)| {
            let before = self.text[..start].chars().next_back();
            let after = self.text[start + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }
}

/// Score and explanations for one skill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchScore {
    pub score: u32,
    pub matches: Vec<KeywordMatch>,
}

/// A skill that matched with a non-zero score.
#[derive(Debug, Clone)]
pub struct ScoredSkill {
    pub skill: Skill,
    pub score: u32,
    pub matches: Vec<KeywordMatch>,
}

/// Score a keyword list against a message, in keyword order.
pub fn score_keywords<S: AsRef<str>>(message: &MessageIndex, keywords: &[S]) -> MatchScore {
    let matches: Vec<KeywordMatch> = keywords
        .iter()
        .filter_map(|k| message.match_keyword(k.as_ref()))
        .collect();
    MatchScore {
        score: matches.iter().map(KeywordMatch::score).sum(),
        matches,
    }
}

/// Score every candidate and drop the ones that scored zero.
pub fn match_skills(message: &MessageIndex, candidates: Vec<Skill>) -> Vec<ScoredSkill> {
    candidates
        .into_iter()
        .filter_map(|skill| {
            let MatchScore { score, matches } = score_keywords(message, &skill.trigger_keywords);
            (score > 0).then_some(ScoredSkill {
                skill,
                score,
                matches,
            })
        })
        .collect()
}
