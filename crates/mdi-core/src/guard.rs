//! Placeholder guard.
//!
//! Substrings matched by caller-supplied patterns are swapped for inert
//! tokens before rendering, so the markdown engine never interprets them,
//! and swapped back into the final markup afterwards.

use regex::Regex;

use crate::error::GuardPatternError;

/// Base of every placeholder token.
const TOKEN_PREFIX: &str = "IGNORE";

/// Inputs every pattern is tried against when checking for empty matches.
const ZERO_WIDTH_PROBES: [&str; 6] = ["", " ", "a", "a b", "\n\n", "_"];

/// Compiled guard patterns.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderGuard {
    patterns: Vec<Regex>,
}

impl PlaceholderGuard {
    /// Compile `patterns`, rejecting invalid ones and ones that can match an
    /// empty string.
    pub fn new<I, S>(patterns: I) -> Result<Self, GuardPatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| compile(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern sources, in application order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    /// Replace every match of every pattern with a placeholder token.
    ///
    /// Patterns run one after another over the text produced by the previous
    /// one. The returned table restores the originals.
    pub fn guard(&self, text: &str) -> Result<(String, PlaceholderTable), GuardPatternError> {
        let mut table = PlaceholderTable::new(token_prefix(text));
        let mut processed = text.to_owned();

        for pattern in &self.patterns {
            if !pattern.is_match(&processed) {
                continue;
            }
            let mut out = String::with_capacity(processed.len());
            let mut last = 0;
            for found in pattern.find_iter(&processed) {
                if found.is_empty() {
                    return Err(GuardPatternError::ZeroWidth {
                        pattern: pattern.as_str().to_owned(),
                    });
                }
                out.push_str(&processed[last..found.start()]);
                out.push_str(&table.insert(found.as_str()));
                last = found.end();
            }
            out.push_str(&processed[last..]);
            processed = out;
        }

        Ok((processed, table))
    }
}

fn compile(pattern: &str) -> Result<Regex, GuardPatternError> {
    let regex = Regex::new(pattern).map_err(|source| GuardPatternError::Invalid {
        pattern: pattern.to_owned(),
        source,
    })?;

    let zero_width = ZERO_WIDTH_PROBES
        .iter()
        .any(|probe| regex.find_iter(probe).any(|found| found.is_empty()));
    if zero_width {
        return Err(GuardPatternError::ZeroWidth {
            pattern: pattern.to_owned(),
        });
    }
    Ok(regex)
}

/// Token prefix that does not occur in `text`.
fn token_prefix(text: &str) -> String {
    let mut prefix = TOKEN_PREFIX.to_owned();
    while text.contains(&prefix) {
        prefix.push('X');
    }
    prefix
}

/// Placeholder tokens and the text they stand for, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTable {
    prefix: String,
    entries: Vec<(String, String)>,
}

impl PlaceholderTable {
    fn new(prefix: String) -> Self {
        Self {
            prefix,
            entries: Vec::new(),
        }
    }

    /// Record `original` and return its token.
    fn insert(&mut self, original: &str) -> String {
        // The trailing `Z` keeps `…1Z` from matching inside `…10Z`.
        let token = format!("{}{}Z", self.prefix, self.entries.len());
        self.entries.push((token.clone(), original.to_owned()));
        token
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(token, original)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(token, original)| (token.as_str(), original.as_str()))
    }

    /// Put the originals back into `markup`, last entry first.
    #[must_use]
    pub fn restore(&self, markup: &str) -> String {
        let mut restored = markup.to_owned();
        for (token, original) in self.entries.iter().rev() {
            restored = restored.replace(token.as_str(), original);
        }
        restored
    }
}
