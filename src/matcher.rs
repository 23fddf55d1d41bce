//! Wildcard path matching.
//!
//! Patterns are glob-like expressions where `*` matches any run of
//! characters, including the empty run and `/`. Matching is anchored
//! (the whole candidate must match, not a substring) and
//! case-insensitive. Pattern sets are built once, at configuration
//! time, and queried many times per request.

use serde::{Deserialize, Serialize};

/// An ordered set of wildcard path patterns.
///
/// A `PatternSet` is built either from a newline-delimited block (the
/// shape a settings textarea produces) or from an ordered list of
/// lines. Blank lines are dropped and every pattern is lowercased at
/// construction so the per-request match path does no pattern parsing.
///
/// # Examples
///
/// ```
/// use securepages::PatternSet;
///
/// let patterns = PatternSet::from_lines("/admin\n/admin/*\n/user/*");
/// assert!(patterns.matches("/admin/modules"));
/// assert!(patterns.matches("/ADMIN")); // case-insensitive
/// assert!(!patterns.matches("/node"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    /// Builds a pattern set from a newline-delimited block of patterns.
    pub fn from_lines(block: &str) -> Self {
        Self::from_list(block.lines())
    }

    /// Builds a pattern set from an ordered list of pattern strings.
    ///
    /// Each element may itself contain newlines; it is split the same
    /// way as [`PatternSet::from_lines`].
    pub fn from_list<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = lines
            .into_iter()
            .flat_map(|s| {
                s.as_ref()
                    .lines()
                    .map(|line| line.trim().to_lowercase())
                    .collect::<Vec<_>>()
            })
            .filter(|line| !line.is_empty())
            .collect();
        Self { patterns }
    }

    /// Returns true when the set contains no patterns.
    ///
    /// An empty set never matches anything; callers use emptiness to
    /// distinguish "no rules configured" from "rules configured but
    /// none matched".
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Tests a candidate against the set, short-circuiting on the
    /// first matching pattern.
    ///
    /// The candidate is lowercased before comparison. An empty set
    /// always returns false.
    ///
    /// # Examples
    ///
    /// ```
    /// use securepages::PatternSet;
    ///
    /// let ignore = PatternSet::from_lines("*/autocomplete/*");
    /// assert!(ignore.matches("/user/autocomplete/alice"));
    /// assert!(!ignore.matches("/user/login"));
    /// ```
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| wildcard_match(pattern, &candidate))
    }

    /// Returns the normalized patterns in order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl From<Vec<String>> for PatternSet {
    fn from(lines: Vec<String>) -> Self {
        Self::from_list(lines)
    }
}

impl From<PatternSet> for Vec<String> {
    fn from(set: PatternSet) -> Self {
        set.patterns
    }
}

/// Anchored wildcard match of `candidate` against a single `pattern`.
///
/// `*` matches any run of characters including `/`. Both inputs are
/// expected to be lowercased already. Iterative two-pointer scan with
/// star backtracking, linear in the common case.
fn wildcard_match(pattern: &str, candidate: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let c: Vec<char> = candidate.chars().collect();

    let mut pi = 0; // position in pattern
    let mut ci = 0; // position in candidate
    let mut star: Option<usize> = None; // last '*' seen in pattern
    let mut resume = 0; // candidate position to retry from after backtrack

    while ci < c.len() {
        // '*' must be recognized before the literal comparison: a
        // literal '*' in the candidate would otherwise consume it.
        if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            resume = ci;
            pi += 1;
        } else if pi < p.len() && p[pi] == c[ci] {
            pi += 1;
            ci += 1;
        } else if let Some(star_pos) = star {
            // Let the last '*' absorb one more candidate character.
            pi = star_pos + 1;
            resume += 1;
            ci = resume;
        } else {
            return false;
        }
    }

    // Only trailing stars may remain in the pattern.
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
