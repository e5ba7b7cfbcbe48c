//! Glob matching over action names, index names and certificate DNs.
//!
//! # Responsibilities
//! - `*` matches any run of characters (including none)
//! - `?` matches exactly one character
//! - Everything else matches literally, case-sensitive
//!
//! # Design Decisions
//! - Patterns without wildcards compare by string equality
//! - Backtracking is bounded to the last `*`, so matching is O(n * m) worst case

/// A compiled glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    literal: bool,
}

impl Pattern {
    /// Compile a pattern.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let literal = !raw.contains(['*', '?']);
        Self { raw, literal }
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if `candidate` matches this pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        if self.literal {
            return self.raw == candidate;
        }

        let pattern: Vec<char> = self.raw.chars().collect();
        let text: Vec<char> = candidate.chars().collect();

        let (mut p, mut t) = (0usize, 0usize);
        // Position of the last `*` seen and the text index it was tried at.
        let mut star: Option<(usize, usize)> = None;

        while t < text.len() {
            if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
                p += 1;
                t += 1;
            } else if p < pattern.len() && pattern[p] == '*' {
                star = Some((p, t));
                p += 1;
            } else if let Some((star_p, star_t)) = star {
                p = star_p + 1;
                t = star_t + 1;
                star = Some((star_p, star_t + 1));
            } else {
                return false;
            }
        }

        pattern[p..].iter().all(|c| *c == '*')
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Pattern::new(raw)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns true if any of `patterns` matches `candidate`.
pub fn matches_any(patterns: &[Pattern], candidate: &str) -> bool {
    patterns.iter().any(|p| p.matches(candidate))
}
