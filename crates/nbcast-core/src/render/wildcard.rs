//! Glob-style matching for mime-type patterns.
//!
//! `*` matches any run of characters within a single `/`-delimited segment:
//! `text/*` matches `text/html`, `*/*` matches anything with exactly one
//! `/`, and a lone `*` never crosses a segment boundary.

/// Whether `pattern` glob-matches `text`.
pub(crate) fn matches(pattern: &str, text: &str) -> bool {
    let pattern = pattern.as_bytes();
    let text = text.as_bytes();

    let mut p = 0;
    let mut t = 0;
    // Position to resume from when the most recent `*` has to absorb one
    // more character: (pattern index after the star, next text index).
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p + 1, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((after_star, resume)) = backtrack {
            if text[resume] == b'/' {
                // A star never absorbs a segment separator.
                return false;
            }
            backtrack = Some((after_star, resume + 1));
            p = after_star;
            t = resume + 1;
        } else {
            return false;
        }
    }

    // Only trailing stars may remain unconsumed.
    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

/// Number of wildcard characters in `pattern`. Fewer wildcards means a more
/// specific pattern.
pub(crate) fn count(pattern: &str) -> usize {
    pattern.bytes().filter(|b| *b == b'*').count()
}
