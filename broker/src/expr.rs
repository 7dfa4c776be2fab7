// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Affero General Public License that can be found
// in the LICENSE file.

//! Compile-once pattern matcher used by the domain dispatcher and ACL rules.
//!
//! Patterns use a small glob-like syntax (`*` zero-or-more, `?` one-any,
//! `|` alternation) rather than raw regex, translated to an anchored
//! [`regex::Regex`] at construction time.

use regex::Regex;

use crate::error::{Error, ErrorKind};

/// An immutable, shareable compiled pattern.
#[derive(Debug, Clone)]
pub struct Expression {
    pattern: String,
    re: Regex,
}

impl Expression {
    /// Compile `pattern` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns error if `pattern` contains an unsupported construct.
    pub fn compile(pattern: &str) -> Result<Self, Error> {
        let re = Regex::new(&Self::to_regex(pattern)).map_err(|err| {
            Error::from_string(
                ErrorKind::ExprError,
                format!("Invalid expression {:?}: {:?}", pattern, err),
            )
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            re,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whole-string match against `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// Translate the glob-like syntax into an anchored regex source.
    fn to_regex(pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() * 2 + 2);
        out.push('^');
        out.push('(');
        for ch in pattern.chars() {
            match ch {
                '*' => out.push_str(".*"),
                '?' => out.push('.'),
                '|' => out.push('|'),
                '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '\\' => {
                    out.push('\\');
                    out.push(ch);
                }
                c => out.push(c),
            }
        }
        out.push(')');
        out.push('$');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        let e = Expression::compile("example.com").unwrap();
        assert!(e.is_match("example.com"));
        assert!(!e.is_match("example.org"));
    }

    #[test]
    fn test_star() {
        let e = Expression::compile("tenant-*").unwrap();
        assert!(e.is_match("tenant-a"));
        assert!(e.is_match("tenant-"));
        assert!(!e.is_match("other"));
    }

    #[test]
    fn test_alternation() {
        let e = Expression::compile("alice|bob").unwrap();
        assert!(e.is_match("alice"));
        assert!(e.is_match("bob"));
        assert!(!e.is_match("carol"));
    }

    #[test]
    fn test_question_mark() {
        let e = Expression::compile("device-?").unwrap();
        assert!(e.is_match("device-1"));
        assert!(!e.is_match("device-12"));
    }
}
