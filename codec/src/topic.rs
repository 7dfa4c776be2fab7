// Copyright (c) 2024 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use byteorder::{BigEndian, WriteBytesExt};
use std::fmt;
use std::io::Write;

use crate::utils::validate_utf8_string;
use crate::{ByteArray, DecodeError, DecodePacket, EncodeError, EncodePacket};

fn split_levels(s: &str) -> Vec<&str> {
    s.split('/').collect()
}

/// A topic name used in PUBLISH. Unlike a topic filter, it MUST NOT
/// contain the wildcard characters `+` or `#`, nor a `U+0000` null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PubTopic(String);

impl PubTopic {
    /// Parse and validate a publish topic.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is empty, contains `+`, `#`, a null byte,
    /// or is not valid UTF-8.
    pub fn new(s: &str) -> Result<Self, EncodeError> {
        validate_utf8_string(s)?;
        if s.is_empty() || s.contains('+') || s.contains('#') {
            return Err(EncodeError::InvalidTopic);
        }
        Ok(Self(s.to_string()))
    }

    /// Get byte length used in packet (2-byte length prefix + contents).
    #[must_use]
    pub fn bytes(&self) -> usize {
        2 + self.0.len()
    }

    /// Topic levels split on `/`, used by the subscription trie to walk
    /// down to matching subscribers without rescanning the string.
    #[must_use]
    pub fn levels(&self) -> Vec<&str> {
        split_levels(&self.0)
    }
}

impl fmt::Display for PubTopic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PubTopic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl DecodePacket for PubTopic {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let len = ba.read_u16()?;
        let s = ba.read_string(len as usize)?;
        if s.is_empty() || s.contains('+') || s.contains('#') {
            return Err(DecodeError::InvalidTopic);
        }
        Ok(Self(s))
    }
}

impl EncodePacket for PubTopic {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.0.len() as u16;
        buf.write_u16::<BigEndian>(len)?;
        buf.write_all(self.0.as_bytes())?;
        Ok(self.bytes())
    }
}

/// A topic filter used in SUBSCRIBE/UNSUBSCRIBE. May contain the
/// single-level wildcard `+` and the terminal multi-level wildcard `#`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubTopic(String);

impl SubTopic {
    /// Parse and validate a topic filter.
    ///
    /// `#` is only legal as the last level, on its own. `+` is only legal
    /// as an entire level.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is empty, not valid UTF-8, or the wildcard
    /// placement rules are violated.
    pub fn new(s: &str) -> Result<Self, EncodeError> {
        validate_utf8_string(s)?;
        if s.is_empty() || !Self::valid_filter(s) {
            return Err(EncodeError::InvalidTopic);
        }
        Ok(Self(s.to_string()))
    }

    fn valid_filter(s: &str) -> bool {
        let levels: Vec<&str> = split_levels(s);
        for (i, level) in levels.iter().enumerate() {
            let is_last = i + 1 == levels.len();
            if level.contains('#') && (*level != "#" || !is_last) {
                return false;
            }
            if level.contains('+') && *level != "+" {
                return false;
            }
        }
        true
    }

    /// Get byte length used in packet (2-byte length prefix + contents).
    #[must_use]
    pub fn bytes(&self) -> usize {
        2 + self.0.len()
    }

    /// Returns true if this filter matches the concrete publish topic
    /// `topic`, per the level-by-level rules in section 4.7 of the MQTT
    /// 3.1.1 spec: `+` matches exactly one level, a trailing `#` matches
    /// the current level and everything below it, and filters starting
    /// with `$` never match topics that don't also start with `$`.
    #[must_use]
    pub fn is_match(&self, topic: &str) -> bool {
        let filter_levels = split_levels(&self.0);
        let topic_levels = split_levels(topic);

        if topic_levels.first().is_some_and(|l| l.starts_with('$'))
            && !filter_levels.first().is_some_and(|l| l.starts_with('$'))
        {
            return false;
        }

        Self::match_levels(&filter_levels, &topic_levels)
    }

    fn match_levels(filter: &[&str], topic: &[&str]) -> bool {
        match (filter.first(), topic.first()) {
            (Some(&"#"), _) if filter.len() == 1 => true,
            (Some(&"+"), Some(_)) => Self::match_levels(&filter[1..], &topic[1..]),
            (Some(f), Some(t)) if *f == *t => Self::match_levels(&filter[1..], &topic[1..]),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SubTopic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SubTopic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl DecodePacket for SubTopic {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let len = ba.read_u16()?;
        let s = ba.read_string(len as usize)?;
        if s.is_empty() || !Self::valid_filter(&s) {
            return Err(DecodeError::InvalidTopic);
        }
        Ok(Self(s))
    }
}

impl EncodePacket for SubTopic {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.0.len() as u16;
        buf.write_u16::<BigEndian>(len)?;
        buf.write_all(self.0.as_bytes())?;
        Ok(self.bytes())
    }
}

/// Generic topic string, kept for call sites that do not yet distinguish
/// publish topics from subscribe filters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    /// Wrap an arbitrary topic string without validation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_wildcard() {
        let filter = SubTopic::new("test/+").unwrap();
        assert!(filter.is_match("test/a"));
        assert!(!filter.is_match("test/a/b"));
    }

    #[test]
    fn test_hash_wildcard() {
        let filter = SubTopic::new("foo/#").unwrap();
        assert!(filter.is_match("foo"));
        assert!(filter.is_match("foo/a"));
        assert!(filter.is_match("foo/a/b"));
        assert!(!filter.is_match("fooo/a"));
    }

    #[test]
    fn test_dollar_topic_not_matched_by_hash() {
        let filter = SubTopic::new("#").unwrap();
        assert!(!filter.is_match("$SYS/broker/uptime"));
    }

    #[test]
    fn test_invalid_filter_placement() {
        assert!(SubTopic::new("sport/tennis#").is_err());
        assert!(SubTopic::new("sport/+tennis").is_err());
    }

    #[test]
    fn test_pub_topic_rejects_wildcards() {
        assert!(PubTopic::new("a/+/b").is_err());
        assert!(PubTopic::new("a/#").is_err());
        assert!(PubTopic::new("a/b").is_ok());
    }
}
