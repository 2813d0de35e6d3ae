//! Canonical path keys: one fixed separator, no trailing separator,
//! optional case folding.

use std::borrow::Cow;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathKey {
    separator: char,
    case_sensitive: bool,
}

impl Default for PathKey {
    fn default() -> Self {
        Self::new('\\', true)
    }
}

impl PathKey {
    pub fn new(separator: char, case_sensitive: bool) -> Self {
        Self {
            separator,
            case_sensitive,
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Drop trailing separators. A path made only of separators is left alone.
    pub fn canonicalize<'a>(&self, path: &'a str) -> &'a str {
        let trimmed = path.trim().trim_end_matches(self.separator);
        if trimmed.is_empty() {
            path.trim()
        } else {
            trimmed
        }
    }

    /// The comparison form of `s` under this key's case rule.
    pub fn fold<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if self.case_sensitive {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.to_lowercase())
        }
    }

    /// True iff `b` equals `a` or lies underneath it.
    pub fn is_ancestor(&self, a: &str, b: &str) -> bool {
        let a = self.fold(a);
        let b = self.fold(b);
        Self::folded_is_ancestor(&a, &b, self.separator)
    }

    fn folded_is_ancestor(a: &str, b: &str, separator: char) -> bool {
        if a.is_empty() {
            return false;
        }
        b == a || (b.starts_with(a) && b[a.len()..].starts_with(separator))
    }

    /// Number of segments `b` sits below `a`; `Some(1)` for an immediate child.
    /// `None` unless `a` is a proper ancestor of `b`.
    pub fn depth_delta(&self, a: &str, b: &str) -> Option<usize> {
        let a = self.fold(a);
        let b = self.fold(b);
        if a == b || !Self::folded_is_ancestor(&a, &b, self.separator) {
            return None;
        }
        let rest = &b[a.len() + self.separator.len_utf8()..];
        Some(rest.matches(self.separator).count() + 1)
    }

    pub fn parent_of<'a>(&self, path: &'a str) -> Result<&'a str, Error> {
        match self.canonicalize(path).rsplit_once(self.separator) {
            Some((parent, _)) if !parent.is_empty() => Ok(parent),
            _ => Err(Error::NoParent(path.to_string())),
        }
    }

    /// Last segment of `path`, or the whole path when it has a single segment.
    pub fn leaf_name<'a>(&self, path: &'a str) -> &'a str {
        path.rsplit_once(self.separator)
            .map_or(path, |(_, leaf)| leaf)
    }

    pub fn join(&self, parent: &str, name: &str) -> String {
        format!("{}{}{}", parent, self.separator, name)
    }

    /// Every proper ancestor prefix of an already folded path, shortest first.
    pub(crate) fn ancestor_prefixes<'a>(&self, path: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        path.match_indices(self.separator)
            .map(move |(idx, _)| &path[..idx])
            .filter(|prefix| !prefix.is_empty())
    }
}
