//! Search helpers over raw text, matching against lists of candidate strings.
//!
//! Prefix and suffix tests ignore surrounding whitespace, so an indented
//! `    # comment` still counts as starting with `#`.

use crate::error::{Error, Result};

/// Find the first candidate that occurs anywhere in `data`
pub fn contains<'a, S: AsRef<str>>(data: &str, xs: &'a [S]) -> Option<&'a str> {
    xs.iter().map(AsRef::as_ref).find(|x| data.contains(*x))
}

pub fn has<S: AsRef<str>>(data: &str, xs: &[S]) -> bool {
    contains(data, xs).is_some()
}

/// Find the first candidate that the trimmed `data` starts with
pub fn prefix<'a, S: AsRef<str>>(data: &str, xs: &'a [S]) -> Option<&'a str> {
    let trimmed = data.trim();
    xs.iter().map(AsRef::as_ref).find(|x| trimmed.starts_with(*x))
}

pub fn has_prefix<S: AsRef<str>>(data: &str, xs: &[S]) -> bool {
    prefix(data, xs).is_some()
}

/// Find the first candidate that the trimmed `data` ends with
pub fn suffix<'a, S: AsRef<str>>(data: &str, xs: &'a [S]) -> Option<&'a str> {
    let trimmed = data.trim();
    xs.iter().map(AsRef::as_ref).find(|x| trimmed.ends_with(*x))
}

pub fn has_suffix<S: AsRef<str>>(data: &str, xs: &[S]) -> bool {
    suffix(data, xs).is_some()
}

/// Remove the first occurrence of `p` from `s`.
///
/// The caller is expected to have checked with [`prefix`] first; a missing
/// prefix is reported as [`Error::PrefixNotFound`].
pub fn remove_prefix(s: &str, p: &str) -> Result<String> {
    if !s.contains(p) {
        return Err(Error::PrefixNotFound {
            text: s.to_string(),
            prefix: p.to_string(),
        });
    }
    Ok(s.replacen(p, "", 1))
}

/// Remove the last occurrence of `p` from `s`.
///
/// A missing suffix is reported as [`Error::SuffixNotFound`].
pub fn remove_suffix(s: &str, p: &str) -> Result<String> {
    match s.rfind(p) {
        Some(pos) => Ok(format!("{}{}", &s[..pos], &s[pos + p.len()..])),
        None => Err(Error::SuffixNotFound {
            text: s.to_string(),
            suffix: p.to_string(),
        }),
    }
}

/// The first character of `s`, if it is whitespace
pub fn first_whitespace(s: &str) -> Option<char> {
    s.chars().next().filter(|c| c.is_whitespace())
}

/// The last character of `s`, if it is whitespace
pub fn last_whitespace(s: &str) -> Option<char> {
    s.chars().next_back().filter(|c| c.is_whitespace())
}
