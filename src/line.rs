use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};
use crate::strutil::{
    first_whitespace, has, has_prefix, has_suffix, last_whitespace, prefix, remove_prefix,
};
use crate::syntax::{
    Syntax, ASSIGNMENTS, MATCHING_PAIRS, MULTILINE_COMMENT_END, MULTILINE_COMMENT_START, NEWLINES,
};

/// The terminator that followed a line in its source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    /// Last line of a text that does not end with a newline
    #[default]
    None,
    Lf,
    Cr,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::None => "",
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Split a line as emitted by [`crate::file::split_lines`] into its body
    /// and terminator
    pub fn split(line: &str) -> (&str, LineEnding) {
        if let Some(body) = line.strip_suffix("\r\n") {
            (body, LineEnding::CrLf)
        } else if let Some(body) = line.strip_suffix('\n') {
            (body, LineEnding::Lf)
        } else if let Some(body) = line.strip_suffix('\r') {
            (body, LineEnding::Cr)
        } else {
            (line, LineEnding::None)
        }
    }
}

/// A single line split into key, assignment operator and value.
///
/// The three segments keep their surrounding whitespace, so an untouched
/// line renders back to exactly the text it was parsed from:
///
/// ```
/// use setconf::line::Line;
///
/// let mut line = Line::new("  CC =\t\tg++").unwrap();
/// assert_eq!(line.operator(), "=");
/// line.set_value("clang");
/// assert_eq!(line.to_string(), "  CC =\t\tclang");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    raw: String,
    key_segment: String,
    operator: String,
    value_segment: String,
    definition: bool,
    ending: LineEnding,
    trim_key: bool,
    trim_value: bool,
    /// Keep one whitespace character between the key and the operator when trimming
    min_one_space_after_key: bool,
    /// Keep one whitespace character between the operator and the value when trimming
    min_one_space_before_value: bool,
}

impl Line {
    /// Parse a line using the default vocabulary
    pub fn new(raw: &str) -> Result<Self> {
        Self::parse(raw, &Syntax::default())
    }

    /// Parse a line. Fails with [`Error::InvalidInput`] if `raw` contains a newline.
    pub fn parse(raw: &str, syntax: &Syntax) -> Result<Self> {
        if has(raw, NEWLINES) {
            return Err(Error::InvalidInput(raw.to_string()));
        }

        let mut line = Line {
            raw: raw.to_string(),
            key_segment: raw.to_string(),
            operator: String::new(),
            value_segment: String::new(),
            definition: false,
            ending: LineEnding::None,
            trim_key: false,
            trim_value: false,
            min_one_space_after_key: false,
            min_one_space_before_value: false,
        };

        if let Some((pos, operator)) = find_assignment(raw) {
            line.key_segment = raw[..pos].to_string();
            line.operator = operator.to_string();
            line.value_segment = raw[pos + operator.len()..].to_string();
        } else if has_prefix(raw, syntax.define_prefixes()) {
            line.definition = true;
        }

        Ok(line)
    }

    pub fn with_ending(mut self, ending: LineEnding) -> Self {
        self.ending = ending;
        self
    }

    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    pub fn set_ending(&mut self, ending: LineEnding) {
        self.ending = ending;
    }

    /// The text the line was parsed from, without terminator
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The matched assignment operator, or "" if there is none
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// True for `key<op>value` lines and for definition lines like `#define X 1`
    pub fn has_assignment(&self) -> bool {
        !self.operator.is_empty() || self.definition
    }

    pub fn is_definition(&self) -> bool {
        self.definition
    }

    /// The key, without whitespace or comment marker
    pub fn key(&self, syntax: &Syntax) -> String {
        match self.comment_marker(syntax) {
            // The marker was found at the start of the segment, so it is present
            Some(marker) => self.key_segment.replacen(marker, "", 1).trim().to_string(),
            None => self.key_segment.trim().to_string(),
        }
    }

    pub fn value(&self) -> &str {
        self.value_segment.trim()
    }

    /// Replace the first occurrence of the current key within the key segment
    pub fn set_key(&mut self, new_key: &str, syntax: &Syntax) {
        let current = self.key(syntax);
        self.key_segment = self.key_segment.replacen(&current, new_key, 1);
    }

    /// Replace the first occurrence of the current value within the value
    /// segment. Lines without an operator have no value and are left alone.
    pub fn set_value(&mut self, new_value: &str) {
        if self.operator.is_empty() {
            return;
        }
        let current = self.value().to_string();
        self.value_segment = self.value_segment.replacen(&current, new_value, 1);
    }

    /// Trim whitespace around the key when rendering
    pub fn trim_key(&mut self, min_one_space: bool) {
        self.trim_key = true;
        self.min_one_space_after_key = min_one_space;
    }

    /// Trim whitespace around the value when rendering
    pub fn trim_value(&mut self, min_one_space: bool) {
        self.trim_value = true;
        self.min_one_space_before_value = min_one_space;
    }

    /// The comment marker the key segment starts with, if any
    pub fn comment_marker<'s>(&self, syntax: &'s Syntax) -> Option<&'s str> {
        if self.definition {
            return None;
        }
        prefix(&self.key_segment, syntax.comment_markers())
    }

    pub fn is_commented(&self, syntax: &Syntax) -> bool {
        self.comment_marker(syntax).is_some()
    }

    /// Comment the line out with `marker`, or remove `marker` if the line is
    /// already commented. Unknown markers are added to `syntax`.
    pub fn toggle_comment(&mut self, marker: &str, syntax: &mut Syntax) -> Result<()> {
        if self.is_commented(syntax) {
            self.key_segment = remove_prefix(&self.key_segment, marker)?;
        } else {
            self.key_segment = format!("{}{}", marker, self.key_segment);
            syntax.register_comment_marker(marker);
        }
        Ok(())
    }

    /// Remove a known comment marker. Returns the marker that was removed.
    pub fn uncomment(&mut self, syntax: &Syntax) -> Result<Option<String>> {
        let Some(marker) = self.comment_marker(syntax) else {
            return Ok(None);
        };
        self.key_segment = remove_prefix(&self.key_segment, marker)?;
        Ok(Some(marker.to_string()))
    }

    /// Look for an unclosed `{`, `(` or `[`, or an odd number of quotes.
    /// Returns the missing closing character. Only the first problem found
    /// is reported.
    pub fn unmatched(&self) -> Option<char> {
        for &(left, right) in MATCHING_PAIRS {
            if count(&self.raw, left) > count(&self.raw, right) {
                return Some(right);
            }
        }
        ['\'', '"']
            .into_iter()
            .find(|&quote| count(&self.raw, quote) % 2 != 0)
    }

    pub fn starts_multiline_comment(&self) -> bool {
        has_prefix(&self.raw, MULTILINE_COMMENT_START)
    }

    pub fn ends_multiline_comment(&self) -> bool {
        has_suffix(&self.raw, MULTILINE_COMMENT_END)
    }

    /// True if rendering would produce something other than the parsed text
    pub fn is_changed(&self) -> bool {
        self.body() != self.raw
    }

    /// Render the line, including its terminator
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Render the line without its terminator
    pub fn body(&self) -> String {
        format!("{}{}{}", self.rendered_key(), self.operator, self.rendered_value())
    }

    /// Byte offset within the rendered body where the value segment starts
    pub(crate) fn value_start(&self) -> usize {
        self.rendered_key().len() + self.operator.len()
    }

    fn rendered_key(&self) -> Cow<'_, str> {
        if !self.trim_key {
            return Cow::Borrowed(&self.key_segment);
        }
        let mut key = self.key_segment.trim().to_string();
        if self.min_one_space_after_key {
            key.push(last_whitespace(&self.key_segment).unwrap_or(' '));
        }
        Cow::Owned(key)
    }

    fn rendered_value(&self) -> Cow<'_, str> {
        if !self.trim_value {
            return Cow::Borrowed(&self.value_segment);
        }
        let mut value = String::new();
        if self.min_one_space_before_value {
            value.push(first_whitespace(&self.value_segment).unwrap_or(' '));
        }
        value.push_str(self.value_segment.trim());
        Cow::Owned(value)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.rendered_key(),
            self.operator,
            self.rendered_value(),
            self.ending.as_str()
        )
    }
}

/// Find the operator that starts earliest in the line
fn find_assignment(raw: &str) -> Option<(usize, &'static str)> {
    let mut first: Option<(usize, &'static str)> = None;
    for &operator in ASSIGNMENTS {
        if let Some(pos) = raw.find(operator) {
            // Strictly smaller, so the operator listed first wins a tie
            if first.map_or(true, |(best, _)| pos < best) {
                first = Some((pos, operator));
            }
        }
    }
    first
}

fn count(s: &str, c: char) -> usize {
    s.chars().filter(|&x| x == c).count()
}
