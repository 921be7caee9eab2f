//! Value replacement over whole files: change, add, increment and multi-line
//! replacement.

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::file::ConfigFile;
use crate::line::{Line, LineEnding};
use crate::syntax::{Syntax, NEWLINES};

/// Operators accepted in `KEY<op>VALUE` arguments. `+=` and `-=` adjust a
/// numeric value instead of replacing it.
const ARGUMENT_OPERATORS: &[&str] = &["+=", "-=", "==", "=>", ":=", "=", "::", ":"];

/// How a value replacement treats the line it edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPolicy {
    /// Leave commented out lines alone
    pub skip_commented: bool,
    /// Remove the comment marker from a matching line before changing it
    pub uncomment: bool,
    pub trim_key: bool,
    pub trim_value: bool,
    pub min_one_space_after_key: bool,
    pub min_one_space_before_value: bool,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            skip_commented: true,
            uncomment: false,
            trim_key: false,
            trim_value: false,
            min_one_space_after_key: true,
            min_one_space_before_value: true,
        }
    }
}

/// Direction of a numeric adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    Increment,
    Decrement,
}

/// What [`ConfigFile::add`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The key existed and this many lines were changed
    Changed(usize),
    /// The key existed with the same value
    Unchanged,
    /// The key was missing and a new line was appended
    Appended,
}

/// A `KEY<op>VALUE` pair, as given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub operator: String,
    pub value: String,
    text: String,
}

impl Assignment {
    /// A `KEY=VALUE` assignment
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            operator: "=".to_string(),
            value: value.to_string(),
            text: format!("{}={}", key, value),
        }
    }

    /// Split an argument at its earliest operator. Returns None if there is
    /// no operator or the key is empty.
    pub fn parse(arg: &str) -> Option<Self> {
        let mut first: Option<(usize, &str)> = None;
        for &operator in ARGUMENT_OPERATORS {
            if let Some(pos) = arg.find(operator) {
                if first.map_or(true, |(best, _)| pos < best) {
                    first = Some((pos, operator));
                }
            }
        }
        let (pos, operator) = first?;
        let key = arg[..pos].trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_string(),
            operator: operator.to_string(),
            value: arg[pos + operator.len()..].trim().to_string(),
            text: arg.to_string(),
        })
    }

    /// `+=` or `-=` assignments adjust the current value
    pub fn adjustment(&self) -> Option<Adjust> {
        match self.operator.as_str() {
            "+=" => Some(Adjust::Increment),
            "-=" => Some(Adjust::Decrement),
            _ => None,
        }
    }

    /// The assignment as it was written
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Set the value of a single line according to `policy`.
///
/// Returns true if the rendered line changed. Lines without an operator are
/// never touched.
pub fn change_line(
    line: &mut Line,
    value: &str,
    policy: &EditPolicy,
    syntax: &Syntax,
) -> Result<bool> {
    if line.operator().is_empty() {
        return Ok(false);
    }
    let before = line.render();

    if line.is_commented(syntax) {
        if policy.uncomment {
            line.uncomment(syntax)?;
        } else if policy.skip_commented {
            debug!(line = line.raw(), "skipping commented line");
            return Ok(false);
        }
    }

    line.set_value(value);
    if policy.trim_key {
        line.trim_key(policy.min_one_space_after_key);
    }
    if policy.trim_value {
        line.trim_value(policy.min_one_space_before_value);
    }

    Ok(line.render() != before)
}

/// Add `delta` to (or subtract it from) `current`.
///
/// Both sides are read as exact decimal numbers, so `0.2 + 0.1` is `0.3`.
/// Trailing zeros after the decimal point are dropped from the result. If
/// either side is not a number, `delta` is returned unchanged.
pub fn adjust_number(current: &str, delta: &str, adjust: Adjust) -> String {
    let (Some(a), Some(b)) = (Decimal::parse(current), Decimal::parse(delta)) else {
        return delta.trim().to_string();
    };
    let result = match adjust {
        Adjust::Increment => a.checked_add(b),
        Adjust::Decrement => b.checked_neg().and_then(|b| a.checked_add(b)),
    };
    match result {
        Some(result) => result.to_string(),
        None => delta.trim().to_string(),
    }
}

/// A decimal number as an integer mantissa and a count of fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Parse `[+-]digits[.digits]`. A bare `.5` or `5.` is accepted.
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, digits) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let mut mantissa: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let digit = c.to_digit(10)?;
            mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(digit))?;
        }
        let scale = u32::try_from(frac_part.len()).ok()?;
        Some(Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        })
    }

    fn rescale(self, scale: u32) -> Option<Self> {
        let factor = 10i128.checked_pow(scale - self.scale)?;
        Some(Self {
            mantissa: self.mantissa.checked_mul(factor)?,
            scale,
        })
    }

    fn checked_add(self, other: Self) -> Option<Self> {
        let scale = self.scale.max(other.scale);
        let (a, b) = (self.rescale(scale)?, other.rescale(scale)?);
        Some(Self {
            mantissa: a.mantissa.checked_add(b.mantissa)?,
            scale,
        })
    }

    fn checked_neg(self) -> Option<Self> {
        Some(Self {
            mantissa: self.mantissa.checked_neg()?,
            scale: self.scale,
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        let frac_part = frac_part.trim_end_matches('0');

        let zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
        if self.mantissa < 0 && !zero {
            write!(f, "-")?;
        }
        write!(f, "{}", int_part)?;
        if !frac_part.is_empty() {
            write!(f, ".{}", frac_part)?;
        }
        Ok(())
    }
}

impl ConfigFile {
    /// Set the value of every line with the given key. Returns the number of
    /// lines that changed.
    pub fn set_value(
        &mut self,
        key: &str,
        value: &str,
        policy: &EditPolicy,
        syntax: &Syntax,
    ) -> Result<usize> {
        let mut changed = 0;
        for (index, line) in self.lines_mut().iter_mut().enumerate() {
            if line.key(syntax) != key {
                continue;
            }
            if change_line(line, value, policy, syntax)? {
                debug!(index, key, "changed line");
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// The first uncommented assignment with the given key, with its index
    pub fn find_assignment(&self, key: &str, syntax: &Syntax) -> Option<(usize, &Line)> {
        self.lines()
            .iter()
            .enumerate()
            .find(|(_, line)| is_active_assignment(line, key, syntax))
    }

    /// The value of the first uncommented assignment with the given key
    pub fn value_of(&self, key: &str, syntax: &Syntax) -> Option<&str> {
        self.find_assignment(key, syntax).map(|(_, line)| line.value())
    }

    /// True if an uncommented assignment with the given key exists
    pub fn has_key(&self, key: &str, syntax: &Syntax) -> bool {
        self.lines()
            .iter()
            .any(|line| is_active_assignment(line, key, syntax))
    }

    /// Change the key if it exists, otherwise append the assignment as a new line
    pub fn add(
        &mut self,
        assignment: &Assignment,
        policy: &EditPolicy,
        syntax: &Syntax,
    ) -> Result<AddOutcome> {
        let changed = self.set_value(&assignment.key, &assignment.value, policy, syntax)?;
        if changed > 0 {
            return Ok(AddOutcome::Changed(changed));
        }
        if self.has_key(&assignment.key, syntax) {
            return Ok(AddOutcome::Unchanged);
        }

        let ending = self
            .lines()
            .iter()
            .map(Line::ending)
            .find(|ending| *ending != LineEnding::None)
            .unwrap_or(LineEnding::Lf);
        let line = Line::parse(assignment.text(), syntax)?.with_ending(ending);
        debug!(line = line.raw(), "appending line");
        self.push_line(line);
        Ok(AddOutcome::Appended)
    }

    /// Increment or decrement the numeric value of a key. A missing or
    /// non-numeric current value is replaced by `delta`.
    pub fn adjust_value(
        &mut self,
        key: &str,
        delta: &str,
        adjust: Adjust,
        policy: &EditPolicy,
        syntax: &Syntax,
    ) -> Result<usize> {
        let current = self.value_of(key, syntax).unwrap_or_default().to_string();
        let value = adjust_number(&current, delta, adjust);
        self.set_value(key, &value, policy, syntax)
    }

    /// Replace a value that may span several lines.
    ///
    /// Everything from the start of the value of the first matching line up
    /// to and including `end_marker` is replaced by `value`. A newline end
    /// marker changes just that one line. Returns false if the key or the end
    /// marker could not be found.
    pub fn set_value_multiline(
        &mut self,
        key: &str,
        value: &str,
        end_marker: &str,
        policy: &EditPolicy,
        syntax: &Syntax,
    ) -> Result<bool> {
        let found = self.lines().iter().position(|line| {
            line.key(syntax) == key
                && !line.operator().is_empty()
                && (policy.uncomment || !line.is_commented(syntax))
        });
        let Some(index) = found else {
            debug!(key, "key not found");
            return Ok(false);
        };

        if NEWLINES.contains(&end_marker) {
            return change_line(&mut self.lines_mut()[index], value, policy, syntax);
        }

        // Search before uncommenting: a missing marker changes nothing
        let (text, start) = self.value_offset(index);
        if !text[start..].contains(end_marker) {
            warn!(key, end_marker, "end marker not found, leaving value as is");
            return Ok(false);
        }

        let uncommented =
            policy.uncomment && self.lines_mut()[index].uncomment(syntax)?.is_some();
        let (text, start) = if uncommented {
            self.value_offset(index)
        } else {
            (text, start)
        };
        let Some(pos) = text[start..].find(end_marker) else {
            return Ok(false);
        };
        let end = start + pos + end_marker.len();

        let new_text = format!("{}{}{}", &text[..start], value, &text[end..]);
        if new_text == text {
            return Ok(uncommented);
        }
        self.replace_lines(ConfigFile::from_text(&new_text, syntax)?);
        Ok(true)
    }

    /// The rendered text and the byte offset of the first non-blank
    /// character of the value on line `index`
    fn value_offset(&self, index: usize) -> (String, usize) {
        let text = self.to_string();
        let line = &self.lines()[index];
        let line_start: usize = self.lines()[..index].iter().map(|l| l.render().len()).sum();
        let body = line.body();
        let value_part = &body[line.value_start()..];
        let leading = value_part.len() - value_part.trim_start().len();
        (text, line_start + line.value_start() + leading)
    }
}

fn is_active_assignment(line: &Line, key: &str, syntax: &Syntax) -> bool {
    !line.operator().is_empty() && !line.is_commented(syntax) && line.key(syntax) == key
}
