use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::line::{Line, LineEnding};
use crate::syntax::Syntax;

/// Split text into lines, keeping each line's terminator.
///
/// `\n`, `\r` and `\r\n` all end a line. A final line without terminator is
/// kept, but no empty line is produced after a trailing newline.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some(&(j, '\n')) => {
                    chars.next();
                    j + 1
                }
                _ => i + 1,
            },
            '\n' => i + 1,
            _ => continue,
        };
        lines.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// How the bytes of a file map to text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    /// Each byte is one character. Used for files that are not valid UTF-8.
    Latin1,
}

impl Encoding {
    /// Decode UTF-8, falling back to Latin-1 so any byte sequence survives
    /// a round trip
    pub fn decode(bytes: Vec<u8>) -> (String, Encoding) {
        match String::from_utf8(bytes) {
            Ok(text) => (text, Encoding::Utf8),
            Err(e) => {
                let text = e.into_bytes().into_iter().map(char::from).collect();
                (text, Encoding::Latin1)
            }
        }
    }

    /// Encode text. Fails with the first character Latin-1 has no byte for.
    pub fn encode(self, text: &str) -> std::result::Result<Vec<u8>, char> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => text.chars().map(|c| u8::try_from(c).map_err(|_| c)).collect(),
        }
    }
}

/// The lines of a configuration file, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    filename: Option<PathBuf>,
    encoding: Encoding,
    lines: Vec<Line>,
}

impl ConfigFile {
    /// Parse literal text. The result has no filename until one is assigned.
    pub fn from_text(text: &str, syntax: &Syntax) -> Result<Self> {
        let lines = split_lines(text)
            .into_iter()
            .map(|segment| {
                let (body, ending) = LineEnding::split(segment);
                Line::parse(body, syntax).map(|line| line.with_ending(ending))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            filename: None,
            encoding: Encoding::Utf8,
            lines,
        })
    }

    /// Read and parse a file
    pub fn open(path: impl AsRef<Path>, syntax: &Syntax) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        let (content, encoding) = Encoding::decode(bytes);
        let mut file = Self::from_text(&content, syntax)?;
        debug!(path = %path.display(), lines = file.lines.len(), ?encoding, "read file");
        file.filename = Some(path.to_path_buf());
        file.encoding = encoding;
        Ok(file)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, filename: impl Into<PathBuf>) {
        self.filename = Some(filename.into());
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines that are not blank
    pub fn content_lines(&self) -> Vec<&Line> {
        self.lines
            .iter()
            .filter(|line| !line.body().trim().is_empty())
            .collect()
    }

    /// Find the first line with the given key, with its index
    pub fn find_key(&self, key: &str, syntax: &Syntax) -> Option<(usize, &Line)> {
        self.lines
            .iter()
            .enumerate()
            .find(|(_, line)| line.key(syntax) == key)
    }

    /// Append a line. If the current last line has no terminator it gets a
    /// `\n` so the new line starts on a line of its own.
    pub fn push_line(&mut self, line: Line) {
        if let Some(last) = self.lines.last_mut() {
            if last.ending() == LineEnding::None {
                last.set_ending(LineEnding::Lf);
            }
        }
        self.lines.push(line);
    }

    /// Take over the lines of `other`, keeping this file's name and encoding
    pub(crate) fn replace_lines(&mut self, other: ConfigFile) {
        self.lines = other.lines;
    }

    /// Write the lines back to the file they were read from
    pub fn save(&self) -> Result<()> {
        let path = self.filename.as_deref().ok_or(Error::MissingFilename)?;
        let bytes = self
            .encoding
            .encode(&self.to_string())
            .map_err(|ch| Error::Unencodable {
                path: path.to_path_buf(),
                ch,
            })?;
        fs::write(path, bytes).map_err(|e| Error::io(path, e))?;
        debug!(path = %path.display(), "wrote file");
        Ok(())
    }

    /// Assign a filename and write the lines to it
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.set_filename(path);
        self.save()
    }
}

/// Create an empty file if nothing exists at `path`. Returns true if the
/// file was created.
pub fn create_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, "").map_err(|e| Error::io(path, e))?;
    debug!(path = %path.display(), "created empty file");
    Ok(true)
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}
