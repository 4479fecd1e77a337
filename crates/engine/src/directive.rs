//! Directive scanning
//!
//! Finds `CALL: name(args)` spans in free-form text. The grammar is
//! deliberately flat: the argument text runs from the opening `(` to the
//! first `)` that follows it, so nested parentheses are not supported.
//! `CALL: add(foo(1), 2)` yields the raw arguments `foo(1`.

/// Marker that introduces a directive
pub const MARKER: &str = "CALL:";

/// A single `CALL: name(args)` span found in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Identifier matching `[A-Za-z_][A-Za-z0-9_]*`
    pub name: &'a str,
    /// Text strictly between `(` and the next `)`
    pub raw_args: &'a str,
    /// Byte offset of the `CALL:` marker
    pub position: usize,
}

/// Scanner state while looking for the next directive
#[derive(Debug, Clone, Copy)]
enum State<'a> {
    /// Looking for the next marker with a valid `name(` header
    Searching,
    /// Header accepted; looking for the closing `)`
    InArgs { name: &'a str, position: usize, args_start: usize },
}

/// Iterator over the directives in a text, leftmost first
///
/// Matches never overlap: after a match the scan resumes past its closing
/// parenthesis. A marker that does not start a well-formed header is skipped
/// and never reported as an error.
#[derive(Debug)]
pub struct DirectiveScanner<'a> {
    text: &'a str,
    cursor: usize,
}

impl<'a> DirectiveScanner<'a> {
    /// Creates a scanner positioned at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self { text, cursor: 0 }
    }

    /// Parses `CALL:` + optional whitespace + identifier + `(` starting at `start`
    ///
    /// Returns the identifier and the byte offset just past the `(`.
    fn header_at(&self, start: usize) -> Option<(&'a str, usize)> {
        let text = self.text;
        let after_marker = start + MARKER.len();
        let rest = &text[after_marker..];
        let name_start = after_marker + (rest.len() - rest.trim_start().len());

        let bytes = text.as_bytes();
        let first = *bytes.get(name_start)?;
        if !(first.is_ascii_alphabetic() || first == b'_') {
            return None;
        }

        let mut name_end = name_start + 1;
        while name_end < bytes.len() && (bytes[name_end].is_ascii_alphanumeric() || bytes[name_end] == b'_') {
            name_end += 1;
        }

        if bytes.get(name_end) != Some(&b'(') {
            return None;
        }

        Some((&text[name_start..name_end], name_end + 1))
    }
}

impl<'a> Iterator for DirectiveScanner<'a> {
    type Item = Directive<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut state = State::Searching;

        loop {
            match state {
                State::Searching => {
                    let offset = self.text.get(self.cursor..)?.find(MARKER)?;
                    let position = self.cursor + offset;
                    // The marker is ASCII, so one byte past its start is a char boundary.
                    self.cursor = position + 1;

                    if let Some((name, args_start)) = self.header_at(position) {
                        state = State::InArgs { name, position, args_start };
                    }
                }
                State::InArgs { name, position, args_start } => match self.text[args_start..].find(')') {
                    Some(len) => {
                        let close = args_start + len;
                        self.cursor = close + 1;
                        return Some(Directive { name, raw_args: &self.text[args_start..close], position });
                    }
                    None => {
                        // No `)` remains, so no later marker can complete either.
                        self.cursor = self.text.len();
                        return None;
                    }
                },
            }
        }
    }
}

/// Scans `text` for directives
pub fn scan(text: &str) -> DirectiveScanner<'_> {
    DirectiveScanner::new(text)
}
