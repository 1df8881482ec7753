//! The payload stored per outline node, and its line-level text format.

use std::fmt;

pub const COMPLETE_TAG: &str = "[COMPLETE]";
pub const COLLAPSED_TAG: &str = "[COLLAPSED]";
/// Indent width of one nesting level in the save-file format.
pub const SPACES_PER_LEVEL: usize = 2;

/// Error for a single unparseable save-file line. The outline parser
/// skips such lines rather than failing the whole load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("indent of {0} spaces is not a multiple of {SPACES_PER_LEVEL}")]
    BadIndent(usize),
    #[error("line has no `- ` item marker")]
    MissingMarker,
    #[error("subtitle line has no preceding item")]
    DanglingSubtitle,
}

/// A single outline entry: display text, an optional secondary line,
/// and the completion/collapse flags. Equality compares all four fields
/// (used by structural tree comparison, not node identity).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub text: String,
    pub subtitle: String,
    pub complete: bool,
    pub collapsed: bool,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Item {
            text: text.into(),
            ..Item::default()
        }
    }

    /// Parse one save-file line.
    ///
    /// A line that is entirely a double-quoted string (after trimming)
    /// is a subtitle continuation: it is merged into `last` and no new
    /// item is produced. Otherwise the line must contain a `- ` marker;
    /// the prefix before it is indentation whose length must be an exact
    /// multiple of [`SPACES_PER_LEVEL`], giving the item's level. The
    /// `[COMPLETE]` and `[COLLAPSED]` tags are stripped by literal
    /// substring match wherever they appear; a tag-shaped substring in
    /// real item text is stripped too, a known format ambiguity.
    pub fn parse_line(line: &str, last: Option<&mut Item>) -> Result<Option<(Item, i32)>, LineError> {
        let trimmed = line.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            let last = last.ok_or(LineError::DanglingSubtitle)?;
            last.subtitle = trimmed[1..trimmed.len() - 1].to_string();
            return Ok(None);
        }

        let (indent, rest) = line.split_once("- ").ok_or(LineError::MissingMarker)?;
        if indent.len() % SPACES_PER_LEVEL != 0 {
            return Err(LineError::BadIndent(indent.len()));
        }
        let level = (indent.len() / SPACES_PER_LEVEL) as i32;

        let complete = rest.contains(COMPLETE_TAG);
        let collapsed = rest.contains(COLLAPSED_TAG);
        let text = rest
            .replace(COMPLETE_TAG, "")
            .replace(COLLAPSED_TAG, "")
            .trim()
            .to_string();

        Ok(Some((
            Item {
                text,
                subtitle: String::new(),
                complete,
                collapsed,
            },
            level,
        )))
    }
}

impl fmt::Display for Item {
    /// Renders `[COMPLETE] [COLLAPSED] <text>`, each tag present only if
    /// the flag is set, followed by a `"<subtitle>"` line when the
    /// subtitle is non-empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.complete {
            write!(f, "{} ", COMPLETE_TAG)?;
        }
        if self.collapsed {
            write!(f, "{} ", COLLAPSED_TAG)?;
        }
        write!(f, "{}", self.text)?;
        if !self.subtitle.is_empty() {
            write!(f, "\n\"{}\"", self.subtitle)?;
        }
        Ok(())
    }
}
