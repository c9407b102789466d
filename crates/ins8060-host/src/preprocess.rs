//! Line numbering and label substitution for unnumbered BASIC sources.
//!
//! NIBL expects every program line to start with a line number. Sources can
//! instead be written without numbers, using marker lines such as `&loop` to
//! name the following line and `&loop` references inside statements:
//!
//! ```text
//! &loop
//! PRINT "HI"
//! GOTO &loop
//! ```
//!
//! becomes `1 PRINT "HI"` / `2 GOTO 1`. Numbering runs in two passes: the
//! first binds every label to the number its following line will receive,
//! the second emits numbered lines with references replaced.

/// Marker that introduces a label definition or reference.
pub const DEFAULT_MARKER: char = '&';

/// Step between generated line numbers.
pub const DEFAULT_INTERVAL: u32 = 1;

/// A named line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Label identifier, without the marker.
    pub name: String,
    /// BASIC line number the label stands for.
    pub line: u32,
    /// 1-indexed source line holding the definition.
    pub defined_at: usize,
}

/// Labels in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    entries: Vec<Label>,
}

impl LabelTable {
    /// Line number bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|label| label.name == name)
            .map(|label| label.line)
    }

    /// Number of distinct labels.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no label was defined.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in the order they were first defined.
    pub fn iter(&self) -> impl Iterator<Item = &Label> + '_ {
        self.entries.iter()
    }

    /// Binds `name`; a later definition replaces an earlier one.
    fn bind(&mut self, name: &str, line: u32, defined_at: usize) {
        if let Some(label) = self.entries.iter_mut().find(|label| label.name == name) {
            log::warn!(
                "label `{name}` on source line {defined_at} redefines line {}",
                label.defined_at
            );
            label.line = line;
            label.defined_at = defined_at;
        } else {
            self.entries.push(Label {
                name: name.to_string(),
                line,
                defined_at,
            });
        }
    }
}

/// Output of [`Preprocessor::preprocess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// Numbered program text, one statement per line.
    pub text: String,
    /// Labels bound during the first pass.
    pub labels: LabelTable,
}

/// Two-pass line numberer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    /// Step between line numbers; also the first number assigned.
    pub interval: u32,
    /// Label marker character.
    pub marker: char,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Preprocessor {
    /// Creates a preprocessor with the default marker.
    #[must_use]
    pub const fn new(interval: u32) -> Self {
        Self {
            interval,
            marker: DEFAULT_MARKER,
        }
    }

    /// Numbers every non-blank, non-label line and substitutes references.
    ///
    /// Leading blanks and blank lines are dropped. A reference to an
    /// undefined label is removed from the output.
    #[must_use]
    pub fn preprocess(&self, text: &str) -> Preprocessed {
        let labels = self.bind_labels(text);
        for label in labels.iter() {
            log::debug!("{} {}", label.name, label.line);
        }

        let mut out = String::with_capacity(text.len() + text.len() / 4);
        let mut number: u32 = 0;
        for line in text.lines().map(skip_blanks) {
            if line.is_empty() || line.starts_with(self.marker) {
                continue;
            }
            number = number.saturating_add(self.interval);
            out.push_str(&number.to_string());
            out.push(' ');
            self.substitute(line, &labels, &mut out);
            out.push('\n');
        }

        Preprocessed { text: out, labels }
    }

    fn bind_labels(&self, text: &str) -> LabelTable {
        let mut labels = LabelTable::default();
        let mut next_line = self.interval;
        for (index, line) in text.lines().map(skip_blanks).enumerate() {
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix(self.marker) {
                let (name, _) = take_word(rest);
                if name.is_empty() {
                    log::warn!("source line {}: marker without a label name", index + 1);
                } else {
                    labels.bind(name, next_line, index + 1);
                }
            } else {
                next_line = next_line.saturating_add(self.interval);
            }
        }
        labels
    }

    fn substitute(&self, line: &str, labels: &LabelTable, out: &mut String) {
        let mut rest = line;
        while let Some(at) = rest.find(self.marker) {
            out.push_str(&rest[..at]);
            let (name, tail) = take_word(&rest[at + self.marker.len_utf8()..]);
            match labels.get(name) {
                Some(number) => out.push_str(&number.to_string()),
                None => log::warn!("undefined label `{name}`"),
            }
            rest = tail;
        }
        out.push_str(rest);
    }
}

/// Readies a source file for NIBL's line editor.
///
/// Text whose first non-blank character is a digit is already numbered and
/// passes through unchanged; anything else is run through a
/// [`Preprocessor`] with the given interval.
#[must_use]
pub fn prepare_program(text: &str, interval: u32) -> String {
    if skip_blanks(text).starts_with(|ch: char| ch.is_ascii_digit()) {
        text.to_string()
    } else {
        Preprocessor::new(interval).preprocess(text).text
    }
}

/// Control characters and spaces, but not the line feed.
const fn is_blank(ch: char) -> bool {
    ch <= ' ' && ch != '\n'
}

fn skip_blanks(text: &str) -> &str {
    text.trim_start_matches(is_blank)
}

/// Splits a leading `[A-Za-z_][A-Za-z0-9_]*` identifier off `text`, after
/// skipping blanks.
fn take_word(text: &str) -> (&str, &str) {
    let text = skip_blanks(text);
    let mut chars = text.char_indices();
    let end = match chars.next() {
        Some((_, first)) if first.is_ascii_alphabetic() || first == '_' => chars
            .find(|&(_, ch)| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .map_or(text.len(), |(index, _)| index),
        _ => 0,
    };
    text.split_at(end)
}
