//! Comment and carriage-return stripping for program source files.
//!
//! Sources may carry C-style comments. `//` runs to the end of the line and
//! keeps the newline; `/* ... */` does not nest, keeps any newlines it spans
//! so line numbers survive, and collapses to a single space.

use crate::errors::SourceError;

/// Removes carriage returns and comments from `text`.
///
/// # Errors
///
/// Returns [`SourceError::UnterminatedComment`] when a `/*` comment is still
/// open at the end of the text. A `//` comment may end the file.
pub fn clean_source(text: &str) -> Result<String, SourceError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().filter(|&ch| ch != '\r').peekable();
    let mut line = 1;

    while let Some(ch) = chars.next() {
        let next = chars.peek().copied();
        match (ch, next) {
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        line += 1;
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                let opened_on = line;
                chars.next();
                let mut closed = false;
                while let Some(skipped) = chars.next() {
                    if skipped == '\n' {
                        out.push('\n');
                        line += 1;
                    } else if skipped == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        out.push(' ');
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(SourceError::UnterminatedComment { line: opened_on });
                }
            }
            _ => {
                if ch == '\n' {
                    line += 1;
                }
                out.push(ch);
            }
        }
    }

    Ok(out)
}
