use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::sound_table::SoundTable;

/// Separator between a prompt key and its value.
pub const SEPARATOR: &str = ": ";

/// Recognized `(opener, closer)` pairs for values spanning several lines.
pub const DELIMITERS: &[(u8, u8)] = &[(b'"', b'"'), (b'[', b']')];

#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    /// Structural violation.
    ///
    /// `line` is 1-based: the first line of the input is line 1. For an
    /// unterminated multi-line value it is the line the value started on and
    /// `context` holds its key; otherwise `context` is the raw line.
    #[error("Malformed input on line {line}: {reason} ({context:?})")]
    MalformedInput {
        line: usize,
        reason: &'static str,
        context: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Carries the number of lines consumed before cancellation.
    #[error("Parse cancelled after line {0}")]
    Cancelled(usize),
}

/// Counters reported once the whole input has been consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines read, including ignored ones.
    pub processed: usize,
    /// Blank and comment lines.
    pub ignored: usize,
    /// Distinct keys in the resulting table.
    pub distinct: usize,
    /// Keys that were defined more than once.
    pub duplicates: usize,
}

/// Result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub table: SoundTable,
    pub stats: ParseStats,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Accumulating {
        key: String,
        buffer: String,
        closer: u8,
        start_line: usize,
    },
}

/// Line-by-line transcript scanner.
///
/// A parser handles exactly one input stream: feed every line in order with
/// [`Parser::feed_line`], then call [`Parser::finish`]. Independent parsers
/// share no state and can run on separate threads.
///
/// ```
/// use sound_prompts::transcript::Parser;
///
/// let mut parser = Parser::new();
/// for line in ["vm-intro: Welcome", "vm-goodbye: \"Good", "bye\""] {
///     parser.feed_line(line)?;
/// }
/// let transcript = parser.finish()?;
/// assert_eq!(transcript.table.get("vm-goodbye"), Some("Good\nbye"));
/// # Ok::<(), sound_prompts::transcript::TranscriptError>(())
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    table: SoundTable,
    line: usize,
    ignored: usize,
    duplicates: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines fed so far.
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Process the next input line.
    pub fn feed_line(&mut self, line: &str) -> Result<(), TranscriptError> {
        self.line += 1;

        if line.is_empty() || line.starts_with(';') {
            self.ignored += 1;
            return Ok(());
        }

        if let State::Accumulating {
            key,
            mut buffer,
            closer,
            start_line,
        } = std::mem::take(&mut self.state)
        {
            if line.as_bytes().last() == Some(&closer) {
                log::debug!("End multi-line value on line {}", self.line);
                buffer.push('\n');
                // The closer is ASCII, so dropping one byte stays on a char boundary.
                buffer.push_str(&line[..line.len() - 1]);
                self.insert(key, buffer);
            } else {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(line);
                self.state = State::Accumulating {
                    key,
                    buffer,
                    closer,
                    start_line,
                };
            }
            return Ok(());
        }

        let closer = unclosed_delimiter(line);

        let (key, rest) = match line.split_once(SEPARATOR) {
            Some((key, rest)) if !key.is_empty() && !rest.is_empty() => (key, rest),
            Some(_) => return Err(self.malformed("empty key or value", line)),
            None => return Err(self.malformed("missing key/value separator", line)),
        };

        if let Some(closer) = closer {
            log::debug!("Begin multi-line value on line {}: {}", self.line, key);
            let mut value = rest.chars();
            value.next();
            self.state = State::Accumulating {
                key: key.to_string(),
                buffer: value.as_str().to_string(),
                closer,
                start_line: self.line,
            };
            return Ok(());
        }

        self.insert(key.to_string(), rest.to_string());
        Ok(())
    }

    /// Finish the stream and return the table.
    ///
    /// Fails if a multi-line value is still open.
    pub fn finish(self) -> Result<Transcript, TranscriptError> {
        if let State::Accumulating {
            key, start_line, ..
        } = self.state
        {
            return Err(TranscriptError::MalformedInput {
                line: start_line,
                reason: "unterminated multi-line value",
                context: key,
            });
        }

        let stats = ParseStats {
            processed: self.line,
            ignored: self.ignored,
            distinct: self.table.len(),
            duplicates: self.duplicates,
        };
        log::info!(
            "Processed {} lines, ignored {} lines, {} distinct results parsed",
            stats.processed,
            stats.ignored,
            stats.distinct
        );

        Ok(Transcript {
            table: self.table,
            stats,
        })
    }

    fn insert(&mut self, key: String, value: String) {
        if self.table.contains_key(&key) {
            log::warn!("Duplicate key: {key}");
            self.duplicates += 1;
        }
        self.table.insert(key, value);
    }

    fn malformed(&self, reason: &'static str, line: &str) -> TranscriptError {
        TranscriptError::MalformedInput {
            line: self.line,
            reason,
            context: line.to_string(),
        }
    }
}

/// Find the first separator directly followed by a recognized opener.
fn opening_delimiter(line: &str) -> Option<(u8, u8)> {
    let bytes = line.as_bytes();
    line.match_indices(SEPARATOR).find_map(|(idx, _)| {
        let next = *bytes.get(idx + SEPARATOR.len())?;
        DELIMITERS.iter().copied().find(|&(open, _)| open == next)
    })
}

/// Returns the closer to wait for when the delimiter count on this line is odd.
///
/// Parity is the only signal: escaped delimiters and nested spans of the same
/// character are not recognized.
fn unclosed_delimiter(line: &str) -> Option<u8> {
    let (opener, closer) = opening_delimiter(line)?;
    let count_of = |b: u8| line.bytes().filter(|&c| c == b).count();

    let mut count = count_of(opener);
    if opener != closer {
        count += count_of(closer);
    }

    (count % 2 != 0).then_some(closer)
}

/// Parse a sequence of lines.
pub fn parse<I, S>(lines: I) -> Result<Transcript, TranscriptError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_with_cancel(lines, &AtomicBool::new(false))
}

/// Parse a sequence of lines, checking `cancel` before each line.
pub fn parse_with_cancel<I, S>(lines: I, cancel: &AtomicBool) -> Result<Transcript, TranscriptError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = Parser::new();
    for line in lines {
        if cancel.load(Ordering::Relaxed) {
            return Err(TranscriptError::Cancelled(parser.line_number()));
        }
        parser.feed_line(line.as_ref())?;
    }
    parser.finish()
}

/// Parse lines from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Transcript, TranscriptError> {
    let mut parser = Parser::new();
    for line in reader.lines() {
        parser.feed_line(&line?)?;
    }
    parser.finish()
}

/// Parse a transcript file.
pub fn parse_file(path: &Path) -> Result<Transcript, TranscriptError> {
    log::info!("Parsing transcript {}", path.display());
    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}
