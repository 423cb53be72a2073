//! Asterisk sound prompt transcript parsing.
//!
//! Transcripts are line-oriented `key: value` definitions as shipped with
//! Asterisk sound packs:
//!
//! ```text
//! ; comments start with a semicolon
//! vm-intro: Please leave your message after the tone.
//! vm-options: "Press 1 to record your unavailable message,
//! press 2 to record your busy message."
//! conf-getpin: [Please enter the conference pin number
//! followed by the pound key.]
//! ```
//!
//! A value that starts with `"` or `[` and contains an odd number of
//! delimiter characters on its first line continues on the following lines
//! until a line ends with the matching `"` or `]`. The delimiters themselves
//! are stripped and the lines are joined with `\n`.
//!
//! # Example
//!
//! ```rust
//! use sound_prompts::transcript::parse;
//!
//! let transcript = parse(["vm-intro: Hello", "vm-bye: [Good", "bye]"])?;
//! let keys: Vec<&str> = transcript.table.keys().collect();
//! assert_eq!(keys, ["vm-intro", "vm-bye"]);
//! assert_eq!(transcript.table.get("vm-bye"), Some("Good\nbye"));
//! # Ok::<(), sound_prompts::transcript::TranscriptError>(())
//! ```

pub mod parser;
pub mod sound_table;

pub use parser::{
    parse, parse_file, parse_reader, parse_with_cancel, ParseStats, Parser, Transcript,
    TranscriptError,
};
pub use sound_table::{Entry, SoundTable};
