//! Bounded in-memory log of dashboard events.
//!
//! Complements `defmt`: hosts without a debug probe drain it and print the lines,
//! and tests assert on it. Old entries are dropped when the log is full.
//!
//! # Usage
//!
//! ```ignore
//! let mut log = DiagnosticLog::new();
//! log.push(Level::Info, "history restored");
//! log.push_fmt(Level::Warn, format_args!("sensor: {}", err));
//!
//! for entry in log.drain() {
//!     eprintln!("{} {}", entry.level.prefix(), entry.message);
//! }
//! ```

use core::fmt::{self, Write};

use heapless::{Deque, String};

/// Entries kept before the oldest is dropped.
pub const LOG_ENTRIES: usize = 16;

/// Characters kept per entry; longer messages are truncated.
pub const LOG_LINE_LENGTH: usize = 48;

/// Entry severity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    /// Single-character tag used when printing.
    pub const fn prefix(self) -> char {
        match self {
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

/// One log line.
#[derive(Clone, Debug)]
pub struct Entry {
    pub level: Level,
    pub message: String<LOG_LINE_LENGTH>,
}

/// Writer that silently stops at capacity instead of failing the whole format.
struct Truncating<'a>(&'a mut String<LOG_LINE_LENGTH>);

impl Write for Truncating<'_> {
    fn write_str(
        &mut self,
        s: &str,
    ) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Ring buffer of the last [`LOG_ENTRIES`] entries.
pub struct DiagnosticLog {
    entries: Deque<Entry, LOG_ENTRIES>,
}

impl DiagnosticLog {
    pub const fn new() -> Self { Self { entries: Deque::new() } }

    pub fn push(
        &mut self,
        level: Level,
        message: &str,
    ) {
        self.push_fmt(level, format_args!("{message}"));
    }

    /// Record a formatted message, truncated to [`LOG_LINE_LENGTH`].
    pub fn push_fmt(
        &mut self,
        level: Level,
        args: fmt::Arguments<'_>,
    ) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        let mut message = String::new();
        Truncating(&mut message).write_fmt(args).ok();
        self.entries.push_back(Entry { level, message }).ok();
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> { self.entries.iter() }

    /// Remove and yield all entries, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Entry> + '_ { core::iter::from_fn(move || self.entries.pop_front()) }

    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl Default for DiagnosticLog {
    fn default() -> Self { Self::new() }
}
