use std::io::{self, BufRead, Write};

use crate::selection::Selection;

pub const FORMAT_PROMPT: &str =
    "Enter the numbers of the formats to download (comma-separated), or 'q' to quit: ";
pub const PLAYLIST_PROMPT: &str =
    "Enter video numbers to download (e.g., 1-5,8,10), '0' for all, or 'q' to quit: ";
pub const INVALID_INPUT: &str = "Invalid input. Please enter numbers from the list.";

/// Interactive selection over an injected reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writer for listings shown before a prompt.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Asks until the answer resolves. Never returns [`Selection::Invalid`];
    /// end of input counts as [`Selection::Abort`].
    pub fn select(&mut self, prompt: &str, count: usize, allow_all: bool) -> io::Result<Selection> {
        loop {
            write!(self.output, "\n{}", prompt)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(Selection::Abort);
            }

            match Selection::resolve(&line, count, allow_all) {
                Selection::Invalid => writeln!(self.output, "{}", INVALID_INPUT)?,
                selection => return Ok(selection),
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
