//! Operator review of generated candidates.
//!
//! Review is a blocking prompt: no timeout, one item at a time.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Stderr, Stdin, Write};
use std::path::Path;

use parking_lot::Mutex;

/// Operator decision on one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Keep this candidate and stop.
    Accept,
    /// Drop the item entirely.
    Reject,
    /// Regenerate with this prompt (empty keeps the current one).
    Revise(String),
}

/// Something that can review a candidate.
pub trait Confirmer: Send + Sync {
    fn review(&self, item: &str, candidate: &Path) -> io::Result<Decision>;
}

/// Line-based review over any reader/writer pair.
///
/// Accepts `a`/`accept` (or an empty line), `r`/`reject`, `v`/`revise`.
/// End of input counts as reject.
pub struct TerminalConfirmer<R, W> {
    input: Mutex<R>,
    output: Mutex<W>,
}

impl TerminalConfirmer<BufReader<Stdin>, Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead + Send, W: Write + Send> TerminalConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: Mutex::new(input),
            output: Mutex::new(output),
        }
    }

    fn read_line(&self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let n = self.input.lock().read_line(&mut line)?;
        Ok((n > 0).then(|| line.trim().to_string()))
    }

    fn prompt(&self, text: &str) -> io::Result<()> {
        let mut out = self.output.lock();
        write!(out, "{}", text)?;
        out.flush()
    }
}

impl<R: BufRead + Send, W: Write + Send> Confirmer for TerminalConfirmer<R, W> {
    fn review(&self, item: &str, candidate: &Path) -> io::Result<Decision> {
        {
            let mut out = self.output.lock();
            writeln!(out, "\n{}: {}", item, candidate.display())?;
        }

        loop {
            self.prompt("[a]ccept / [r]eject / re[v]ise > ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(Decision::Reject);
            };

            match answer.to_ascii_lowercase().as_str() {
                "" | "a" | "accept" | "y" | "yes" => return Ok(Decision::Accept),
                "r" | "reject" | "n" | "no" => return Ok(Decision::Reject),
                "v" | "revise" => {
                    self.prompt("New prompt: ")?;
                    let prompt = self.read_line()?.unwrap_or_default();
                    return Ok(Decision::Revise(prompt));
                }
                _ => {
                    let mut out = self.output.lock();
                    writeln!(out, "Unrecognised answer '{}'", answer)?;
                }
            }
        }
    }
}

/// Replays a fixed list of decisions, then accepts.
pub struct ScriptedConfirmer {
    decisions: Mutex<VecDeque<Decision>>,
}

impl ScriptedConfirmer {
    pub fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn review(&self, _item: &str, _candidate: &Path) -> io::Result<Decision> {
        Ok(self.decisions.lock().pop_front().unwrap_or(Decision::Accept))
    }
}
