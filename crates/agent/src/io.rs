use std::io::{BufRead, StdinLock, Stdout, Write};

use anyhow::{bail, Context, Result};

/// Prompt/answer text surface the dialogue runs over.
pub trait DialogueIo {
    /// Shows `prompt` and blocks for one line of free-text answer.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    fn say(&mut self, text: &str) -> Result<()>;
}

pub struct TerminalIo<R, W> {
    input: R,
    output: W,
}

impl TerminalIo<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R, W> TerminalIo<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R, W> DialogueIo for TerminalIo<R, W>
where
    R: BufRead,
    W: Write,
{
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.say(prompt)?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("failed to read answer")?;
        if read == 0 {
            bail!("input closed before an answer was given");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").context("failed to write to output")?;
        self.output.flush().context("failed to flush output")
    }
}
