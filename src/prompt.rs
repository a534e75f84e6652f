use anyhow::Context;
use std::io::{BufRead, Write};

pub trait Prompt {
    /// Shows `message` and returns the operator's answer with surrounding
    /// whitespace removed.
    fn ask(&mut self, message: &str) -> anyhow::Result<String>;
}

pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn ask(&mut self, message: &str) -> anyhow::Result<String> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        let n = self
            .input
            .read_line(&mut line)
            .context("failed to read operator input")?;
        if n == 0 {
            anyhow::bail!("input closed while waiting for an answer");
        }
        Ok(line.trim().to_string())
    }
}
