//! Interactive REPL for toolrelay
//!
//! Reads one query per line, runs it through the agent, prints the result.

use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::agent::Agent;
use crate::cli::commands::{parse_input, Input};
use crate::core::Result;

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    agent: Agent,
}

impl Repl {
    /// Create a REPL around an agent
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// Run the REPL on stdin/stdout
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.run_with(stdin, io::stdout()).await
    }

    /// Run the REPL on any line source and sink
    ///
    /// A failed query is reported and the loop keeps going; only `quit`, EOF,
    /// or an I/O failure on the input end it. Invalid UTF-8 is decoded lossily.
    pub async fn run_with<R, W>(&self, mut input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.print_banner(&mut output)?;

        let mut buf = Vec::new();

        loop {
            write!(output, "\nQuery: ")?;
            output.flush()?;

            buf.clear();
            match input.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    writeln!(output)?;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(target: "agent", error = %e, "Failed to read input");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf);

            match parse_input(&line) {
                Input::Quit => break,
                Input::Query(query) => match self.agent.process(&query).await {
                    Ok(response) => writeln!(output, "\n{}", response)?,
                    Err(e) => {
                        warn!(target: "agent", error = %e, "Query failed");
                        writeln!(output, "\nError: {}", e)?;
                    }
                },
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner<W: Write>(&self, output: &mut W) -> Result<()> {
        writeln!(output, "\nMCP Client Started!")?;
        writeln!(output, "Using Ollama model: {}", self.agent.model())?;
        writeln!(output, "Type your queries or 'quit' to exit.")?;
        Ok(())
    }
}
