//! REPL input classification

/// What a line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Exit the REPL
    Quit,
    /// Send to the orchestrator
    Query(String),
}

/// Classify one line of input
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();

    if line.eq_ignore_ascii_case("quit") {
        Input::Quit
    } else {
        Input::Query(line.to_string())
    }
}
