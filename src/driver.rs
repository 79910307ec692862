//! JSON-lines driver: one stimulus in, one presence record out

use selph_agent::AgentFacade;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use tracing::warn;

/// Parse one input line. Anything that is not JSON becomes a zero-strength text stimulus.
pub fn parse_stimulus(line: &str) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Stimulus is not JSON ({}), treating as text", e);
            Some(json!({ "name": "text", "text": line }))
        }
    }
}

/// Step the agent once per non-empty line, writing each presence record as a JSON line.
/// With `auto_evolve`, the agent also gets an evolution check after every step.
pub fn run_lines<R: BufRead, W: Write>(
    agent: &mut AgentFacade,
    input: R,
    mut output: W,
    auto_evolve: bool,
) -> anyhow::Result<usize> {
    let mut steps = 0;
    for line in input.lines() {
        let Some(stimulus) = parse_stimulus(&line?) else {
            continue;
        };
        let presence = agent.step(&stimulus);
        if auto_evolve {
            agent.auto_evolve();
        }
        serde_json::to_writer(&mut output, &presence)?;
        writeln!(output)?;
        steps += 1;
    }
    output.flush()?;
    Ok(steps)
}
