/// Replay scripts: one JSON `Input` per line.
use anyhow::{Context, Result};

use retrace_mod_history::{History, Input, Transition, UndoManager};

/// An input together with its 1-based line number in the script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub input: Input,
}

/// Parses a JSON Lines script. Blank lines and `#` comments are skipped.
///
/// # Errors
///
/// Returns an error naming the first line that is not a valid input.
pub fn parse(text: &str) -> Result<Vec<ScriptLine>> {
    text.lines()
        .enumerate()
        .map(|(i, raw)| (i + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
        .map(|(line, raw)| {
            let input = serde_json::from_str(raw)
                .with_context(|| format!("Invalid input on script line {line}"))?;
            Ok(ScriptLine { line, input })
        })
        .collect()
}

/// Feeds every script line to `manager`, starting from a fresh bootstrap.
///
/// # Errors
///
/// Fails on the first engine error, naming the script line that caused it.
pub fn replay<T: Transition>(manager: &UndoManager<T>, lines: &[ScriptLine]) -> Result<History> {
    let mut history = manager.bootstrap();
    for ScriptLine { line, input } in lines {
        history = manager
            .handle(Some(&history), input)
            .with_context(|| format!("Engine error on script line {line} (`{}`)", input.trigger))?;
        tracing::debug!(
            line,
            trigger = %input.trigger,
            past = history.past().len(),
            future = history.future().len(),
            "replayed input"
        );
    }
    Ok(history)
}
