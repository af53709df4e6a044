use serde::Serialize;
use tracing::debug;

use crate::errors::{GuidanceError, GuidanceResult};
use crate::history::Turn;

/// How much of the history is forwarded upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// Send every turn.
    #[default]
    Unbounded,
    /// Send only the most recent `n` turns.
    LastTurns(usize),
}

impl From<Option<usize>> for HistoryWindow {
    fn from(max_turns: Option<usize>) -> Self {
        match max_turns {
            Some(n) => HistoryWindow::LastTurns(n),
            None => HistoryWindow::Unbounded,
        }
    }
}

impl HistoryWindow {
    fn apply<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        match *self {
            HistoryWindow::Unbounded => history,
            HistoryWindow::LastTurns(n) => &history[history.len().saturating_sub(n)..],
        }
    }
}

/// Payload for one guidance call: prior turns plus the new user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceRequest {
    history: Vec<Turn>,
    new_input: String,
}

impl GuidanceRequest {
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn new_input(&self) -> &str {
        &self.new_input
    }
}

/// Rejects input that is empty once surrounding whitespace is ignored.
pub fn validate_input(field: &str, input: &str) -> GuidanceResult<()> {
    if input.trim().is_empty() {
        return Err(GuidanceError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Builds [`GuidanceRequest`] values from a history snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestAssembler {
    window: HistoryWindow,
}

impl RequestAssembler {
    pub fn new(window: HistoryWindow) -> Self {
        Self { window }
    }

    /// Packages `history` and `new_input`. The input is carried verbatim.
    pub fn assemble(&self, history: &[Turn], new_input: &str) -> GuidanceResult<GuidanceRequest> {
        validate_input("newInput", new_input)?;

        let kept = self.window.apply(history);
        if kept.len() < history.len() {
            debug!(
                total = history.len(),
                kept = kept.len(),
                "History window dropped older turns"
            );
        }

        Ok(GuidanceRequest {
            history: kept.to_vec(),
            new_input: new_input.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn four_turns() -> Vec<Turn> {
        vec![
            Turn::user("I lost my job."),
            Turn::assistant("Trust in Allah's plan."),
            Turn::user("How do I stay hopeful?"),
            Turn::assistant("Remember that with hardship comes ease."),
        ]
    }

    #[test]
    fn test_empty_history_scenario() {
        let request = RequestAssembler::default()
            .assemble(&[], "I am feeling anxious about an exam.")
            .unwrap();

        assert!(request.history().is_empty());
        assert_eq!(request.new_input(), "I am feeling anxious about an exam.");
    }

    #[test]
    fn test_history_is_copied_in_order() {
        let history = four_turns();
        let request = RequestAssembler::default()
            .assemble(&history, "What about patience?")
            .unwrap();

        assert_eq!(request.history(), history.as_slice());
        assert_eq!(request.new_input(), "What about patience?");
    }

    #[test]
    fn test_input_is_not_trimmed() {
        let request = RequestAssembler::default().assemble(&[], "  padded \n").unwrap();
        assert_eq!(request.new_input(), "  padded \n");
    }

    #[test]
    fn test_blank_input_is_rejected() {
        for input in ["", "   ", "\n\t"] {
            let err = RequestAssembler::default().assemble(&four_turns(), input).unwrap_err();
            assert!(matches!(err, GuidanceError::Validation(_)), "input {:?}", input);
        }
    }

    #[test]
    fn test_window_keeps_most_recent_turns() {
        let history = four_turns();
        let request = RequestAssembler::new(HistoryWindow::LastTurns(2))
            .assemble(&history, "next")
            .unwrap();

        assert_eq!(request.history(), &history[2..]);
    }

    #[test]
    fn test_window_larger_than_history_keeps_everything() {
        let history = four_turns();
        let request = RequestAssembler::new(HistoryWindow::from(Some(10)))
            .assemble(&history, "next")
            .unwrap();

        assert_eq!(request.history().len(), 4);
    }

    #[test]
    fn test_wire_format() {
        let request = RequestAssembler::default()
            .assemble(&[Turn::user("salaam")], "question")
            .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "history": [{"role": "user", "content": "salaam"}],
                "newInput": "question"
            })
        );
    }
}
