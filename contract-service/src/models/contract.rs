//! Shape of a successful contract response.

use serde::Serialize;

/// Number of non-empty lines shown in the preview.
pub const PREVIEW_LINES: usize = 3;

/// Fixed routine scaffold returned alongside every contract.
///
/// Not derived from the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractPlan {
    pub daily_block: &'static str,
    pub impact_actions: [&'static str; 3],
    pub checkins: &'static str,
    pub recovery: &'static str,
}

impl ContractPlan {
    pub const fn scaffold() -> Self {
        Self {
            daily_block: "5–25 minutos por dia, todos os dias",
            impact_actions: ["Ação 1", "Ação 2", "Ação 3"],
            checkins: "Revisão semanal (10–15 min) aos domingos",
            recovery: "Se falhar no dia, retome com 5 minutos no mesmo dia",
        }
    }
}

impl Default for ContractPlan {
    fn default() -> Self {
        Self::scaffold()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub preview: String,
    pub full: String,
    pub plan: ContractPlan,
}

impl CompletionResult {
    /// Build the response from the model's raw message content.
    pub fn from_content(content: &str) -> Self {
        let full = content.trim().to_string();
        let preview = preview(&full, PREVIEW_LINES);

        Self {
            preview,
            full,
            plan: ContractPlan::scaffold(),
        }
    }
}

/// First `lines` non-blank lines of `text`, each trimmed, joined by `\n`.
pub fn preview(text: &str, lines: usize) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(lines)
        .collect::<Vec<_>>()
        .join("\n")
}
