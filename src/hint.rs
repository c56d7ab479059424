// hint.rs
use crate::country::Country;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HintState {
    pub active: bool,
    pub text: Option<String>,
    pub reward_penalty: bool,
}

/// Text shown for `target`: its capital, else its fun fact, else nothing.
pub fn hint_text(target: &Country) -> String {
    target
        .capital
        .clone()
        .or_else(|| target.fun_fact.clone())
        .unwrap_or_default()
}

pub fn has_hint(target: &Country) -> bool {
    target.capital.is_some() || target.fun_fact.is_some()
}

impl HintState {
    /// Reveals the hint for this round. Revealing again returns the same text.
    pub fn reveal(&mut self, target: &Country) -> String {
        if let Some(text) = &self.text {
            return text.clone();
        }
        let text = hint_text(target);
        self.active = true;
        self.reward_penalty = true;
        self.text = Some(text.clone());
        text
    }

    pub fn clear(&mut self) {
        *self = HintState::default();
    }
}
