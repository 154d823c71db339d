use hh_core::Chips;

/// A player decision submitted to the engine for the seat currently owing
/// action. Unlike the teacher's `Action`, there is no `Draw`/`Blind` chance
/// variant here — deals and blind posts are engine-internal transitions
/// emitted as [`crate::EngineEvent`]s, not edges a client can submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    Check,
    Call,
    RaiseTo(Chips),
}

impl Action {
    pub fn is_aggro(&self) -> bool {
        matches!(self, Action::RaiseTo(_))
    }
    pub fn is_passive(&self) -> bool {
        matches!(self, Action::Fold | Action::Check)
    }
    pub fn amount(&self) -> Option<Chips> {
        match self {
            Action::RaiseTo(amount) => Some(*amount),
            _ => None,
        }
    }
    pub fn label(&self) -> &'static str {
        match self {
            Action::Fold => "FOLD",
            Action::Check => "CHECK",
            Action::Call => "CALL",
            Action::RaiseTo(_) => "RAISE_TO",
        }
    }
}

impl TryFrom<&str> for Action {
    type Error = &'static str;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.first().copied().unwrap_or("").to_uppercase().as_str() {
            "FOLD" => Ok(Action::Fold),
            "CHECK" => Ok(Action::Check),
            "CALL" => Ok(Action::Call),
            "RAISE_TO" => parts
                .get(1)
                .and_then(|n| n.parse().ok())
                .map(Action::RaiseTo)
                .ok_or("invalid raise amount"),
            _ => Err("invalid action type"),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Action::Fold => write!(f, "FOLD"),
            Action::Check => write!(f, "CHECK"),
            Action::Call => write!(f, "CALL"),
            Action::RaiseTo(amount) => write!(f, "RAISE_TO {amount}"),
        }
    }
}

/// The legal action set offered to the acting seat, computed per §4.3.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegalActions {
    pub can_fold: bool,
    pub can_check: bool,
    pub can_call: bool,
    pub can_raise: bool,
    pub call_amount: Chips,
    pub min_raise_to: Chips,
    pub max_raise_to: Chips,
}

impl LegalActions {
    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::Fold => self.can_fold,
            Action::Check => self.can_check,
            Action::Call => self.can_call,
            Action::RaiseTo(amount) => {
                self.can_raise && amount >= self.min_raise_to && amount <= self.max_raise_to
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for action in [Action::Fold, Action::Check, Action::Call, Action::RaiseTo(400)] {
            assert_eq!(Action::try_from(action.to_string().as_str()).unwrap(), action);
        }
    }

    #[test]
    fn legal_actions_reject_raise_outside_band() {
        let legal = LegalActions {
            can_fold: true,
            can_check: false,
            can_call: true,
            can_raise: true,
            call_amount: 100,
            min_raise_to: 300,
            max_raise_to: 1000,
        };
        assert!(!legal.allows(Action::RaiseTo(200)));
        assert!(legal.allows(Action::RaiseTo(300)));
        assert!(!legal.allows(Action::RaiseTo(1001)));
    }
}
