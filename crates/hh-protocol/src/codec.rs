use crate::bot::ClientMessage;
use crate::error::{ErrorCode, WireError};
use crate::spectator::SpectatorClientMessage;
use hh_engine::{Action, LegalActions};

/// Decodes and validates frames, bridging the untyped wire to the typed
/// engine. Centralizes the protocol layer the way the teacher's own
/// `Protocol` does: nothing here performs I/O, it is pure parsing and
/// validation.
pub struct WireCodec;

impl WireCodec {
    pub fn decode_client(json: &str) -> Result<ClientMessage, WireError> {
        serde_json::from_str(json).map_err(|e| WireError::BadSchema(e.to_string()))
    }

    pub fn decode_spectator(json: &str) -> Result<SpectatorClientMessage, WireError> {
        serde_json::from_str(json).map_err(|e| WireError::BadSchema(e.to_string()))
    }

    /// Parses the `action`/`amount` pair of a `ClientMessage::Action` into
    /// an engine [`Action`].
    pub fn decode_action(action: &str, amount: Option<i64>) -> Result<Action, WireError> {
        let label = match amount {
            Some(amount) => format!("{action} {amount}"),
            None => action.to_string(),
        };
        Action::try_from(label.as_str())
            .map_err(|_| WireError::UnknownCode(ErrorCode::InvalidAction, format!("unparsable action {action:?}")))
    }

    /// Rejects an action the engine's legal set does not offer (§6
    /// `error.INVALID_ACTION`). Out-of-turn is detected earlier, by
    /// comparing the acting seat, not here.
    pub fn validate(action: Action, legal: &LegalActions) -> Result<Action, WireError> {
        if legal.allows(action) {
            Ok(action)
        } else {
            Err(WireError::UnknownCode(
                ErrorCode::InvalidAction,
                format!("{action} not in legal set"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_action_without_amount() {
        assert_eq!(WireCodec::decode_action("FOLD", None).unwrap(), Action::Fold);
    }

    #[test]
    fn decode_action_with_amount() {
        assert_eq!(
            WireCodec::decode_action("RAISE_TO", Some(400)).unwrap(),
            Action::RaiseTo(400)
        );
    }

    #[test]
    fn decode_action_rejects_garbage() {
        assert!(WireCodec::decode_action("SMASH", None).is_err());
    }

    #[test]
    fn validate_rejects_action_outside_legal_set() {
        let legal = LegalActions {
            can_fold: true,
            can_check: true,
            can_call: false,
            can_raise: false,
            call_amount: 0,
            min_raise_to: 0,
            max_raise_to: 0,
        };
        assert!(WireCodec::validate(Action::Call, &legal).is_err());
        assert!(WireCodec::validate(Action::Check, &legal).is_ok());
    }

    #[test]
    fn decode_client_surfaces_bad_schema_on_malformed_json() {
        let err = WireCodec::decode_client("{not json").unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadSchema);
    }
}
