//! Internal action to host action translation

use crate::request::{ActionLabel, DecisionRequest, ExternalAction};
use cfrbot_engine::{Action, EngineError, Result};
use log::warn;

/// Map an internal action onto the host's `(label, amount)` pair.
///
/// Raise amounts are clamped into the request's raise range. An action the
/// request does not allow at all is an error, never replaced by another.
pub fn to_external(action: Action, request: &DecisionRequest) -> Result<ExternalAction> {
    match action {
        Action::Fold if request.can_fold() => Ok(ExternalAction::fold()),
        Action::Call if request.call_amount().is_some() => Ok(ExternalAction::call()),
        Action::Raise(to) => {
            let (min, max) = request
                .raise_range()
                .ok_or_else(|| EngineError::malformed(format!("{} chosen but raising is not legal", action)))?;
            let amount = to.clamp(min, max);
            if amount != to {
                warn!("raise to {} clamped to {} (range [{}, {}])", to, amount, min, max);
            }
            Ok(ExternalAction::raise(amount))
        }
        _ => Err(EngineError::malformed(format!(
            "{} is not in the legal set {:?}",
            action, request.legal
        ))),
    }
}

/// Map a host action back onto the internal representation
pub fn from_external(external: ExternalAction, request: &DecisionRequest) -> Result<Action> {
    let action = match external.label {
        ActionLabel::Fold => Action::Fold,
        ActionLabel::Call => Action::Call,
        ActionLabel::Raise => Action::Raise(external.amount),
    };
    // Round-trips only when the host would accept it unchanged
    match to_external(action, request)? {
        back if back == external => Ok(action),
        back => Err(EngineError::malformed(format!("{} is outside the legal range ({})", external, back))),
    }
}
