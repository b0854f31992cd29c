use soroban_sdk::{Address, Vec};

use crate::{errors::ContractError, Custodian, GroupOp, Method, OpAction, MAX_GROUP_SIZE};

/// How a group plan brings control of the managed account back home
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Restoration {
    /// The final operation rekeys the managed account to the expected custodian
    SelfHealing,
    /// The final operation calls `verify_control_state` on the owning program
    VerifyCall,
}

/// Custodian the managed account must have whenever a group closes.
pub fn expected_custodian(managed: &Address, program: &Address) -> Custodian {
    if managed == program {
        Custodian::SelfControlled
    } else {
        Custodian::Controller(program.clone())
    }
}

pub fn validate_plan(plan: &Vec<GroupOp>) -> Result<(), ContractError> {
    if plan.is_empty() || plan.len() > MAX_GROUP_SIZE {
        return Err(ContractError::InvalidGroup);
    }
    Ok(())
}

/// Checks that the final operation of `plan` leaves `managed` under the
/// control of `program`, either directly or by asserting it.
pub fn verify_group_restores_control(
    plan: &Vec<GroupOp>,
    managed: &Address,
    program: &Address,
) -> Result<Restoration, ContractError> {
    validate_plan(plan)?;
    let last = plan.last().ok_or(ContractError::InvalidGroup)?;

    match &last.action {
        OpAction::Rekey(target) if &last.sender == managed => {
            if Custodian::for_target(managed, target) == expected_custodian(managed, program) {
                Ok(Restoration::SelfHealing)
            } else {
                Err(ContractError::InvariantViolation)
            }
        }
        OpAction::Call(call)
            if &call.program == program && call.method == Method::VerifyControlState =>
        {
            Ok(Restoration::VerifyCall)
        }
        _ => Err(ContractError::InvariantViolation),
    }
}
