use soroban_sdk::Bytes;

use crate::{errors::ContractError, MAX_ALIAS_LENGTH};

pub fn validate_alias_name(name: &Bytes) -> Result<(), ContractError> {
    if name.is_empty() || name.len() > MAX_ALIAS_LENGTH {
        return Err(ContractError::InvalidAlias);
    }
    Ok(())
}
