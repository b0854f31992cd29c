//! Interface of the ledger that records who controls an account.
//!
//! The owning program never writes custody records itself; it asks the
//! custody ledger to rekey, and the ledger only accepts a rekey authorized by
//! the account's current controller.
use soroban_sdk::{contractclient, Address, Env};

use crate::Custodian;

#[contractclient(name = "CustodyClient")]
pub trait CustodyInterface {
    /// Current custodian of `account`.
    fn custodian(env: Env, account: Address) -> Custodian;

    /// Moves control of `account` to `target`.
    ///
    /// Must be authorized by the account's current effective controller.
    fn rekey(env: Env, account: Address, target: Address);
}
