//! Interface a delegate implements to act on a managed account it holds.
use soroban_sdk::{contractclient, Address, Env, Vec};

use crate::GroupOp;

#[contractclient(name = "PluginClient")]
pub trait PluginInterface {
    /// Runs `group` while the delegate controls `account`.
    ///
    /// The delegate must have rekeyed `account` back to its owning program by
    /// the time this returns, or the delegation that invoked it fails.
    fn execute(env: Env, account: Address, group: Vec<GroupOp>);
}
