#![cfg(test)]

use crate::{PluginAccount, PluginAccountClient};
use custody_ledger::{CustodyLedger, CustodyLedgerClient};
use custody_lib::{
    custody::CustodyClient, plugin::PluginInterface, Custodian, GroupOp, Method, OpAction,
    ProgramCall,
};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Symbol, Vec};

#[contracttype]
#[derive(Clone)]
enum RunnerKey {
    Custody,
    /// Custodian of the account when the runner was invoked
    Seen,
    Transfers,
}

/// Plugin that performs the plan's rekeys and counts its transfers
#[contract]
pub struct GroupRunner;

#[contractimpl]
impl GroupRunner {
    pub fn __constructor(env: Env, custody: Address) {
        env.storage().instance().set(&RunnerKey::Custody, &custody);
    }

    pub fn seen(env: Env) -> Option<Custodian> {
        env.storage().instance().get(&RunnerKey::Seen)
    }

    pub fn transfers(env: Env) -> u32 {
        env.storage()
            .instance()
            .get(&RunnerKey::Transfers)
            .unwrap_or(0)
    }
}

#[contractimpl]
impl PluginInterface for GroupRunner {
    fn execute(env: Env, account: Address, group: Vec<GroupOp>) {
        let custody: Address = env.storage().instance().get(&RunnerKey::Custody).unwrap();
        let ledger = CustodyClient::new(&env, &custody);
        env.storage()
            .instance()
            .set(&RunnerKey::Seen, &ledger.custodian(&account));

        let mut transfers = 0u32;
        for op in group.iter() {
            match op.action {
                OpAction::Rekey(target) if op.sender == account => {
                    ledger.rekey(&account, &target)
                }
                OpAction::Transfer(_) if op.sender == account => transfers += 1,
                _ => {}
            }
        }
        env.storage()
            .instance()
            .set(&RunnerKey::Transfers, &transfers);
    }
}

pub use hoarder::Hoarder;

mod hoarder {
    use custody_lib::{plugin::PluginInterface, GroupOp};
    use soroban_sdk::{contract, contractimpl, Address, Env, Vec};

    /// Plugin that keeps control of whatever it is handed
    #[contract]
    pub struct Hoarder;

    #[contractimpl]
    impl PluginInterface for Hoarder {
        fn execute(_env: Env, _account: Address, _group: Vec<GroupOp>) {}
    }
}

/// A created managed account wired to a fresh custody ledger
pub struct Harness {
    pub env: Env,
    pub program: PluginAccountClient<'static>,
    pub custody: CustodyLedgerClient<'static>,
    pub admin: Address,
    pub managed: Address,
}

impl Harness {
    /// External managed account whose custody was handed to the program
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();

        let (program, custody) = register(&env);
        let admin = Address::generate(&env);
        let managed = Address::generate(&env);

        custody.rekey(&managed, &program.address);
        program.create_managed_account(&admin, &Some(managed.clone()), &custody.address, &None);

        Harness {
            env,
            program,
            custody,
            admin,
            managed,
        }
    }

    /// The program manages its own address
    pub fn self_managed() -> Self {
        let env = Env::default();
        env.mock_all_auths();

        let (program, custody) = register(&env);
        let admin = Address::generate(&env);
        program.create_managed_account(&admin, &None, &custody.address, &None);
        let managed = program.address.clone();

        Harness {
            env,
            program,
            custody,
            admin,
            managed,
        }
    }

    pub fn program_id(&self) -> Address {
        self.program.address.clone()
    }

    /// Final operation that rekeys the managed account back to the program
    pub fn restore_op(&self) -> GroupOp {
        rekey_op(&self.managed, &self.program_id())
    }

    pub fn verify_op(&self, sender: &Address) -> GroupOp {
        GroupOp {
            sender: sender.clone(),
            action: OpAction::Call(ProgramCall {
                program: self.program_id(),
                method: Method::VerifyControlState,
            }),
        }
    }

    /// `caller` invokes `method` on the program
    pub fn call_op(&self, caller: &Address, method: &str) -> GroupOp {
        GroupOp {
            sender: caller.clone(),
            action: OpAction::Call(ProgramCall {
                program: self.program_id(),
                method: Method::Other(Symbol::new(&self.env, method)),
            }),
        }
    }

    /// Delegation by `caller` that the plugin undoes at the end of the group
    pub fn restoring_plan(&self, caller: &Address) -> Vec<GroupOp> {
        Vec::from_array(
            &self.env,
            [self.call_op(caller, "delegate_control"), self.restore_op()],
        )
    }

    /// Delegation by `caller` with nothing after it
    pub fn abandoning_plan(&self, caller: &Address) -> Vec<GroupOp> {
        Vec::from_array(&self.env, [self.call_op(caller, "delegate_control")])
    }

    /// Plugin that runs whatever group it is given
    pub fn plugin(&self) -> GroupRunnerClient<'static> {
        let id = self.env.register(GroupRunner, (self.custody.address.clone(),));
        GroupRunnerClient::new(&self.env, &id)
    }

    /// Deploys a `GroupRunner` at an address fixed in advance
    pub fn plugin_at(&self, id: &Address) -> GroupRunnerClient<'static> {
        self.env
            .register_at(id, GroupRunner, (self.custody.address.clone(),));
        GroupRunnerClient::new(&self.env, id)
    }

    pub fn hoarder(&self) -> Address {
        self.env.register(Hoarder, ())
    }

    pub fn now(&self, timestamp: u64) {
        use soroban_sdk::testutils::Ledger;
        self.env.ledger().set_timestamp(timestamp);
    }

    pub fn advance_ledgers(&self, count: u32) {
        use soroban_sdk::testutils::Ledger;
        self.env.ledger().with_mut(|li| li.sequence_number += count);
    }

    pub fn is_home(&self) -> bool {
        self.custody.custodian(&self.managed) == self.program.expected_custodian()
    }
}

pub fn register(env: &Env) -> (PluginAccountClient<'static>, CustodyLedgerClient<'static>) {
    let program_id = env.register(PluginAccount, ());
    let custody_id = env.register(CustodyLedger, ());
    (
        PluginAccountClient::new(env, &program_id),
        CustodyLedgerClient::new(env, &custody_id),
    )
}

pub fn rekey_op(sender: &Address, target: &Address) -> GroupOp {
    GroupOp {
        sender: sender.clone(),
        action: OpAction::Rekey(target.clone()),
    }
}
