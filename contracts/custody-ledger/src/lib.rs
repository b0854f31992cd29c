#![no_std]


use custody_lib::{custody::CustodyInterface, ttl, Custodian};
use soroban_sdk::{contract, contractimpl, contracttype, Address, Env, Symbol};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Custodian of an account; absent means self-controlled
    Custodian(Address),
}

#[contract]
pub struct CustodyLedger;

#[contractimpl]
impl CustodyInterface for CustodyLedger {
    fn custodian(env: Env, account: Address) -> Custodian {
        ttl::bump_instance(&env);

        let key = DataKey::Custodian(account);
        match env.storage().persistent().get(&key) {
            Some(custodian) => {
                ttl::bump_record(&env, &key);
                custodian
            }
            None => Custodian::SelfControlled,
        }
    }

    fn rekey(env: Env, account: Address, target: Address) {
        let current = Self::custodian(env.clone(), account.clone());
        current.effective(&account).require_auth();

        let key = DataKey::Custodian(account.clone());
        let next = Custodian::for_target(&account, &target);
        match &next {
            Custodian::SelfControlled => env.storage().persistent().remove(&key),
            Custodian::Controller(_) => {
                env.storage().persistent().set(&key, &next);
                ttl::bump_record(&env, &key);
            }
        }

        env.events()
            .publish((Symbol::new(&env, "rekeyed"),), (account, target));
    }
}

#[contractimpl]
impl CustodyLedger {
    /// Address whose authorization currently moves `account`
    pub fn controller(env: Env, account: Address) -> Address {
        Self::custodian(env, account.clone()).effective(&account)
    }
}
