use custody_lib::{ttl, AccountSettings, ContractError, GrantKey};
use soroban_sdk::{contracttype, Address, Bytes, Env, TryFromVal, Val};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Address whose control this contract governs
    ManagedAccount,
    /// Custody ledger holding the managed account's control record
    CustodyLedger,
    Settings,
    /// Grant expiry by (delegate, caller scope)
    Grant(GrantKey),
    /// Named grant, resolving to a grant key
    Alias(Bytes),
    /// Factory allowed to register the plugins it deploys
    Factory(Address),
}

/* ---------------- ACCOUNT ---------------- */

pub fn set_managed_account(env: &Env, account: &Address) {
    env.storage().instance().set(&DataKey::ManagedAccount, account);
}

pub fn get_managed_account(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::ManagedAccount)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_custody_ledger(env: &Env, ledger: &Address) {
    env.storage().instance().set(&DataKey::CustodyLedger, ledger);
}

pub fn get_custody_ledger(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::CustodyLedger)
        .ok_or(ContractError::NotInitialized)
}

/* ---------------- CONFIGURATION ---------------- */

pub fn set_settings(env: &Env, settings: &AccountSettings) {
    env.storage().instance().set(&DataKey::Settings, settings);
}

pub fn get_settings(env: &Env) -> AccountSettings {
    env.storage()
        .instance()
        .get(&DataKey::Settings)
        .unwrap_or(AccountSettings {
            factory_grant_lifetime: None,
        })
}

/* ---------------- GRANTS ---------------- */

pub fn set_grant(env: &Env, key: &GrantKey, expiry: u64) {
    let key = DataKey::Grant(key.clone());
    env.storage().persistent().set(&key, &expiry);
    ttl::bump_record(env, &key);
}

pub fn get_grant(env: &Env, key: &GrantKey) -> Option<u64> {
    get_record(env, &DataKey::Grant(key.clone()))
}

pub fn remove_grant(env: &Env, key: &GrantKey) {
    env.storage()
        .persistent()
        .remove(&DataKey::Grant(key.clone()));
}

/// A grant is usable strictly before its expiry.
pub fn is_grant_valid(env: &Env, key: &GrantKey) -> bool {
    match get_grant(env, key) {
        Some(expiry) => expiry > env.ledger().timestamp(),
        None => false,
    }
}

/* ---------------- ALIASES ---------------- */

pub fn has_alias(env: &Env, name: &Bytes) -> bool {
    env.storage().persistent().has(&DataKey::Alias(name.clone()))
}

pub fn set_alias(env: &Env, name: &Bytes, grant: &GrantKey) {
    let key = DataKey::Alias(name.clone());
    env.storage().persistent().set(&key, grant);
    ttl::bump_record(env, &key);
}

pub fn get_alias(env: &Env, name: &Bytes) -> Option<GrantKey> {
    get_record(env, &DataKey::Alias(name.clone()))
}

pub fn remove_alias(env: &Env, name: &Bytes) {
    env.storage()
        .persistent()
        .remove(&DataKey::Alias(name.clone()));
}

/* ---------------- FACTORIES ---------------- */

pub fn set_factory(env: &Env, factory: &Address) {
    let key = DataKey::Factory(factory.clone());
    env.storage().persistent().set(&key, &true);
    ttl::bump_record(env, &key);
}

pub fn is_factory(env: &Env, factory: &Address) -> bool {
    get_record::<bool>(env, &DataKey::Factory(factory.clone())).unwrap_or(false)
}

pub fn remove_factory(env: &Env, factory: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Factory(factory.clone()));
}

/// Reads a persistent record, keeping it live when present
fn get_record<V>(env: &Env, key: &DataKey) -> Option<V>
where
    V: TryFromVal<Env, Val>,
{
    let value = env.storage().persistent().get(key);
    if value.is_some() {
        ttl::bump_record(env, key);
    }
    value
}
