#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

mod storage;

#[cfg(test)]
mod testutils;

use custody_lib::{
    admin,
    audit::{self, AuditLog, AuditLogQueryResult, OperationType},
    custody::CustodyClient,
    group::{self, Restoration},
    plugin::PluginClient,
    ttl, validation, AccountSettings, CallerScope, ContractError, Custodian, GrantKey, GroupOp,
    FACTORY_GRANT_NO_EXPIRY,
};
use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, Symbol, Vec};

#[contract]
pub struct PluginAccount;

#[contractimpl]
impl PluginAccount {
    /// Set up the admin and the managed account (one-time setup)
    ///
    /// With no `managed_account` this contract's own address is managed.
    pub fn create_managed_account(
        env: Env,
        admin: Address,
        managed_account: Option<Address>,
        custody_ledger: Address,
        factory_grant_lifetime: Option<u64>,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        if admin::has_admin(&env) {
            return Err(ContractError::AlreadyInitialized);
        }

        let managed = managed_account.unwrap_or_else(|| env.current_contract_address());
        if admin == managed {
            return Err(ContractError::InvalidAdmin);
        }

        admin.require_auth();

        admin::set_admin(&env, &admin);
        storage::set_managed_account(&env, &managed);
        storage::set_custody_ledger(&env, &custody_ledger);
        storage::set_settings(
            &env,
            &AccountSettings {
                factory_grant_lifetime,
            },
        );

        env.events().publish(
            (Symbol::new(&env, "account_created"),),
            (admin.clone(), managed.clone()),
        );
        audit::create_audit_log(&env, &admin, OperationType::AccountCreated, Some(managed));
        Ok(())
    }

    /* ---------------- ADMIN GOVERNANCE ---------------- */

    pub fn change_admin(env: Env, caller: Address, new_admin: Address) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        let managed = storage::get_managed_account(&env)?;
        admin::transfer_admin(&env, &caller, &new_admin, &managed)?;

        env.events().publish(
            (Symbol::new(&env, "admin_changed"),),
            (caller.clone(), new_admin.clone()),
        );
        audit::create_audit_log(&env, &caller, OperationType::AdminChanged, Some(new_admin));
        Ok(())
    }

    /// Hand control of the managed account to `target`
    ///
    /// A flash rekey lends control for the span of `group`: `target` is
    /// invoked to run it and must rekey the account home before the call
    /// returns. Without `flash` control stays with `target` and `group` is
    /// ignored.
    pub fn direct_rekey(
        env: Env,
        caller: Address,
        target: Address,
        flash: bool,
        group: Vec<GroupOp>,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;
        let managed = storage::get_managed_account(&env)?;

        if flash {
            verify_group(&env, &group, &managed)?;
            lend_control(&env, &managed, &target, &group)?;
        } else {
            custody(&env)?.rekey(&managed, &target);
        }

        env.events().publish(
            (Symbol::new(&env, "direct_rekey"),),
            (target.clone(), flash),
        );
        audit::create_audit_log(&env, &caller, OperationType::DirectRekey, Some(target));
        Ok(())
    }

    /// Upsert a grant; re-adding overwrites the expiry
    pub fn add_grant(
        env: Env,
        caller: Address,
        delegate: Address,
        scope: CallerScope,
        expiry: u64,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;

        let key = GrantKey {
            delegate: delegate.clone(),
            scope: scope.clone(),
        };
        storage::set_grant(&env, &key, expiry);

        env.events().publish(
            (Symbol::new(&env, "grant_added"),),
            (delegate.clone(), scope, expiry),
        );
        audit::create_audit_log(&env, &caller, OperationType::GrantAdded, Some(delegate));
        Ok(())
    }

    /// Delete a grant. Removing a grant that does not exist succeeds.
    pub fn remove_grant(
        env: Env,
        caller: Address,
        delegate: Address,
        scope: CallerScope,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;

        let key = GrantKey {
            delegate: delegate.clone(),
            scope: scope.clone(),
        };
        storage::remove_grant(&env, &key);

        env.events().publish(
            (Symbol::new(&env, "grant_removed"),),
            (delegate.clone(), scope),
        );
        audit::create_audit_log(&env, &caller, OperationType::GrantRemoved, Some(delegate));
        Ok(())
    }

    /// Create an alias and its grant together. Names are never overwritten.
    pub fn add_named_grant(
        env: Env,
        caller: Address,
        name: Bytes,
        delegate: Address,
        scope: CallerScope,
        expiry: u64,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;
        validation::validate_alias_name(&name)?;

        if storage::has_alias(&env, &name) {
            return Err(ContractError::AliasExists);
        }

        let key = GrantKey {
            delegate: delegate.clone(),
            scope,
        };
        storage::set_alias(&env, &name, &key);
        storage::set_grant(&env, &key, expiry);

        env.events().publish(
            (Symbol::new(&env, "named_grant_added"),),
            (name, delegate.clone(), expiry),
        );
        audit::create_audit_log(&env, &caller, OperationType::NamedGrantAdded, Some(delegate));
        Ok(())
    }

    /// Remove an alias and the grant it names
    pub fn remove_named_grant(env: Env, caller: Address, name: Bytes) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;

        let key = storage::get_alias(&env, &name).ok_or(ContractError::NotFound)?;
        storage::remove_alias(&env, &name);
        storage::remove_grant(&env, &key);

        env.events().publish(
            (Symbol::new(&env, "named_grant_removed"),),
            (name, key.delegate.clone()),
        );
        audit::create_audit_log(
            &env,
            &caller,
            OperationType::NamedGrantRemoved,
            Some(key.delegate),
        );
        Ok(())
    }

    pub fn add_factory(env: Env, caller: Address, factory: Address) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;
        storage::set_factory(&env, &factory);

        env.events()
            .publish((Symbol::new(&env, "factory_added"),), factory.clone());
        audit::create_audit_log(&env, &caller, OperationType::FactoryAdded, Some(factory));
        Ok(())
    }

    pub fn remove_factory(env: Env, caller: Address, factory: Address) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        admin::require_admin(&env, &caller)?;
        storage::remove_factory(&env, &factory);

        env.events()
            .publish((Symbol::new(&env, "factory_removed"),), factory.clone());
        audit::create_audit_log(&env, &caller, OperationType::FactoryRemoved, Some(factory));
        Ok(())
    }

    /* ---------------- DELEGATION ---------------- */

    /// Hand control of the managed account to `delegate` while it runs
    /// `group`; the delegate must give control back before the call returns
    pub fn delegate_control(
        env: Env,
        caller: Address,
        delegate: Address,
        group: Vec<GroupOp>,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        caller.require_auth();
        delegate_to(&env, &caller, &delegate, &group)
    }

    /// Like `delegate_control`, with the delegate looked up by alias.
    ///
    /// The grant check runs against the current caller, not the scope stored
    /// with the alias.
    pub fn delegate_control_by_name(
        env: Env,
        caller: Address,
        name: Bytes,
        group: Vec<GroupOp>,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        caller.require_auth();

        let key = storage::get_alias(&env, &name).ok_or(ContractError::NotFound)?;
        delegate_to(&env, &caller, &key.delegate, &group)
    }

    /// Register a plugin deployed by a known factory as a standing global delegate
    pub fn add_factory_grant(
        env: Env,
        caller: Address,
        factory: Address,
        delegate: Address,
        salt: BytesN<32>,
    ) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        caller.require_auth();

        if caller != factory
            || !storage::is_factory(&env, &factory)
            || Self::factory_origin(env.clone(), factory.clone(), salt) != delegate
        {
            return Err(ContractError::NotAuthorized);
        }

        let expiry = match storage::get_settings(&env).factory_grant_lifetime {
            Some(lifetime) => env.ledger().timestamp().saturating_add(lifetime),
            None => FACTORY_GRANT_NO_EXPIRY,
        };
        storage::set_grant(&env, &GrantKey::global(&delegate), expiry);

        env.events().publish(
            (Symbol::new(&env, "factory_grant_added"),),
            (factory.clone(), delegate.clone(), expiry),
        );
        audit::create_audit_log(&env, &factory, OperationType::FactoryGrantAdded, Some(delegate));
        Ok(())
    }

    /* ---------------- INVARIANT ---------------- */

    /// Assert the managed account is back under this contract's control
    pub fn verify_control_state(env: Env) -> Result<(), ContractError> {
        ttl::bump_instance(&env);
        let managed = storage::get_managed_account(&env)?;
        ensure_control_home(&env, &managed)
    }

    /* ---------------- VIEWS ---------------- */

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        ttl::bump_instance(&env);
        admin::get_admin(&env)
    }

    pub fn managed_account(env: Env) -> Result<Address, ContractError> {
        ttl::bump_instance(&env);
        storage::get_managed_account(&env)
    }

    pub fn expected_custodian(env: Env) -> Result<Custodian, ContractError> {
        ttl::bump_instance(&env);
        let managed = storage::get_managed_account(&env)?;
        Ok(group::expected_custodian(
            &managed,
            &env.current_contract_address(),
        ))
    }

    pub fn get_grant(env: Env, delegate: Address, scope: CallerScope) -> Option<u64> {
        ttl::bump_instance(&env);
        storage::get_grant(&env, &GrantKey { delegate, scope })
    }

    pub fn resolve_alias(env: Env, name: Bytes) -> Option<GrantKey> {
        ttl::bump_instance(&env);
        storage::get_alias(&env, &name)
    }

    pub fn is_factory(env: Env, factory: Address) -> bool {
        ttl::bump_instance(&env);
        storage::is_factory(&env, &factory)
    }

    /// Whether `caller` could delegate to `delegate` right now
    pub fn can_delegate(env: Env, caller: Address, delegate: Address) -> bool {
        ttl::bump_instance(&env);
        is_authorized(&env, &caller, &delegate)
    }

    /// Address a factory deploys a plugin to for `salt`
    pub fn factory_origin(env: Env, factory: Address, salt: BytesN<32>) -> Address {
        ttl::bump_instance(&env);
        env.deployer().with_address(factory, salt).deployed_address()
    }

    pub fn audit_log(env: Env, log_id: u64) -> Option<AuditLog> {
        ttl::bump_instance(&env);
        audit::get_audit_log(&env, log_id)
    }

    pub fn audit_log_count(env: Env) -> u64 {
        ttl::bump_instance(&env);
        audit::get_log_id_counter(&env)
    }

    pub fn query_audit_logs(
        env: Env,
        start_id: u64,
        end_id: u64,
        max_results: u32,
    ) -> AuditLogQueryResult {
        ttl::bump_instance(&env);
        audit::query_audit_logs(&env, start_id, end_id, max_results)
    }
}

fn custody(env: &Env) -> Result<CustodyClient<'_>, ContractError> {
    let ledger = storage::get_custody_ledger(env)?;
    Ok(CustodyClient::new(env, &ledger))
}

/// Global grants are checked first; a scoped grant only applies to its caller
fn is_authorized(env: &Env, caller: &Address, delegate: &Address) -> bool {
    storage::is_grant_valid(env, &GrantKey::global(delegate))
        || storage::is_grant_valid(env, &GrantKey::scoped(delegate, caller))
}

fn verify_group(
    env: &Env,
    group: &Vec<GroupOp>,
    managed: &Address,
) -> Result<Restoration, ContractError> {
    group::verify_group_restores_control(group, managed, &env.current_contract_address())
}

/// Rekeys `managed` to `holder`, lets it run `group`, then requires the
/// account to be home again. An error rolls the whole call back.
fn lend_control(
    env: &Env,
    managed: &Address,
    holder: &Address,
    group: &Vec<GroupOp>,
) -> Result<(), ContractError> {
    custody(env)?.rekey(managed, holder);
    PluginClient::new(env, holder).execute(managed, group);
    ensure_control_home(env, managed)
}

fn ensure_control_home(env: &Env, managed: &Address) -> Result<(), ContractError> {
    let actual = custody(env)?.custodian(managed);
    if actual != group::expected_custodian(managed, &env.current_contract_address()) {
        return Err(ContractError::InvariantViolation);
    }
    Ok(())
}

fn delegate_to(
    env: &Env,
    caller: &Address,
    delegate: &Address,
    group: &Vec<GroupOp>,
) -> Result<(), ContractError> {
    if !is_authorized(env, caller, delegate) {
        return Err(ContractError::NotAuthorized);
    }

    let managed = storage::get_managed_account(env)?;
    verify_group(env, group, &managed)?;
    lend_control(env, &managed, delegate, group)?;

    env.events().publish(
        (Symbol::new(env, "control_delegated"),),
        (delegate.clone(), caller.clone()),
    );
    audit::create_audit_log(env, caller, OperationType::ControlDelegated, Some(delegate.clone()));
    Ok(())
}
