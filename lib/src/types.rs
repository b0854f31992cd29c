use soroban_sdk::{contracttype, Address, Symbol};

/// Who may exercise a grant
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum CallerScope {
    /// Wildcard: any caller
    Any,
    Caller(Address),
}

/// Key of a grant record; the stored value is the expiry timestamp
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct GrantKey {
    pub delegate: Address,
    pub scope: CallerScope,
}

impl GrantKey {
    pub fn global(delegate: &Address) -> Self {
        GrantKey {
            delegate: delegate.clone(),
            scope: CallerScope::Any,
        }
    }

    pub fn scoped(delegate: &Address, caller: &Address) -> Self {
        GrantKey {
            delegate: delegate.clone(),
            scope: CallerScope::Caller(caller.clone()),
        }
    }
}

/// Control-holder of an account's custody record
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum Custodian {
    /// The account controls itself (the null custodian)
    SelfControlled,
    Controller(Address),
}

impl Custodian {
    /// Custodian recorded when `account` is rekeyed to `target`.
    ///
    /// Rekeying an account to itself clears the controller.
    pub fn for_target(account: &Address, target: &Address) -> Self {
        if account == target {
            Custodian::SelfControlled
        } else {
            Custodian::Controller(target.clone())
        }
    }

    /// Address whose authorization currently moves `account`.
    pub fn effective(&self, account: &Address) -> Address {
        match self {
            Custodian::SelfControlled => account.clone(),
            Custodian::Controller(controller) => controller.clone(),
        }
    }
}

/// Methods of the owning program that a group plan can name
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum Method {
    VerifyControlState,
    Other(Symbol),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct ProgramCall {
    pub program: Address,
    pub method: Method,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub enum OpAction {
    /// Plain operation towards a recipient; custody is untouched
    Transfer(Address),
    /// Hands control of the sender's custody record to the target
    Rekey(Address),
    Call(ProgramCall),
}

/// One operation of an atomic group plan
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct GroupOp {
    pub sender: Address,
    pub action: OpAction,
}

/// Settings fixed when the managed account is created
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct AccountSettings {
    /// Lifetime in seconds of factory-issued grants; `None` never expires
    pub factory_grant_lifetime: Option<u64>,
}
