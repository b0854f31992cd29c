use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    /// Caller is not the admin.
    Unauthorized = 3,
    /// Admin and managed account would be the same identity.
    InvalidAdmin = 4,
    /// No valid grant, or the factory checks failed.
    NotAuthorized = 5,
    AliasExists = 6,
    NotFound = 7,
    /// The group cannot close with control back at the owning program.
    InvariantViolation = 8,
    InvalidGroup = 9,
    InvalidAlias = 10,
}
