#![no_std]
pub mod admin;
pub mod audit;
pub mod custody;
pub mod errors;
pub mod group;
pub mod plugin;
pub mod storage_keys;
pub mod ttl;
pub mod types;
pub mod validation;


pub use errors::ContractError;
pub use storage_keys::*;
pub use types::*;

// Config
pub const ADMIN_KEY: &str = "admin";

// Group plan limits (one atomic group never exceeds 16 operations)
pub const MAX_GROUP_SIZE: u32 = 16;

// Alias names are opaque bytes, bounded to keep storage keys small
pub const MAX_ALIAS_LENGTH: u32 = 64;

// Factory-issued grants without a configured lifetime never expire
pub const FACTORY_GRANT_NO_EXPIRY: u64 = u64::MAX;

// Audit log paging
pub const DEFAULT_AUDIT_QUERY_LIMIT: u32 = 100;
pub const MAX_AUDIT_QUERY_LIMIT: u32 = 500;

// Storage TTLs, in ledgers
pub const INSTANCE_TTL_THRESHOLD: u32 = 518_400; // ~30 days
pub const INSTANCE_TTL_EXTEND: u32 = 1_036_800; // ~60 days
pub const RECORD_TTL_THRESHOLD: u32 = 518_400;
pub const RECORD_TTL_EXTEND: u32 = 1_036_800;
