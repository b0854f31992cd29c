/// Audit trail for governance and delegation actions
///
/// Entries are append-only, numbered from 1, and live in persistent storage
/// next to the grant records they describe. A rejected group rolls its
/// entries back together with everything else.
use soroban_sdk::{contracttype, Address, Env, Symbol, Vec};

use crate::{
    ttl, AUDIT_LOG_COUNTER_KEY, AUDIT_LOG_ENTRY_KEY, DEFAULT_AUDIT_QUERY_LIMIT,
    MAX_AUDIT_QUERY_LIMIT,
};

// ============================================================================
// AUDIT LOG TYPES
// ============================================================================

#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum OperationType {
    // Admin operations
    AccountCreated = 1,
    AdminChanged = 2,
    DirectRekey = 3,

    // Grant store
    GrantAdded = 10,
    GrantRemoved = 11,
    NamedGrantAdded = 12,
    NamedGrantRemoved = 13,

    // Factories
    FactoryAdded = 20,
    FactoryRemoved = 21,
    FactoryGrantAdded = 22,

    // Delegation
    ControlDelegated = 30,
}

#[contracttype]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditLog {
    pub id: u64,
    /// Ledger timestamp at time of operation
    pub timestamp: u64,
    /// Address that triggered the operation
    pub operator: Address,
    pub operation_type: OperationType,
    /// Delegate, factory or identity the operation was about
    pub subject: Option<Address>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct AuditLogQueryResult {
    pub logs: Vec<AuditLog>,
    pub total_count: u64,
    pub start_id: u64,
    pub end_id: u64,
    pub has_more: bool,
}

// ============================================================================
// AUDIT LOG STORAGE FUNCTIONS
// ============================================================================

pub fn get_log_id_counter(env: &Env) -> u64 {
    let key = Symbol::new(env, AUDIT_LOG_COUNTER_KEY);
    env.storage().persistent().get::<_, u64>(&key).unwrap_or(0)
}

fn increment_log_id_counter(env: &Env) -> u64 {
    let key = Symbol::new(env, AUDIT_LOG_COUNTER_KEY);
    let next = get_log_id_counter(env).saturating_add(1);
    env.storage().persistent().set(&key, &next);
    ttl::bump_record(env, &key);
    next
}

fn store_audit_log(env: &Env, log: &AuditLog) {
    let key = (Symbol::new(env, AUDIT_LOG_ENTRY_KEY), log.id);
    env.storage().persistent().set(&key, log);
    ttl::bump_record(env, &key);
}

pub fn get_audit_log(env: &Env, log_id: u64) -> Option<AuditLog> {
    let key = (Symbol::new(env, AUDIT_LOG_ENTRY_KEY), log_id);
    let log = env.storage().persistent().get(&key);
    if log.is_some() {
        ttl::bump_record(env, &key);
    }
    log
}

// ============================================================================
// AUDIT LOG CREATION
// ============================================================================

/// Append an entry and return its id
pub fn create_audit_log(
    env: &Env,
    operator: &Address,
    operation_type: OperationType,
    subject: Option<Address>,
) -> u64 {
    let log = AuditLog {
        id: increment_log_id_counter(env),
        timestamp: env.ledger().timestamp(),
        operator: operator.clone(),
        operation_type,
        subject,
    };

    store_audit_log(env, &log);
    log.id
}

// ============================================================================
// AUDIT LOG QUERYING
// ============================================================================

/// Query audit logs with pagination
///
/// Returns logs inclusive of start_id and end_id. A start of 0 means the first
/// entry, an end past the last entry is clamped, and `max_results` of 0 uses
/// the default page size.
pub fn query_audit_logs(
    env: &Env,
    start_id: u64,
    end_id: u64,
    max_results: u32,
) -> AuditLogQueryResult {
    let total_count = get_log_id_counter(env);

    let actual_start = if start_id == 0 { 1 } else { start_id };
    let actual_end = end_id.min(total_count);
    let limit = match max_results {
        0 => DEFAULT_AUDIT_QUERY_LIMIT,
        n => n.min(MAX_AUDIT_QUERY_LIMIT),
    };

    let mut logs: Vec<AuditLog> = Vec::new(env);

    if actual_start > actual_end {
        return AuditLogQueryResult {
            logs,
            total_count,
            start_id: actual_start,
            end_id: actual_end,
            has_more: false,
        };
    }

    let mut count = 0u32;
    let mut current_id = actual_start;

    while current_id <= actual_end && count < limit {
        if let Some(log) = get_audit_log(env, current_id) {
            logs.push_back(log);
            count += 1;
        }
        current_id += 1;
    }

    // Stopped on the limit rather than the end of the range
    let has_more = count == limit && current_id <= actual_end;

    AuditLogQueryResult {
        logs,
        total_count,
        start_id: actual_start,
        end_id: if has_more { current_id - 1 } else { actual_end },
        has_more,
    }
}
