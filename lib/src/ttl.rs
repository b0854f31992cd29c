use soroban_sdk::{Env, IntoVal, Val};

use crate::{INSTANCE_TTL_EXTEND, INSTANCE_TTL_THRESHOLD, RECORD_TTL_EXTEND, RECORD_TTL_THRESHOLD};

/// Keeps the running contract's instance and code live
pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

/// Extends a persistent record. `key` must exist.
pub fn bump_record<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, RECORD_TTL_THRESHOLD, RECORD_TTL_EXTEND);
}
