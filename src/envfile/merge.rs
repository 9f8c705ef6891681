//! Combine persisted state with newly supplied variables

use super::record::{EnvMap, Record};

/// Merge `incoming` into `existing`. Incoming values win on key collision;
/// keys only present in `existing` keep their value.
pub fn merge(existing: Record, incoming: &EnvMap) -> Record {
    let mut env = existing.env;
    for (key, value) in incoming {
        env.insert(key.clone(), value.clone());
    }
    Record::new(env)
}
