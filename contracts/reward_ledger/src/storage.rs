use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::ledger::{Account, GlobalState, LedgerConfig};

// ── Storage key constants ───────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const GLOBAL: Symbol = symbol_short!("GLOBAL");

// Per-account persistent storage uses tuple keys: (prefix, staker_address)
const ACCOUNT: Symbol = symbol_short!("ACCOUNT");

const INSTANCE_TTL_THRESHOLD: u32 = 518_400; // ~30 days
const INSTANCE_TTL_EXTEND_TO: u32 = 3_110_400; // ~180 days
const ACCOUNT_TTL_THRESHOLD: u32 = 518_400;
const ACCOUNT_TTL_EXTEND_TO: u32 = 3_110_400;

fn account_key(staker: &Address) -> (Symbol, Address) {
    (ACCOUNT, staker.clone())
}

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
}

// ── Instance storage ────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn get_config(env: &Env) -> Option<LedgerConfig> {
    env.storage().instance().get(&CONFIG)
}

pub fn set_config(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&CONFIG, config);
    extend_instance_ttl(env);
}

pub fn get_global(env: &Env) -> Option<GlobalState> {
    env.storage().instance().get(&GLOBAL)
}

pub fn set_global(env: &Env, global: &GlobalState) {
    env.storage().instance().set(&GLOBAL, global);
    extend_instance_ttl(env);
}

// ── Persistent storage ──────────────────────────────────────────────────────

/// Retrieve a staker's record, `None` if the address never staked.
pub fn get_account(env: &Env, staker: &Address) -> Option<Account> {
    env.storage().persistent().get(&account_key(staker))
}

/// Persist a staker's record and keep it alive.
pub fn set_account(env: &Env, staker: &Address, account: &Account) {
    let key = account_key(staker);
    env.storage().persistent().set(&key, account);
    env.storage()
        .persistent()
        .extend_ttl(&key, ACCOUNT_TTL_THRESHOLD, ACCOUNT_TTL_EXTEND_TO);
}
