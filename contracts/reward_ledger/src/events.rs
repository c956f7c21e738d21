use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::ledger::CooldownAnchor;

// ── Payloads ──────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub stake_asset: Address,
    pub reward_asset: Address,
    pub reward_rate: i128,
    pub lock_duration: u64,
    pub cooldown_anchor: CooldownAnchor,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub staked: i128,
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnstakedEvent {
    pub staker: Address,
    pub amount: i128,
    pub staked: i128,
    pub total_staked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub staker: Address,
    pub amount: i128,
}

/// Emitted by `recalc_reward`; `accrued` is the amount folded in by this sync.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardRecalculatedEvent {
    pub staker: Address,
    pub accrued: i128,
    pub pending_reward: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsFundedEvent {
    pub funder: Address,
    pub amount: i128,
}

// ── Publishers ────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, event: InitializedEvent) {
    env.events().publish((symbol_short!("INIT"),), event);
}

pub fn publish_staked(
    env: &Env,
    staker: Address,
    amount: i128,
    staked: i128,
    total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("STAKED"), staker.clone()),
        StakedEvent {
            staker,
            amount,
            staked,
            total_staked,
        },
    );
}

pub fn publish_unstaked(
    env: &Env,
    staker: Address,
    amount: i128,
    staked: i128,
    total_staked: i128,
) {
    env.events().publish(
        (symbol_short!("UNSTAKED"), staker.clone()),
        UnstakedEvent {
            staker,
            amount,
            staked,
            total_staked,
        },
    );
}

pub fn publish_reward_claimed(env: &Env, staker: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), staker.clone()),
        RewardClaimedEvent { staker, amount },
    );
}

pub fn publish_reward_recalculated(
    env: &Env,
    staker: Address,
    accrued: i128,
    pending_reward: i128,
) {
    env.events().publish(
        (symbol_short!("RECALC"), staker.clone()),
        RewardRecalculatedEvent {
            staker,
            accrued,
            pending_reward,
        },
    );
}

pub fn publish_rewards_funded(env: &Env, funder: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("FUNDED"), funder.clone()),
        RewardsFundedEvent { funder, amount },
    );
}
