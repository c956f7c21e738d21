//! In-memory accrual state machine.
//!
//! Contract entry points load [`GlobalState`] and the caller's [`Account`],
//! run one of the transitions below, move assets, and only then persist.
//! Every transition works on copies and commits them on success, so an `Err`
//! leaves both records exactly as they were.
//!
//! Synchronization itself never fails. An interval whose emission cannot be
//! represented in the accumulator stays undistributed in custody, and an
//! accrual beyond `i128` saturates, so a staker can always withdraw.

use soroban_sdk::{contracttype, Address};

use crate::{rewards, ContractError};

// ── Configuration ───────────────────────────────────────────────────────────

/// Which timestamp the claim cooldown is measured from.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CooldownAnchor {
    /// The account's most recent `stake`.
    LastStake,
    /// The account's first ever `stake`.
    FirstStake,
    /// The account's last successful claim, or its first stake before that.
    LastClaim,
}

/// Emission and cooldown parameters, fixed at construction.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardSchedule {
    /// Reward units emitted per second across all stakers.
    pub reward_rate: i128,
    /// Seconds that must pass after the anchor before a claim.
    pub lock_duration: u64,
    pub cooldown_anchor: CooldownAnchor,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    pub stake_asset: Address,
    pub reward_asset: Address,
    pub schedule: RewardSchedule,
}

// ── State ───────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalState {
    /// Sum of every account's `staked`.
    pub total_staked: i128,
    /// Cumulative reward per staked unit, scaled by `rewards::PRECISION`.
    pub reward_per_unit_stored: i128,
    /// Scaled emission not yet folded into the accumulator.
    pub reward_remainder: i128,
    pub last_update_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Account {
    pub staked: i128,
    /// `reward_per_unit_stored` as of this account's last sync.
    pub reward_per_unit_paid: i128,
    /// Accrued and not yet claimed.
    pub pending_reward: i128,
    pub last_stake_time: u64,
    pub first_stake_time: u64,
    pub last_claim_time: Option<u64>,
}

impl Account {
    /// A fresh record for an address staking for the first time at `now`.
    pub fn open(now: u64) -> Self {
        Account {
            staked: 0,
            reward_per_unit_paid: 0,
            pending_reward: 0,
            last_stake_time: now,
            first_stake_time: now,
            last_claim_time: None,
        }
    }

    /// Fold everything earned since the last snapshot into `pending_reward`
    /// and move the snapshot to `current_rpu`. Returns the newly accrued
    /// amount.
    pub fn settle(&mut self, current_rpu: i128) -> i128 {
        let earned = rewards::accrued(self.staked, current_rpu, self.reward_per_unit_paid)
            .unwrap_or(i128::MAX);
        self.pending_reward = self.pending_reward.saturating_add(earned);
        self.reward_per_unit_paid = current_rpu;
        earned
    }

    pub fn cooldown_start(&self, anchor: CooldownAnchor) -> u64 {
        match anchor {
            CooldownAnchor::LastStake => self.last_stake_time,
            CooldownAnchor::FirstStake => self.first_stake_time,
            CooldownAnchor::LastClaim => self.last_claim_time.unwrap_or(self.first_stake_time),
        }
    }

    /// First timestamp at which a claim is accepted.
    pub fn cooldown_ends_at(&self, schedule: &RewardSchedule) -> u64 {
        self.cooldown_start(schedule.cooldown_anchor)
            .saturating_add(schedule.lock_duration)
    }
}

impl GlobalState {
    pub fn new(now: u64) -> Self {
        GlobalState {
            total_staked: 0,
            reward_per_unit_stored: 0,
            reward_remainder: 0,
            last_update_time: now,
        }
    }

    /// Bring the accumulator up to `now` under the current `total_staked`.
    ///
    /// Returns `false` when the interval's emission was left undistributed
    /// because the accumulator could not hold it.
    pub fn sync(&mut self, schedule: &RewardSchedule, now: u64) -> bool {
        let elapsed = now.saturating_sub(self.last_update_time);
        let step = rewards::compute_reward_per_unit(
            self.reward_per_unit_stored,
            self.reward_remainder,
            schedule.reward_rate,
            elapsed,
            self.total_staked,
        );
        self.last_update_time = self.last_update_time.max(now);

        match step {
            Some(step) => {
                self.reward_per_unit_stored = step.reward_per_unit;
                self.reward_remainder = step.remainder;
                true
            }
            None => false,
        }
    }

    /// Sync the accumulator, then settle `account` against it. Returns the
    /// amount newly credited to the account.
    pub fn sync_account(
        &mut self,
        schedule: &RewardSchedule,
        account: &mut Account,
        now: u64,
    ) -> i128 {
        self.sync(schedule, now);
        account.settle(self.reward_per_unit_stored)
    }

    /// Credit `amount` of stake to `account`.
    pub fn stake(
        &mut self,
        schedule: &RewardSchedule,
        account: &mut Account,
        amount: i128,
        now: u64,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut global = self.clone();
        let mut next = account.clone();

        // Accrue under the pre-deposit total before the stake changes.
        global.sync_account(schedule, &mut next, now);

        next.staked = next
            .staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        global.total_staked = global
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        next.last_stake_time = now;

        *self = global;
        *account = next;
        Ok(())
    }

    /// Debit `amount` of stake from `account`. The cooldown anchor and the
    /// pending reward are left as synchronized.
    pub fn unstake(
        &mut self,
        schedule: &RewardSchedule,
        account: &mut Account,
        amount: i128,
        now: u64,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if amount > account.staked {
            return Err(ContractError::InsufficientStake);
        }

        let mut global = self.clone();
        let mut next = account.clone();

        global.sync_account(schedule, &mut next, now);

        next.staked -= amount;
        global.total_staked -= amount;

        *self = global;
        *account = next;
        Ok(())
    }

    /// Sync `account` and take its whole pending reward. Returns the amount
    /// to pay out, which may be zero.
    pub fn claim(
        &mut self,
        schedule: &RewardSchedule,
        account: &mut Account,
        now: u64,
    ) -> Result<i128, ContractError> {
        if now < account.cooldown_ends_at(schedule) {
            return Err(ContractError::TooEarly);
        }

        let mut global = self.clone();
        let mut next = account.clone();

        global.sync_account(schedule, &mut next, now);

        let amount = next.pending_reward;
        next.pending_reward = 0;
        next.last_claim_time = Some(now);

        *self = global;
        *account = next;
        Ok(amount)
    }
}
