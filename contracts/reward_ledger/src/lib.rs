#![no_std]

pub mod events;
pub mod ledger;
pub mod rewards;
mod storage;

use ledger::{Account, CooldownAnchor, GlobalState, LedgerConfig, RewardSchedule};
use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidAmount = 3,
    InsufficientStake = 4,
    TooEarly = 5,
    AssetTransferFailed = 6,
    InvalidConfig = 7,
    ArithmeticOverflow = 8,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Snapshot of a staker's position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub staked: i128,
    /// As of the last sync; see `recalc_reward`.
    pub pending_reward: i128,
    /// First timestamp at which `get_reward` is accepted.
    pub cooldown_ends_at: u64,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardLedgerContract;

#[contractimpl]
impl RewardLedgerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `stake_asset`     – token address users stake.
    /// * `reward_asset`    – token address distributed as rewards.
    /// * `reward_rate`     – reward units emitted **per second** across all stakers.
    /// * `lock_duration`   – seconds a claim must wait after the cooldown anchor.
    /// * `cooldown_anchor` – which account timestamp the cooldown counts from.
    pub fn initialize(
        env: Env,
        stake_asset: Address,
        reward_asset: Address,
        reward_rate: i128,
        lock_duration: u64,
        cooldown_anchor: CooldownAnchor,
    ) -> Result<(), ContractError> {
        Self::require_uninitialized(&env)?;
        Self::configure(
            &env,
            stake_asset,
            reward_asset,
            RewardSchedule {
                reward_rate,
                lock_duration,
                cooldown_anchor,
            },
        )
    }

    /// Bootstrap the ledger with a rate derived from a reward pool spread
    /// over `distribution_horizon` seconds (`reward_pool / horizon`, floored).
    pub fn initialize_with_pool(
        env: Env,
        stake_asset: Address,
        reward_asset: Address,
        reward_pool: i128,
        distribution_horizon: u64,
        lock_duration: u64,
        cooldown_anchor: CooldownAnchor,
    ) -> Result<(), ContractError> {
        Self::require_uninitialized(&env)?;
        let reward_rate = rewards::rate_for_pool(reward_pool, distribution_horizon)
            .ok_or(ContractError::InvalidConfig)?;
        Self::configure(
            &env,
            stake_asset,
            reward_asset,
            RewardSchedule {
                reward_rate,
                lock_duration,
                cooldown_anchor,
            },
        )
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake units.
    ///
    /// The staker must have approved the ledger for at least `amount` on the
    /// stake asset. The accumulator is flushed under the pre-deposit total so
    /// the new units earn nothing retroactively.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut global = Self::load_global(&env)?;
        let mut account =
            storage::get_account(&env, &staker).unwrap_or_else(|| Account::open(now));

        if let Err(err) = global.stake(&config.schedule, &mut account, amount, now) {
            log!(&env, "stake rejected", staker, amount, err as u32);
            return Err(err);
        }

        Self::collect(&env, &config.stake_asset, &staker, amount)?;

        storage::set_global(&env, &global);
        storage::set_account(&env, &staker, &account);

        events::publish_staked(&env, staker, amount, account.staked, global.total_staked);

        Ok(())
    }

    /// Withdraw `amount` stake units back to the staker.
    ///
    /// Pending reward and the cooldown anchor are kept as synchronized. Only
    /// validation and the asset transfer can reject a withdrawal.
    pub fn unstake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut global = Self::load_global(&env)?;
        let mut account = storage::get_account(&env, &staker).unwrap_or_default();

        if let Err(err) = global.unstake(&config.schedule, &mut account, amount, now) {
            log!(&env, "unstake rejected", staker, amount, err as u32);
            return Err(err);
        }

        Self::pay(&env, &config.stake_asset, &staker, amount)?;

        storage::set_global(&env, &global);
        storage::set_account(&env, &staker, &account);

        events::publish_unstaked(&env, staker, amount, account.staked, global.total_staked);

        Ok(())
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim the staker's whole pending reward once the cooldown has passed.
    ///
    /// A zero claim succeeds without touching the reward asset. An address
    /// that never staked has nothing to claim and gets `0`.
    pub fn get_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        staker.require_auth();

        let mut account = match storage::get_account(&env, &staker) {
            Some(account) => account,
            None => return Ok(0),
        };

        let now = env.ledger().timestamp();
        let mut global = Self::load_global(&env)?;

        let amount = match global.claim(&config.schedule, &mut account, now) {
            Ok(amount) => amount,
            Err(err) => {
                log!(&env, "claim rejected", staker, now, err as u32);
                return Err(err);
            }
        };

        if amount > 0 {
            Self::pay(&env, &config.reward_asset, &staker, amount)?;
        }

        storage::set_global(&env, &global);
        storage::set_account(&env, &staker, &account);

        events::publish_reward_claimed(&env, staker, amount);

        Ok(amount)
    }

    /// Synchronize `staker` without claiming and return the refreshed pending
    /// reward. Open to any caller and not subject to the cooldown.
    pub fn recalc_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;

        let now = env.ledger().timestamp();
        let mut global = Self::load_global(&env)?;

        match storage::get_account(&env, &staker) {
            Some(mut account) => {
                let accrued = global.sync_account(&config.schedule, &mut account, now);

                storage::set_global(&env, &global);
                storage::set_account(&env, &staker, &account);

                let pending = account.pending_reward;
                events::publish_reward_recalculated(&env, staker, accrued, pending);

                Ok(pending)
            }
            None => {
                if !global.sync(&config.schedule, now) {
                    log!(&env, "emission left undistributed", now);
                }
                storage::set_global(&env, &global);
                Ok(0)
            }
        }
    }

    /// Move `amount` of the reward asset from `funder` into the ledger's
    /// custody.
    pub fn fund_rewards(env: Env, funder: Address, amount: i128) -> Result<(), ContractError> {
        let config = Self::load_config(&env)?;
        funder.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let ledger = env.current_contract_address();
        let reward_asset = token::Client::new(&env, &config.reward_asset);
        if !matches!(reward_asset.try_transfer(&funder, &ledger, &amount), Ok(Ok(()))) {
            log!(&env, "reward funding failed", funder, amount);
            return Err(ContractError::AssetTransferFailed);
        }

        events::publish_rewards_funded(&env, funder, amount);

        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the staker's current staked balance.
    pub fn get_staked(env: Env, staker: Address) -> i128 {
        storage::get_account(&env, &staker)
            .map(|account| account.staked)
            .unwrap_or(0)
    }

    /// Return the sum of all currently staked units.
    pub fn get_total_staked(env: Env) -> i128 {
        storage::get_global(&env)
            .map(|global| global.total_staked)
            .unwrap_or(0)
    }

    /// Return the pending reward as of the staker's last sync.
    ///
    /// Not a live value: call `recalc_reward` first to include time elapsed
    /// since then.
    pub fn get_pending_reward(env: Env, staker: Address) -> i128 {
        storage::get_account(&env, &staker)
            .map(|account| account.pending_reward)
            .unwrap_or(0)
    }

    pub fn get_account(env: Env, staker: Address) -> Option<Account> {
        storage::get_account(&env, &staker)
    }

    pub fn get_global(env: Env) -> Result<GlobalState, ContractError> {
        Self::load_global(&env)
    }

    pub fn get_config(env: Env) -> Result<LedgerConfig, ContractError> {
        Self::load_config(&env)
    }

    /// Return the combined position for a staker; all zero if it never staked.
    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let config = Self::load_config(&env)?;

        Ok(match storage::get_account(&env, &staker) {
            Some(account) => StakerInfo {
                staked: account.staked,
                pending_reward: account.pending_reward,
                cooldown_ends_at: account.cooldown_ends_at(&config.schedule),
            },
            None => StakerInfo {
                staked: 0,
                pending_reward: 0,
                cooldown_ends_at: 0,
            },
        })
    }

    /// Return the reward asset balance held in custody.
    pub fn get_reward_balance(env: Env) -> Result<i128, ContractError> {
        let config = Self::load_config(&env)?;
        let reward_asset = token::Client::new(&env, &config.reward_asset);
        Ok(reward_asset.balance(&env.current_contract_address()))
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    /// Contract version.
    pub fn version() -> u32 {
        1
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_uninitialized(env: &Env) -> Result<(), ContractError> {
        if storage::is_initialized(env) {
            return Err(ContractError::AlreadyInitialized);
        }
        Ok(())
    }

    fn configure(
        env: &Env,
        stake_asset: Address,
        reward_asset: Address,
        schedule: RewardSchedule,
    ) -> Result<(), ContractError> {
        if schedule.reward_rate < 0 || stake_asset == reward_asset {
            return Err(ContractError::InvalidConfig);
        }

        let now = env.ledger().timestamp();

        storage::set_config(
            env,
            &LedgerConfig {
                stake_asset: stake_asset.clone(),
                reward_asset: reward_asset.clone(),
                schedule: schedule.clone(),
            },
        );
        storage::set_global(env, &GlobalState::new(now));

        events::publish_initialized(
            env,
            events::InitializedEvent {
                stake_asset,
                reward_asset,
                reward_rate: schedule.reward_rate,
                lock_duration: schedule.lock_duration,
                cooldown_anchor: schedule.cooldown_anchor,
            },
        );

        Ok(())
    }

    fn load_config(env: &Env) -> Result<LedgerConfig, ContractError> {
        storage::get_config(env).ok_or(ContractError::NotInitialized)
    }

    fn load_global(env: &Env) -> Result<GlobalState, ContractError> {
        storage::get_global(env).ok_or(ContractError::NotInitialized)
    }

    /// Pull `amount` of `asset` from `from` using the allowance it granted
    /// the ledger.
    fn collect(
        env: &Env,
        asset: &Address,
        from: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        let ledger = env.current_contract_address();
        let client = token::Client::new(env, asset);
        match client.try_transfer_from(&ledger, from, &ledger, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(env, "asset collection failed", asset.clone(), from.clone(), amount);
                Err(ContractError::AssetTransferFailed)
            }
        }
    }

    /// Send `amount` of `asset` out of custody to `to`.
    fn pay(env: &Env, asset: &Address, to: &Address, amount: i128) -> Result<(), ContractError> {
        let ledger = env.current_contract_address();
        let client = token::Client::new(env, asset);
        match client.try_transfer(&ledger, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => {
                log!(env, "asset payout failed", asset.clone(), to.clone(), amount);
                Err(ContractError::AssetTransferFailed)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
