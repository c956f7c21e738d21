#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reward_ledger::ledger::CooldownAnchor;
use reward_ledger::{RewardLedgerContract, RewardLedgerContractClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, Address, Env};

const STAKERS: usize = 3;
const FUNDS: i128 = 1_000_000_000;

#[derive(Arbitrary, Debug)]
enum Op {
    Stake { who: u8, amount: u32 },
    Unstake { who: u8, amount: u32 },
    Claim { who: u8 },
    Recalc { who: u8 },
    Advance { seconds: u32 },
}

#[derive(Arbitrary, Debug)]
struct Input {
    reward_rate: u32,
    lock_duration: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    if input.ops.len() > 64 {
        return;
    }

    let env = Env::default();
    env.mock_all_auths();

    let issuer = Address::generate(&env);
    let stake_sac = env.register_stellar_asset_contract_v2(issuer.clone());
    let reward_sac = env.register_stellar_asset_contract_v2(issuer);
    let stake_asset = token::Client::new(&env, &stake_sac.address());
    let stake_admin = token::StellarAssetClient::new(&env, &stake_sac.address());
    let reward_admin = token::StellarAssetClient::new(&env, &reward_sac.address());

    let contract_id = env.register(RewardLedgerContract, ());
    let ledger = RewardLedgerContractClient::new(&env, &contract_id);
    ledger.initialize(
        &stake_sac.address(),
        &reward_sac.address(),
        &i128::from(input.reward_rate),
        &u64::from(input.lock_duration),
        &CooldownAnchor::LastStake,
    );
    reward_admin.mint(&contract_id, &i128::MAX);

    let stakers: Vec<Address> = (0..STAKERS)
        .map(|_| {
            let staker = Address::generate(&env);
            stake_admin.mint(&staker, &FUNDS);
            staker
        })
        .collect();
    let pick = |who: u8| &stakers[usize::from(who) % STAKERS];

    let mut last_rpu = 0i128;
    for op in &input.ops {
        match *op {
            Op::Stake { who, amount } => {
                let staker = pick(who);
                let amount = i128::from(amount);
                let expiration = env.ledger().sequence() + 100;
                stake_asset.approve(staker, &contract_id, &amount, &expiration);
                let _ = ledger.try_stake(staker, &amount);
            }
            Op::Unstake { who, amount } => {
                let _ = ledger.try_unstake(pick(who), &i128::from(amount));
            }
            Op::Claim { who } => {
                let _ = ledger.try_get_reward(pick(who));
            }
            Op::Recalc { who } => {
                let _ = ledger.try_recalc_reward(pick(who));
            }
            Op::Advance { seconds } => {
                env.ledger()
                    .with_mut(|li| li.timestamp = li.timestamp.saturating_add(u64::from(seconds)));
            }
        }

        let global = ledger.get_global();
        let staked: i128 = stakers.iter().map(|s| ledger.get_staked(s)).sum();
        assert_eq!(global.total_staked, staked);
        assert_eq!(stake_asset.balance(&contract_id), staked);
        assert!(global.reward_per_unit_stored >= last_rpu);
        last_rpu = global.reward_per_unit_stored;
    }
});
