//! Engine Tests for the Lending Market
//!
//! Scenario and property tests over the pure ledger and risk engine.
//! No program deployment required.

use anchor_lang::prelude::Pubkey;
use proptest::prelude::*;

use lending_market::constants::{
    WAD, SECONDS_PER_YEAR, MAX_BORROW_RATE_PER_SECOND, REPAY_MAX, REWARD_INITIAL_INDEX,
};
use lending_market::errors::{LendingError, RejectCode};
use lending_market::interfaces::JumpRateModel;
use lending_market::math::*;
use lending_market::risk::*;
use lending_market::state::{AccountMembership, Market, Position, RedeemAmount};

// ============================================================================
// Fixtures
// ============================================================================

const NOW: i64 = 1_700_000_000;

/// 2% base, 10% multiplier, 109% jump, 80% kink
fn rate_model() -> JumpRateModel {
    let mut model = JumpRateModel::default();
    model
        .set_parameters(WAD / 50, WAD / 10, WAD * 109 / 100, WAD * 8 / 10)
        .unwrap();
    model
}

fn new_market(initial_exchange_rate: u128, collateral_factor: u128) -> Market {
    Market {
        is_listed: true,
        initial_exchange_rate,
        collateral_factor,
        reserve_factor: WAD / 10,
        borrow_index: WAD,
        accrual_timestamp: NOW,
        ..Market::default()
    }
}

fn clock(now: i64) -> RewardClock {
    RewardClock { reward_tokens: 1, now }
}

fn error_code(err: anchor_lang::error::Error) -> u32 {
    match err {
        anchor_lang::error::Error::AnchorError(e) => e.error_code_number,
        anchor_lang::error::Error::ProgramError(_) => u32::MAX,
    }
}

fn lending_code(err: LendingError) -> u32 {
    u32::from(err)
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_rate_at_ninety_percent_utilization() {
        let model = rate_model();
        let per_second = model.get_borrow_rate(10 * WAD, 90 * WAD, 0).unwrap();
        let per_year = per_second * SECONDS_PER_YEAR;

        // 2% + 80% * 10% + 10% * 109% = 20.9%
        let expected = WAD * 209 / 1000;
        let diff = expected.abs_diff(per_year);
        assert!(diff < WAD / 10_000_000, "got {} expected {}", per_year, expected);
    }

    #[test]
    fn test_mint_one_unit_at_two_percent() {
        let mut market = new_market(WAD / 50, 0);
        let mut position = Position::default();

        let shares = market.mint_fresh(&mut position, WAD).unwrap();

        assert_eq!(shares, 50 * WAD);
        assert_eq!(market.total_supply_shares, 50 * WAD);
    }

    #[test]
    fn test_shortfall_of_one_dollar() {
        let collateral = AccountMarketSnapshot {
            market: Pubkey::new_unique(),
            shares: 100 * WAD,
            borrow_balance: 0,
            exchange_rate: WAD,
            collateral_factor: WAD * 7 / 10,
            price: WAD,
        };
        let debt = AccountMarketSnapshot {
            market: Pubkey::new_unique(),
            shares: 0,
            borrow_balance: 71 * WAD,
            exchange_rate: WAD,
            collateral_factor: 0,
            price: WAD,
        };

        let liquidity = account_liquidity(&[collateral, debt]).unwrap();

        assert_eq!(liquidity.liquidity, 0);
        assert_eq!(liquidity.shortfall, WAD);
    }

    #[test]
    fn test_close_factor_rejects_fifty_one_of_hundred() {
        let borrowed = new_market(WAD, 0);
        let collateral = new_market(WAD, WAD * 7 / 10);
        let collateral_key = Pubkey::new_unique();
        let mut membership = AccountMembership::default();
        membership.enter(collateral_key, 16);

        let code = liquidate_borrow_allowed(&LiquidateCheck {
            borrowed_market: &borrowed,
            collateral_market: &collateral,
            collateral_key,
            liquidator_allowed: true,
            borrower_membership: &membership,
            borrower_liquidity: Liquidity { liquidity: 0, shortfall: WAD },
            borrow_balance: 100 * WAD,
            repay_amount: 51 * WAD,
            close_factor: WAD / 2,
        })
        .unwrap();

        assert_eq!(code, RejectCode::TooMuchRepay);
        assert_eq!(code.code(), 17);
    }

    #[test]
    fn test_seize_two_hundred_seventy() {
        let (code, seize) =
            liquidate_calculate_seize_tokens(WAD, 2 * WAD, WAD / 50, WAD * 108 / 100, 10).unwrap();
        assert_eq!(code, RejectCode::NoError);
        assert_eq!(seize, 270);
    }

    /// Supply, borrow against collateral in another market, let interest
    /// push the borrower underwater, then liquidate.
    #[test]
    fn test_lending_cycle_to_liquidation() {
        let model = rate_model();
        let collateral_key = Pubkey::new_unique();
        let borrowed_key = Pubkey::new_unique();

        let mut collateral_market = new_market(WAD, WAD * 3 / 4);
        let mut borrowed_market = new_market(WAD, 0);

        // Lender funds the borrowed market
        let mut lender = Position::default();
        let mut lender_membership = AccountMembership::default();
        mint_allowed(&mut borrowed_market, &mut lender, &mut lender_membership, clock(NOW))
            .unwrap()
            .into_result("mint")
            .unwrap();
        borrowed_market.mint_fresh(&mut lender, 1_000 * WAD).unwrap();

        // Borrower posts 100 units of collateral and enters the market
        let mut borrower_collateral = Position::default();
        let mut borrower_debt = Position::default();
        let mut borrower_membership = AccountMembership::default();
        collateral_market.mint_fresh(&mut borrower_collateral, 100 * WAD).unwrap();
        assert!(borrower_membership.enter(collateral_key, 16).is_ok());

        let snapshots = vec![AccountMarketSnapshot::from_state(
            collateral_key,
            &collateral_market,
            &borrower_collateral,
            WAD,
        )
        .unwrap()];
        let target = AccountMarketSnapshot::from_state(
            borrowed_key,
            &borrowed_market,
            &borrower_debt,
            WAD,
        )
        .unwrap();

        // 76 exceeds the 75 allowed
        let rejected = borrow_allowed(
            &mut borrowed_market,
            &mut borrower_debt,
            &mut borrower_membership,
            16,
            &snapshots,
            &target,
            76 * WAD,
            clock(NOW),
        )
        .unwrap();
        assert_eq!(rejected.code, RejectCode::InsufficientLiquidity);

        let allowed = borrow_allowed(
            &mut borrowed_market,
            &mut borrower_debt,
            &mut borrower_membership,
            16,
            &snapshots,
            &target,
            74 * WAD,
            clock(NOW),
        )
        .unwrap();
        assert_eq!(allowed.code, RejectCode::NoError);
        assert!(borrower_membership.is_member(&borrowed_key));
        borrowed_market.borrow_fresh(&mut borrower_debt, 74 * WAD).unwrap();

        // A year of interest
        let later = NOW + SECONDS_PER_YEAR as i64;
        borrowed_market.accrue_interest(&model, later).unwrap();
        collateral_market.accrue_interest(&model, later).unwrap();
        let debt = borrowed_market.borrow_balance_stored(&borrower_debt).unwrap();
        assert!(debt > 74 * WAD);

        let borrower_snapshots = vec![
            AccountMarketSnapshot::from_state(
                collateral_key,
                &collateral_market,
                &borrower_collateral,
                WAD,
            )
            .unwrap(),
            AccountMarketSnapshot::from_state(borrowed_key, &borrowed_market, &borrower_debt, WAD)
                .unwrap(),
        ];
        let liquidity = account_liquidity(&borrower_snapshots).unwrap();
        assert!(liquidity.has_shortfall());

        let accounts = LiquidationAccounts {
            borrowed_market: borrowed_market.clone(),
            collateral_market: collateral_market.clone(),
            borrower_borrow_position: borrower_debt.clone(),
            borrower_collateral_position: borrower_collateral.clone(),
            liquidator_collateral_position: Position::default(),
            borrower_membership: borrower_membership.clone(),
            liquidator_membership: AccountMembership::default(),
        };
        let repay = debt / 4;
        let request = LiquidationRequest {
            now: later,
            liquidator: Pubkey::new_unique(),
            borrower: Pubkey::new_unique(),
            liquidator_allowed: true,
            repay_amount: repay,
            borrowed_key,
            collateral_key,
            price_borrowed: WAD,
            price_collateral: WAD,
            close_factor: WAD / 2,
            liquidation_incentive: WAD * 108 / 100,
            seize_paused: false,
            reward_tokens: 0,
            borrower_snapshots: &borrower_snapshots,
        };

        let outcome = liquidate_borrow(&request, &accounts).unwrap();

        assert_eq!(outcome.stage, LiquidationStage::Settled);
        assert_eq!(outcome.repay_amount, repay);
        let settled = outcome.accounts;
        assert_eq!(
            settled.borrower_collateral_position.shares + outcome.seize_shares,
            borrower_collateral.shares
        );
        assert_eq!(
            settled.liquidator_collateral_position.shares,
            outcome.seize.liquidator_shares
        );
        let remaining = settled
            .borrowed_market
            .borrow_balance_stored(&settled.borrower_borrow_position)
            .unwrap();
        assert_eq!(remaining, debt - repay);
    }

    #[test]
    fn test_repay_sentinel_settles_full_debt() {
        let model = rate_model();
        let mut market = new_market(WAD, 0);
        let mut supplier = Position::default();
        let mut borrower = Position::default();
        market.mint_fresh(&mut supplier, 1_000 * WAD).unwrap();
        market.borrow_fresh(&mut borrower, 500 * WAD).unwrap();

        market.accrue_interest(&model, NOW + 86_400).unwrap();
        let owed = market.borrow_balance_stored(&borrower).unwrap();

        let repaid = market.repay_borrow_fresh(&mut borrower, REPAY_MAX as u128).unwrap();

        assert_eq!(repaid, owed);
        assert!(!borrower.has_debt());
    }

    #[test]
    fn test_redeem_blocked_by_entered_collateral() {
        let key = Pubkey::new_unique();
        let mut market = new_market(WAD, WAD / 2);
        let mut position = Position::default();
        let mut membership = AccountMembership::default();
        market.mint_fresh(&mut position, 100 * WAD).unwrap();
        membership.enter(key, 16);

        // borrowed 40 against 50 of capacity: 20 units of collateral remain redeemable
        let debt = AccountMarketSnapshot {
            market: Pubkey::new_unique(),
            borrow_balance: 40 * WAD,
            price: WAD,
            ..AccountMarketSnapshot::default()
        };
        let target = AccountMarketSnapshot::from_state(key, &market, &position, WAD).unwrap();
        let snapshots = [target, debt];

        let too_much = redeem_allowed(
            &mut market,
            &mut position,
            &mut membership,
            &snapshots,
            &target,
            21 * WAD,
            clock(NOW),
        )
        .unwrap();
        assert_eq!(too_much.code, RejectCode::InsufficientLiquidity);

        let ok = redeem_allowed(
            &mut market,
            &mut position,
            &mut membership,
            &snapshots,
            &target,
            20 * WAD,
            clock(NOW),
        )
        .unwrap();
        assert_eq!(ok.code, RejectCode::NoError);
        market.redeem_fresh(&mut position, RedeemAmount::Shares(20 * WAD)).unwrap();
        assert_eq!(position.shares, 80 * WAD);
    }

    #[test]
    fn test_unlisted_market_rejects_mint_and_borrow() {
        let mut market = new_market(WAD / 50, WAD / 2);
        let mut position = Position::default();
        let mut membership = AccountMembership::default();
        market.mint_fresh(&mut position, 100 * WAD).unwrap();
        let ledger = (market.cash, market.total_supply_shares, position.shares);

        market.is_listed = false;

        let mint = mint_allowed(&mut market, &mut position, &mut membership, clock(NOW)).unwrap();
        assert_eq!(mint.code, RejectCode::MarketNotListed);

        let own = AccountMarketSnapshot {
            market: Pubkey::new_unique(),
            shares: position.shares,
            borrow_balance: 0,
            exchange_rate: market.exchange_rate_stored().unwrap(),
            collateral_factor: market.collateral_factor,
            price: WAD,
        };
        let borrow = borrow_allowed(
            &mut market,
            &mut position,
            &mut membership,
            16,
            &[],
            &own,
            WAD,
            clock(NOW),
        )
        .unwrap();
        assert_eq!(borrow.code, RejectCode::MarketNotListed);

        // Ledger persists and the market works again once relisted
        assert_eq!(ledger, (market.cash, market.total_supply_shares, position.shares));
        market.is_listed = true;
        let mint = mint_allowed(&mut market, &mut position, &mut membership, clock(NOW)).unwrap();
        assert_eq!(mint.code, RejectCode::NoError);
    }

    #[test]
    fn test_rejection_surfaces_tagged_error() {
        let err = RejectCode::InsufficientLiquidity.into_result("borrow").unwrap_err();
        assert_eq!(error_code(err), lending_code(LendingError::InsufficientLiquidity));
    }

    #[test]
    fn test_rewards_follow_supply_then_claimable() {
        let mut market = new_market(WAD, 0);
        set_reward_speeds(&mut market, 0, 1_000, 0, NOW).unwrap();

        let mut alice = Position::default();
        let mut alice_membership = AccountMembership::default();
        mint_allowed(&mut market, &mut alice, &mut alice_membership, clock(NOW)).unwrap();
        market.mint_fresh(&mut alice, 10 * WAD).unwrap();

        let outcome =
            mint_allowed(&mut market, &mut alice, &mut alice_membership, clock(NOW + 100)).unwrap();

        assert_eq!(outcome.distributed[0], 100_000);
        assert_eq!(alice_membership.reward_accrued[0], 100_000);
        assert!(U256::from(market.rewards[0].supply_index) > U256::from(REWARD_INITIAL_INDEX));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn funded_market(cash: u128, borrows: u128, shares: u128, reserve_factor: u128) -> Market {
        Market {
            is_listed: true,
            initial_exchange_rate: WAD / 50,
            reserve_factor,
            borrow_index: WAD,
            cash,
            total_borrows: borrows,
            total_supply_shares: shares,
            accrual_timestamp: NOW,
            ..Market::default()
        }
    }

    proptest! {
        /// Accruing twice at the same instant changes nothing the second time
        #[test]
        fn prop_accrual_idempotent(
            cash in 0u128..1_000_000_000 * WAD,
            borrows in 0u128..1_000_000_000 * WAD,
            rate in 0u128..=MAX_BORROW_RATE_PER_SECOND,
            dt in 0i64..100_000_000,
        ) {
            let mut market = funded_market(cash, borrows, WAD, WAD / 10);
            accrue_interest_on_market(&mut market, NOW + dt, rate).unwrap();
            let snapshot = (market.total_borrows, market.total_reserves, market.borrow_index);

            let second = accrue_interest_on_market(&mut market, NOW + dt, rate).unwrap();

            prop_assert_eq!(second.interest, 0);
            prop_assert_eq!(
                (market.total_borrows, market.total_reserves, market.borrow_index),
                snapshot
            );
        }

        /// Accrual never lowers the exchange rate
        #[test]
        fn prop_exchange_rate_monotonic(
            cash in 0u128..1_000_000 * WAD,
            borrows in 0u128..1_000_000 * WAD,
            shares in WAD..1_000_000 * WAD,
            reserve_factor in 0u128..=WAD,
            dt in 1i64..10_000_000,
        ) {
            let model = rate_model();
            let mut market = funded_market(cash, borrows, shares, reserve_factor);
            let before = market.exchange_rate_stored().unwrap();

            market.accrue_interest(&model, NOW + dt).unwrap();

            prop_assert!(market.exchange_rate_stored().unwrap() >= before);
        }

        /// Cash moves exactly with the underlying leaving or entering, and a
        /// mint/redeem round trip never returns more than was deposited
        #[test]
        fn prop_conservation(
            seed_cash in 1u128..1_000_000 * WAD,
            borrowed_percent in 0u128..=100,
            deposit in 1_000u128..1_000_000 * WAD,
        ) {
            let mut market = funded_market(0, 0, 0, 0);
            let mut seed = Position::default();
            market.mint_fresh(&mut seed, seed_cash).unwrap();
            // outstanding borrows raise the exchange rate up to 2x
            market.total_borrows = seed_cash * borrowed_percent / 100;

            let mut position = Position::default();
            let cash_before = market.cash;
            let shares = market.mint_fresh(&mut position, deposit).unwrap();
            prop_assert_eq!(market.cash, cash_before + deposit);

            let (amount, burned) = market
                .redeem_fresh(&mut position, RedeemAmount::Shares(shares))
                .unwrap();
            prop_assert_eq!(burned, shares);
            prop_assert!(amount <= deposit);
            prop_assert_eq!(market.cash, cash_before + deposit - amount);
            prop_assert_eq!(position.shares, 0);
        }

        /// Liquidity and shortfall are exclusive and net to collateral minus debt
        #[test]
        fn prop_liquidity_consistent(
            entries in prop::collection::vec(
                (0u128..1_000 * WAD, 0u128..1_000 * WAD, 1u128..2 * WAD, 0u128..=WAD * 9 / 10, 1u128..10 * WAD),
                0..8,
            ),
        ) {
            let snapshots: Vec<AccountMarketSnapshot> = entries
                .iter()
                .map(|(shares, borrow, rate, cf, price)| AccountMarketSnapshot {
                    market: Pubkey::new_unique(),
                    shares: *shares,
                    borrow_balance: *borrow,
                    exchange_rate: *rate,
                    collateral_factor: *cf,
                    price: *price,
                })
                .collect();

            let mut collateral = 0u128;
            let mut debt = 0u128;
            for s in &snapshots {
                collateral += s.collateral_value(s.shares).unwrap();
                debt += s.debt_value(s.borrow_balance).unwrap();
            }

            let result = account_liquidity(&snapshots).unwrap();

            prop_assert!(result.liquidity == 0 || result.shortfall == 0);
            if collateral >= debt {
                prop_assert_eq!(result.liquidity, collateral - debt);
            } else {
                prop_assert_eq!(result.shortfall, debt - collateral);
            }
        }

        /// Suppliers collect speed * elapsed in total, less at most one unit
        /// of rounding each, and each collects at most its pro-rata share
        #[test]
        fn prop_reward_fairness(
            alice_shares in 1u128..50_000_000 * WAD,
            bob_shares in 1u128..50_000_000 * WAD,
            speed in 0u64..1_000_000_000,
            dt in 1i64..1_000_000,
        ) {
            let mut market = funded_market(0, 0, 0, 0);
            set_reward_speeds(&mut market, 0, speed, 0, NOW).unwrap();

            let mut alice = Position::default();
            let mut bob = Position::default();
            let mut alice_m = AccountMembership::default();
            let mut bob_m = AccountMembership::default();
            refresh_supplier(&mut market, &mut alice, &mut alice_m, 1, NOW).unwrap();
            refresh_supplier(&mut market, &mut bob, &mut bob_m, 1, NOW).unwrap();
            alice.shares = alice_shares;
            bob.shares = bob_shares;
            market.total_supply_shares = alice_shares + bob_shares;

            refresh_supplier(&mut market, &mut alice, &mut alice_m, 1, NOW + dt).unwrap();
            refresh_supplier(&mut market, &mut bob, &mut bob_m, 1, NOW + dt).unwrap();

            let emitted = speed as u128 * dt as u128;
            let total = alice_m.reward_accrued[0] + bob_m.reward_accrued[0];
            prop_assert!(total <= emitted);
            prop_assert!(emitted - total <= 2, "emitted {} total {}", emitted, total);

            let total_shares = alice_shares + bob_shares;
            let alice_fair = mul_div_up(emitted, alice_shares, total_shares).unwrap();
            prop_assert!(alice_m.reward_accrued[0] <= alice_fair);
        }

        /// Equal shares held over the same interval earn the same rewards,
        /// however often each holder is touched
        #[test]
        fn prop_equal_share_time_equal_rewards(
            shares in WAD..50_000_000 * WAD,
            speed in 1u64..1_000_000_000,
            gaps in proptest::collection::vec(1i64..1_000, 1..20),
        ) {
            let mut market = funded_market(0, 0, 0, 0);
            set_reward_speeds(&mut market, 0, speed, 0, NOW).unwrap();

            let mut alice = Position::default();
            let mut bob = Position::default();
            let mut alice_m = AccountMembership::default();
            let mut bob_m = AccountMembership::default();
            refresh_supplier(&mut market, &mut alice, &mut alice_m, 1, NOW).unwrap();
            refresh_supplier(&mut market, &mut bob, &mut bob_m, 1, NOW).unwrap();
            alice.shares = shares;
            bob.shares = shares;
            market.total_supply_shares = 2 * shares;

            let mut now = NOW;
            for gap in &gaps {
                now += gap;
                refresh_supplier(&mut market, &mut alice, &mut alice_m, 1, now).unwrap();
            }
            refresh_supplier(&mut market, &mut bob, &mut bob_m, 1, now).unwrap();

            let alice_total = alice_m.reward_accrued[0];
            let bob_total = bob_m.reward_accrued[0];
            prop_assert!(alice_total <= bob_total);
            prop_assert!(bob_total - alice_total <= gaps.len() as u128);

            let emitted = speed as u128 * (now - NOW) as u128;
            prop_assert!(emitted - (alice_total + bob_total) <= gaps.len() as u128 + 1);
        }
    }
}
