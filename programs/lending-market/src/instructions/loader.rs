//! Remaining-account loading for cross-market operations
//!
//! Liquidity checks walk the account's entered markets. Callers pass one
//! `(market, position, price_feed)` triple per entered market, in entry
//! order, as remaining accounts. Markets the handler already holds in
//! memory are taken from there instead of the (possibly stale) account data.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::{transfer_checked, TransferChecked};
use crate::errors::LendingError;
use crate::events::{AccrueInterest, RewardDistributed};
use crate::interfaces::{JumpRateModel, PriceFeed, PriceOracle};
use crate::risk::{AccountMarketSnapshot, Distributed};
use crate::state::{AccountMembership, Market, Position};

/// Accounts per entered market in the remaining-accounts list
pub const SNAPSHOT_ACCOUNTS_PER_MARKET: usize = 3;

/// A market already deserialized by the handler
pub struct LiveMarket<'a> {
    pub key: Pubkey,
    pub market: &'a Market,
    pub position: &'a Position,
}

/// Deserialize a program-owned account, checking owner and discriminator
pub fn load_account<T: AccountDeserialize>(info: &AccountInfo, program_id: &Pubkey) -> Result<T> {
    require_keys_eq!(*info.owner, *program_id, LendingError::InvalidRemainingAccounts);
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

/// Write an account loaded with `load_account` back to its data
pub fn store_account<T: AccountSerialize>(info: &AccountInfo, value: &T) -> Result<()> {
    require!(info.is_writable, LendingError::InvalidRemainingAccounts);
    let mut data = info.try_borrow_mut_data()?;
    let mut writer: &mut [u8] = &mut data[..];
    value.try_serialize(&mut writer)
}

/// Accrue `market` up to `now`, emitting an event when time has passed
pub fn accrue_market(key: Pubkey, market: &mut Market, model: &JumpRateModel, now: i64) -> Result<()> {
    let result = market.accrue_interest(model, now)?;
    if result.elapsed == 0 {
        return Ok(());
    }

    emit!(AccrueInterest {
        market: key,
        borrow_rate: result.borrow_rate,
        interest_accumulated: result.interest,
        borrow_index: market.borrow_index,
        total_borrows: market.total_borrows,
        total_reserves: market.total_reserves,
    });
    Ok(())
}

/// Read a validated price for `market` from its feed account
pub fn read_price(
    feed: &PriceFeed,
    feed_key: &Pubkey,
    market: &Market,
    now: i64,
    max_stale_period: i64,
) -> Result<u128> {
    require_keys_eq!(*feed_key, market.price_feed, LendingError::InvalidPriceFeed);
    feed.underlying_price(now, max_stale_period)
}

/// Build liquidity snapshots for every market `membership` has entered
pub fn load_account_snapshots(
    program_id: &Pubkey,
    comptroller: &Pubkey,
    membership: &AccountMembership,
    remaining: &[AccountInfo],
    live: &[LiveMarket],
    now: i64,
    max_stale_period: i64,
) -> Result<Vec<AccountMarketSnapshot>> {
    let entered = membership.entered();
    require!(
        remaining.len() == entered.len() * SNAPSHOT_ACCOUNTS_PER_MARKET,
        LendingError::InvalidRemainingAccounts
    );

    let mut snapshots = Vec::with_capacity(entered.len());
    for (key, triple) in entered
        .iter()
        .zip(remaining.chunks_exact(SNAPSHOT_ACCOUNTS_PER_MARKET))
    {
        let (market_info, position_info, feed_info) = (&triple[0], &triple[1], &triple[2]);
        require_keys_eq!(market_info.key(), *key, LendingError::InvalidRemainingAccounts);

        let stored_market: Market;
        let stored_position: Position;
        let (market, position) = match live.iter().find(|l| l.key == *key) {
            Some(l) => (l.market, l.position),
            None => {
                stored_market = load_account(market_info, program_id)?;
                stored_position = load_account(position_info, program_id)?;
                (&stored_market, &stored_position)
            }
        };

        require_keys_eq!(market.comptroller, *comptroller, LendingError::ComptrollerMismatch);
        require_keys_eq!(position.market, *key, LendingError::InvalidRemainingAccounts);
        require_keys_eq!(position.owner, membership.owner, LendingError::InvalidOwner);

        let feed: PriceFeed = load_account(feed_info, program_id)?;
        let price = read_price(&feed, &feed_info.key(), market, now, max_stale_period)?;
        snapshots.push(AccountMarketSnapshot::from_state(*key, market, position, price)?);
    }
    Ok(snapshots)
}

/// Move underlying from a user account into a market vault
pub fn transfer_in<'info>(
    token_program: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    amount: u64,
    decimals: u8,
) -> Result<()> {
    transfer_checked(
        CpiContext::new(
            token_program,
            TransferChecked { from, to, authority, mint },
        ),
        amount,
        decimals,
    )
}

/// Move tokens out of a program-owned vault
#[allow(clippy::too_many_arguments)]
pub fn transfer_out<'info>(
    token_program: AccountInfo<'info>,
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    mint: AccountInfo<'info>,
    signer_seeds: &[&[&[u8]]],
    amount: u64,
    decimals: u8,
) -> Result<()> {
    transfer_checked(
        CpiContext::new_with_signer(
            token_program,
            TransferChecked { from, to, authority, mint },
            signer_seeds,
        ),
        amount,
        decimals,
    )
}

/// Emit one event per non-zero reward distribution
pub fn emit_distributed(market: Pubkey, account: Pubkey, distributed: &Distributed, borrow_side: bool) {
    for (reward_type, amount) in distributed.iter().enumerate() {
        if *amount == 0 {
            continue;
        }
        emit!(RewardDistributed {
            market,
            account,
            reward_type: reward_type as u8,
            borrow_side,
            amount: *amount,
        });
    }
}
