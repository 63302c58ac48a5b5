//! Position and membership instructions (open, close, enter, exit)

use anchor_lang::prelude::*;
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::{LendingError, RejectCode};
use crate::events::{PositionOpened, PositionClosed, MarketEntered, MarketExited};
use crate::risk::exit_market_allowed;
use crate::state::{AccountMembership, Comptroller, Market, Position};
use super::loader::{load_account, load_account_snapshots, LiveMarket};

// ============================================================================
// Open Position
// ============================================================================

#[derive(Accounts)]
pub struct OpenPosition<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// CHECK: Position owner - can be any account
    pub owner: UncheckedAccount<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(
        init,
        payer = payer,
        space = Position::space(),
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, market.key().as_ref(), owner.key().as_ref()],
        bump,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = AccountMembership::space(),
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, owner.key().as_ref()],
        bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,

    pub system_program: Program<'info, System>,
}

pub fn open_position(ctx: Context<OpenPosition>) -> Result<()> {
    let market_key = ctx.accounts.market.key();
    let owner = ctx.accounts.owner.key();

    **ctx.accounts.position = Position::new(market_key, owner, ctx.bumps.position);

    let membership = &mut ctx.accounts.membership;
    if membership.owner == Pubkey::default() {
        membership.bump = ctx.bumps.membership;
        membership.owner = owner;
    }

    emit!(PositionOpened {
        market: market_key,
        owner,
    });
    Ok(())
}

// ============================================================================
// Close Position
// ============================================================================

#[derive(Accounts)]
pub struct ClosePosition<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: Rent receiver - can be any account
    #[account(mut)]
    pub rent_receiver: UncheckedAccount<'info>,

    #[account(
        mut,
        close = rent_receiver,
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, position.market.as_ref(), owner.key().as_ref()],
        bump = position.bump,
        constraint = position.owner == owner.key() @ LendingError::Unauthorized,
        constraint = position.is_empty() @ LendingError::PositionNotEmpty,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, owner.key().as_ref()],
        bump = membership.bump,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,
}

/// An entered market's position must stay open; exit the market first.
pub fn close_position(ctx: Context<ClosePosition>) -> Result<()> {
    let market = ctx.accounts.position.market;
    require!(
        !ctx.accounts.membership.is_member(&market),
        LendingError::PositionNotEmpty
    );

    emit!(PositionClosed {
        market,
        owner: ctx.accounts.owner.key(),
    });
    Ok(())
}

// ============================================================================
// Enter Markets
// ============================================================================

#[derive(Accounts)]
pub struct EnterMarkets<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, owner.key().as_ref()],
        bump = membership.bump,
        constraint = membership.owner == owner.key() @ LendingError::InvalidOwner,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,
    // remaining_accounts: (market, position) per market to enter
}

pub fn enter_markets<'info>(ctx: Context<'_, '_, 'info, 'info, EnterMarkets<'info>>) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(
        !remaining.is_empty() && remaining.len() % 2 == 0,
        LendingError::InvalidRemainingAccounts
    );

    let comptroller_key = ctx.accounts.comptroller.key();
    let cap = ctx.accounts.comptroller.entered_markets_cap();
    let owner = ctx.accounts.owner.key();
    let membership = &mut ctx.accounts.membership;

    for pair in remaining.chunks_exact(2) {
        let market_key = pair[0].key();
        let market: Market = load_account(&pair[0], ctx.program_id)?;
        let position: Position = load_account(&pair[1], ctx.program_id)?;

        require_keys_eq!(market.comptroller, comptroller_key, LendingError::ComptrollerMismatch);
        require_keys_eq!(position.market, market_key, LendingError::InvalidRemainingAccounts);
        require_keys_eq!(position.owner, owner, LendingError::InvalidOwner);

        if !market.is_listed {
            RejectCode::MarketNotListed.into_result("enter markets")?;
        }
        if membership.is_member(&market_key) {
            continue;
        }
        membership.enter(market_key, cap).into_result("enter markets")?;

        emit!(MarketEntered {
            market: market_key,
            account: owner,
        });
    }
    Ok(())
}

// ============================================================================
// Exit Market
// ============================================================================

#[derive(Accounts)]
pub struct ExitMarket<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Market::SEED, market.underlying_mint.as_ref()],
        bump = market.bump,
        constraint = market.comptroller == comptroller.key() @ LendingError::ComptrollerMismatch,
    )]
    pub market: Box<Account<'info, Market>>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Position::SEED, market.key().as_ref(), owner.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Box<Account<'info, Position>>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, AccountMembership::SEED, owner.key().as_ref()],
        bump = membership.bump,
        constraint = membership.owner == owner.key() @ LendingError::InvalidOwner,
    )]
    pub membership: Box<Account<'info, AccountMembership>>,
    // remaining_accounts: (market, position, price_feed) per entered market
}

pub fn exit_market<'info>(ctx: Context<'_, '_, 'info, 'info, ExitMarket<'info>>) -> Result<()> {
    let market_key = ctx.accounts.market.key();
    if !ctx.accounts.membership.is_member(&market_key) {
        return Ok(());
    }

    let now = Clock::get()?.unix_timestamp;
    let snapshots = load_account_snapshots(
        ctx.program_id,
        &ctx.accounts.comptroller.key(),
        &ctx.accounts.membership,
        ctx.remaining_accounts,
        &[LiveMarket {
            key: market_key,
            market: &ctx.accounts.market,
            position: &ctx.accounts.position,
        }],
        now,
        ctx.accounts.comptroller.max_stale_period,
    )?;
    let target = snapshots
        .iter()
        .find(|s| s.market == market_key)
        .copied()
        .ok_or(LendingError::MarketNotEntered)?;

    exit_market_allowed(
        &ctx.accounts.market,
        &ctx.accounts.position,
        &ctx.accounts.membership,
        &snapshots,
        &target,
    )?
    .into_result("exit market")?;

    ctx.accounts.membership.leave(&market_key);

    emit!(MarketExited {
        market: market_key,
        account: ctx.accounts.owner.key(),
    });
    Ok(())
}
