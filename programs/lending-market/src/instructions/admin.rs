//! Admin instructions for the comptroller
//!
//! - Initialize comptroller
//! - Two-step admin transfer
//! - Close factor, liquidation incentive, max assets, oracle staleness
//! - Seize pause
//! - Liquidator allow-list

use anchor_lang::prelude::*;
use crate::constants::{PROGRAM_SEED_PREFIX, DEFAULT_MAX_STALE_PERIOD, MAX_ENTERED_MARKETS};
use crate::errors::LendingError;
use crate::events::*;
use crate::state::{AllowedLiquidator, Comptroller};

// ============================================================================
// Initialize
// ============================================================================

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        init,
        payer = payer,
        space = Comptroller::space(),
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    pub system_program: Program<'info, System>,
}

pub fn initialize(
    ctx: Context<Initialize>,
    admin: Pubkey,
    close_factor: u128,
    liquidation_incentive: u128,
    max_assets: u8,
) -> Result<()> {
    Comptroller::validate_close_factor(close_factor).into_result("initialize")?;
    Comptroller::validate_liquidation_incentive(liquidation_incentive).into_result("initialize")?;
    require!(
        max_assets > 0 && (max_assets as usize) <= MAX_ENTERED_MARKETS,
        LendingError::InvalidInput
    );

    let comptroller = &mut ctx.accounts.comptroller;
    comptroller.bump = ctx.bumps.comptroller;
    comptroller.admin = admin;
    comptroller.pending_admin = Pubkey::default();
    comptroller.close_factor = close_factor;
    comptroller.liquidation_incentive = liquidation_incentive;
    comptroller.max_assets = max_assets;
    comptroller.max_stale_period = DEFAULT_MAX_STALE_PERIOD;
    comptroller.seize_paused = false;
    comptroller.market_count = 0;
    comptroller.reward_token_count = 0;

    emit!(ComptrollerInitialized {
        admin,
        close_factor,
        liquidation_incentive,
        max_assets,
    });
    Ok(())
}

// ============================================================================
// Admin Transfer (Two-Step)
// ============================================================================

/// Accounts for comptroller-only parameter updates
#[derive(Accounts)]
pub struct UpdateComptroller<'info> {
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,
}

pub fn transfer_admin(ctx: Context<UpdateComptroller>, new_admin: Pubkey) -> Result<()> {
    ctx.accounts.comptroller.pending_admin = new_admin;

    emit!(AdminTransferStarted {
        current_admin: ctx.accounts.admin.key(),
        pending_admin: new_admin,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct AcceptAdmin<'info> {
    pub pending_admin: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.pending_admin == pending_admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,
}

pub fn accept_admin(ctx: Context<AcceptAdmin>) -> Result<()> {
    let comptroller = &mut ctx.accounts.comptroller;
    let previous_admin = comptroller.admin;

    comptroller.admin = comptroller.pending_admin;
    comptroller.pending_admin = Pubkey::default();

    emit!(AdminTransferred {
        previous_admin,
        new_admin: comptroller.admin,
    });
    Ok(())
}

// ============================================================================
// Risk Parameters
// ============================================================================

pub fn set_close_factor(ctx: Context<UpdateComptroller>, close_factor: u128) -> Result<()> {
    Comptroller::validate_close_factor(close_factor).into_result("set close factor")?;

    let comptroller = &mut ctx.accounts.comptroller;
    let old_close_factor = comptroller.close_factor;
    comptroller.close_factor = close_factor;

    emit!(NewCloseFactor {
        old_close_factor,
        new_close_factor: close_factor,
    });
    Ok(())
}

pub fn set_liquidation_incentive(ctx: Context<UpdateComptroller>, incentive: u128) -> Result<()> {
    Comptroller::validate_liquidation_incentive(incentive).into_result("set liquidation incentive")?;

    let comptroller = &mut ctx.accounts.comptroller;
    let old_incentive = comptroller.liquidation_incentive;
    comptroller.liquidation_incentive = incentive;

    emit!(NewLiquidationIncentive {
        old_incentive,
        new_incentive: incentive,
    });
    Ok(())
}

pub fn set_max_assets(ctx: Context<UpdateComptroller>, max_assets: u8) -> Result<()> {
    require!(
        max_assets > 0 && (max_assets as usize) <= MAX_ENTERED_MARKETS,
        LendingError::InvalidInput
    );

    let comptroller = &mut ctx.accounts.comptroller;
    let old_max_assets = comptroller.max_assets;
    comptroller.max_assets = max_assets;

    emit!(NewMaxAssets {
        old_max_assets,
        new_max_assets: max_assets,
    });
    Ok(())
}

pub fn set_max_stale_period(ctx: Context<UpdateComptroller>, period: i64) -> Result<()> {
    require!(period > 0, LendingError::InvalidInput);

    let comptroller = &mut ctx.accounts.comptroller;
    let old_period = comptroller.max_stale_period;
    comptroller.max_stale_period = period;

    emit!(NewMaxStalePeriod {
        old_period,
        new_period: period,
    });
    Ok(())
}

pub fn set_seize_paused(ctx: Context<UpdateComptroller>, paused: bool) -> Result<()> {
    ctx.accounts.comptroller.seize_paused = paused;
    emit!(SeizePausedSet { paused });
    Ok(())
}

// ============================================================================
// Liquidator Allow-List
// ============================================================================

#[derive(Accounts)]
pub struct SetAllowedLiquidator<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    /// CHECK: Liquidator being allowed or disallowed
    pub liquidator: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = admin,
        space = AllowedLiquidator::space(),
        seeds = [PROGRAM_SEED_PREFIX, AllowedLiquidator::SEED, liquidator.key().as_ref()],
        bump,
    )]
    pub allowed_liquidator: Account<'info, AllowedLiquidator>,

    pub system_program: Program<'info, System>,
}

pub fn set_allowed_liquidator(ctx: Context<SetAllowedLiquidator>, allowed: bool) -> Result<()> {
    let entry = &mut ctx.accounts.allowed_liquidator;
    entry.bump = ctx.bumps.allowed_liquidator;
    entry.liquidator = ctx.accounts.liquidator.key();
    entry.allowed = allowed;

    emit!(LiquidatorAllowanceSet {
        liquidator: entry.liquidator,
        allowed,
    });
    Ok(())
}
