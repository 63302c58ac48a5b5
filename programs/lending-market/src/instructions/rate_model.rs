//! Interest rate model instructions

use anchor_lang::prelude::*;
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events::RateModelUpdated;
use crate::interfaces::JumpRateModel;
use crate::state::Comptroller;

/// Yearly rate curve parameters (WAD-scaled)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateModelParams {
    pub base_rate_per_year: u128,
    pub multiplier_per_year: u128,
    pub jump_multiplier_per_year: u128,
    pub kink: u128,
}

fn apply_params(model: &mut JumpRateModel, key: Pubkey, params: RateModelParams) -> Result<()> {
    model.set_parameters(
        params.base_rate_per_year,
        params.multiplier_per_year,
        params.jump_multiplier_per_year,
        params.kink,
    )?;

    emit!(RateModelUpdated {
        rate_model: key,
        base_rate_per_second: model.base_rate_per_second,
        multiplier_per_second: model.multiplier_per_second,
        jump_multiplier_per_second: model.jump_multiplier_per_second,
        kink: model.kink,
    });
    Ok(())
}

// ============================================================================
// Create Rate Model
// ============================================================================

#[derive(Accounts)]
#[instruction(id: u64)]
pub struct CreateRateModel<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    #[account(
        init,
        payer = admin,
        space = JumpRateModel::space(),
        seeds = [PROGRAM_SEED_PREFIX, JumpRateModel::SEED, &id.to_le_bytes()],
        bump,
    )]
    pub rate_model: Box<Account<'info, JumpRateModel>>,

    pub system_program: Program<'info, System>,
}

pub fn create_rate_model(
    ctx: Context<CreateRateModel>,
    id: u64,
    owner: Pubkey,
    params: RateModelParams,
) -> Result<()> {
    let key = ctx.accounts.rate_model.key();
    let model = &mut ctx.accounts.rate_model;
    model.bump = ctx.bumps.rate_model;
    model.id = id;
    model.owner = owner;
    apply_params(model, key, params)
}

// ============================================================================
// Update Rate Model
// ============================================================================

#[derive(Accounts)]
pub struct UpdateRateModel<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, JumpRateModel::SEED, &rate_model.id.to_le_bytes()],
        bump = rate_model.bump,
        constraint = rate_model.owner == owner.key() @ LendingError::Unauthorized,
    )]
    pub rate_model: Box<Account<'info, JumpRateModel>>,
}

/// Markets using this model keep their accrued state; the new curve
/// applies from their next accrual.
pub fn update_rate_model(ctx: Context<UpdateRateModel>, params: RateModelParams) -> Result<()> {
    let key = ctx.accounts.rate_model.key();
    apply_params(&mut ctx.accounts.rate_model, key, params)
}
