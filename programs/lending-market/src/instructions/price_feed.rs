//! Price feed instructions
//!
//! The admin creates one feed per underlying mint and names the adapter
//! authority allowed to publish into it.

use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;
use crate::constants::PROGRAM_SEED_PREFIX;
use crate::errors::LendingError;
use crate::events::{PriceFeedCreated, PricePublished};
use crate::interfaces::PriceFeed;
use crate::state::Comptroller;

#[derive(Accounts)]
pub struct CreatePriceFeed<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        seeds = [PROGRAM_SEED_PREFIX, Comptroller::SEED],
        bump = comptroller.bump,
        constraint = comptroller.admin == admin.key() @ LendingError::Unauthorized,
    )]
    pub comptroller: Box<Account<'info, Comptroller>>,

    pub underlying_mint: InterfaceAccount<'info, Mint>,

    #[account(
        init,
        payer = admin,
        space = PriceFeed::space(),
        seeds = [PROGRAM_SEED_PREFIX, PriceFeed::SEED, underlying_mint.key().as_ref()],
        bump,
    )]
    pub price_feed: Account<'info, PriceFeed>,

    pub system_program: Program<'info, System>,
}

pub fn create_price_feed(ctx: Context<CreatePriceFeed>, authority: Pubkey) -> Result<()> {
    let feed = &mut ctx.accounts.price_feed;
    feed.bump = ctx.bumps.price_feed;
    feed.underlying_mint = ctx.accounts.underlying_mint.key();
    feed.authority = authority;
    feed.price = 0;
    feed.publish_time = 0;

    emit!(PriceFeedCreated {
        price_feed: feed.key(),
        underlying_mint: feed.underlying_mint,
        authority,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct PublishPrice<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [PROGRAM_SEED_PREFIX, PriceFeed::SEED, price_feed.underlying_mint.as_ref()],
        bump = price_feed.bump,
        constraint = price_feed.authority == authority.key() @ LendingError::Unauthorized,
    )]
    pub price_feed: Account<'info, PriceFeed>,
}

pub fn publish_price(ctx: Context<PublishPrice>, price: u128) -> Result<()> {
    require!(price > 0, LendingError::OracleInvalidPrice);
    let now = Clock::get()?.unix_timestamp;

    let feed = &mut ctx.accounts.price_feed;
    feed.price = price;
    feed.publish_time = now;

    emit!(PricePublished {
        price_feed: feed.key(),
        price,
        publish_time: now,
    });
    Ok(())
}
