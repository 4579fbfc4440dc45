//! # Introduction
//! An async client for the Crypto Dev token exchange, a two-asset automated market maker
//! deployed as an Exchange contract (which is also the LP token) paired with the Crypto Dev
//! ERC20 token.
//!
//! The pricing math lives on chain. This crate encodes calls against the exchange, submits and
//! confirms transactions through a [`ledger::LedgerClient`], and computes the one thing that is
//! done off chain: how much of each reserve an LP withdrawal returns.
//!
//! ## Getting started
//! ```rust,no_run
//! use cryptodev_exchange::config::ExchangeConfig;
//! use cryptodev_exchange::exchange::Exchange;
//! use cryptodev_exchange::ledger::Web3Ledger;
//! use cryptodev_exchange::types::SwapDirection;
//! use clarity::{Address, Uint256};
//! use std::time::Duration;
//!
//! let config = ExchangeConfig::new(
//!     Address::parse_and_validate("0x1111111111111111111111111111111111111111").unwrap(),
//!     Address::parse_and_validate("0x2222222222222222222222222222222222222222").unwrap(),
//! );
//! let signer = Address::parse_and_validate("0x3333333333333333333333333333333333333333").unwrap();
//! let ledger = Web3Ledger::new("http://localhost:8545", Duration::from_secs(30))
//!     .with_signer(signer);
//! let exchange = Exchange::new(&ledger, config);
//!
//! actix_rt::System::new().block_on(async move {
//!     let reserves = exchange.get_reserves().await.unwrap();
//!     let amount_in: Uint256 = 1_000_000_000_000_000u64.into();
//!     let out = exchange
//!         .quote_swap(amount_in, SwapDirection::BaseIn, &reserves)
//!         .await
//!         .unwrap();
//!     exchange
//!         .swap_tokens(amount_in, out, SwapDirection::BaseIn)
//!         .await
//!         .unwrap();
//! });
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;

pub mod config;
pub mod contract;
pub mod error;
pub mod exchange;
pub mod jsonrpc;
pub mod ledger;
pub mod quote;
pub mod swap;
pub mod types;

pub use error::{ErrorKind, ExchangeError};
pub use exchange::Exchange;
pub use quote::compute_withdrawal_quote;
pub use types::{AmountWei, QuoteResult, ReservePair, SwapDirection};
