//! Off chain withdrawal quotes.
//!
//! When LP tokens are burned the exchange pays out the same fraction of each reserve as the
//! fraction of the LP supply being burned. The contract does this with integer math, so we do
//! too: multiply first, then floor divide, never touching floating point. The product is formed
//! in an arbitrary precision integer so that `reserve * lp_amount` can't overflow 256 bits.

use crate::error::ExchangeError;
use crate::types::{AmountWei, LiquidityWithdrawalRequest, QuoteResult, ReservePair};
use clarity::Uint256;
use num_bigint::BigUint;

/// Computes the ether and Crypto Dev token amounts returned for burning `lp_amount` LP tokens
///
/// `lp_amount` is not checked against `total_lp_supply`, a larger value simply produces a
/// proportionally larger quote. A zero supply means nobody has provided liquidity yet and is
/// reported as [`ExchangeError::DivisionByZero`].
pub fn compute_withdrawal_quote(
    lp_amount: AmountWei,
    base_reserve: AmountWei,
    paired_reserve: AmountWei,
    total_lp_supply: AmountWei,
) -> Result<QuoteResult, ExchangeError> {
    if total_lp_supply == Uint256::from(0u8) {
        return Err(ExchangeError::DivisionByZero);
    }
    let lp_amount = to_big(lp_amount);
    let total_lp_supply = to_big(total_lp_supply);

    let base_amount_out = from_big(to_big(base_reserve) * &lp_amount / &total_lp_supply)?;
    let paired_amount_out = from_big(to_big(paired_reserve) * &lp_amount / &total_lp_supply)?;

    Ok(QuoteResult {
        base_amount_out,
        paired_amount_out,
    })
}

/// Same as [`compute_withdrawal_quote`] for callers already holding the request and reserves
pub fn quote_withdrawal(
    request: &LiquidityWithdrawalRequest,
    reserves: &ReservePair,
    total_lp_supply: AmountWei,
) -> Result<QuoteResult, ExchangeError> {
    compute_withdrawal_quote(
        request.lp_amount,
        reserves.base_reserve,
        reserves.paired_reserve,
        total_lp_supply,
    )
}

fn to_big(value: Uint256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes())
}

fn from_big(value: BigUint) -> Result<Uint256, ExchangeError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ExchangeError::InvalidInput(format!(
            "withdrawal quote of {value} does not fit in a uint256"
        )));
    }
    Ok(Uint256::from_be_bytes(&bytes))
}
