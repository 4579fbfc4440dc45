//! Exchange operations: reads, quotes and the transaction wrappers.
use crate::config::ExchangeConfig;
use crate::contract::{decode_uint256, ExchangeContract, TokenContract};
use crate::error::ExchangeError;
use crate::ledger::LedgerClient;
use crate::quote::compute_withdrawal_quote;
use crate::swap::{SwapOutcome, SwapSequence};
use crate::types::{AmountWei, QuoteResult, ReservePair, SwapDirection, TransactionReceipt};
use clarity::Address;

/// A handle on one deployed exchange/token pair, backed by some ledger.
///
/// Every method is a single independent sequence of remote calls. The handle holds no mutable
/// state, so nothing stops a caller from issuing the same swap twice while the first one is
/// still pending; deduplicating that is up to the caller.
pub struct Exchange<'a, L: LedgerClient + ?Sized> {
    ledger: &'a L,
    config: ExchangeConfig,
    exchange: ExchangeContract,
    token: TokenContract,
}

impl<'a, L: LedgerClient + ?Sized> Exchange<'a, L> {
    pub fn new(ledger: &'a L, config: ExchangeConfig) -> Self {
        Exchange {
            ledger,
            config,
            exchange: ExchangeContract::new(config.exchange_address),
            token: TokenContract::new(config.token_address),
        }
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Total supply of LP tokens
    pub async fn get_lp_total_supply(&self) -> Result<AmountWei, ExchangeError> {
        let response = self.ledger.call(&self.exchange.total_supply()?).await?;
        decode_uint256(&response, "totalSupply()")
    }

    /// LP token balance of `owner`
    pub async fn get_lp_balance(&self, owner: Address) -> Result<AmountWei, ExchangeError> {
        let response = self.ledger.call(&self.exchange.balance_of(owner)?).await?;
        decode_uint256(&response, "exchange balanceOf(address)")
    }

    /// Crypto Dev token balance of `owner`
    pub async fn get_token_balance(&self, owner: Address) -> Result<AmountWei, ExchangeError> {
        let response = self.ledger.call(&self.token.balance_of(owner)?).await?;
        decode_uint256(&response, "token balanceOf(address)")
    }

    /// Current pool reserves, the ether reserve is the exchange contract's own balance
    pub async fn get_reserves(&self) -> Result<ReservePair, ExchangeError> {
        let base_reserve = self.ledger.balance(self.exchange.address()).await?;
        let response = self.ledger.call(&self.exchange.get_reserve()?).await?;
        let paired_reserve = decode_uint256(&response, "getReserve()")?;
        trace!(
            "reserves are {} wei and {} CD",
            base_reserve,
            paired_reserve
        );
        Ok(ReservePair {
            base_reserve,
            paired_reserve,
        })
    }

    /// How much ether and how many Crypto Dev tokens burning `lp_amount` LP tokens would
    /// return, given the reserves the caller already holds. Reads the LP supply from the chain.
    pub async fn get_tokens_after_remove(
        &self,
        lp_amount: AmountWei,
        reserves: &ReservePair,
    ) -> Result<QuoteResult, ExchangeError> {
        let total_supply = self.get_lp_total_supply().await?;
        compute_withdrawal_quote(
            lp_amount,
            reserves.base_reserve,
            reserves.paired_reserve,
            total_supply,
        )
    }

    /// Asks the exchange how much of the other asset `input_amount` buys. The reserves are
    /// handed to `getAmountOfTokens` in (input, output) order for `direction`.
    pub async fn quote_swap(
        &self,
        input_amount: AmountWei,
        direction: SwapDirection,
        reserves: &ReservePair,
    ) -> Result<AmountWei, ExchangeError> {
        let (input_reserve, output_reserve) = direction.order_reserves(reserves);
        let call = self
            .exchange
            .get_amount_of_tokens(input_amount, input_reserve, output_reserve)?;
        let response = self.ledger.call(&call).await?;
        let amount_out = decode_uint256(&response, "getAmountOfTokens()")?;
        debug!(
            "{} for {} quoted at {}",
            direction, input_amount, amount_out
        );
        Ok(amount_out)
    }

    /// Burns `lp_amount` LP tokens and waits for the removal to be mined
    pub async fn remove_liquidity(
        &self,
        lp_amount: AmountWei,
    ) -> Result<TransactionReceipt, ExchangeError> {
        let call = self.exchange.remove_liquidity(lp_amount)?;
        self.ledger.submit_and_confirm(&call).await
    }

    /// Approves the exchange for `token_amount` Crypto Dev tokens, then deposits them along
    /// with `ether_amount` wei
    pub async fn add_liquidity(
        &self,
        token_amount: AmountWei,
        ether_amount: AmountWei,
    ) -> Result<SwapOutcome, ExchangeError> {
        let approval = self
            .token
            .approve(self.exchange.address(), token_amount)?;
        let deposit = self.exchange.add_liquidity(token_amount, ether_amount)?;
        SwapSequence::with_approval(approval, deposit)
            .run(self.ledger)
            .await
    }

    /// Builds the sequence `swap_tokens` would run, without running it
    pub fn plan_swap(
        &self,
        amount_in: AmountWei,
        expected_amount_out: AmountWei,
        direction: SwapDirection,
    ) -> Result<SwapSequence, ExchangeError> {
        match direction {
            SwapDirection::BaseIn => {
                let swap = self
                    .exchange
                    .eth_to_crypto_dev_token(expected_amount_out, amount_in)?;
                Ok(SwapSequence::direct(swap))
            }
            SwapDirection::PairedIn => {
                let approval = self.token.approve(self.exchange.address(), amount_in)?;
                let swap = self
                    .exchange
                    .crypto_dev_token_to_eth(amount_in, expected_amount_out)?;
                Ok(SwapSequence::with_approval(approval, swap))
            }
        }
    }

    /// Swaps `amount_in` of the input asset for at least `expected_amount_out` of the other.
    ///
    /// Ether in is one transaction carrying `amount_in` as value. Tokens in is an approval
    /// followed by the swap, the swap is never submitted unless the approval confirmed.
    pub async fn swap_tokens(
        &self,
        amount_in: AmountWei,
        expected_amount_out: AmountWei,
        direction: SwapDirection,
    ) -> Result<SwapOutcome, ExchangeError> {
        info!(
            "swapping {} {} for at least {}",
            amount_in, direction, expected_amount_out
        );
        self.plan_swap(amount_in, expected_amount_out, direction)?
            .run(self.ledger)
            .await
    }
}
