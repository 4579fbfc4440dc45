//! Call builders for the exchange and token contracts.
//!
//! Nothing in here touches the network, each builder ABI encodes one contract call into a
//! [`ContractCall`] that a [`crate::ledger::LedgerClient`] can either simulate or submit.
use crate::error::ExchangeError;
use crate::types::AmountWei;
use clarity::abi::{encode_call, AbiToken};
use clarity::{Address, Uint256};

pub const TOTAL_SUPPLY: &str = "totalSupply()";
pub const GET_RESERVE: &str = "getReserve()";
pub const BALANCE_OF: &str = "balanceOf(address)";
pub const GET_AMOUNT_OF_TOKENS: &str = "getAmountOfTokens(uint256,uint256,uint256)";
pub const ADD_LIQUIDITY: &str = "addLiquidity(uint256)";
pub const REMOVE_LIQUIDITY: &str = "removeLiquidity(uint256)";
pub const ETH_TO_CRYPTO_DEV_TOKEN: &str = "ethToCryptoDevToken(uint256)";
pub const CRYPTO_DEV_TOKEN_TO_ETH: &str = "cryptoDevTokenToEth(uint256,uint256)";
pub const APPROVE: &str = "approve(address,uint256)";

/// A fully encoded contract call, `value` is the ether attached to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub to: Address,
    pub signature: &'static str,
    pub data: Vec<u8>,
    pub value: AmountWei,
}

impl ContractCall {
    fn new(
        to: Address,
        signature: &'static str,
        tokens: &[AbiToken],
        value: AmountWei,
    ) -> Result<ContractCall, ExchangeError> {
        let data = encode_call(signature, tokens)?;
        trace!("encoded {} for {} as {:02X?}", signature, to, data);
        Ok(ContractCall {
            to,
            signature,
            data,
            value,
        })
    }

    pub fn is_payable(&self) -> bool {
        self.value != Uint256::from(0u8)
    }
}

/// The AMM exchange contract, which is also the ERC20 LP token for its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeContract {
    address: Address,
}

impl ExchangeContract {
    pub fn new(address: Address) -> Self {
        ExchangeContract { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Total supply of LP tokens
    pub fn total_supply(&self) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(self.address, TOTAL_SUPPLY, &[], 0u8.into())
    }

    /// The exchange's Crypto Dev token reserve, the ether reserve is just the contract balance
    pub fn get_reserve(&self) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(self.address, GET_RESERVE, &[], 0u8.into())
    }

    /// LP token balance of `owner`
    pub fn balance_of(&self, owner: Address) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(self.address, BALANCE_OF, &[owner.into()], 0u8.into())
    }

    /// Asks the contract how much of the output asset `input_amount` buys given the reserves,
    /// the fee and the pricing curve are applied on chain
    pub fn get_amount_of_tokens(
        &self,
        input_amount: AmountWei,
        input_reserve: AmountWei,
        output_reserve: AmountWei,
    ) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(
            self.address,
            GET_AMOUNT_OF_TOKENS,
            &[
                AbiToken::Uint(input_amount),
                AbiToken::Uint(input_reserve),
                AbiToken::Uint(output_reserve),
            ],
            0u8.into(),
        )
    }

    pub fn add_liquidity(
        &self,
        token_amount: AmountWei,
        ether_amount: AmountWei,
    ) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(
            self.address,
            ADD_LIQUIDITY,
            &[AbiToken::Uint(token_amount)],
            ether_amount,
        )
    }

    pub fn remove_liquidity(&self, lp_amount: AmountWei) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(
            self.address,
            REMOVE_LIQUIDITY,
            &[AbiToken::Uint(lp_amount)],
            0u8.into(),
        )
    }

    /// Swaps the attached `ether_in` for at least `min_tokens_out` Crypto Dev tokens
    pub fn eth_to_crypto_dev_token(
        &self,
        min_tokens_out: AmountWei,
        ether_in: AmountWei,
    ) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(
            self.address,
            ETH_TO_CRYPTO_DEV_TOKEN,
            &[AbiToken::Uint(min_tokens_out)],
            ether_in,
        )
    }

    /// Swaps `tokens_in` Crypto Dev tokens for at least `min_ether_out`, the exchange
    /// must already be approved to pull `tokens_in`
    pub fn crypto_dev_token_to_eth(
        &self,
        tokens_in: AmountWei,
        min_ether_out: AmountWei,
    ) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(
            self.address,
            CRYPTO_DEV_TOKEN_TO_ETH,
            &[AbiToken::Uint(tokens_in), AbiToken::Uint(min_ether_out)],
            0u8.into(),
        )
    }
}

/// The Crypto Dev ERC20 token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContract {
    address: Address,
}

impl TokenContract {
    pub fn new(address: Address) -> Self {
        TokenContract { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Grants `spender` an allowance of exactly `amount`
    pub fn approve(
        &self,
        spender: Address,
        amount: AmountWei,
    ) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(
            self.address,
            APPROVE,
            &[spender.into(), AbiToken::Uint(amount)],
            0u8.into(),
        )
    }

    pub fn balance_of(&self, owner: Address) -> Result<ContractCall, ExchangeError> {
        ContractCall::new(self.address, BALANCE_OF, &[owner.into()], 0u8.into())
    }
}

/// Reads a single `uint256` return value, `what` names the call for the error message
pub fn decode_uint256(response: &[u8], what: &str) -> Result<Uint256, ExchangeError> {
    match response.get(0..32) {
        Some(val) => Ok(Uint256::from_be_bytes(val)),
        None => Err(ExchangeError::BadResponse(format!(
            "{what} returned {} bytes, expected a uint256",
            response.len()
        ))),
    }
}
