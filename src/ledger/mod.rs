//! The seam between exchange operations and the chain.
//!
//! [`LedgerClient`] is everything the exchange needs from a node: read only contract calls,
//! balances, submitting a transaction and blocking until it is mined. [`Web3Ledger`] is the
//! JSON-RPC implementation, tests substitute their own.
use crate::contract::ContractCall;
use crate::error::ExchangeError;
use crate::types::{AmountWei, TransactionReceipt, TxHash};
use async_trait::async_trait;
use clarity::Address;

mod web3;

pub use web3::Web3Ledger;

#[async_trait(?Send)]
pub trait LedgerClient {
    /// Executes `call` against the latest block without creating a transaction
    async fn call(&self, call: &ContractCall) -> Result<Vec<u8>, ExchangeError>;

    /// Ether balance of `address`
    async fn balance(&self, address: Address) -> Result<AmountWei, ExchangeError>;

    /// Submits `call` as a transaction from the ledger's signer and returns its hash
    /// without waiting for it to be mined
    async fn submit(&self, call: &ContractCall) -> Result<TxHash, ExchangeError>;

    /// Blocks until `tx_hash` is mined, a reverted transaction is an error
    async fn await_confirmation(&self, tx_hash: TxHash)
        -> Result<TransactionReceipt, ExchangeError>;

    async fn submit_and_confirm(
        &self,
        call: &ContractCall,
    ) -> Result<TransactionReceipt, ExchangeError> {
        let tx_hash = self.submit(call).await?;
        debug!(
            "submitted {} to {} as {:#066x}",
            call.signature, call.to, tx_hash
        );
        let receipt = self.await_confirmation(tx_hash).await?;
        info!("{} confirmed as {:#066x}", call.signature, tx_hash);
        Ok(receipt)
    }
}
