//! Multi transaction sequences against the exchange.
//!
//! Selling Crypto Dev tokens (and adding liquidity) needs an ERC20 allowance first, so the
//! exchange can pull the tokens. That makes the operation two transactions which must be mined
//! in order. [`SwapSequence`] models it as an explicit state machine,
//! `PendingApproval -> PendingSwap -> Done`, where each stage submits one transaction and waits
//! for its first confirmation before moving on. Sequences without an approval start at
//! `PendingSwap`.
//!
//! A failed stage leaves the sequence where it was. Nothing that already confirmed is undone.
use crate::contract::ContractCall;
use crate::error::ExchangeError;
use crate::ledger::LedgerClient;
use crate::types::TransactionReceipt;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapStage {
    /// The allowance grant has not been confirmed yet
    PendingApproval,
    /// The exchange call itself has not been confirmed yet
    PendingSwap,
    Done,
}

impl fmt::Display for SwapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapStage::PendingApproval => write!(f, "approval"),
            SwapStage::PendingSwap => write!(f, "swap"),
            SwapStage::Done => write!(f, "done"),
        }
    }
}

/// Receipts of a completed sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub approval: Option<TransactionReceipt>,
    pub swap: TransactionReceipt,
}

#[derive(Debug, Clone)]
pub struct SwapSequence {
    stage: SwapStage,
    approval: Option<ContractCall>,
    swap: ContractCall,
    approval_receipt: Option<TransactionReceipt>,
    swap_receipt: Option<TransactionReceipt>,
}

impl SwapSequence {
    /// A single transaction, nothing to approve
    pub fn direct(swap: ContractCall) -> Self {
        SwapSequence {
            stage: SwapStage::PendingSwap,
            approval: None,
            swap,
            approval_receipt: None,
            swap_receipt: None,
        }
    }

    /// `approval` must be confirmed before `swap` is submitted
    pub fn with_approval(approval: ContractCall, swap: ContractCall) -> Self {
        SwapSequence {
            stage: SwapStage::PendingApproval,
            approval: Some(approval),
            swap,
            approval_receipt: None,
            swap_receipt: None,
        }
    }

    pub fn stage(&self) -> SwapStage {
        self.stage
    }

    /// Runs the current stage to confirmation and moves to the next one. On failure the stage
    /// is left unchanged so the caller can see, and if it wants retry, where things stopped.
    pub async fn advance<L: LedgerClient + ?Sized>(
        &mut self,
        ledger: &L,
    ) -> Result<SwapStage, ExchangeError> {
        let stage = self.stage;
        match stage {
            SwapStage::PendingApproval => {
                if let Some(approval) = &self.approval {
                    let receipt = confirm_stage(ledger, stage, approval).await?;
                    self.approval_receipt = Some(receipt);
                }
                self.stage = SwapStage::PendingSwap;
            }
            SwapStage::PendingSwap => {
                let receipt = confirm_stage(ledger, stage, &self.swap).await?;
                self.swap_receipt = Some(receipt);
                self.stage = SwapStage::Done;
            }
            SwapStage::Done => {}
        }
        debug!("{} sequence moved {} -> {}", self.swap.signature, stage, self.stage);
        Ok(self.stage)
    }

    /// Drives the sequence until it is done
    pub async fn run<L: LedgerClient + ?Sized>(
        mut self,
        ledger: &L,
    ) -> Result<SwapOutcome, ExchangeError> {
        while self.stage != SwapStage::Done {
            self.advance(ledger).await?;
        }
        match self.swap_receipt {
            Some(swap) => Ok(SwapOutcome {
                approval: self.approval_receipt,
                swap,
            }),
            None => Err(ExchangeError::ContractCallError(format!(
                "{} finished without a receipt",
                self.swap.signature
            ))),
        }
    }
}

async fn confirm_stage<L: LedgerClient + ?Sized>(
    ledger: &L,
    stage: SwapStage,
    call: &ContractCall,
) -> Result<TransactionReceipt, ExchangeError> {
    match ledger.submit_and_confirm(call).await {
        Ok(receipt) => Ok(receipt),
        Err(e) => {
            error!("{} failed during {}: {}", call.signature, stage, e);
            Err(ExchangeError::SwapFailed {
                stage,
                source: Box::new(e),
            })
        }
    }
}
