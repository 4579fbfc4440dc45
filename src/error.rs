use crate::swap::SwapStage;
use awc::error::SendRequestError as ActixError;
use clarity::Error as ClarityError;
use clarity::Uint256;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::time::Duration;

/// Coarse classification of an [`ExchangeError`], the three outcomes a caller has to
/// tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A local quote was attempted against a zero LP supply, no liquidity exists yet.
    DivisionByZero,
    /// Transport, JSON-RPC or contract level failure. Never retried locally.
    RemoteCallFailure,
    /// The caller or the configuration handed us something unusable.
    InvalidInput,
}

#[derive(Debug)]
pub enum ExchangeError {
    DivisionByZero,
    InvalidInput(String),
    BadConfig(String),
    NoSigner,
    BadResponse(String),
    FailedToSend(ActixError),
    JsonRpcError {
        code: i64,
        message: String,
        data: String,
    },
    ClarityError(ClarityError),
    ContractCallError(String),
    TransactionReverted {
        tx_hash: Uint256,
    },
    TransactionTimeout {
        tx_hash: Uint256,
        waited: Duration,
    },
    SwapFailed {
        stage: SwapStage,
        source: Box<ExchangeError>,
    },
}

impl ExchangeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::DivisionByZero => ErrorKind::DivisionByZero,
            ExchangeError::InvalidInput(_)
            | ExchangeError::BadConfig(_)
            | ExchangeError::NoSigner
            | ExchangeError::ClarityError(_) => ErrorKind::InvalidInput,
            ExchangeError::BadResponse(_)
            | ExchangeError::FailedToSend(_)
            | ExchangeError::JsonRpcError { .. }
            | ExchangeError::ContractCallError(_)
            | ExchangeError::TransactionReverted { .. }
            | ExchangeError::TransactionTimeout { .. } => ErrorKind::RemoteCallFailure,
            ExchangeError::SwapFailed { source, .. } => source.kind(),
        }
    }

    /// The stage a multi step sequence was in when it failed, if this error came from one
    pub fn failed_stage(&self) -> Option<SwapStage> {
        match self {
            ExchangeError::SwapFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<ClarityError> for ExchangeError {
    fn from(error: ClarityError) -> Self {
        ExchangeError::ClarityError(error)
    }
}

impl From<ActixError> for ExchangeError {
    fn from(error: ActixError) -> Self {
        ExchangeError::FailedToSend(error)
    }
}

impl From<std::io::Error> for ExchangeError {
    fn from(error: std::io::Error) -> Self {
        ExchangeError::BadConfig(format!("{error}"))
    }
}

impl Display for ExchangeError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ExchangeError::DivisionByZero => {
                write!(f, "LP token supply is zero, no liquidity to withdraw")
            }
            ExchangeError::InvalidInput(val) => write!(f, "Invalid input {val}"),
            ExchangeError::BadConfig(val) => write!(f, "Bad exchange config {val}"),
            ExchangeError::NoSigner => {
                write!(f, "Ledger has no signer account, cannot submit transactions")
            }
            ExchangeError::BadResponse(val) => write!(f, "Web3 bad response {val}"),
            ExchangeError::FailedToSend(val) => write!(f, "Web3 Failed to send {val}"),
            ExchangeError::JsonRpcError {
                code,
                message,
                data,
            } => write!(
                f,
                "Web3 Response error code {code} message {message} data {data:?}"
            ),
            ExchangeError::ClarityError(val) => write!(f, "ClarityError {val}"),
            ExchangeError::ContractCallError(val) => {
                write!(f, "Error performing exchange contract call {val}")
            }
            ExchangeError::TransactionReverted { tx_hash } => {
                write!(f, "Transaction {tx_hash:#066x} reverted")
            }
            ExchangeError::TransactionTimeout { tx_hash, waited } => write!(
                f,
                "Transaction {tx_hash:#066x} was not confirmed after {waited:?}"
            ),
            ExchangeError::SwapFailed { stage, source } => {
                write!(f, "Failed during {stage}: {source}")
            }
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExchangeError::ClarityError(inner) => Some(inner),
            ExchangeError::FailedToSend(inner) => Some(inner),
            ExchangeError::SwapFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

#[test]
fn test_error_kinds() {
    assert_eq!(
        ExchangeError::DivisionByZero.kind(),
        ErrorKind::DivisionByZero
    );
    assert_eq!(ExchangeError::NoSigner.kind(), ErrorKind::InvalidInput);
    assert_eq!(
        ExchangeError::TransactionReverted {
            tx_hash: 1u8.into()
        }
        .kind(),
        ErrorKind::RemoteCallFailure
    );
    let wrapped = ExchangeError::SwapFailed {
        stage: SwapStage::PendingApproval,
        source: Box::new(ExchangeError::ContractCallError("nope".to_string())),
    };
    assert_eq!(wrapped.kind(), ErrorKind::RemoteCallFailure);
    assert_eq!(wrapped.failed_stage(), Some(SwapStage::PendingApproval));
    assert!(wrapped.source().is_some());
}

#[test]
fn test_send_failure_keeps_its_source() {
    let err = ExchangeError::FailedToSend(ActixError::Timeout);
    assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
    assert!(err.source().is_some());
}

#[test]
fn test_timeout_reports_sub_second_bound() {
    let err = ExchangeError::TransactionTimeout {
        tx_hash: 1u8.into(),
        waited: Duration::from_millis(250),
    };
    assert!(err.to_string().ends_with("was not confirmed after 250ms"));
}
