use super::LedgerClient;
use crate::config::{LedgerConfig, DEFAULT_CONFIRMATION_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS};
use crate::contract::ContractCall;
use crate::error::ExchangeError;
use crate::jsonrpc::HttpClient;
use crate::types::{AmountWei, Data, TransactionReceipt, TransactionRequest, TxHash};
use async_trait::async_trait;
use clarity::{Address, Uint256};
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// A [`LedgerClient`] speaking JSON-RPC to an Ethereum node.
///
/// Transactions are sent with `eth_sendTransaction`, so signing happens wherever the node's
/// accounts live (a wallet, a dev chain's unlocked accounts). Without a signer the ledger is
/// a read only provider.
#[derive(Clone)]
pub struct Web3Ledger {
    url: String,
    jsonrpc_client: HttpClient,
    timeout: Duration,
    signer: Option<Address>,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl Web3Ledger {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            jsonrpc_client: HttpClient::new(url),
            timeout,
            url: url.to_string(),
            signer: None,
            confirmation_timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        let ledger = Web3Ledger::new(&config.url, config.request_timeout())
            .with_confirmation_timeout(config.confirmation_timeout())
            .with_poll_interval(config.poll_interval());
        match config.signer {
            Some(signer) => ledger.with_signer(signer),
            None => ledger,
        }
    }

    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn get_signer(&self) -> Option<Address> {
        self.signer
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_url(&self) -> String {
        self.url.clone()
    }

    pub async fn eth_call(&self, transaction: TransactionRequest) -> Result<Data, ExchangeError> {
        self.jsonrpc_client
            .request_method("eth_call", (transaction, "latest"), self.timeout)
            .await
    }

    pub async fn eth_get_balance(&self, address: Address) -> Result<Uint256, ExchangeError> {
        self.jsonrpc_client
            .request_method(
                "eth_getBalance",
                vec![address.to_string(), "latest".to_string()],
                self.timeout,
            )
            .await
    }

    pub async fn eth_send_transaction(
        &self,
        transaction: TransactionRequest,
    ) -> Result<Uint256, ExchangeError> {
        self.jsonrpc_client
            .request_method("eth_sendTransaction", vec![transaction], self.timeout)
            .await
    }

    pub async fn eth_get_transaction_receipt(
        &self,
        hash: Uint256,
    ) -> Result<Option<TransactionReceipt>, ExchangeError> {
        self.jsonrpc_client
            .request_method(
                "eth_getTransactionReceipt",
                vec![format!("{hash:#066x}")],
                self.timeout,
            )
            .await
    }

    /// Polls for the receipt of `tx_hash` until it lands in a block or the
    /// confirmation timeout passes
    pub async fn wait_for_transaction(
        &self,
        tx_hash: Uint256,
    ) -> Result<TransactionReceipt, ExchangeError> {
        let start = Instant::now();
        loop {
            sleep(self.poll_interval).await;
            if let Some(receipt) = self.eth_get_transaction_receipt(tx_hash).await? {
                if receipt.is_mined() {
                    return check_receipt(tx_hash, receipt);
                }
            }

            if Instant::now() - start > self.confirmation_timeout {
                return Err(ExchangeError::TransactionTimeout {
                    tx_hash,
                    waited: self.confirmation_timeout,
                });
            }
        }
    }
}

fn check_receipt(
    tx_hash: Uint256,
    receipt: TransactionReceipt,
) -> Result<TransactionReceipt, ExchangeError> {
    if receipt.succeeded() {
        Ok(receipt)
    } else {
        warn!(
            "transaction {:#066x} reverted in block {:?}",
            tx_hash, receipt.block_number
        );
        Err(ExchangeError::TransactionReverted { tx_hash })
    }
}

fn to_request(from: Option<Address>, call: &ContractCall) -> TransactionRequest {
    TransactionRequest {
        from,
        to: call.to,
        value: if call.is_payable() {
            Some(call.value.into())
        } else {
            None
        },
        data: Some(call.data.clone().into()),
    }
}

#[async_trait(?Send)]
impl LedgerClient for Web3Ledger {
    async fn call(&self, call: &ContractCall) -> Result<Vec<u8>, ExchangeError> {
        let bytes = self.eth_call(to_request(self.signer, call)).await?;
        trace!("{} returned {:02X?}", call.signature, bytes.0);
        Ok(bytes.0)
    }

    async fn balance(&self, address: Address) -> Result<AmountWei, ExchangeError> {
        self.eth_get_balance(address).await
    }

    async fn submit(&self, call: &ContractCall) -> Result<TxHash, ExchangeError> {
        let signer = self.signer.ok_or(ExchangeError::NoSigner)?;
        self.eth_send_transaction(to_request(Some(signer), call))
            .await
    }

    async fn await_confirmation(
        &self,
        tx_hash: TxHash,
    ) -> Result<TransactionReceipt, ExchangeError> {
        self.wait_for_transaction(tx_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::ExchangeContract;
    use crate::error::ErrorKind;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::{Arc, Mutex};
    use std::thread;

    const MINED: &str = r#"{
        "transactionHash": "0x01",
        "blockHash": "0x02",
        "blockNumber": "0x10",
        "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
        "status": "0x1"
    }"#;

    const REVERTED: &str = r#"{
        "transactionHash": "0x01",
        "blockHash": "0x02",
        "blockNumber": "0x10",
        "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
        "status": "0x0"
    }"#;

    /// Reads one HTTP request and returns its body
    fn read_body(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let len: usize = text[..end]
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .and_then(|v| v.trim().parse().ok())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    return text[end + 4..].to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serves one JSON-RPC `result` per request, in order, repeating the last one.
    /// Returns the url and the request bodies seen so far.
    fn serve(results: Vec<&'static str>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let requests = seen.clone();
        thread::spawn(move || {
            for (i, stream) in listener.incoming().enumerate() {
                let mut stream = match stream {
                    Ok(stream) => stream,
                    Err(_) => return,
                };
                requests.lock().unwrap().push(read_body(&mut stream));
                let result = results[i.min(results.len() - 1)];
                let body = format!(r#"{{"jsonrpc":"2.0","id":1,"result":{result}}}"#);
                let _ = write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
            }
        });
        (url, seen)
    }

    fn polling_ledger(url: &str) -> Web3Ledger {
        Web3Ledger::new(url, Duration::from_secs(5))
            .with_poll_interval(Duration::from_millis(10))
            .with_confirmation_timeout(Duration::from_millis(300))
    }

    fn exchange() -> ExchangeContract {
        ExchangeContract::new(
            Address::parse_and_validate("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap(),
        )
    }

    #[test]
    fn test_request_omits_zero_value() {
        let call = exchange().total_supply().unwrap();
        let req = to_request(None, &call);
        assert_eq!(req.value, None);
        assert_eq!(req.from, None);
        let call = exchange()
            .eth_to_crypto_dev_token(1u8.into(), 10u8.into())
            .unwrap();
        let req = to_request(None, &call);
        assert_eq!(req.value, Some(Uint256::from(10u8).into()));
    }

    #[test]
    fn test_reverted_receipt_is_remote_failure() {
        let receipt: TransactionReceipt = serde_json::from_str(
            r#"{
                "transactionHash": "0x01",
                "blockHash": "0x02",
                "blockNumber": "0x10",
                "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
                "to": null,
                "gasUsed": "0x5208",
                "status": "0x0"
            }"#,
        )
        .unwrap();
        let err = check_receipt(1u8.into(), receipt.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);

        let mut ok = receipt;
        ok.status = Some("0x1".to_string());
        assert!(check_receipt(1u8.into(), ok).is_ok());
    }

    #[test]
    fn test_read_only_ledger_cannot_submit() {
        let runner = actix_rt::System::new();
        let ledger = Web3Ledger::new("http://localhost:8545", Duration::from_secs(1));
        let call = exchange().remove_liquidity(1u8.into()).unwrap();
        let res = runner.block_on(async move { ledger.submit(&call).await });
        assert_eq!(res.unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_from_config() {
        let _runner = actix_rt::System::new();
        let mut config = LedgerConfig::new("http://localhost:8545");
        config.signer = Some(exchange().address());
        config.poll_interval_ms = 50;
        let ledger = Web3Ledger::from_config(&config);
        assert_eq!(ledger.get_signer(), Some(exchange().address()));
        assert_eq!(ledger.poll_interval, Duration::from_millis(50));
        assert_eq!(ledger.get_url(), "http://localhost:8545");
    }

    #[test]
    fn test_wait_polls_until_mined() {
        let (url, seen) = serve(vec!["null", "null", MINED]);
        let runner = actix_rt::System::new();
        let ledger = polling_ledger(&url);
        let receipt = runner
            .block_on(async move { ledger.wait_for_transaction(1u8.into()).await })
            .unwrap();
        assert_eq!(receipt.block_number, Some(16u8.into()));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("eth_getTransactionReceipt"));
        assert!(seen[0].contains(
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        ));
    }

    #[test]
    fn test_wait_reports_revert() {
        let (url, _seen) = serve(vec!["null", REVERTED]);
        let runner = actix_rt::System::new();
        let ledger = polling_ledger(&url);
        let err = runner
            .block_on(async move { ledger.wait_for_transaction(1u8.into()).await })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
        assert!(matches!(err, ExchangeError::TransactionReverted { .. }));
    }

    #[test]
    fn test_wait_gives_up_after_confirmation_timeout() {
        let (url, seen) = serve(vec!["null"]);
        let runner = actix_rt::System::new();
        let ledger = polling_ledger(&url);
        let err = runner
            .block_on(async move { ledger.wait_for_transaction(1u8.into()).await })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
        match err {
            ExchangeError::TransactionTimeout { waited, .. } => {
                assert_eq!(waited, Duration::from_millis(300))
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(seen.lock().unwrap().len() > 1);
    }

    #[test]
    fn test_submit_and_confirm_over_http() {
        let (url, seen) = serve(vec![
            r#""0x00000000000000000000000000000000000000000000000000000000000000aa""#,
            "null",
            MINED,
        ]);
        let runner = actix_rt::System::new();
        let ledger = polling_ledger(&url).with_signer(exchange().address());
        let call = exchange()
            .eth_to_crypto_dev_token(1u8.into(), 255u8.into())
            .unwrap();
        let receipt = runner
            .block_on(async move { ledger.submit_and_confirm(&call).await })
            .unwrap();
        assert!(receipt.succeeded());
        let seen = seen.lock().unwrap();
        assert!(seen[0].contains("eth_sendTransaction"));
        assert!(seen[0].contains(r#""value":"0xff""#));
        assert!(seen[1].contains("eth_getTransactionReceipt"));
        assert!(seen[1].contains("00aa"));
    }
}
