use crate::error::ExchangeError;
use serde_json::Value;

/// One JSON-RPC 2.0 call, `id` is unique per [`super::HttpClient`]
#[derive(Serialize, Debug)]
pub struct Request<'a, T> {
    id: u64,
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
}

impl<'a, T> Request<'a, T> {
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Request {
            id,
            jsonrpc: "2.0",
            method,
            params,
        }
    }
}

/// The `error` member of a failed call. Reverts from `eth_call` carry the
/// ABI encoded revert reason in `data`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RpcFailure {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Outcome<R> {
    Failure { error: RpcFailure },
    Success { result: R },
}

#[derive(Deserialize, Debug, Clone)]
pub struct Response<R> {
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome<R>,
}

impl<R> Response<R> {
    pub fn into_result(self) -> Result<R, ExchangeError> {
        match self.outcome {
            Outcome::Success { result } => Ok(result),
            Outcome::Failure { error } => Err(ExchangeError::JsonRpcError {
                code: error.code,
                message: error.message,
                data: match error.data {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => String::new(),
                },
            }),
        }
    }
}

#[test]
fn test_request_envelope() {
    let req = Request::new(7, "eth_call", ("0x00".to_string(), "latest"));
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["id"], 7);
    assert_eq!(json["method"], "eth_call");
    assert_eq!(json["params"][1], "latest");
}

#[test]
fn test_receipt_pending_response() {
    use crate::types::TransactionReceipt;
    let response: Response<Option<TransactionReceipt>> =
        serde_json::from_str(r#"{"jsonrpc": "2.0", "result": null, "id": 3}"#).unwrap();
    assert_eq!(response.id.as_u64().unwrap(), 3);
    assert!(response.into_result().unwrap().is_none());
}

#[test]
fn test_revert_error_response() {
    use crate::error::ErrorKind;
    let response: Response<Value> = serde_json::from_str(
        r#"{"jsonrpc": "2.0", "error": {"code": 3, "message": "execution reverted: Invalid Reserves", "data": "0x08c379a0"}, "id": "1"}"#,
    )
    .unwrap();
    assert_eq!(response.id.as_str().unwrap(), "1");
    let err = response.into_result().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteCallFailure);
    match err {
        ExchangeError::JsonRpcError {
            code,
            message,
            data,
        } => {
            assert_eq!(code, 3);
            assert_eq!(message, "execution reverted: Invalid Reserves");
            assert_eq!(data, "0x08c379a0");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
