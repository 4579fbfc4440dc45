use clarity::utils::{bytes_to_hex_str, hex_str_to_bytes};
use clarity::{Address, Uint256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Deref;

/// An exact quantity of an asset in its smallest indivisible unit (wei for ether)
pub type AmountWei = Uint256;

/// Handle of a submitted transaction, the hash returned by `eth_sendTransaction`
pub type TxHash = Uint256;

/// Which asset is handed to the exchange in a swap. The base asset is ether, the
/// paired asset is the Crypto Dev token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    BaseIn,
    PairedIn,
}

impl SwapDirection {
    /// Orders the pool reserves as (input reserve, output reserve) for this direction
    pub fn order_reserves(self, reserves: &ReservePair) -> (AmountWei, AmountWei) {
        match self {
            SwapDirection::BaseIn => (reserves.base_reserve, reserves.paired_reserve),
            SwapDirection::PairedIn => (reserves.paired_reserve, reserves.base_reserve),
        }
    }
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapDirection::BaseIn => write!(f, "ETH -> CD"),
            SwapDirection::PairedIn => write!(f, "CD -> ETH"),
        }
    }
}

/// Current holdings of the pool, ether and Crypto Dev tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservePair {
    pub base_reserve: AmountWei,
    pub paired_reserve: AmountWei,
}

impl ReservePair {
    pub fn new(base_reserve: AmountWei, paired_reserve: AmountWei) -> Self {
        ReservePair {
            base_reserve,
            paired_reserve,
        }
    }
}

/// A request to burn `lp_amount` LP tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityWithdrawalRequest {
    pub lp_amount: AmountWei,
}

/// The payout expected from burning some amount of LP tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteResult {
    pub base_amount_out: AmountWei,
    pub paired_amount_out: AmountWei,
}

/// Serializes slice of data as "UNFORMATTED DATA" format required
/// by Ethereum JSONRPC API.
///
/// See more https://ethereum.org/en/developers/docs/apis/json-rpc/#hex-encoding
pub fn data_serialize<S>(x: &[u8], s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format!("0x{}", bytes_to_hex_str(x)))
}

/// Deserializes "UNFORMATTED DATA" back into bytes
pub fn data_deserialize<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    hex_str_to_bytes(&s).map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq, Hash)]
pub struct Data(
    #[serde(
        serialize_with = "data_serialize",
        deserialize_with = "data_deserialize"
    )]
    pub Vec<u8>,
);

impl Deref for Data {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl From<Vec<u8>> for Data {
    fn from(v: Vec<u8>) -> Self {
        Data(v)
    }
}

/// A quantity serialized without leading zeroes, which is what nodes expect
/// for values in a transaction request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpaddedHex(pub Uint256);

impl Serialize for UnpaddedHex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:#x}", self.0))
    }
}

impl From<Uint256> for UnpaddedHex {
    fn from(v: Uint256) -> Self {
        UnpaddedHex(v)
    }
}

/// Call object for `eth_call` and `eth_sendTransaction`. Gas and fees are left out,
/// the node fills them in.
#[derive(Serialize, Clone, Eq, PartialEq, Debug)]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<UnpaddedHex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

/// As received by getTransactionReceipt, trimmed to the fields this crate reads. Other
/// members of the node's response are ignored.
///
/// See more: https://ethereum.org/en/developers/docs/apis/json-rpc/#eth_gettransactionreceipt
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: Data,
    /// null while pending
    #[serde(rename = "blockHash")]
    pub block_hash: Option<Data>,
    /// null while pending
    #[serde(rename = "blockNumber")]
    pub block_number: Option<Uint256>,
    pub from: Address,
    /// either 1 (success) or 0 (failure), absent before Byzantium
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn is_mined(&self) -> bool {
        self.block_number.is_some()
    }

    /// Pre Byzantium receipts carry no status and are treated as successful
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00") | Some("0"))
    }
}

#[test]
fn test_order_reserves() {
    let reserves = ReservePair::new(10u8.into(), 20u8.into());
    assert_eq!(
        SwapDirection::BaseIn.order_reserves(&reserves),
        (10u8.into(), 20u8.into())
    );
    assert_eq!(
        SwapDirection::PairedIn.order_reserves(&reserves),
        (20u8.into(), 10u8.into())
    );
}

#[test]
fn test_transaction_request_serialization() {
    let to = Address::parse_and_validate("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
    let req = TransactionRequest {
        from: None,
        to,
        value: Some(Uint256::from(255u16).into()),
        data: Some(vec![0xde, 0xad].into()),
    };
    let json = serde_json::to_value(&req).unwrap();
    assert!(json.get("from").is_none());
    assert_eq!(json["value"], "0xff");
    assert_eq!(json["data"], "0xdead");
}

#[test]
fn test_receipt_status() {
    let receipt: TransactionReceipt = serde_json::from_str(
        r#"{
            "transactionHash": "0xb903239f8543d04b5dc1ba6579132b143087c68db1b2168786408fcbce568238",
            "blockHash": "0xc6ef2fc5426d6ad6fd9e2a26abeab0aa2411b7ab17f30a99d3cb96aed1d1055b",
            "blockNumber": "0xb",
            "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
            "to": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
            "gasUsed": "0x5208",
            "status": "0x0"
        }"#,
    )
    .unwrap();
    assert!(receipt.is_mined());
    assert!(!receipt.succeeded());
    assert_eq!(receipt.block_number, Some(11u8.into()));
}

#[test]
fn test_pending_receipt_ignores_extra_members() {
    let receipt: TransactionReceipt = serde_json::from_str(
        r#"{
            "transactionHash": "0xb903239f8543d04b5dc1ba6579132b143087c68db1b2168786408fcbce568238",
            "blockHash": null,
            "blockNumber": null,
            "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
            "to": null,
            "gasUsed": "0x5208",
            "logs": [],
            "contractAddress": null
        }"#,
    )
    .unwrap();
    assert!(!receipt.is_mined());
    assert!(receipt.succeeded());
}
