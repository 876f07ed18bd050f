//! User-operation submission through an ERC-4337 bundler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ridepay_types::{Address, TokenAmount, TxHash, UserOpHash};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::redeem::CallData;

/// EntryPoint v0.7.
pub const ENTRY_POINT_V07: Address = Address::new([
    0x00, 0x00, 0x00, 0x00, 0x71, 0x72, 0x7d, 0xe2, 0x2e, 0x5e, 0x9d, 0x8b, 0xaf, 0x0e, 0xda,
    0xc6, 0xf3, 0x7d, 0xa0, 0x32,
]);

/// `0x`-prefixed hex quantities, as used by Ethereum JSON-RPC.
mod quantity {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let digits = raw
            .strip_prefix("0x")
            .ok_or_else(|| serde::de::Error::custom(format!("quantity without 0x: {raw}")))?;
        u128::from_str_radix(digits, 16).map_err(serde::de::Error::custom)
    }
}

/// EIP-1559 fee caps, in wei.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFees {
    #[serde(with = "quantity")]
    pub max_fee_per_gas: u128,
    #[serde(with = "quantity")]
    pub max_priority_fee_per_gas: u128,
}

/// Bundler fee suggestions by inclusion speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPriceTiers {
    pub slow: GasFees,
    pub standard: GasFees,
    pub fast: GasFees,
}

/// One call inside a user operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub to: Address,
    pub data: CallData,
    #[serde(default)]
    pub value: TokenAmount,
}

/// A user operation as submitted to the bundler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub calls: Vec<Call>,
    #[serde(flatten)]
    pub fees: GasFees,
    /// Paymaster sponsoring gas, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    #[serde(with = "quantity")]
    pub block_number: u128,
}

/// Outcome of an included user operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    pub user_op_hash: UserOpHash,
    pub success: bool,
    pub receipt: TransactionReceipt,
}

/// A bundler service.
#[async_trait]
pub trait BundlerClient: Send + Sync {
    async fn gas_price(&self) -> Result<GasPriceTiers, WalletError>;

    async fn send_user_operation(&self, op: &UserOperation) -> Result<UserOpHash, WalletError>;

    /// Wait until the operation is included and return its receipt.
    async fn wait_for_user_operation_receipt(
        &self,
        hash: &UserOpHash,
    ) -> Result<UserOperationReceipt, WalletError>;
}

// ── RpcBundlerClient ────────────────────────────────────────────────────

/// JSON-RPC bundler client over HTTP.
pub struct RpcBundlerClient {
    http: reqwest::Client,
    url: String,
    entry_point: Address,
    poll_interval: Duration,
    receipt_timeout: Duration,
    next_id: AtomicU64,
}

impl RpcBundlerClient {
    pub fn new(url: impl Into<String>) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WalletError::Bundler(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            entry_point: ENTRY_POINT_V07,
            poll_interval: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(120),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.receipt_timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body(&self, method: &str, params: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        })
    }

    /// Send a JSON-RPC request and return the `result` field.
    async fn rpc_call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let body = self.request_body(method, params);
        tracing::debug!(%method, url = %self.url, "bundler request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Bundler(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WalletError::Bundler(format!(
                "bundler returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WalletError::Bundler(format!("invalid JSON response: {e}")))?;
        rpc_result(json)
    }

    async fn user_operation_receipt(
        &self,
        hash: &UserOpHash,
    ) -> Result<Option<UserOperationReceipt>, WalletError> {
        let result = self
            .rpc_call("eth_getUserOperationReceipt", serde_json::json!([hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| WalletError::Bundler(format!("invalid receipt: {e}")))
    }
}

/// Extract `result` from a JSON-RPC response, mapping `error` objects.
fn rpc_result(mut json: serde_json::Value) -> Result<serde_json::Value, WalletError> {
    if let Some(err) = json.get("error").filter(|e| !e.is_null()) {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        return Err(WalletError::Bundler(message));
    }
    Ok(json
        .get_mut("result")
        .map(serde_json::Value::take)
        .unwrap_or(serde_json::Value::Null))
}

#[async_trait]
impl BundlerClient for RpcBundlerClient {
    async fn gas_price(&self) -> Result<GasPriceTiers, WalletError> {
        let result = self
            .rpc_call("pimlico_getUserOperationGasPrice", serde_json::json!([]))
            .await?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::Bundler(format!("invalid gas price response: {e}")))
    }

    async fn send_user_operation(&self, op: &UserOperation) -> Result<UserOpHash, WalletError> {
        let result = self
            .rpc_call(
                "eth_sendUserOperation",
                serde_json::json!([op, self.entry_point]),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::Bundler(format!("invalid user operation hash: {e}")))
    }

    async fn wait_for_user_operation_receipt(
        &self,
        hash: &UserOpHash,
    ) -> Result<UserOperationReceipt, WalletError> {
        let deadline = tokio::time::Instant::now() + self.receipt_timeout;
        loop {
            if let Some(receipt) = self.user_operation_receipt(hash).await? {
                return Ok(receipt);
            }
            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(WalletError::ReceiptTimeout(*hash));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_price_parses_hex_quantities() {
        let tiers: GasPriceTiers = serde_json::from_value(serde_json::json!({
            "slow": { "maxFeePerGas": "0x1", "maxPriorityFeePerGas": "0x1" },
            "standard": { "maxFeePerGas": "0x10", "maxPriorityFeePerGas": "0x2" },
            "fast": { "maxFeePerGas": "0x3b9aca00", "maxPriorityFeePerGas": "0x5f5e100" },
        }))
        .unwrap();
        assert_eq!(tiers.fast.max_fee_per_gas, 1_000_000_000);
        assert_eq!(tiers.fast.max_priority_fee_per_gas, 100_000_000);
    }

    #[test]
    fn user_operation_flattens_fees() {
        let op = UserOperation {
            sender: Address::new([1; 20]),
            calls: vec![Call {
                to: Address::new([2; 20]),
                data: CallData(vec![0xAB]),
                value: TokenAmount::ZERO,
            }],
            fees: GasFees {
                max_fee_per_gas: 255,
                max_priority_fee_per_gas: 16,
            },
            paymaster: None,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["maxFeePerGas"], "0xff");
        assert_eq!(json["maxPriorityFeePerGas"], "0x10");
        assert_eq!(json["calls"][0]["data"], "0xab");
        assert!(json.get("paymaster").is_none());
    }

    #[test]
    fn request_body_is_json_rpc() {
        let client = RpcBundlerClient::new("http://localhost:4337").unwrap();
        let first = client.request_body("eth_chainId", serde_json::json!([]));
        let second = client.request_body("eth_chainId", serde_json::json!([]));
        assert_eq!(first["jsonrpc"], "2.0");
        assert_eq!(first["method"], "eth_chainId");
        assert_ne!(first["id"], second["id"]);
    }

    #[test]
    fn rpc_error_is_surfaced() {
        let err = rpc_result(serde_json::json!({
            "jsonrpc": "2.0", "id": 1,
            "error": { "code": -32500, "message": "AA21 didn't pay prefund" }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("AA21"));
    }

    #[test]
    fn missing_result_is_null() {
        let result = rpc_result(serde_json::json!({ "jsonrpc": "2.0", "id": 1 })).unwrap();
        assert!(result.is_null());
    }

    #[test]
    fn receipt_parses() {
        let receipt: UserOperationReceipt = serde_json::from_value(serde_json::json!({
            "userOpHash": format!("0x{}", "11".repeat(32)),
            "success": true,
            "receipt": {
                "transactionHash": format!("0x{}", "22".repeat(32)),
                "blockNumber": "0x10"
            }
        }))
        .unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.receipt.block_number, 16);
        assert_eq!(receipt.receipt.transaction_hash, TxHash::new([0x22; 32]));
    }
}
