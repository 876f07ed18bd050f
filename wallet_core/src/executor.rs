//! On-chain ride payment through a redeemed delegation.

use ridepay_types::{Address, SignedDelegation, TokenAmount, TxHash, UserOpHash};
use serde::Serialize;

use crate::bundler::{BundlerClient, Call, UserOperation};
use crate::error::WalletError;
use crate::redeem::prepare_redeem_delegation_data;

/// Hashes of an executed payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub user_op_hash: UserOpHash,
    pub transaction_hash: TxHash,
}

/// Submits delegation redemptions from the delegate's smart account.
pub struct RidePaymentExecutor<B> {
    bundler: B,
    sender: Address,
    paymaster: Option<String>,
}

impl<B: BundlerClient> RidePaymentExecutor<B> {
    /// An executor sending user operations from `sender`, the delegate's
    /// smart account.
    pub fn new(bundler: B, sender: Address) -> Self {
        Self {
            bundler,
            sender,
            paymaster: None,
        }
    }

    /// Have gas sponsored by `paymaster`.
    pub fn with_paymaster(mut self, paymaster: impl Into<String>) -> Self {
        self.paymaster = Some(paymaster.into());
        self
    }

    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    /// Redeem `delegation` in a user operation calling `recipient`, priced at
    /// the bundler's fast tier, and wait for it to be included.
    pub async fn execute_payment(
        &self,
        delegation: &SignedDelegation,
        recipient: Address,
    ) -> Result<PaymentReceipt, WalletError> {
        let data = prepare_redeem_delegation_data(delegation)?;
        let fees = self.bundler.gas_price().await?.fast;

        let op = UserOperation {
            sender: self.sender,
            calls: vec![Call {
                to: recipient,
                data,
                value: TokenAmount::ZERO,
            }],
            fees,
            paymaster: self.paymaster.clone(),
        };
        let user_op_hash = self.bundler.send_user_operation(&op).await?;
        tracing::info!(%user_op_hash, %recipient, "submitted ride payment");

        let receipt = self
            .bundler
            .wait_for_user_operation_receipt(&user_op_hash)
            .await?;
        if !receipt.success {
            return Err(WalletError::Reverted(user_op_hash));
        }

        let transaction_hash = receipt.receipt.transaction_hash;
        tracing::info!(%user_op_hash, %transaction_hash, "ride payment executed");
        Ok(PaymentReceipt {
            user_op_hash,
            transaction_hash,
        })
    }
}
