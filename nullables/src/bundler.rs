//! Nullable bundler — accept user operations without a chain.

use async_trait::async_trait;
use ridepay_types::{TxHash, UserOpHash};
use ridepay_wallet_core::{
    BundlerClient, GasFees, GasPriceTiers, TransactionReceipt, UserOperation,
    UserOperationReceipt, WalletError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A bundler that records submitted operations and includes them at once.
///
/// Hashes are sequential: the n-th operation gets user-op hash `[n; 32]` and
/// transaction hash `[0x80 | n; 32]`.
pub struct NullBundler {
    tiers: GasPriceTiers,
    submitted: Mutex<Vec<UserOperation>>,
    reject_submissions: AtomicBool,
    revert: AtomicBool,
    never_include: AtomicBool,
}

impl NullBundler {
    pub fn new() -> Self {
        let fees = |gwei: u128| GasFees {
            max_fee_per_gas: gwei * 1_000_000_000,
            max_priority_fee_per_gas: gwei * 100_000_000,
        };
        Self {
            tiers: GasPriceTiers {
                slow: fees(1),
                standard: fees(2),
                fast: fees(3),
            },
            submitted: Mutex::new(Vec::new()),
            reject_submissions: AtomicBool::new(false),
            revert: AtomicBool::new(false),
            never_include: AtomicBool::new(false),
        }
    }

    pub fn gas_tiers(&self) -> GasPriceTiers {
        self.tiers
    }

    /// Fail every `send_user_operation` with a bundler error.
    pub fn reject_submissions(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }

    /// Report included operations as reverted.
    pub fn revert_operations(&self, revert: bool) {
        self.revert.store(revert, Ordering::SeqCst);
    }

    /// Never produce receipts, so waiting times out.
    pub fn never_include(&self, never: bool) {
        self.never_include.store(never, Ordering::SeqCst);
    }

    /// Operations submitted so far (for assertions).
    pub fn submitted(&self) -> Vec<UserOperation> {
        self.submitted.lock().unwrap().clone()
    }

    fn index_of(&self, hash: &UserOpHash) -> Option<u8> {
        let n = hash.as_bytes()[0];
        let count = self.submitted.lock().unwrap().len();
        (n >= 1 && usize::from(n) <= count && *hash == UserOpHash::new([n; 32])).then_some(n)
    }
}

impl Default for NullBundler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BundlerClient for NullBundler {
    async fn gas_price(&self) -> Result<GasPriceTiers, WalletError> {
        Ok(self.tiers)
    }

    async fn send_user_operation(&self, op: &UserOperation) -> Result<UserOpHash, WalletError> {
        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(WalletError::Bundler("user operation rejected".into()));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(op.clone());
        let n = (submitted.len() % 0x80) as u8;
        Ok(UserOpHash::new([n; 32]))
    }

    async fn wait_for_user_operation_receipt(
        &self,
        hash: &UserOpHash,
    ) -> Result<UserOperationReceipt, WalletError> {
        if self.never_include.load(Ordering::SeqCst) {
            return Err(WalletError::ReceiptTimeout(*hash));
        }
        let n = self
            .index_of(hash)
            .ok_or_else(|| WalletError::Bundler(format!("unknown user operation {hash}")))?;
        Ok(UserOperationReceipt {
            user_op_hash: *hash,
            success: !self.revert.load(Ordering::SeqCst),
            receipt: TransactionReceipt {
                transaction_hash: TxHash::new([0x80 | n; 32]),
                block_number: u128::from(n),
            },
        })
    }
}
