//! Call data for redeeming a delegation through the delegation manager.
//!
//! Layout follows the contract ABI: a 4-byte selector followed by 32-byte
//! words, with dynamic `bytes[]` arguments referenced by offset.

use std::fmt;

use ridepay_crypto::blake2b_256;
use ridepay_types::{Address, SignedDelegation, TokenAmount};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::WalletError;

pub const REDEEM_DELEGATIONS_SIGNATURE: &str = "redeemDelegations(bytes[],bytes32[],bytes[])";

const WORD: usize = 32;

/// Encoded contract call data.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CallData(pub Vec<u8>);

impl CallData {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallData({} bytes)", self.0.len())
    }
}

impl Serialize for CallData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CallData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        hex::decode(raw.strip_prefix("0x").unwrap_or(&raw))
            .map(CallData)
            .map_err(serde::de::Error::custom)
    }
}

/// How the delegation manager runs an execution (ERC-7579 mode word).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    SingleDefault,
    SingleTry,
    BatchDefault,
    BatchTry,
}

impl ExecutionMode {
    /// Byte 0 is the call type, byte 1 the exec type; the rest is zero.
    pub fn word(&self) -> [u8; WORD] {
        let (call_type, exec_type) = match self {
            Self::SingleDefault => (0x00, 0x00),
            Self::SingleTry => (0x00, 0x01),
            Self::BatchDefault => (0x01, 0x00),
            Self::BatchTry => (0x01, 0x01),
        };
        let mut word = [0u8; WORD];
        word[0] = call_type;
        word[1] = exec_type;
        word
    }
}

/// A single call made on the delegator's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Execution {
    pub target: Address,
    pub value: TokenAmount,
    pub call_data: CallData,
}

impl Execution {
    /// A zero-value call to `target` with no call data.
    pub fn to(target: Address) -> Self {
        Self {
            target,
            value: TokenAmount::ZERO,
            call_data: CallData::default(),
        }
    }

    /// Packed single-execution encoding: target, value word, call data.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(20 + WORD + self.call_data.len());
        out.extend_from_slice(self.target.as_bytes());
        out.extend_from_slice(&uint_word(self.value.raw()));
        out.extend_from_slice(self.call_data.as_bytes());
        out
    }
}

/// First four bytes of the function signature's hash.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = blake2b_256(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

/// Call data redeeming `delegation` as a one-link chain, in
/// `SingleDefault` mode, with one execution targeting the scope's token (or
/// the zero address for native-token scopes).
pub fn prepare_redeem_delegation_data(
    delegation: &SignedDelegation,
) -> Result<CallData, WalletError> {
    let execution = Execution::to(delegation.scope().token_address());
    encode_redeem_delegations(
        &[vec![delegation.clone()]],
        &[ExecutionMode::SingleDefault],
        &[execution],
    )
}

/// Encode `redeemDelegations(permissionContexts, modes, executionCallDatas)`.
///
/// The three slices are parallel: one delegation chain, mode and execution
/// per redemption.
pub fn encode_redeem_delegations(
    chains: &[Vec<SignedDelegation>],
    modes: &[ExecutionMode],
    executions: &[Execution],
) -> Result<CallData, WalletError> {
    if chains.len() != modes.len() || modes.len() != executions.len() {
        return Err(WalletError::Other(format!(
            "mismatched redemption arguments: {} chains, {} modes, {} executions",
            chains.len(),
            modes.len(),
            executions.len()
        )));
    }

    let contexts = chains
        .iter()
        .map(|chain| serde_json::to_vec(chain).map_err(|e| WalletError::Other(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    let execution_data: Vec<Vec<u8>> = executions.iter().map(Execution::encode).collect();

    let contexts_enc = encode_bytes_array(&contexts);
    let modes_enc = encode_word_array(&modes.iter().map(ExecutionMode::word).collect::<Vec<_>>());
    let executions_enc = encode_bytes_array(&execution_data);

    let head_len = 3 * WORD;
    let mut out = Vec::with_capacity(4 + head_len + contexts_enc.len() + modes_enc.len() + executions_enc.len());
    out.extend_from_slice(&selector(REDEEM_DELEGATIONS_SIGNATURE));
    out.extend_from_slice(&uint_word(head_len as u128));
    out.extend_from_slice(&uint_word((head_len + contexts_enc.len()) as u128));
    out.extend_from_slice(&uint_word(
        (head_len + contexts_enc.len() + modes_enc.len()) as u128,
    ));
    out.extend(contexts_enc);
    out.extend(modes_enc);
    out.extend(executions_enc);
    Ok(CallData(out))
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// `bytes`: length word, then the data right-padded to a word boundary.
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD + padded_len(data.len()));
    out.extend_from_slice(&uint_word(data.len() as u128));
    out.extend_from_slice(data);
    out.resize(WORD + padded_len(data.len()), 0);
    out
}

/// `bytes[]`: count, one offset per element (relative to the first offset),
/// then the elements.
fn encode_bytes_array(items: &[Vec<u8>]) -> Vec<u8> {
    let encoded: Vec<Vec<u8>> = items.iter().map(|i| encode_bytes(i)).collect();
    let mut out = Vec::new();
    out.extend_from_slice(&uint_word(items.len() as u128));

    let mut offset = items.len() * WORD;
    for item in &encoded {
        out.extend_from_slice(&uint_word(offset as u128));
        offset += item.len();
    }
    for item in encoded {
        out.extend(item);
    }
    out
}

/// `bytes32[]`: count, then the words.
fn encode_word_array(words: &[[u8; WORD]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(WORD * (words.len() + 1));
    out.extend_from_slice(&uint_word(words.len() as u128));
    for word in words {
        out.extend_from_slice(word);
    }
    out
}
