//! Error types for the Numo state-transition engine.
//!
//! All errors use the `NUMO_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Wire / decoding errors
//! - 2xx: Commitment (tree and proof) errors
//! - 3xx: Rules / domain errors
//! - 4xx: Message validation errors
//! - 5xx: Matching errors
//! - 6xx: Arithmetic errors
//! - 7xx: Batch errors
//! - 9xx: General / internal errors
//!
//! Every variant also maps to a [`Severity`]: message-level failures skip a
//! single message, batch-fatal failures discard the whole batch.

use thiserror::Error;

use crate::{Address, OrderId, U256};

/// How far a failure propagates through batch processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending message is skipped; the batch continues.
    Message,
    /// The whole batch is discarded; the stored root stands.
    Batch,
}

/// Central error enum for all Numo operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumoError {
    // =================================================================
    // Wire Errors (1xx)
    // =================================================================
    /// The input ended before a fixed-width field could be read.
    #[error("NUMO_ERR_100: Unexpected end of input at offset {offset}: need {needed} bytes")]
    UnexpectedEof { offset: usize, needed: usize },

    /// Bytes remain after the last declared section.
    #[error("NUMO_ERR_101: {count} trailing bytes after last section")]
    TrailingBytes { count: usize },

    /// An enumeration byte holds an unrecognized discriminant.
    #[error("NUMO_ERR_102: Invalid {field} value: {value}")]
    InvalidEnum { field: &'static str, value: u32 },

    /// The message tag byte is neither `Place` nor `Cancel`.
    #[error("NUMO_ERR_103: Unknown message tag: {0:#04x}")]
    UnknownMessageTag(u8),

    /// A stored value has the wrong length for its entity type.
    #[error("NUMO_ERR_104: Invalid {entity} value length: expected {expected}, got {got}")]
    InvalidValueLength {
        entity: &'static str,
        expected: usize,
        got: usize,
    },

    // =================================================================
    // Commitment Errors (2xx)
    // =================================================================
    /// A membership proof does not fold to the current root.
    #[error("NUMO_ERR_200: Proof does not match current root")]
    ProofRootMismatch,

    /// The next proof in the stream is for a different key.
    #[error("NUMO_ERR_201: Proof key mismatch: expected 0x{expected}, got 0x{got}")]
    ProofKeyMismatch { expected: String, got: String },

    /// The replay requested a key but the proof stream is exhausted.
    #[error("NUMO_ERR_202: Missing proof for state access")]
    MissingProof,

    /// Replay finished with proofs left unconsumed.
    #[error("NUMO_ERR_203: {0} unused proofs after replay")]
    UnusedProofs(usize),

    /// A proof is structurally invalid (e.g. wrong sibling count).
    #[error("NUMO_ERR_204: Malformed proof: {reason}")]
    MalformedProof { reason: String },

    // =================================================================
    // Rules / Domain Errors (3xx)
    // =================================================================
    /// The rule set violates a structural requirement.
    #[error("NUMO_ERR_300: Invalid rules: {reason}")]
    InvalidRules { reason: String },

    /// The asserted rules do not hash to the expected `rulesHash`.
    #[error("NUMO_ERR_301: Rules hash mismatch")]
    RulesHashMismatch,

    /// The asserted domain separator does not match the market ids.
    #[error("NUMO_ERR_302: Domain separator mismatch")]
    DomainSeparatorMismatch,

    // =================================================================
    // Message Validation Errors (4xx)
    // =================================================================
    /// The signature is malformed or no key can be recovered from it.
    #[error("NUMO_ERR_400: Invalid signature")]
    SignatureInvalid,

    /// The recovered signer is not the claimed trader.
    #[error("NUMO_ERR_401: Signer mismatch: claimed {claimed}, recovered {recovered}")]
    SignerMismatch {
        claimed: Address,
        recovered: Address,
    },

    /// The message nonce is not the account's next expected nonce.
    #[error("NUMO_ERR_402: Nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: u64, got: u64 },

    /// The tick index is negative or not a multiple of the tick size.
    #[error("NUMO_ERR_403: Tick {0} not aligned to tick size")]
    TickMisaligned(i32),

    /// The quantity is not a multiple of the lot size.
    #[error("NUMO_ERR_404: Quantity {0} not aligned to lot size")]
    LotMisaligned(U256),

    /// The order quantity is zero.
    #[error("NUMO_ERR_405: Zero quantity")]
    ZeroQuantity,

    /// The all-zero order id is reserved.
    #[error("NUMO_ERR_406: Reserved order id")]
    ReservedOrderId,

    /// An order with this ID already rests on the book.
    #[error("NUMO_ERR_407: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The cancel target does not exist.
    #[error("NUMO_ERR_408: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The cancel target belongs to someone else.
    #[error("NUMO_ERR_409: Order {0} not owned by signer")]
    NotOrderOwner(OrderId),

    // =================================================================
    // Matching Errors (5xx)
    // =================================================================
    /// Not enough available balance to lock or settle.
    #[error("NUMO_ERR_500: Insufficient available balance: need {needed}, have {available}")]
    InsufficientBalance { needed: U256, available: U256 },

    /// Host-supplied tick hints failed the adjacency check.
    #[error("NUMO_ERR_501: Invalid tick hint: {reason}")]
    InvalidTickHint { reason: String },

    // =================================================================
    // Arithmetic Errors (6xx)
    // =================================================================
    /// A checked operation overflowed or underflowed.
    #[error("NUMO_ERR_600: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Division by a zero denominator.
    #[error("NUMO_ERR_601: Division by zero")]
    DivisionByZero,

    /// `available + locked` would exceed `maxBalance`.
    #[error("NUMO_ERR_602: Balance cap exceeded: total {total}, cap {cap}")]
    BalanceCapExceeded { total: U256, cap: U256 },

    // =================================================================
    // Batch Errors (7xx)
    // =================================================================
    /// `batchSeq` is not `storedSeq + 1`.
    #[error("NUMO_ERR_700: Batch sequence mismatch: expected {expected}, got {got}")]
    BatchSeqMismatch { expected: u64, got: u64 },

    /// `prevRoot` is not the stored root.
    #[error("NUMO_ERR_701: Previous root mismatch")]
    PrevRootMismatch,

    /// The asserted batch digest does not match the messages.
    #[error("NUMO_ERR_702: Batch digest mismatch")]
    BatchDigestMismatch,

    /// The batch holds more messages than `maxOrdersPerBatch`.
    #[error("NUMO_ERR_703: Too many messages: {count} > {max}")]
    TooManyMessages { count: usize, max: u32 },

    /// No market is registered under this domain separator.
    #[error("NUMO_ERR_704: Unknown market: 0x{0}")]
    UnknownMarket(String),

    /// The proof verifier rejected the `(PublicInputs, proof)` pair.
    #[error("NUMO_ERR_705: Proof rejected")]
    ProofRejected,

    // =================================================================
    // General / Internal Errors (9xx)
    // =================================================================
    /// Stored state contradicts a structural invariant.
    #[error("NUMO_ERR_900: Invariant violation: {0}")]
    InvariantViolation(String),

    /// Serialization / deserialization error.
    #[error("NUMO_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

impl NumoError {
    /// Numeric code embedded in the display prefix.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::UnexpectedEof { .. } => 100,
            Self::TrailingBytes { .. } => 101,
            Self::InvalidEnum { .. } => 102,
            Self::UnknownMessageTag(_) => 103,
            Self::InvalidValueLength { .. } => 104,
            Self::ProofRootMismatch => 200,
            Self::ProofKeyMismatch { .. } => 201,
            Self::MissingProof => 202,
            Self::UnusedProofs(_) => 203,
            Self::MalformedProof { .. } => 204,
            Self::InvalidRules { .. } => 300,
            Self::RulesHashMismatch => 301,
            Self::DomainSeparatorMismatch => 302,
            Self::SignatureInvalid => 400,
            Self::SignerMismatch { .. } => 401,
            Self::NonceMismatch { .. } => 402,
            Self::TickMisaligned(_) => 403,
            Self::LotMisaligned(_) => 404,
            Self::ZeroQuantity => 405,
            Self::ReservedOrderId => 406,
            Self::DuplicateOrder(_) => 407,
            Self::OrderNotFound(_) => 408,
            Self::NotOrderOwner(_) => 409,
            Self::InsufficientBalance { .. } => 500,
            Self::InvalidTickHint { .. } => 501,
            Self::ArithmeticOverflow => 600,
            Self::DivisionByZero => 601,
            Self::BalanceCapExceeded { .. } => 602,
            Self::BatchSeqMismatch { .. } => 700,
            Self::PrevRootMismatch => 701,
            Self::BatchDigestMismatch => 702,
            Self::TooManyMessages { .. } => 703,
            Self::UnknownMarket(_) => 704,
            Self::ProofRejected => 705,
            Self::InvariantViolation(_) => 900,
            Self::Serialization(_) => 901,
        }
    }

    /// Message-level codes (4xx, 5xx, 6xx) skip one message; everything
    /// else aborts the batch.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self.code() {
            400..=699 => Severity::Message,
            _ => Severity::Batch,
        }
    }

    /// Shorthand for `severity() == Severity::Batch`.
    #[must_use]
    pub fn is_batch_fatal(&self) -> bool {
        self.severity() == Severity::Batch
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, NumoError>;
