//! Per-message transactional application of a batch.
//!
//! Message pipeline:
//!
//! ```text
//! signature ──► nonce gate ──► [checkpoint] static checks ──► place / cancel
//!     │             │                 │                          │
//!   skip          skip           rollback + skip           rollback + skip
//! ```
//!
//! Signature and nonce failures write nothing. Past the nonce gate, a
//! message-level error rolls back to the checkpoint taken right after the
//! nonce write, so the nonce stays consumed. A batch-fatal error aborts the
//! whole batch and is returned to the caller.

use numo_commit::{State, StateAccess};
use numo_ingress::{check_static, consume_nonce, verify_message};
use numo_matchcore::{Execution, FeeLedger, apply_cancel, apply_place, trades_root};
use numo_types::{FeeTotal, Hash32, MarketConfig, Message, Result, SignedMessage, TradeRecord};
use serde::{Deserialize, Serialize};

/// What happened to one message. Diagnostics only; not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MessageOutcome {
    Applied { fills: usize, rested: bool },
    Skipped { code: u16 },
}

impl MessageOutcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Everything a batch produced besides the new root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    pub trades: Vec<TradeRecord>,
    pub fees: FeeLedger,
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchOutput {
    #[must_use]
    pub fn trades_root(&self) -> Hash32 {
        trades_root(&self.trades)
    }

    #[must_use]
    pub fn fees_root(&self) -> Hash32 {
        self.fees.root()
    }

    #[must_use]
    pub fn fee_totals(&self) -> Vec<FeeTotal> {
        self.fees.totals()
    }

    #[must_use]
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.applied()
    }
}

/// Apply `messages` in order to `store`. Batch preconditions (sequence,
/// previous root, rules hash, size) are the caller's.
pub fn apply_batch<S: StateAccess>(
    store: &mut S,
    market: &MarketConfig,
    messages: &[SignedMessage],
) -> Result<BatchOutput> {
    let domain = market.domain_separator();
    let mut state = State::new(store, market.market_id);
    let mut output = BatchOutput::default();

    for (index, signed) in messages.iter().enumerate() {
        let outcome = match apply_message(&mut state, market, &domain, signed, &mut output) {
            Ok(execution) => MessageOutcome::Applied {
                fills: execution.trades.len(),
                rested: execution.rested,
            },
            Err(err) if err.is_batch_fatal() => {
                tracing::warn!(index, code = err.code(), error = %err, "Batch aborted");
                return Err(err);
            }
            Err(err) => {
                tracing::debug!(index, code = err.code(), error = %err, "Message skipped");
                MessageOutcome::Skipped { code: err.code() }
            }
        };
        output.outcomes.push(outcome);
    }
    Ok(output)
}

fn apply_message<S: StateAccess>(
    state: &mut State<'_, S>,
    market: &MarketConfig,
    domain: &Hash32,
    signed: &SignedMessage,
    output: &mut BatchOutput,
) -> Result<Execution> {
    verify_message(domain, signed)?;
    let message = &signed.message;
    consume_nonce(state, &message.trader(), message.nonce())?;

    let checkpoint = state.checkpoint();
    let result = execute(state, market, message).and_then(|execution| {
        let mut fees = output.fees.clone();
        fees.add_trades(market.rules.quote_asset_id, &execution.trades)?;
        Ok((execution, fees))
    });
    match result {
        Ok((execution, fees)) => {
            output.trades.extend(execution.trades.iter().cloned());
            output.fees = fees;
            Ok(execution)
        }
        Err(err) if err.is_batch_fatal() => Err(err),
        Err(err) => {
            state.rollback(checkpoint)?;
            Err(err)
        }
    }
}

fn execute<S: StateAccess>(
    state: &mut State<'_, S>,
    market: &MarketConfig,
    message: &Message,
) -> Result<Execution> {
    check_static(&market.rules, message)?;
    match message {
        Message::Place(place) => apply_place(state, &market.rules, place),
        Message::Cancel(cancel) => {
            apply_cancel(state, &market.rules, cancel)?;
            Ok(Execution::default())
        }
    }
}
