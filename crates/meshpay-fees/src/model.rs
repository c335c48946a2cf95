//! Reference model for multi-hop fee accrual.
//!
//! Connectors quote a payment before any money moves: the first
//! (quoting) connector composes the per-hop spreads, budgets one whole
//! destination-scale unit for every remote hop's rounding, applies its
//! own slippage once, and floors the result at the destination ledger's
//! scale. The intermediate transfers that actually settle follow a
//! separate chain: each hop's post-spread amount floored at that hop's
//! destination scale. Both sequences are observable as ledger balances,
//! so the model exposes both.
//!
//! Rounding is local and directional. Forward quoting only ever rounds
//! down; reverse quoting only ever rounds up, so the destination is
//! guaranteed at least the requested amount. There is no global
//! rounding pass and no tolerance for drift.

use crate::amount::{Amount, Rate, MAX_SCALE};
use crate::error::{FeeError, Result};

/// Per-hop quoting inputs, derived from the connector and destination
/// ledger of the hop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HopParameters {
    /// Fraction of the transferred amount the connector retains.
    pub spread: Rate,
    /// Quoted-rate protection discount, applied once by the quoting hop.
    pub slippage: Rate,
    /// Fractional digits of the hop's destination ledger.
    pub destination_scale: u32,
}

/// An ordered payment route from a source ledger through one or more
/// connector hops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentPath {
    /// Fractional digits of the source ledger.
    pub source_scale: u32,
    /// Hops in path order; the first hop belongs to the quoting
    /// connector.
    pub hops: Vec<HopParameters>,
}

impl PaymentPath {
    /// Build a validated path.
    pub fn new(source_scale: u32, hops: Vec<HopParameters>) -> Result<PaymentPath> {
        let path = PaymentPath { source_scale, hops };
        path.validate()?;
        Ok(path)
    }

    fn validate(&self) -> Result<()> {
        if self.hops.is_empty() {
            return Err(FeeError::EmptyPath);
        }
        check_scale(self.source_scale)?;
        for hop in &self.hops {
            check_scale(hop.destination_scale)?;
            check_rate(hop.spread)?;
            check_rate(hop.slippage)?;
        }
        Ok(())
    }

    fn destination_scale(&self) -> u32 {
        self.hops[self.hops.len() - 1].destination_scale
    }
}

fn check_scale(scale: u32) -> Result<()> {
    if scale == 0 || scale > MAX_SCALE {
        return Err(FeeError::InvalidScale(scale));
    }
    Ok(())
}

fn check_rate(rate: Rate) -> Result<()> {
    if rate >= Rate::ONE {
        return Err(FeeError::RateOutOfRange(rate.to_string()));
    }
    Ok(())
}

fn check_amount(amount: Amount) -> Result<()> {
    if amount.is_negative() {
        return Err(FeeError::NegativeAmount(amount.to_string()));
    }
    Ok(())
}

/// Expected outcome of a payment quoted by source amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceQuote {
    /// Amount credited on the final destination ledger.
    pub destination_amount: Amount,
    /// Amounts credited on each intermediate ledger, one per hop except
    /// the last. Empty for single-hop payments.
    pub intermediate_amounts: Vec<Amount>,
}

/// Quote a payment by its source amount.
///
/// The destination amount composes `1 - spread` per hop, deducts one
/// destination-scale unit after every hop except the first, applies the
/// quoting hop's slippage once, and floors at the final scale. Rounding
/// loss at an intermediate hop is real and propagates forward.
pub fn quote_by_source(path: &PaymentPath, source_amount: Amount) -> Result<SourceQuote> {
    path.validate()?;
    check_amount(source_amount)?;

    let mut quoted = source_amount;
    for (i, hop) in path.hops.iter().enumerate() {
        quoted = quoted.mul_rate(hop.spread.complement());
        if i > 0 {
            // Allowance for the remote hop's local rounding; a
            // pathological path may exhaust the amount entirely.
            quoted = (quoted - Amount::unit(hop.destination_scale)).max(Amount::ZERO);
        }
    }
    quoted = quoted.mul_rate(path.hops[0].slippage.complement());
    let destination_amount = quoted.floor_to_scale(path.destination_scale());

    let mut intermediate_amounts = Vec::with_capacity(path.hops.len() - 1);
    let mut transferred = source_amount;
    for hop in &path.hops[..path.hops.len() - 1] {
        transferred = transferred
            .mul_rate(hop.spread.complement())
            .floor_to_scale(hop.destination_scale);
        intermediate_amounts.push(transferred);
    }

    Ok(SourceQuote {
        destination_amount,
        intermediate_amounts,
    })
}

/// Quote a payment by its destination amount.
///
/// Inverts [`quote_by_source`] hop by hop from destination back to
/// source with every division rounded up, then ceils the source debit
/// to the source ledger's scale. The destination is therefore
/// guaranteed to receive at least the requested amount.
pub fn quote_by_destination(path: &PaymentPath, destination_amount: Amount) -> Result<Amount> {
    path.validate()?;
    check_amount(destination_amount)?;

    let mut required = destination_amount.div_rate_ceil(path.hops[0].slippage.complement());
    for (i, hop) in path.hops.iter().enumerate().rev() {
        if i > 0 {
            required += Amount::unit(hop.destination_scale);
        }
        required = required.div_rate_ceil(hop.spread.complement());
    }
    Ok(required.ceil_to_scale(path.source_scale))
}
