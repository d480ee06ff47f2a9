//! Run-length analysis over a chronologically ordered P&L series.
//!
//! A run accumulates consecutive trades while the running total stays on
//! one side of zero; it restarts at the current trade once the total
//! crosses over.

use rust_decimal::Decimal;

/// Returns `(max_single_loss, max_single_profit)`, both as non-negative magnitudes.
pub fn extract_extremes(pl: &[Decimal]) -> (Decimal, Decimal) {
    let mut worst = Decimal::ZERO;
    let mut best = Decimal::ZERO;
    for &value in pl {
        if value > best {
            best = value;
        } else if value < worst {
            worst = value;
        }
    }
    (-worst, best)
}

/// The largest accumulated profit of any winning run. Never negative.
pub fn extract_max_accum_profit(pl: &[Decimal]) -> Decimal {
    let mut best = Decimal::ZERO;
    // `None` plays the role of -inf: the first trade always starts a run.
    let mut running: Option<Decimal> = None;

    for &value in pl {
        let acc = match running {
            Some(prev) if prev >= Decimal::ZERO => prev + value,
            _ => value,
        };
        running = Some(acc);

        if value > Decimal::ZERO {
            best = best.max(acc);
        }
    }
    best
}

/// The largest accumulated loss of any losing run, as a non-negative
/// magnitude, together with the inclusive index span of that run.
///
/// The span is `None` when the series has no losing trade.
pub fn extract_max_accum_loss(pl: &[Decimal]) -> (Decimal, Option<(usize, usize)>) {
    let mut worst = Decimal::ZERO;
    let mut span = None;
    // `None` plays the role of +inf: the first trade always starts a run.
    let mut running: Option<Decimal> = None;
    let mut start = 0;

    for (idx, &value) in pl.iter().enumerate() {
        let acc = match running {
            Some(prev) if prev < Decimal::ZERO => prev + value,
            _ => {
                start = idx;
                value
            }
        };
        running = Some(acc);

        if value < Decimal::ZERO && acc < worst {
            worst = acc;
            span = Some((start, idx));
        }
    }
    (-worst, span)
}
