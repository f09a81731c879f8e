//! Ticket classification: what a single ticket contributes to a revenue
//! aggregate, and under which payment bucket.
//!
//! Two report families disagree on derivative tickets (DUPLICATE, FREE,
//! PENALTY): the live dashboards take the ticket's own amount at face value,
//! while the historical reports defer to the referenced original ticket.
//! That divergence is deliberate and kept visible as [`DerivativePolicy`].

use crate::entities::tickets::{self, TicketStatus, TicketType};
use rust_decimal::Decimal;

/// Payment modes bucketed as electronic revenue.
pub const ONLINE_MODES: [&str; 3] = ["online", "credit_card", "upi"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativePolicy {
    /// Derivative tickets contribute their own amount, no refund logic.
    OwnAmount,
    /// DUPLICATE/FREE defer entirely to the referenced original;
    /// PENALTY combines its own leg with the referenced leg.
    DeferToOriginal,
}

#[derive(Debug, Clone, Copy)]
pub struct ClassifierConfig {
    pub derivative_policy: DerivativePolicy,
    /// When set, zeroing a cancelled ticket requires `is_cancelled` in
    /// addition to `status = CANCELLED`.
    pub require_cancelled_flag: bool,
}

/// What one ticket adds to an aggregate. `cash + online` may be less than
/// `amount` when the payment mode is absent or unrecognized; the remainder
/// stays unbucketed but still counts toward the grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contribution {
    pub amount: Decimal,
    pub cash: Decimal,
    pub online: Decimal,
    pub tickets: u64,
}

impl Contribution {
    pub const ZERO: Contribution = Contribution {
        amount: Decimal::ZERO,
        cash: Decimal::ZERO,
        online: Decimal::ZERO,
        tickets: 0,
    };

    /// Component-wise sum of the amount fields; the ticket count is left
    /// alone so a combined penalty still counts as one ticket.
    pub fn absorb_amounts(&mut self, other: &Contribution) {
        self.amount += other.amount;
        self.cash += other.cash;
        self.online += other.online;
    }
}

/// Outcome of classifying one ticket. `Defer` and `Combine` carry the ticket
/// so the resolver can follow `ref_ticket_no` (a single hop, never
/// transitive).
#[derive(Debug)]
pub enum Classification<'a> {
    Settled(Contribution),
    Defer(&'a tickets::Model),
    Combine(Contribution, &'a tickets::Model),
}

pub fn classify<'a>(ticket: &'a tickets::Model, cfg: &ClassifierConfig) -> Classification<'a> {
    if is_zeroed(ticket, cfg.require_cancelled_flag) {
        return Classification::Settled(Contribution::ZERO);
    }

    match cfg.derivative_policy {
        DerivativePolicy::OwnAmount => match ticket.ticket_type {
            // Own amount at face value, skipping the refund rule.
            TicketType::Duplicate | TicketType::Free | TicketType::Penalty => {
                Classification::Settled(bucketed(ticket.amount, ticket.payment_mode.as_deref()))
            }
            TicketType::Regular => Classification::Settled(base_contribution(ticket)),
        },
        DerivativePolicy::DeferToOriginal => match ticket.ticket_type {
            TicketType::Duplicate | TicketType::Free => Classification::Defer(ticket),
            TicketType::Penalty => Classification::Combine(base_contribution(ticket), ticket),
            TicketType::Regular => Classification::Settled(base_contribution(ticket)),
        },
    }
}

/// Rules 3-5: refunded tickets retain only the admin fee, everything else
/// contributes the full amount, bucketed by payment mode.
pub fn base_contribution(ticket: &tickets::Model) -> Contribution {
    let amount = if ticket.status == TicketStatus::Refunded {
        ticket.admin_fee
    } else {
        ticket.amount
    };
    bucketed(amount, ticket.payment_mode.as_deref())
}

pub fn is_zeroed(ticket: &tickets::Model, require_cancelled_flag: bool) -> bool {
    let cancelled_status = ticket.status == TicketStatus::Cancelled;
    if require_cancelled_flag {
        cancelled_status && ticket.is_cancelled
    } else {
        cancelled_status
    }
}

fn bucketed(amount: Decimal, payment_mode: Option<&str>) -> Contribution {
    let mode = payment_mode.map(str::to_ascii_lowercase);
    let cash = match mode.as_deref() {
        Some("cash") => amount,
        _ => Decimal::ZERO,
    };
    let online = match mode.as_deref() {
        Some(m) if ONLINE_MODES.contains(&m) => amount,
        _ => Decimal::ZERO,
    };
    Contribution {
        amount,
        cash,
        online,
        tickets: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn ticket(
        ticket_type: TicketType,
        status: TicketStatus,
        amount: Decimal,
        payment_mode: Option<&str>,
    ) -> tickets::Model {
        tickets::Model {
            id: 1,
            ticket_no: "T-0001".to_string(),
            ref_ticket_no: None,
            station_source: 10,
            station_destination: Some(12),
            entry_station: None,
            exit_station: None,
            amount,
            admin_fee: dec!(5),
            payment_mode: payment_mode.map(str::to_string),
            status,
            ticket_type,
            is_cancelled: false,
            entry_count: 1,
            exit_count: 1,
            device_id: None,
            created_at: Utc::now(),
            extended_time: None,
        }
    }

    fn settled(c: Classification) -> Contribution {
        match c {
            Classification::Settled(c) => c,
            other => panic!("expected settled classification, got {other:?}"),
        }
    }

    const OWN: ClassifierConfig = ClassifierConfig {
        derivative_policy: DerivativePolicy::OwnAmount,
        require_cancelled_flag: false,
    };
    const DEFER: ClassifierConfig = ClassifierConfig {
        derivative_policy: DerivativePolicy::DeferToOriginal,
        require_cancelled_flag: false,
    };

    #[test]
    fn cancelled_ticket_contributes_nothing() {
        for cfg in [OWN, DEFER] {
            let t = ticket(
                TicketType::Regular,
                TicketStatus::Cancelled,
                dec!(120),
                Some("cash"),
            );
            assert_eq!(settled(classify(&t, &cfg)), Contribution::ZERO);
        }
    }

    #[test]
    fn cancelled_derivative_is_zero_before_policy_applies() {
        let t = ticket(
            TicketType::Penalty,
            TicketStatus::Cancelled,
            dec!(50),
            Some("upi"),
        );
        assert_eq!(settled(classify(&t, &DEFER)), Contribution::ZERO);
    }

    #[test]
    fn require_cancelled_flag_needs_both_signals() {
        let cfg = ClassifierConfig {
            derivative_policy: DerivativePolicy::OwnAmount,
            require_cancelled_flag: true,
        };
        let mut t = ticket(
            TicketType::Regular,
            TicketStatus::Cancelled,
            dec!(80),
            Some("cash"),
        );
        // Status alone is not enough under the stricter rule.
        let c = settled(classify(&t, &cfg));
        assert_eq!(c.amount, dec!(80));

        t.is_cancelled = true;
        assert_eq!(settled(classify(&t, &cfg)), Contribution::ZERO);
    }

    #[test]
    fn refunded_keeps_only_admin_fee() {
        let t = ticket(
            TicketType::Regular,
            TicketStatus::Refunded,
            dec!(100),
            Some("cash"),
        );
        let c = settled(classify(&t, &OWN));
        assert_eq!(c.amount, dec!(5));
        assert_eq!(c.cash, dec!(5));
        assert_eq!(c.online, Decimal::ZERO);
        assert_eq!(c.tickets, 1);
    }

    #[test]
    fn payment_mode_matching_is_case_insensitive() {
        let t = ticket(
            TicketType::Regular,
            TicketStatus::Active,
            dec!(40),
            Some("UPI"),
        );
        let c = settled(classify(&t, &OWN));
        assert_eq!(c.online, dec!(40));
        assert_eq!(c.cash, Decimal::ZERO);
    }

    #[test]
    fn unrecognized_mode_stays_unbucketed() {
        let t = ticket(
            TicketType::Regular,
            TicketStatus::Active,
            dec!(30),
            Some("voucher"),
        );
        let c = settled(classify(&t, &OWN));
        assert_eq!(c.amount, dec!(30));
        assert_eq!(c.cash + c.online, Decimal::ZERO);
    }

    #[test]
    fn missing_mode_still_counts_toward_total() {
        let t = ticket(TicketType::Regular, TicketStatus::Active, dec!(25), None);
        let c = settled(classify(&t, &OWN));
        assert_eq!(c.amount, dec!(25));
        assert_eq!(c.tickets, 1);
    }

    #[test]
    fn own_amount_policy_takes_derivative_at_face_value() {
        // A refunded duplicate would keep only the admin fee under the base
        // rules; OwnAmount skips that and takes the raw amount.
        let t = ticket(
            TicketType::Duplicate,
            TicketStatus::Refunded,
            dec!(60),
            Some("cash"),
        );
        let c = settled(classify(&t, &OWN));
        assert_eq!(c.amount, dec!(60));
        assert_eq!(c.cash, dec!(60));
    }

    #[test]
    fn defer_policy_routes_derivatives_to_the_resolver() {
        let dup = ticket(
            TicketType::Free,
            TicketStatus::Active,
            dec!(0),
            Some("cash"),
        );
        assert!(matches!(classify(&dup, &DEFER), Classification::Defer(_)));

        let pen = ticket(
            TicketType::Penalty,
            TicketStatus::Active,
            dec!(50),
            Some("upi"),
        );
        match classify(&pen, &DEFER) {
            Classification::Combine(own, _) => {
                assert_eq!(own.amount, dec!(50));
                assert_eq!(own.online, dec!(50));
            }
            other => panic!("expected combine, got {other:?}"),
        }
    }
}
