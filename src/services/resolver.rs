//! Resolution of `ref_ticket_no` references for derivative tickets.
//!
//! References are followed exactly one hop: a referenced ticket's own
//! contribution is computed with the base rules and never chased further,
//! which bounds malformed self-referential data. Dangling references are
//! tolerated as zero-value, never an error.

use crate::entities::tickets;
use crate::error::AppResult;
use crate::services::classifier::{base_contribution, Classification, Contribution};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;

#[derive(Clone)]
pub struct ReferenceResolver {
    pool: DatabaseConnection,
}

impl ReferenceResolver {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Batch-loads every original referenced by `batch` in one query, keyed
    /// by ticket number. One round-trip per report instead of one per
    /// derivative ticket.
    pub async fn load_originals(
        &self,
        batch: &[tickets::Model],
    ) -> AppResult<HashMap<String, tickets::Model>> {
        let refs: Vec<String> = batch
            .iter()
            .filter_map(|t| t.ref_ticket_no.clone())
            .collect();
        if refs.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = tickets::Entity::find()
            .filter(tickets::Column::TicketNo.is_in(refs))
            .all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|m| (m.ticket_no.clone(), m))
            .collect())
    }
}

/// Settles a classification against the preloaded originals.
pub fn settle(
    classification: Classification<'_>,
    originals: &HashMap<String, tickets::Model>,
) -> Contribution {
    match classification {
        Classification::Settled(c) => c,
        Classification::Defer(ticket) => {
            let mut c = match lookup(ticket, originals) {
                Some(original) => base_contribution(original),
                None => Contribution::ZERO,
            };
            // The derivative row itself still counts as one issued ticket.
            c.tickets = 1;
            c
        }
        Classification::Combine(mut own, ticket) => {
            if let Some(original) = lookup(ticket, originals) {
                own.absorb_amounts(&base_contribution(original));
            }
            own
        }
    }
}

fn lookup<'a>(
    ticket: &tickets::Model,
    originals: &'a HashMap<String, tickets::Model>,
) -> Option<&'a tickets::Model> {
    let reference = ticket.ref_ticket_no.as_deref()?;
    let found = originals.get(reference);
    if found.is_none() {
        log::warn!(
            "ticket {} references missing original {reference}; counting reference as zero",
            ticket.ticket_no
        );
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::tickets::{TicketStatus, TicketType};
    use crate::services::classifier::{classify, ClassifierConfig, DerivativePolicy};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const DEFER: ClassifierConfig = ClassifierConfig {
        derivative_policy: DerivativePolicy::DeferToOriginal,
        require_cancelled_flag: false,
    };

    fn ticket(
        ticket_no: &str,
        ticket_type: TicketType,
        status: TicketStatus,
        amount: Decimal,
        payment_mode: Option<&str>,
        ref_ticket_no: Option<&str>,
    ) -> tickets::Model {
        tickets::Model {
            id: 1,
            ticket_no: ticket_no.to_string(),
            ref_ticket_no: ref_ticket_no.map(str::to_string),
            station_source: 10,
            station_destination: None,
            entry_station: None,
            exit_station: None,
            amount,
            admin_fee: dec!(5),
            payment_mode: payment_mode.map(str::to_string),
            status,
            ticket_type,
            is_cancelled: false,
            entry_count: 0,
            exit_count: 0,
            device_id: None,
            created_at: Utc::now(),
            extended_time: None,
        }
    }

    fn originals_of(models: Vec<tickets::Model>) -> HashMap<String, tickets::Model> {
        models
            .into_iter()
            .map(|m| (m.ticket_no.clone(), m))
            .collect()
    }

    #[test]
    fn penalty_combines_both_legs_component_wise() {
        let original = ticket(
            "T-100",
            TicketType::Regular,
            TicketStatus::Active,
            dec!(100),
            Some("cash"),
            None,
        );
        let penalty = ticket(
            "P-001",
            TicketType::Penalty,
            TicketStatus::Active,
            dec!(50),
            Some("upi"),
            Some("T-100"),
        );
        let originals = originals_of(vec![original]);

        let c = settle(classify(&penalty, &DEFER), &originals);
        assert_eq!(c.amount, dec!(150));
        assert_eq!(c.cash, dec!(100));
        assert_eq!(c.online, dec!(50));
        assert_eq!(c.tickets, 1);
    }

    #[test]
    fn duplicate_defers_entirely_to_original() {
        let original = ticket(
            "T-200",
            TicketType::Regular,
            TicketStatus::Active,
            dec!(75),
            Some("cash"),
            None,
        );
        let duplicate = ticket(
            "D-001",
            TicketType::Duplicate,
            TicketStatus::Active,
            dec!(10),
            Some("upi"),
            Some("T-200"),
        );
        let originals = originals_of(vec![original]);

        let c = settle(classify(&duplicate, &DEFER), &originals);
        assert_eq!(c.amount, dec!(75));
        assert_eq!(c.cash, dec!(75));
        assert_eq!(c.online, Decimal::ZERO);
        assert_eq!(c.tickets, 1);
    }

    #[test]
    fn refunded_original_contributes_its_admin_fee() {
        let original = ticket(
            "T-300",
            TicketType::Regular,
            TicketStatus::Refunded,
            dec!(100),
            Some("cash"),
            None,
        );
        let penalty = ticket(
            "P-002",
            TicketType::Penalty,
            TicketStatus::Active,
            dec!(50),
            Some("cash"),
            Some("T-300"),
        );
        let originals = originals_of(vec![original]);

        let c = settle(classify(&penalty, &DEFER), &originals);
        // Own 50 plus the original's retained admin fee of 5.
        assert_eq!(c.amount, dec!(55));
        assert_eq!(c.cash, dec!(55));
    }

    #[test]
    fn dangling_reference_is_zero_not_an_error() {
        let penalty = ticket(
            "P-003",
            TicketType::Penalty,
            TicketStatus::Active,
            dec!(50),
            Some("upi"),
            Some("T-GONE"),
        );
        let duplicate = ticket(
            "D-002",
            TicketType::Duplicate,
            TicketStatus::Active,
            dec!(10),
            Some("cash"),
            Some("T-GONE"),
        );
        let originals = HashMap::new();

        let pc = settle(classify(&penalty, &DEFER), &originals);
        assert_eq!(pc.amount, dec!(50));
        assert_eq!(pc.online, dec!(50));

        let dc = settle(classify(&duplicate, &DEFER), &originals);
        assert_eq!(dc.amount, Decimal::ZERO);
        assert_eq!(dc.tickets, 1);
    }
}
