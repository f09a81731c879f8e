//! Shared query conditions over the ticket table.
//!
//! The effective timestamp of a ticket is `extended_time` when present, else
//! `created_at`; every windowed query has to branch on that, so the branch
//! lives here once.

use crate::entities::tickets;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, Condition};

pub fn effective_window(from: DateTime<Utc>, to: DateTime<Utc>) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(tickets::Column::ExtendedTime.is_not_null())
                .add(tickets::Column::ExtendedTime.between(from, to)),
        )
        .add(
            Condition::all()
                .add(tickets::Column::ExtendedTime.is_null())
                .add(tickets::Column::CreatedAt.between(from, to)),
        )
}

/// Station a movement entered at: `entry_station` on the newer schema,
/// falling back to the legacy `station_source`.
pub fn entry_station_expr() -> SimpleExpr {
    Func::coalesce([
        Expr::col(tickets::Column::EntryStation).into(),
        Expr::col(tickets::Column::StationSource).into(),
    ])
    .into()
}

/// Station a movement exited at, with the legacy destination fallback.
pub fn exit_station_expr() -> SimpleExpr {
    Func::coalesce([
        Expr::col(tickets::Column::ExitStation).into(),
        Expr::col(tickets::Column::StationDestination).into(),
    ])
    .into()
}

/// Case-insensitive equality on a text column.
pub fn text_eq_ci<C: ColumnTrait>(column: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).eq(value.to_lowercase())
}
