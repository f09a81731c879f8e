use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Stations {
    Table,
    Id,
    StationName,
    IsActive,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    TicketNo,
    RefTicketNo,
    StationSource,
    StationDestination,
    EntryStation,
    ExitStation,
    Amount,
    AdminFee,
    PaymentMode,
    Status,
    TicketType,
    IsCancelled,
    EntryCount,
    ExitCount,
    DeviceId,
    CreatedAt,
    ExtendedTime,
}

#[derive(DeriveIden)]
enum ValidationRecords {
    Table,
    Id,
    Source,
    Dest,
    RecordType,
    Media,
    Serialno,
    Deviceid,
    Amount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ShiftSessions {
    Table,
    Id,
    ShiftId,
    StationId,
    UserId,
    DeviceId,
    QrAmount,
    QrCashAmount,
    QrUpiAmount,
    QrTicketCount,
    QrTicketCountCash,
    QrTicketCountUpi,
    PenaltyAmount,
    PenaltyCashAmount,
    PenaltyUpiAmount,
    PenaltyTicketCount,
    FailedAmount,
    FailedCashAmount,
    FailedUpiAmount,
    FailedCount,
    TotalAmount,
    TotalCashAmount,
    TotalUpiAmount,
    CardEntries,
    CardExits,
    QrEntries,
    QrExits,
    LoginTime,
    LogoutTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PenaltyRecords {
    Table,
    Id,
    StationId,
    TicketNo,
    Amount,
    PaymentMode,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stations::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stations::StationName).string().not_null())
                    .col(
                        ColumnDef::new(Stations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::TicketNo).string().not_null())
                    .col(ColumnDef::new(Tickets::RefTicketNo).string().null())
                    .col(ColumnDef::new(Tickets::StationSource).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::StationDestination).big_integer().null())
                    .col(ColumnDef::new(Tickets::EntryStation).big_integer().null())
                    .col(ColumnDef::new(Tickets::ExitStation).big_integer().null())
                    .col(
                        ColumnDef::new(Tickets::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::AdminFee)
                            .decimal_len(12, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Tickets::PaymentMode).string().null())
                    .col(ColumnDef::new(Tickets::Status).string().not_null())
                    .col(ColumnDef::new(Tickets::TicketType).string().not_null())
                    .col(
                        ColumnDef::new(Tickets::IsCancelled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Tickets::EntryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Tickets::ExitCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Tickets::DeviceId).string().null())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Tickets::ExtendedTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_tickets_ticket_no")
                    .table(Tickets::Table)
                    .col(Tickets::TicketNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_created_at")
                    .table(Tickets::Table)
                    .col(Tickets::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ValidationRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ValidationRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ValidationRecords::Source).big_integer().not_null())
                    .col(ColumnDef::new(ValidationRecords::Dest).big_integer().null())
                    .col(ColumnDef::new(ValidationRecords::RecordType).string().not_null())
                    .col(ColumnDef::new(ValidationRecords::Media).string().not_null())
                    .col(ColumnDef::new(ValidationRecords::Serialno).string().not_null())
                    .col(ColumnDef::new(ValidationRecords::Deviceid).string().null())
                    .col(
                        ColumnDef::new(ValidationRecords::Amount)
                            .decimal_len(12, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ValidationRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShiftSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShiftSessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShiftSessions::ShiftId).string().not_null())
                    .col(ColumnDef::new(ShiftSessions::StationId).big_integer().not_null())
                    .col(ColumnDef::new(ShiftSessions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ShiftSessions::DeviceId).string().null())
                    .col(&mut col_amount(ShiftSessions::QrAmount))
                    .col(&mut col_amount(ShiftSessions::QrCashAmount))
                    .col(&mut col_amount(ShiftSessions::QrUpiAmount))
                    .col(&mut col_count(ShiftSessions::QrTicketCount))
                    .col(&mut col_count(ShiftSessions::QrTicketCountCash))
                    .col(&mut col_count(ShiftSessions::QrTicketCountUpi))
                    .col(&mut col_amount(ShiftSessions::PenaltyAmount))
                    .col(&mut col_amount(ShiftSessions::PenaltyCashAmount))
                    .col(&mut col_amount(ShiftSessions::PenaltyUpiAmount))
                    .col(&mut col_count(ShiftSessions::PenaltyTicketCount))
                    .col(&mut col_amount(ShiftSessions::FailedAmount))
                    .col(&mut col_amount(ShiftSessions::FailedCashAmount))
                    .col(&mut col_amount(ShiftSessions::FailedUpiAmount))
                    .col(&mut col_count(ShiftSessions::FailedCount))
                    .col(&mut col_amount(ShiftSessions::TotalAmount))
                    .col(&mut col_amount(ShiftSessions::TotalCashAmount))
                    .col(&mut col_amount(ShiftSessions::TotalUpiAmount))
                    .col(&mut col_count(ShiftSessions::CardEntries))
                    .col(&mut col_count(ShiftSessions::CardExits))
                    .col(&mut col_count(ShiftSessions::QrEntries))
                    .col(&mut col_count(ShiftSessions::QrExits))
                    .col(
                        ColumnDef::new(ShiftSessions::LoginTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShiftSessions::LogoutTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShiftSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(ShiftSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // one row per shift
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_shift_sessions_shift_id")
                    .table(ShiftSessions::Table)
                    .col(ShiftSessions::ShiftId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PenaltyRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PenaltyRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PenaltyRecords::StationId).big_integer().not_null())
                    .col(ColumnDef::new(PenaltyRecords::TicketNo).string().null())
                    .col(
                        ColumnDef::new(PenaltyRecords::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PenaltyRecords::PaymentMode).string().not_null())
                    .col(
                        ColumnDef::new(PenaltyRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PenaltyRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShiftSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ValidationRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stations::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn col_amount<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .decimal_len(12, 2)
        .not_null()
        .default(0)
        .to_owned()
}

fn col_count<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name).integer().not_null().default(0).to_owned()
}
