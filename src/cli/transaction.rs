//! Transaction history CLI commands
//!
//! Income and expense records feed auto-tracked goals.

use clap::Subcommand;

use crate::display::format_transaction_list;
use crate::error::{StrideError, StrideResult};
use crate::models::{TransactionId, TransactionKind};
use crate::services::{NewTransaction, TransactionService};

use super::{parse_choice, parse_money, parse_optional_date, print_json, CommandContext};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an income or expense
    Add {
        /// income or expense
        kind: String,
        /// Positive amount (e.g., "42.50")
        amount: String,
        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Where the money came from or went to
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short = 'm', long)]
        description: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    ctx: &CommandContext<'_>,
    cmd: TransactionCommands,
) -> StrideResult<()> {
    let service = TransactionService::new(ctx.storage, ctx.clock);

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            date,
            category,
            source,
            description,
        } => {
            let input = NewTransaction {
                kind: parse_choice::<TransactionKind>(&kind)?,
                amount: parse_money(&amount)?,
                date: parse_optional_date(date.as_deref())?,
                category,
                source,
                description,
            };

            let record = service.add(&ctx.user, input)?;
            println!(
                "Recorded {} of {} on {}",
                record.kind,
                record.amount.format_with_symbol(ctx.symbol()),
                record.date.format("%Y-%m-%d")
            );
            println!("  ID: {}", record.id);
        }

        TransactionCommands::List { limit, json } => {
            let records = service.list(&ctx.user, Some(limit))?;
            if json {
                print_json(&records)?;
            } else {
                print!("{}", format_transaction_list(&records, ctx.symbol()));
            }
        }

        TransactionCommands::Delete { id } => {
            let id = id
                .parse::<TransactionId>()
                .map_err(|_| StrideError::transaction_not_found(&id))?;
            let removed = service.delete(&ctx.user, id)?;
            println!(
                "Deleted {} of {}",
                removed.kind,
                removed.amount.format_with_symbol(ctx.symbol())
            );
        }
    }

    Ok(())
}
