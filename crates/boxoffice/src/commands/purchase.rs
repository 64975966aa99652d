use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use boxoffice_operations::operations::purchase::TicketPurchaseSaga;
use boxoffice_operations::providers::{
    InMemoryEmailService, InMemoryEventRepository, InMemoryPaymentService, InMemoryTicketService,
};
use boxoffice_operations::{BoxofficeConfig, FaultInjector, FaultPolicy};
use boxoffice_store::{EventStore, InMemoryEventStore, export_rows, write_json_lines};
use clap::{Args, ValueEnum};
use tracing::info;

use crate::error::{CliError, Result};
use crate::output::PlainTextFormatter;

#[derive(Args)]
pub(crate) struct PurchaseArgs {
    /// Buyer's user id
    #[arg(long)]
    user: String,

    /// Id of the event to buy tickets for
    #[arg(long)]
    event: String,

    /// Number of tickets
    #[arg(long, short = 'n')]
    quantity: u32,

    /// Force a collaborator to fail, overriding the config
    #[arg(long, value_enum)]
    fail_at: Option<FailAt>,

    /// Write the audit log as JSON lines in `domain_events` layout
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FailAt {
    Reserve,
    Payment,
    Email,
}

pub(crate) fn run(args: PurchaseArgs, config: BoxofficeConfig) -> Result<()> {
    let faults = |stage: FailAt, configured: FaultPolicy| {
        let policy = if args.fail_at == Some(stage) {
            FaultPolicy::Always
        } else {
            configured
        };
        FaultInjector::new(policy)
    };

    let repository = Arc::new(InMemoryEventRepository::with_events(config.events));
    let tickets = Arc::new(InMemoryTicketService::new(
        Arc::clone(&repository),
        faults(FailAt::Reserve, config.ticketing.fault),
    ));
    let payments = Arc::new(InMemoryPaymentService::new(
        config.payment.limit,
        faults(FailAt::Payment, config.payment.fault),
    ));
    let mail = Arc::new(InMemoryEmailService::new(faults(
        FailAt::Email,
        config.email.fault,
    )));
    let store = Arc::new(InMemoryEventStore::new());

    let saga = TicketPurchaseSaga::new(repository, tickets, payments, mail, Arc::clone(&store));
    let result = saga.handle(&args.user, &args.event, args.quantity);

    let saga_id = match &result {
        Ok(outcome) => {
            print!("{}", PlainTextFormatter::format_outcome(outcome));
            Some(outcome.saga_id)
        }
        Err(err) => err.saga_id(),
    };
    if let Some(saga_id) = saga_id {
        println!();
        print!(
            "{}",
            PlainTextFormatter::format_audit_trail(&saga.audit_trail(&saga_id))
        );
    }

    if let Some(path) = &args.export {
        export(store.as_ref(), path)?;
    }

    match result {
        Ok(_) => Ok(()),
        Err(err) => {
            if !err.compensation_failures().is_empty() {
                eprint!(
                    "{}",
                    PlainTextFormatter::format_compensation_failures(err.compensation_failures())
                );
            }
            Err(err.into())
        }
    }
}

fn export(store: &impl EventStore, path: &Path) -> Result<()> {
    let rows = export_rows(store)?;
    let file = File::create(path).map_err(|source| CliError::ExportCreate {
        path: path.to_path_buf(),
        source,
    })?;
    write_json_lines(&rows, BufWriter::new(file))?;
    info!(path = %path.display(), rows = rows.len(), "exported audit log");
    Ok(())
}
