use boxoffice_core::Event;
use boxoffice_operations::CompensationFailure;
use boxoffice_operations::operations::purchase::PurchaseOutcome;
use boxoffice_store::AuditEvent;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    pub(crate) fn format_outcome(outcome: &PurchaseOutcome) -> String {
        let ticket = &outcome.ticket;
        let payment = &outcome.payment;

        let mut output = format!("Purchase completed (saga {})\n", outcome.saga_id);
        output.push_str(&format!(
            "  ticket   {}  {} x {}  total {}\n",
            ticket.id, ticket.quantity, ticket.event_id, ticket.total_price
        ));
        output.push_str(&format!(
            "  payment  {}  {}  {}\n",
            payment.id,
            payment.amount,
            payment.status()
        ));

        output.push_str("\nSteps:\n");
        for line in outcome.steps.summary().lines() {
            output.push_str(&format!("  {line}\n"));
        }
        output
    }

    pub(crate) fn format_audit_trail(events: &[AuditEvent]) -> String {
        let mut output = String::from("Audit trail:\n");
        for event in events {
            let payload = match event.payload_json() {
                Ok(value) => value.to_string(),
                Err(_) => String::from_utf8_lossy(&event.payload).into_owned(),
            };
            output.push_str(&format!(
                "  {}. {} {payload}\n",
                event.version, event.event_type
            ));
        }
        output
    }

    pub(crate) fn format_compensation_failures(failures: &[CompensationFailure]) -> String {
        let mut output = String::from("Rollback incomplete:\n");
        for failure in failures {
            output.push_str(&format!(
                "  step {} '{}' could not {}: {}\n",
                failure.ordinal, failure.step, failure.description, failure.error
            ));
        }
        output
    }

    pub(crate) fn format_events(events: &[Event]) -> String {
        if events.is_empty() {
            return "No events configured.\n".to_string();
        }

        let width = events.iter().map(|e| e.name.len()).max().unwrap_or(0);
        let mut output = String::new();
        for event in events {
            let price = event.unit_price.to_string();
            output.push_str(&format!(
                "{}  {:<width$}  {}  {price:>8}  {} of {} left\n",
                event.id,
                event.name,
                event.date.format("%Y-%m-%d %H:%M UTC"),
                event.remaining(),
                event.max_tickets(),
            ));
        }
        output
    }
}
