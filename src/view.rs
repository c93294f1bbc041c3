//! Plain-text rendering of the dashboard screens.

use std::fmt;

use crate::models::{FormField, Record};
use crate::services::editor::EditorState;
use crate::services::invoices::InvoiceViewer;
use crate::utils::format_local_time;

pub const DASHBOARD_TITLE: &str = "Econetra DPP Dashboard";
pub const EMPTY_COLLECTION: &str = "No records yet";
pub const EMPTY_INVOICES: &str = "No invoices found.";

pub fn render_record(record: &Record) -> String {
    format!(
        "{} – {} ({})",
        record.display_name(),
        record.display_category(),
        record.display_status()
    )
}

pub struct RecordList<'a>(pub &'a [Record]);

impl fmt::Display for RecordList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "{}", EMPTY_COLLECTION);
        }
        for record in self.0 {
            writeln!(f, "  • {}  [{}]", render_record(record), record.id)?;
        }
        Ok(())
    }
}

pub struct DashboardView<'a>(pub &'a EditorState);

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "{}", DASHBOARD_TITLE)?;
        match &state.last_synced_at {
            Some(at) => writeln!(f, "{} (synced {})", state.status, format_local_time(at))?,
            None => writeln!(f, "{}", state.status)?,
        }
        writeln!(f)?;

        let heading = if state.form.is_editing() {
            "Edit DPP"
        } else {
            "Add New DPP"
        };
        writeln!(f, "{}", heading)?;
        for field in FormField::ALL {
            writeln!(f, "  {:<9} {}", format!("{}:", field), state.form.get(field))?;
        }
        writeln!(f)?;

        writeln!(f, "All DPPs")?;
        write!(f, "{}", RecordList(&state.records))
    }
}

pub struct InvoicesView<'a>(pub &'a InvoiceViewer);

impl fmt::Display for InvoicesView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let viewer = self.0;
        writeln!(f, "Saved Invoices")?;
        if viewer.invoices().is_empty() {
            writeln!(f, "{}", EMPTY_INVOICES)?;
        }
        for invoice in viewer.invoices() {
            writeln!(
                f,
                "  Invoice #: {}  [{}]",
                invoice.invoice_number().unwrap_or("N/A"),
                invoice.id().unwrap_or_default()
            )?;
        }
        writeln!(f)?;
        match viewer.selected() {
            Some(invoice) => {
                writeln!(f, "Invoice Details:")?;
                writeln!(f, "{}", invoice.to_pretty_json())
            }
            None => writeln!(f, "Select an invoice to view details"),
        }
    }
}

pub fn render_records(records: &[Record]) -> String {
    RecordList(records).to_string()
}

pub fn render_dashboard(state: &EditorState) -> String {
    DashboardView(state).to_string()
}

pub fn render_invoices(viewer: &InvoiceViewer) -> String {
    InvoicesView(viewer).to_string()
}
