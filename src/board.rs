//! Kanban columns and counters for the ticket dashboard.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::models::catalog_model::TicketState;
use crate::models::ticket_model::Ticket;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub state: TicketState,
    pub tickets: Vec<Ticket>,
}

/// One column per state, in catalog order. Tickets without a state, or with a
/// state missing from the catalog, are left off the board. A state listed
/// twice in the catalog gets two columns holding the same tickets.
pub fn group_by_state(tickets: &[Ticket], states: &[TicketState]) -> Vec<BoardColumn> {
    let mut grouped: HashMap<i64, Vec<Ticket>> = states
        .iter()
        .map(|state| (state.id_estado, Vec::new()))
        .collect();

    for ticket in tickets {
        let Some(state_id) = ticket.id_estado.as_ref().map(|s| s.id_estado) else {
            continue;
        };
        if let Some(column) = grouped.get_mut(&state_id) {
            column.push(ticket.clone());
        }
    }

    states
        .iter()
        .map(|state| BoardColumn {
            state: state.clone(),
            tickets: grouped.get(&state.id_estado).cloned().unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardStats {
    pub open: usize,
    pub in_progress: usize,
    pub critical: usize,
    pub created_today: usize,
}

/// Counters over the tickets currently shown. Name matching is
/// case-insensitive substring matching on the catalog names.
pub fn stats(tickets: &[Ticket], today: NaiveDate) -> BoardStats {
    let mut stats = BoardStats::default();
    for ticket in tickets {
        let state = ticket.state_name().to_lowercase();
        let priority = ticket.priority_name().to_lowercase();
        if state.contains("abierto") {
            stats.open += 1;
        }
        if state.contains("progreso") {
            stats.in_progress += 1;
        }
        if priority.contains("crítica") || priority.contains("critica") {
            stats.critical += 1;
        }
        let created_today = ticket
            .fecha_creacion
            .map(|created| created.with_timezone(&Local).date_naive() == today)
            .unwrap_or(false);
        if created_today {
            stats.created_today += 1;
        }
    }
    stats
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
