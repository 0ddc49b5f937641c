//! Trip status graph.
//!
//! ```text
//! pending -> escrowed -> funded -> in_transit -> completed -> repaid
//!    \__________\__________\__________\-> cancelled
//! ```

use super::trips_model::TripStatus;

/// The single forward step out of `status`, if any.
pub fn next_forward(status: TripStatus) -> Option<TripStatus> {
    match status {
        TripStatus::Pending => Some(TripStatus::Escrowed),
        TripStatus::Escrowed => Some(TripStatus::Funded),
        TripStatus::Funded => Some(TripStatus::InTransit),
        TripStatus::InTransit => Some(TripStatus::Completed),
        TripStatus::Completed => Some(TripStatus::Repaid),
        TripStatus::Cancelled | TripStatus::Repaid => None,
    }
}

pub fn can_transition(from: TripStatus, to: TripStatus) -> bool {
    if to == TripStatus::Cancelled {
        return matches!(
            from,
            TripStatus::Pending | TripStatus::Escrowed | TripStatus::Funded | TripStatus::InTransit
        );
    }
    next_forward(from) == Some(to)
}

/// Forward steps from `from` up to and including `to`, or `None` if `to` is
/// not ahead of `from` on the main path.
pub fn forward_path(from: TripStatus, to: TripStatus) -> Option<Vec<TripStatus>> {
    let mut path = Vec::new();
    let mut current = from;
    while current != to {
        current = next_forward(current)?;
        path.push(current);
    }
    Some(path)
}
