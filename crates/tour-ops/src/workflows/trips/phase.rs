use serde::{Deserialize, Serialize};

/// Ordered operational phases of a trip. The order is total and transitions
/// only ever move to the immediate successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    PreTrip,
    BeforeDeparture,
    DuringTrip,
    PostTrip,
}

impl TripPhase {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::PreTrip,
            Self::BeforeDeparture,
            Self::DuringTrip,
            Self::PostTrip,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PreTrip => "Pre-Trip",
            Self::BeforeDeparture => "Before Departure",
            Self::DuringTrip => "During Trip",
            Self::PostTrip => "Post-Trip",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::PreTrip => Some(Self::BeforeDeparture),
            Self::BeforeDeparture => Some(Self::DuringTrip),
            Self::DuringTrip => Some(Self::PostTrip),
            Self::PostTrip => None,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PostTrip)
    }
}

/// Validate a requested phase move. Backward moves, skips, and moves out of
/// the terminal phase are all rejected here, before any gate is consulted.
pub fn advance(from: TripPhase, to: TripPhase) -> Result<(), TransitionError> {
    match from.next() {
        Some(next) if next == to => Ok(()),
        Some(_) => Err(TransitionError::OutOfOrder { from, to }),
        None => Err(TransitionError::Terminal { from }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot move a trip from {} to {}", .from.label(), .to.label())]
    OutOfOrder { from: TripPhase, to: TripPhase },
    #[error("trip already reached its terminal phase ({})", .from.label())]
    Terminal { from: TripPhase },
}
