//! Crew/role authorization policy.
//!
//! One table, consulted by every mutating operation before any evaluation
//! work happens. Call sites never encode their own role rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{GuideId, Passenger, PassengerStatus};

/// Role an actor claims for a call. Identity and role are passed explicitly
/// into every service call; there is no ambient session state. Absence of a
/// role means "not crew".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Lead,
    Support,
    OpsAdmin,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Support => "support",
            Self::OpsAdmin => "ops_admin",
        }
    }
}

/// Explicit actor identity for a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: GuideId,
    pub role: Option<ActorRole>,
}

impl ActorRef {
    pub fn new(id: impl Into<String>, role: Option<ActorRole>) -> Self {
        Self {
            id: GuideId(id.into()),
            role,
        }
    }
}

/// Every action the policy arbitrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewAction {
    ConfirmOwnAssignment,
    EditChecklistItem,
    RecordPassengerStatus,
    SubmitRiskAssessment,
    TriggerStart,
    TriggerEnd,
    ManageCrew,
    ViewUnmaskedPassengerData,
}

impl CrewAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ConfirmOwnAssignment => "confirm own assignment",
            Self::EditChecklistItem => "edit checklist item",
            Self::RecordPassengerStatus => "record passenger status",
            Self::SubmitRiskAssessment => "submit risk assessment",
            Self::TriggerStart => "start trip",
            Self::TriggerEnd => "end trip",
            Self::ManageCrew => "assign or remove crew",
            Self::ViewUnmaskedPassengerData => "view unmasked passenger data",
        }
    }
}

/// The policy table. Only leads trigger phase transitions; leads and support
/// edit operational data; only ops admins manage crew; passenger personal
/// data is unmasked for leads and ops admins only.
pub fn allows(action: CrewAction, role: Option<ActorRole>) -> bool {
    let Some(role) = role else {
        return false;
    };

    match action {
        CrewAction::ConfirmOwnAssignment
        | CrewAction::EditChecklistItem
        | CrewAction::RecordPassengerStatus
        | CrewAction::SubmitRiskAssessment => {
            matches!(role, ActorRole::Lead | ActorRole::Support)
        }
        CrewAction::TriggerStart | CrewAction::TriggerEnd => matches!(role, ActorRole::Lead),
        CrewAction::ManageCrew => matches!(role, ActorRole::OpsAdmin),
        CrewAction::ViewUnmaskedPassengerData => {
            matches!(role, ActorRole::Lead | ActorRole::OpsAdmin)
        }
    }
}

/// Reject an action up front, before any gate evaluation runs.
pub fn authorize(action: CrewAction, actor: &ActorRef) -> Result<(), AuthorizationError> {
    if allows(action, actor.role) {
        Ok(())
    } else {
        Err(AuthorizationError::Denied {
            action,
            role: actor.role,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    Denied {
        action: CrewAction,
        role: Option<ActorRole>,
    },
    NotConfirmedLead {
        guide: GuideId,
    },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationError::Denied { action, role } => {
                let role = role.map(ActorRole::label).unwrap_or("non-crew");
                write!(f, "role '{}' may not {}", role, action.label())
            }
            AuthorizationError::NotConfirmedLead { guide } => {
                write!(f, "guide {} is not this trip's confirmed lead", guide)
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Passenger data as exposed to a given role. Name, phone, and notes are
/// masked below the lead/ops_admin visibility tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassengerView {
    pub id: super::domain::PassengerId,
    pub full_name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: PassengerStatus,
    pub status_label: &'static str,
    pub masked: bool,
}

pub fn passenger_view(passenger: &Passenger, role: Option<ActorRole>) -> PassengerView {
    let unmasked = allows(CrewAction::ViewUnmaskedPassengerData, role);
    if unmasked {
        PassengerView {
            id: passenger.id.clone(),
            full_name: passenger.full_name.clone(),
            phone: passenger.phone.clone(),
            notes: passenger.notes.clone(),
            status: passenger.status,
            status_label: passenger.status.label(),
            masked: false,
        }
    } else {
        PassengerView {
            id: passenger.id.clone(),
            full_name: mask(&passenger.full_name),
            phone: None,
            notes: None,
            status: passenger.status,
            status_label: passenger.status.label(),
            masked: true,
        }
    }
}

fn mask(value: &str) -> String {
    match value.chars().next() {
        Some(first) => format!("{first}***"),
        None => "***".to_string(),
    }
}
