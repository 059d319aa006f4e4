//! Status presentation table
//!
//! The single place that maps a status to how it is shown. Renderers look up
//! `AgentStatus::style()` instead of matching on the status themselves.

use crate::model::AgentStatus;

/// Indicator color for a status dot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    Gray,
}

/// Badge emphasis for a status label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub status: AgentStatus,
    pub label: &'static str,
    pub color: StatusColor,
    pub badge: BadgeVariant,
}

const STYLES: [StatusStyle; 4] = [
    StatusStyle {
        status: AgentStatus::Active,
        label: "Active",
        color: StatusColor::Green,
        badge: BadgeVariant::Default,
    },
    StatusStyle {
        status: AgentStatus::Idle,
        label: "Idle",
        color: StatusColor::Yellow,
        badge: BadgeVariant::Secondary,
    },
    StatusStyle {
        status: AgentStatus::Error,
        label: "Error",
        color: StatusColor::Red,
        badge: BadgeVariant::Destructive,
    },
    StatusStyle {
        status: AgentStatus::Stopped,
        label: "Stopped",
        color: StatusColor::Gray,
        badge: BadgeVariant::Outline,
    },
];

impl AgentStatus {
    pub fn style(&self) -> &'static StatusStyle {
        // STYLES is ordered like the enum
        &STYLES[*self as usize]
    }
}
