use gosub_shared::node::NodeId;
use std::fmt::{Display, Formatter};

/// Data structure for document fragments. The host is set for the contents of a `<template>`.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DocumentFragmentData {
    pub host: Option<NodeId>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ShadowRootMode {
    #[default]
    Open,
    Closed,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum SlotAssignmentMode {
    /// Slottables find their slot through the `slot` and `name` attributes
    #[default]
    Named,
    /// Slots are filled through `HTMLSlotElement.assign()`
    Manual,
}

/// Options for attaching a shadow root
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct ShadowRootInit {
    pub mode: ShadowRootMode,
    pub delegates_focus: bool,
    pub slot_assignment: SlotAssignmentMode,
}

/// Data structure for shadow roots. A shadow root is a document fragment without a tree parent.
#[derive(Debug, PartialEq, Clone)]
pub struct ShadowRootData {
    pub host: NodeId,
    pub mode: ShadowRootMode,
    pub slot_assignment: SlotAssignmentMode,
    pub delegates_focus: bool,
}

impl ShadowRootData {
    pub(crate) fn new(host: NodeId, init: ShadowRootInit) -> Self {
        Self {
            host,
            mode: init.mode,
            slot_assignment: init.slot_assignment,
            delegates_focus: init.delegates_focus,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode == ShadowRootMode::Open
    }

    pub fn is_named(&self) -> bool {
        self.slot_assignment == SlotAssignmentMode::Named
    }
}

impl Display for ShadowRootMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShadowRootMode::Open => write!(f, "open"),
            ShadowRootMode::Closed => write!(f, "closed"),
        }
    }
}
