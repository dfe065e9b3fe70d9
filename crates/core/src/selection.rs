//! Selection state and its reducer.
//!
//! [`SelectionState`] is an immutable value: every change goes through
//! [`SelectionState::apply`], which consumes the old state and returns the
//! new one. Assets are held behind `Arc`, so a snapshot taken for a running
//! batch keeps its assets alive even if the slot is replaced meanwhile; the
//! asset (and its spooled file) is released when the last holder drops it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::asset::{Slot, UploadedAsset};
use crate::prompt::ItemSet;

/// How many garments the user is trying on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentMode {
    #[default]
    Single,
    Double,
}

/// Which garment is tried on in [`GarmentMode::Single`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GarmentKind {
    #[default]
    Top,
    Bottom,
}

/// A state transition.
#[derive(Debug, Clone)]
pub enum SelectionAction {
    /// Put an asset into a slot, replacing any previous one.
    Set(Slot, Arc<UploadedAsset>),
    /// Empty a slot.
    Clear(Slot),
    SetGarmentMode(GarmentMode),
    SetSingleGarmentKind(GarmentKind),
    /// Drop all assets and restore the defaults.
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    model: Option<Arc<UploadedAsset>>,
    top: Option<Arc<UploadedAsset>>,
    bottom: Option<Arc<UploadedAsset>>,
    accessory: Option<Arc<UploadedAsset>>,
    garment_mode: GarmentMode,
    single_garment_kind: GarmentKind,
}

/// The assets that take part in one submission.
#[derive(Debug, Clone)]
pub struct TryOnInputs {
    pub model: Arc<UploadedAsset>,
    pub top: Option<Arc<UploadedAsset>>,
    pub bottom: Option<Arc<UploadedAsset>>,
    pub accessory: Option<Arc<UploadedAsset>>,
}

impl TryOnInputs {
    pub fn items(&self) -> ItemSet {
        ItemSet {
            top: self.top.is_some(),
            bottom: self.bottom.is_some(),
            accessory: self.accessory.is_some(),
        }
    }
}

impl SelectionState {
    /// Apply one transition, producing the next state.
    pub fn apply(self, action: SelectionAction) -> Self {
        match action {
            SelectionAction::Set(slot, asset) => self.with_slot(slot, Some(asset)),
            SelectionAction::Clear(slot) => self.with_slot(slot, None),
            SelectionAction::SetGarmentMode(garment_mode) => Self {
                garment_mode,
                ..self
            },
            SelectionAction::SetSingleGarmentKind(single_garment_kind) => Self {
                single_garment_kind,
                ..self
            },
            SelectionAction::Reset => Self::default(),
        }
    }

    fn with_slot(self, slot: Slot, asset: Option<Arc<UploadedAsset>>) -> Self {
        match slot {
            Slot::Model => Self {
                model: asset,
                ..self
            },
            Slot::Top => Self { top: asset, ..self },
            Slot::Bottom => Self {
                bottom: asset,
                ..self
            },
            Slot::Accessory => Self {
                accessory: asset,
                ..self
            },
        }
    }

    pub fn asset(&self, slot: Slot) -> Option<&Arc<UploadedAsset>> {
        match slot {
            Slot::Model => self.model.as_ref(),
            Slot::Top => self.top.as_ref(),
            Slot::Bottom => self.bottom.as_ref(),
            Slot::Accessory => self.accessory.as_ref(),
        }
    }

    pub fn garment_mode(&self) -> GarmentMode {
        self.garment_mode
    }

    pub fn single_garment_kind(&self) -> GarmentKind {
        self.single_garment_kind
    }

    /// Whether the top slot takes part in generation under the current mode.
    fn uses_top(&self) -> bool {
        self.garment_mode == GarmentMode::Double || self.single_garment_kind == GarmentKind::Top
    }

    /// Whether the bottom slot takes part in generation under the current mode.
    fn uses_bottom(&self) -> bool {
        self.garment_mode == GarmentMode::Double
            || self.single_garment_kind == GarmentKind::Bottom
    }

    /// Why generation is not allowed yet, or `None` when it is.
    pub fn blocked_reason(&self) -> Option<&'static str> {
        if self.model.is_none() {
            return Some("A model photo is required");
        }
        match self.garment_mode {
            GarmentMode::Double if self.top.is_none() || self.bottom.is_none() => {
                Some("Both a top and a bottom garment are required")
            }
            GarmentMode::Single => match self.single_garment_kind {
                GarmentKind::Top if self.top.is_none() => Some("A top garment is required"),
                GarmentKind::Bottom if self.bottom.is_none() => {
                    Some("A bottom garment is required")
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Pure enablement predicate for the submit action.
    pub fn can_generate(&self) -> bool {
        self.blocked_reason().is_none()
    }

    /// The assets to submit, or `None` when generation is not allowed.
    ///
    /// Garments in slots the current mode does not use are left out; the
    /// accessory is included whenever present.
    pub fn try_on_inputs(&self) -> Option<TryOnInputs> {
        if !self.can_generate() {
            return None;
        }
        Some(TryOnInputs {
            model: self.model.clone()?,
            top: self.top.clone().filter(|_| self.uses_top()),
            bottom: self.bottom.clone().filter(|_| self.uses_bottom()),
            accessory: self.accessory.clone(),
        })
    }
}
