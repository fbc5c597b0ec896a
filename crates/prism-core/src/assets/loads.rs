//! Load requests, tickets and the generation tracker
//!
//! A load that mutates the primary object carries a [`LoadTicket`]. Issuing a
//! new load for the same [`LoadSlot`] bumps the slot generation, so results of
//! superseded loads are recognised and dropped when they arrive.

use crate::geometry::{Geometry, Typeface};
use crate::scene::NodeId;

use super::{AssetError, AssetKey, CubeMapData, ImageData};

/// Part of the primary object a load will replace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSlot {
    PrimaryGeometry,
    PrimaryMaterial,
}

impl LoadSlot {
    fn index(self) -> usize {
        match self {
            Self::PrimaryGeometry => 0,
            Self::PrimaryMaterial => 1,
        }
    }
}

/// What has to be fetched
#[derive(Debug, Clone, PartialEq)]
pub enum LoadJob {
    Image(AssetKey),
    CubeMap(AssetKey),
    Font(AssetKey),
    /// Ask the user for an image file
    PickImage,
    /// Ask the user for an OBJ model
    PickModel,
}

/// Load produced by a reconciliation handler
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub job: LoadJob,
    pub slot: Option<LoadSlot>,
}

impl LoadRequest {
    /// Cache-only load with no mutation attached
    pub fn cache(job: LoadJob) -> Self {
        Self { job, slot: None }
    }

    pub fn for_slot(job: LoadJob, slot: LoadSlot) -> Self {
        Self {
            job,
            slot: Some(slot),
        }
    }
}

/// Identity of the primary object a load was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub slot: LoadSlot,
    pub target: NodeId,
    pub generation: u64,
}

/// Load handed to the loader
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedLoad {
    pub job: LoadJob,
    pub ticket: Option<LoadTicket>,
}

/// Result of a job
///
/// For the picker jobs `None` means the dialog was cancelled.
#[derive(Debug)]
pub enum LoadPayload {
    Image {
        key: AssetKey,
        result: Result<ImageData, AssetError>,
    },
    CubeMap {
        key: AssetKey,
        result: Result<CubeMapData, AssetError>,
    },
    Font {
        key: AssetKey,
        result: Result<Typeface, AssetError>,
    },
    PickedImage(Option<Result<(String, ImageData), AssetError>>),
    PickedModel(Option<Result<(String, Geometry), AssetError>>),
}

/// Finished load sent back to the frame loop
#[derive(Debug)]
pub struct CompletedLoad {
    pub ticket: Option<LoadTicket>,
    pub payload: LoadPayload,
}

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    generation: u64,
    target: Option<NodeId>,
}

/// Latest issued generation per slot
#[derive(Debug, Default)]
pub struct LoadTracker {
    slots: [SlotState; 2],
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a request into an issued load, ticketing it when it targets a slot
    pub fn issue(&mut self, request: LoadRequest, target: Option<NodeId>) -> IssuedLoad {
        let ticket = match (request.slot, target) {
            (Some(slot), Some(target)) => {
                let state = &mut self.slots[slot.index()];
                state.generation += 1;
                state.target = Some(target);
                Some(LoadTicket {
                    slot,
                    target,
                    generation: state.generation,
                })
            }
            _ => None,
        };
        IssuedLoad {
            job: request.job,
            ticket,
        }
    }

    /// Supersede whatever is in flight for `slot`
    pub fn invalidate(&mut self, slot: LoadSlot) {
        let state = &mut self.slots[slot.index()];
        state.generation += 1;
        state.target = None;
    }

    /// The primary object was rebuilt as `new`
    ///
    /// A pending geometry keeps applying to the rebuilt object; a pending
    /// material does not, since the rebuild chose a new material.
    pub fn retarget(&mut self, old: NodeId, new: NodeId) {
        let geometry = &mut self.slots[LoadSlot::PrimaryGeometry.index()];
        if geometry.target == Some(old) {
            geometry.target = Some(new);
        }
        self.invalidate(LoadSlot::PrimaryMaterial);
    }

    /// Whether a result with `ticket` may still be applied to `live`
    pub fn is_current(&self, ticket: &LoadTicket, live: Option<NodeId>) -> bool {
        let state = &self.slots[ticket.slot.index()];
        state.generation == ticket.generation && state.target.is_some() && state.target == live
    }

    /// Mark the slot settled once its result has been applied
    pub fn complete(&mut self, ticket: &LoadTicket) {
        let state = &mut self.slots[ticket.slot.index()];
        if state.generation == ticket.generation {
            state.target = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font_request() -> LoadRequest {
        LoadRequest::for_slot(
            LoadJob::Font(AssetKey::Font("f.json".to_string())),
            LoadSlot::PrimaryGeometry,
        )
    }

    #[test]
    fn test_cache_loads_are_unticketed() {
        let mut tracker = LoadTracker::new();
        let issued = tracker.issue(
            LoadRequest::cache(LoadJob::Image(AssetKey::Image("a.jpg".to_string()))),
            Some(NodeId::new()),
        );
        assert!(issued.ticket.is_none());
        let ticket = tracker.issue(font_request(), Some(NodeId::new())).ticket.unwrap();
        assert_eq!(ticket.generation, 1);
    }

    #[test]
    fn test_newer_load_supersedes_older() {
        let mut tracker = LoadTracker::new();
        let node = NodeId::new();
        let first = tracker.issue(font_request(), Some(node)).ticket.unwrap();
        let second = tracker.issue(font_request(), Some(node)).ticket.unwrap();
        assert!(!tracker.is_current(&first, Some(node)));
        assert!(tracker.is_current(&second, Some(node)));
    }

    #[test]
    fn test_replaced_target_rejects_result() {
        let mut tracker = LoadTracker::new();
        let node = NodeId::new();
        let ticket = tracker.issue(font_request(), Some(node)).ticket.unwrap();
        assert!(!tracker.is_current(&ticket, Some(NodeId::new())));
        assert!(!tracker.is_current(&ticket, None));
    }

    #[test]
    fn test_retarget_follows_geometry_only() {
        let mut tracker = LoadTracker::new();
        let old = NodeId::new();
        let geometry = tracker.issue(font_request(), Some(old)).ticket.unwrap();
        let material = tracker
            .issue(
                LoadRequest::for_slot(LoadJob::PickImage, LoadSlot::PrimaryMaterial),
                Some(old),
            )
            .ticket
            .unwrap();

        let new = NodeId::new();
        tracker.retarget(old, new);
        assert!(tracker.is_current(&geometry, Some(new)));
        assert!(!tracker.is_current(&material, Some(new)));
    }

    #[test]
    fn test_invalidate_and_complete() {
        let mut tracker = LoadTracker::new();
        let node = NodeId::new();
        let ticket = tracker.issue(font_request(), Some(node)).ticket.unwrap();
        tracker.complete(&ticket);
        assert!(!tracker.is_current(&ticket, Some(node)));

        let ticket = tracker.issue(font_request(), Some(node)).ticket.unwrap();
        tracker.invalidate(LoadSlot::PrimaryGeometry);
        assert!(!tracker.is_current(&ticket, Some(node)));
    }
}
