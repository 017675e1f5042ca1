use std::cell::Cell;
use std::rc::Rc;

use fleet::VisibleSet;

use crate::{render, Failure, LayerID, MapSurface, NonFatal};

/// Increases by one with every install. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationID(pub usize);

/// One batch of graphics, attached to the surface as a single layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Generation {
    pub id: GenerationID,
    pub layer: LayerID,
}

/// Shared with pending work, so it can tell whether its generation is still the one on screen.
#[derive(Clone, Debug)]
pub struct LatestGeneration(Rc<Cell<Option<GenerationID>>>);

impl LatestGeneration {
    fn new() -> Self {
        Self(Rc::new(Cell::new(None)))
    }

    pub fn get(&self) -> Option<GenerationID> {
        self.0.get()
    }

    pub fn is(&self, id: GenerationID) -> bool {
        self.0.get() == Some(id)
    }

    fn set(&self, id: Option<GenerationID>) {
        self.0.set(id);
    }
}

/// Owns the one generation that's allowed to be on the surface.
pub struct GenerationManager {
    current: Option<Generation>,
    latest: LatestGeneration,
    next_id: usize,
}

impl GenerationManager {
    pub fn new() -> Self {
        Self {
            current: None,
            latest: LatestGeneration::new(),
            next_id: 1,
        }
    }

    pub fn current(&self) -> Option<Generation> {
        self.current
    }

    pub fn latest(&self) -> LatestGeneration {
        self.latest.clone()
    }

    /// Replace whatever's on the surface with the graphics for `visible`. The old generation is
    /// detached first; if that fails (it was already removed, or the surface is tearing down), the
    /// new one is installed anyway.
    pub fn install<S: MapSurface + ?Sized>(
        &mut self,
        visible: &VisibleSet,
        surface: &mut S,
    ) -> Generation {
        self.retire(surface);

        let id = GenerationID(self.next_id);
        self.next_id += 1;

        // Attach while still empty, so the surface has somewhere to receive graphics
        let layer = surface.create_layer();
        surface
            .attach_layer(layer)
            .non_fatal(Failure::SurfaceTransient, "attaching a new layer");

        let graphics = render::materialize(visible);
        let count = graphics.len();
        for graphic in graphics {
            surface
                .add_graphic(layer, graphic)
                .non_fatal(Failure::SurfaceTransient, "adding a graphic");
        }
        debug!("Installed {:?} on {:?} with {} graphics", id, layer, count);

        let generation = Generation { id, layer };
        self.current = Some(generation);
        self.latest.set(Some(id));
        generation
    }

    /// Take the current generation off the surface, if there is one. Calling this again does
    /// nothing.
    pub fn retire<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(old) = self.current.take() {
            surface
                .detach_layer(old.layer)
                .non_fatal(Failure::SurfaceTransient, "detaching the old layer");
        }
        self.latest.set(None);
    }

    /// Forget the current generation without touching the surface, for when the surface is gone.
    pub fn abandon(&mut self) {
        self.current = None;
        self.latest.set(None);
    }
}

impl Default for GenerationManager {
    fn default() -> Self {
        Self::new()
    }
}
