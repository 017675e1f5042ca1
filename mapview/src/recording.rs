use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use anyhow::Result;
use futures_channel::oneshot;
use geom::LonLat;

use crate::{Attached, Extent, Graphic, LayerID, MapSurface};

/// A map surface that draws nothing and remembers everything. Headless rendering and tests use
/// this.
///
/// By default the surface is ready immediately and layers become renderable as soon as they're
/// attached. `manual()` turns both off, so callers decide when the `ReadyTrigger` fires and when
/// `render_frame` happens.
pub struct RecordingSurface {
    layers: BTreeMap<LayerID, Vec<Graphic>>,
    // In attach order
    attached: Vec<LayerID>,
    rendered: BTreeSet<LayerID>,
    next_layer: usize,

    readiness: Rc<RefCell<Readiness>>,
    waiting_for_render: BTreeMap<LayerID, Vec<oneshot::Sender<()>>>,
    auto_render: bool,
    measure_lines: bool,
    destroyed: bool,

    pub requested_extents: Vec<Extent>,
    pub requested_centers: Vec<(LonLat, f64)>,
}

#[derive(Default)]
struct Readiness {
    ready: bool,
    closed: bool,
    callbacks: Vec<Box<dyn FnOnce()>>,
}

/// Tells a `RecordingSurface` it's ready. This lives apart from the surface, so the callbacks can
/// use the surface themselves.
#[derive(Clone)]
pub struct ReadyTrigger(Rc<RefCell<Readiness>>);

impl ReadyTrigger {
    /// Runs every waiting callback once. Does nothing the second time, or after the surface is
    /// destroyed.
    pub fn fire(&self) {
        let callbacks = {
            let mut readiness = self.0.borrow_mut();
            if readiness.ready || readiness.closed {
                return;
            }
            readiness.ready = true;
            std::mem::take(&mut readiness.callbacks)
        };
        for callback in callbacks {
            callback();
        }
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            layers: BTreeMap::new(),
            attached: Vec::new(),
            rendered: BTreeSet::new(),
            next_layer: 0,

            readiness: Rc::new(RefCell::new(Readiness {
                ready: true,
                ..Default::default()
            })),
            waiting_for_render: BTreeMap::new(),
            auto_render: true,
            measure_lines: true,
            destroyed: false,

            requested_extents: Vec::new(),
            requested_centers: Vec::new(),
        }
    }

    pub fn manual() -> Self {
        let mut surface = Self::new();
        surface.readiness.borrow_mut().ready = false;
        surface.auto_render = false;
        surface
    }

    /// Behave like a surface that can't measure lines.
    pub fn without_line_extents(mut self) -> Self {
        self.measure_lines = false;
        self
    }

    pub fn ready_trigger(&self) -> ReadyTrigger {
        ReadyTrigger(self.readiness.clone())
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn attached_layers(&self) -> Vec<LayerID> {
        self.attached.clone()
    }

    /// Everything attached so far becomes renderable.
    pub fn render_frame(&mut self) {
        for layer in self.attached.clone() {
            self.rendered.insert(layer);
            for tx in self.waiting_for_render.remove(&layer).unwrap_or_default() {
                // The receiver might've been dropped already; that's fine
                let _ = tx.send(());
            }
        }
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for RecordingSurface {
    fn create_layer(&mut self) -> LayerID {
        let layer = LayerID(self.next_layer);
        self.next_layer += 1;
        if !self.destroyed {
            self.layers.insert(layer, Vec::new());
        }
        layer
    }

    fn attach_layer(&mut self, layer: LayerID) -> Result<()> {
        if self.destroyed {
            bail!("Can't attach {:?}, the surface is destroyed", layer);
        }
        if !self.layers.contains_key(&layer) {
            bail!("Can't attach unknown {:?}", layer);
        }
        if !self.attached.contains(&layer) {
            self.attached.push(layer);
        }
        if self.auto_render {
            self.render_frame();
        }
        Ok(())
    }

    fn detach_layer(&mut self, layer: LayerID) -> Result<()> {
        self.attached.retain(|x| *x != layer);
        self.rendered.remove(&layer);
        // Anybody waiting on this layer will never hear back
        self.waiting_for_render.remove(&layer);
        Ok(())
    }

    fn add_graphic(&mut self, layer: LayerID, graphic: Graphic) -> Result<()> {
        match self.layers.get_mut(&layer) {
            Some(graphics) => {
                graphics.push(graphic);
                Ok(())
            }
            None => bail!("Can't add a graphic to unknown {:?}", layer),
        }
    }

    fn graphics(&self, layer: LayerID) -> Result<Vec<Graphic>> {
        match self.layers.get(&layer) {
            Some(graphics) => Ok(graphics.clone()),
            None => bail!("Unknown {:?}", layer),
        }
    }

    fn line_extent(&self, pts: &[LonLat]) -> Option<Extent> {
        if self.measure_lines {
            Extent::from_points(pts)
        } else {
            None
        }
    }

    fn on_ready(&mut self, callback: Box<dyn FnOnce()>) {
        let ready = {
            let mut readiness = self.readiness.borrow_mut();
            if !readiness.ready && !readiness.closed {
                readiness.callbacks.push(callback);
                return;
            }
            readiness.ready
        };
        if ready {
            callback();
        }
    }

    fn when_attached(&mut self, layer: LayerID) -> Attached {
        let (tx, rx) = oneshot::channel();
        if self.rendered.contains(&layer) {
            let _ = tx.send(());
        } else if !self.destroyed && self.attached.contains(&layer) {
            self.waiting_for_render
                .entry(layer)
                .or_insert_with(Vec::new)
                .push(tx);
        }
        // Otherwise tx is dropped here, and the layer will never render
        rx
    }

    fn request_extent(&mut self, extent: Extent) -> Result<()> {
        if self.destroyed {
            bail!("Can't frame {:?}, the surface is destroyed", extent);
        }
        self.requested_extents.push(extent);
        Ok(())
    }

    fn request_center(&mut self, center: LonLat, zoom: f64) -> Result<()> {
        if self.destroyed {
            bail!("Can't recenter, the surface is destroyed");
        }
        self.requested_centers.push((center, zoom));
        Ok(())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.layers.clear();
        self.attached.clear();
        self.rendered.clear();
        self.waiting_for_render.clear();
        let mut readiness = self.readiness.borrow_mut();
        readiness.closed = true;
        readiness.callbacks.clear();
    }
}
