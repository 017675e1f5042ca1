#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod describe;
pub mod export;
mod generation;
mod graphics;
mod recording;
pub mod render;
mod surface;
pub mod viewport;

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

use geom::LonLat;

use fleet::{Catalog, FilterState};

pub use generation::{Generation, GenerationID, GenerationManager, LatestGeneration};
pub use graphics::{Color, Geometry, Graphic, Outline, Popup, Symbol, Tag};
pub use recording::{ReadyTrigger, RecordingSurface};
pub use surface::{Attached, Failure, LayerID, MapSurface, NonFatal};
pub use viewport::{Extent, FitOutcome};

/// A viewport fit that hasn't happened yet. The host's event loop should drive it; dropping it
/// just skips the fit.
pub type PendingFit = Pin<Box<dyn Future<Output = FitOutcome>>>;

#[derive(Clone, Debug, PartialEq)]
pub struct MapOptions {
    /// Where "recenter" goes
    pub center: LonLat,
    pub zoom: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LonLat::new(-95.416, 29.044),
            zoom: 12.0,
        }
    }
}

/// Takes the viewport fits that `LiveMap` starts on its own, and drives them on the host's event
/// loop.
pub type Spawner = Rc<dyn Fn(PendingFit)>;

/// Owns the filter state and keeps the map showing exactly what it selects. Every change to the
/// filters redraws from scratch.
pub struct LiveMap<S: MapSurface> {
    catalog: Rc<Catalog>,
    // The surface's ready callback redraws, so it needs to reach everything else too
    pipeline: Rc<RefCell<Pipeline<S>>>,
}

struct Pipeline<S: MapSurface> {
    catalog: Rc<Catalog>,
    filters: FilterState,
    options: MapOptions,

    // None after destroy
    surface: Option<Rc<RefCell<S>>>,
    generations: GenerationManager,
    ready: Rc<Cell<bool>>,
    // The filters changed since the last draw
    dirty: bool,
    spawner: Option<Spawner>,
}

impl<S: MapSurface + 'static> LiveMap<S> {
    /// If the surface is already ready, nothing is drawn until `sync` is called. Otherwise the
    /// latest filters are drawn as soon as it becomes ready, and that fit goes to the spawner.
    pub fn new(catalog: Catalog, mut surface: S, options: MapOptions) -> Self {
        let catalog = Rc::new(catalog);
        let ready = Rc::new(Cell::new(false));
        let pipeline = Rc::new_cyclic(|pipeline: &Weak<RefCell<Pipeline<S>>>| {
            let pipeline = pipeline.clone();
            let flag = ready.clone();
            surface.on_ready(Box::new(move || {
                flag.set(true);
                // Still being constructed if this fires right away
                if let Some(pipeline) = pipeline.upgrade() {
                    Pipeline::redraw_when_ready(&pipeline);
                }
            }));

            RefCell::new(Pipeline {
                filters: FilterState::for_catalog(&catalog),
                catalog: catalog.clone(),
                options,

                surface: Some(Rc::new(RefCell::new(surface))),
                generations: GenerationManager::new(),
                ready,
                dirty: true,
                spawner: None,
            })
        });
        Self { catalog, pipeline }
    }

    /// Fits that aren't returned to a caller, like the one after the surface becomes ready, are
    /// handed to this. Without a spawner they're skipped.
    pub fn spawn_fits_with<F: Fn(PendingFit) + 'static>(&mut self, spawner: F) {
        self.pipeline.borrow_mut().spawner = Some(Rc::new(spawner));
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> FilterState {
        self.pipeline.borrow().filters.clone()
    }

    pub fn surface(&self) -> Option<Rc<RefCell<S>>> {
        self.pipeline.borrow().surface.clone()
    }

    pub fn current_generation(&self) -> Option<Generation> {
        self.pipeline.borrow().generations.current()
    }

    /// Produce the next filter state from the current one, then redraw.
    pub fn update<F: FnOnce(FilterState) -> FilterState>(&mut self, f: F) -> Option<PendingFit> {
        let filters = f(self.filters());
        self.set_filters(filters)
    }

    pub fn set_filters(&mut self, filters: FilterState) -> Option<PendingFit> {
        let mut pipeline = self.pipeline.borrow_mut();
        pipeline.filters = filters;
        pipeline.dirty = true;
        pipeline.sync()
    }

    /// Redraw if there's something new to show and the surface can take it. Returns the viewport
    /// fit for the new generation.
    pub fn sync(&mut self) -> Option<PendingFit> {
        self.pipeline.borrow_mut().sync()
    }

    /// Frame everything currently drawn again.
    pub fn zoom_to_fit(&mut self) -> Option<PendingFit> {
        self.pipeline.borrow().zoom_to_fit()
    }

    /// Go back to the default view.
    pub fn recenter(&mut self) {
        self.pipeline.borrow().recenter();
    }

    /// Tear everything down. Safe to call more than once, and while a fit is still pending; that
    /// fit will find its generation gone and do nothing.
    pub fn destroy(&mut self) {
        self.pipeline.borrow_mut().destroy();
    }
}

impl<S: MapSurface + 'static> Pipeline<S> {
    fn redraw_when_ready(pipeline: &RefCell<Self>) {
        let (fit, spawner) = match pipeline.try_borrow_mut() {
            Ok(mut pipeline) => (pipeline.sync(), pipeline.spawner.clone()),
            Err(err) => {
                warn!("Map surface became ready mid-update, drawing on the next sync: {err}");
                return;
            }
        };
        // Outside the borrow, in case the spawner polls right away
        match (fit, spawner) {
            (Some(fit), Some(spawner)) => spawner(fit),
            (Some(_), None) => debug!("No spawner, skipping the fit after the surface got ready"),
            (None, _) => {}
        }
    }

    fn sync(&mut self) -> Option<PendingFit> {
        if !self.dirty || !self.ready.get() {
            return None;
        }
        let surface = self.surface.clone()?;
        self.dirty = false;

        let visible = fleet::resolve(&self.filters, &self.catalog);
        let generation = {
            let mut surface = match surface.try_borrow_mut() {
                Ok(surface) => surface,
                Err(err) => {
                    warn!("Can't redraw while the map surface is busy: {err}");
                    self.dirty = true;
                    return None;
                }
            };
            self.generations.install(&visible, &mut *surface)
        };
        info!(
            "Showing {} vehicles and {} routes as {:?}",
            visible.vehicles.len(),
            visible.routes.len(),
            generation.id
        );
        Some(self.fit(surface, generation))
    }

    fn zoom_to_fit(&self) -> Option<PendingFit> {
        let generation = self.generations.current()?;
        let surface = self.surface.clone()?;
        Some(self.fit(surface, generation))
    }

    fn fit(&self, surface: Rc<RefCell<S>>, generation: Generation) -> PendingFit {
        let attached = match surface.try_borrow_mut() {
            Ok(mut surface) => surface.when_attached(generation.layer),
            Err(err) => {
                warn!("Can't wait for {:?} while the map surface is busy: {err}", generation.layer);
                return Box::pin(async { FitOutcome::Failed });
            }
        };
        Box::pin(viewport::fit(
            Rc::downgrade(&surface),
            generation,
            self.generations.latest(),
            attached,
        ))
    }
}

impl<S: MapSurface> Pipeline<S> {
    fn recenter(&self) {
        let surface = match self.surface {
            Some(ref surface) => surface,
            None => return,
        };
        if let Some(mut surface) = surface
            .try_borrow_mut()
            .map_err(|err| anyhow!(err))
            .non_fatal(Failure::SurfaceTransient, "recentering")
        {
            surface
                .request_center(self.options.center, self.options.zoom)
                .non_fatal(Failure::SurfaceTransient, "recentering");
        }
    }

    fn destroy(&mut self) {
        self.generations.abandon();
        if let Some(surface) = self.surface.take() {
            match surface.try_borrow_mut() {
                Ok(mut surface) => surface.destroy(),
                Err(err) => warn!("Map surface busy during teardown, not destroying it: {err}"),
            }
        }
        self.dirty = false;
    }
}

impl<S: MapSurface> Drop for LiveMap<S> {
    fn drop(&mut self) {
        if let Ok(mut pipeline) = self.pipeline.try_borrow_mut() {
            pipeline.destroy();
        }
    }
}
