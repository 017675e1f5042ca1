use std::fmt;

use anyhow::Result;
use futures_channel::oneshot;
use geom::LonLat;

use crate::{Extent, Graphic};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerID(pub usize);

/// Resolves once a layer's graphics are actually renderable. If the sender is dropped instead,
/// the layer will never render (it was detached, or the surface went away).
pub type Attached = oneshot::Receiver<()>;

/// Whatever hosts the map. Only primitives live here; deciding what to draw happens elsewhere.
pub trait MapSurface {
    fn create_layer(&mut self) -> LayerID;
    fn attach_layer(&mut self, layer: LayerID) -> Result<()>;
    /// Must succeed for layers that're already detached or unknown.
    fn detach_layer(&mut self, layer: LayerID) -> Result<()>;
    fn add_graphic(&mut self, layer: LayerID, graphic: Graphic) -> Result<()>;
    fn graphics(&self, layer: LayerID) -> Result<Vec<Graphic>>;

    /// The bounding box of a line, if the surface can compute one. Returning `None` just leaves
    /// the line out of viewport fitting.
    fn line_extent(&self, pts: &[LonLat]) -> Option<Extent> {
        Extent::from_points(pts)
    }

    /// Fires once, after the surface is set up. If that already happened, fires immediately.
    fn on_ready(&mut self, callback: Box<dyn FnOnce()>);
    /// Resolves once `layer` is renderable. Callers ask after attaching, so a layer that already
    /// rendered must resolve right away; a detached or unknown layer drops the sender.
    fn when_attached(&mut self, layer: LayerID) -> Attached;
    fn request_extent(&mut self, extent: Extent) -> Result<()>;
    fn request_center(&mut self, center: LonLat, zoom: f64) -> Result<()>;
    /// Releases everything. Safe to call more than once.
    fn destroy(&mut self);
}

/// The only kinds of failure the map ever sees. None of them are fatal; the next filter change
/// redraws everything anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// The surface is mid-teardown or not set up yet
    SurfaceTransient,
    /// Something referenced has nothing to draw
    DataGap,
    /// An extent couldn't be worked out
    Geometry,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Failure::SurfaceTransient => write!(f, "transient surface failure"),
            Failure::DataGap => write!(f, "missing data"),
            Failure::Geometry => write!(f, "geometry failure"),
        }
    }
}

/// Every surface call that's allowed to fail goes through here, so the failures that get ignored
/// are all logged the same way.
pub trait NonFatal<T> {
    fn non_fatal(self, failure: Failure, context: &str) -> Option<T>;
}

impl<T> NonFatal<T> for Result<T> {
    fn non_fatal(self, failure: Failure, context: &str) -> Option<T> {
        match self {
            Ok(x) => Some(x),
            Err(err) => {
                debug!("Ignoring {failure} while {context}: {err}");
                None
            }
        }
    }
}

impl<T> NonFatal<T> for Option<T> {
    fn non_fatal(self, failure: Failure, context: &str) -> Option<T> {
        if self.is_none() {
            debug!("Ignoring {failure} while {context}");
        }
        self
    }
}

impl<T> NonFatal<T> for std::result::Result<T, oneshot::Canceled> {
    fn non_fatal(self, failure: Failure, context: &str) -> Option<T> {
        self.map_err(|err| anyhow!(err)).non_fatal(failure, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_fatal_swallows_errors() {
        let ok: Result<usize> = Ok(3);
        assert_eq!(ok.non_fatal(Failure::SurfaceTransient, "testing"), Some(3));
        let err: Result<usize> = Err(anyhow!("layer already gone"));
        assert_eq!(err.non_fatal(Failure::SurfaceTransient, "testing"), None);
    }

    #[test]
    fn canceled_signals_are_swallowed() {
        let (tx, mut rx) = oneshot::channel::<()>();
        drop(tx);
        assert_eq!(
            rx.try_recv().non_fatal(Failure::SurfaceTransient, "testing"),
            None
        );
    }
}
