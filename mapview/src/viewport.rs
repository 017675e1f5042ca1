use std::cell::RefCell;
use std::rc::Weak;

use geom::{GPSBounds, LonLat};

use crate::{
    Attached, Failure, Generation, Geometry, Graphic, LatestGeneration, MapSurface, NonFatal,
};

const PADDING_FACTOR: f64 = 0.05;
// Keeps a single point (or several coinciding ones) from asking for a zero-sized view
const MIN_PADDING: f64 = 0.01;

/// An axis-aligned box in map coordinates; x is longitude and y is latitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    pub fn point(pt: LonLat) -> Self {
        Self {
            xmin: pt.x(),
            ymin: pt.y(),
            xmax: pt.x(),
            ymax: pt.y(),
        }
    }

    pub fn from_points(pts: &[LonLat]) -> Option<Self> {
        if pts.is_empty() {
            return None;
        }
        let mut bounds = GPSBounds::new();
        for pt in pts {
            bounds.update(*pt);
        }
        Some(Self {
            xmin: bounds.min_lon,
            ymin: bounds.min_lat,
            xmax: bounds.max_lon,
            ymax: bounds.max_lat,
        })
    }

    /// The smallest extent covering all of these, or `None` if there are none.
    pub fn union_all<I: IntoIterator<Item = Self>>(extents: I) -> Option<Self> {
        let corners: Vec<LonLat> = extents
            .into_iter()
            .flat_map(|extent| extent.corners())
            .collect();
        Self::from_points(&corners)
    }

    fn corners(&self) -> [LonLat; 2] {
        [
            LonLat::new(self.xmin, self.ymin),
            LonLat::new(self.xmax, self.ymax),
        ]
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Grow by 5% of the span on each side, but never by less than a minimum.
    pub fn padded(&self) -> Self {
        let pad_x = (self.width() * PADDING_FACTOR).max(MIN_PADDING);
        let pad_y = (self.height() * PADDING_FACTOR).max(MIN_PADDING);
        Self {
            xmin: self.xmin - pad_x,
            ymin: self.ymin - pad_y,
            xmax: self.xmax + pad_x,
            ymax: self.ymax + pad_y,
        }
    }
}

/// How a viewport fit ended. Callers are free to ignore this; nothing here is an error the user
/// should see.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FitOutcome {
    /// The surface was asked to frame this extent
    Framed(Extent),
    /// Nothing in the generation has a position, so the view was left alone
    Empty,
    /// A newer generation replaced this one before the fit could happen
    Superseded,
    /// The surface went away or refused; the view was left alone
    Failed,
}

/// The padded extent covering all graphics, or `None` if none of them have a usable position.
pub fn fitted_extent<S: MapSurface + ?Sized>(surface: &S, graphics: &[Graphic]) -> Option<Extent> {
    let mut pts = Vec::new();
    for graphic in graphics {
        match graphic.geometry {
            Geometry::Point(pt) => pts.push(pt),
            Geometry::Polyline(ref line) => {
                if let Some(extent) = surface
                    .line_extent(line)
                    .non_fatal(Failure::Geometry, "measuring a line")
                {
                    pts.extend(extent.corners());
                }
            }
        }
    }
    Extent::from_points(&pts).map(|extent| extent.padded())
}

/// Waits for the generation's layer to be renderable, then frames everything in it. If the
/// generation stopped being the latest one in the meantime, the result is thrown away.
pub async fn fit<S: MapSurface>(
    surface: Weak<RefCell<S>>,
    generation: Generation,
    latest: LatestGeneration,
    attached: Attached,
) -> FitOutcome {
    let signal = attached.await;

    // Checked first: a superseded layer is usually detached, so its signal never arrives either
    if !latest.is(generation.id) {
        debug!("Dropping the viewport fit for stale {:?}", generation.id);
        return FitOutcome::Superseded;
    }
    if signal
        .non_fatal(Failure::SurfaceTransient, "waiting for the layer to attach")
        .is_none()
    {
        return FitOutcome::Failed;
    }
    let surface = match surface.upgrade() {
        Some(surface) => surface,
        None => return FitOutcome::Failed,
    };
    let mut surface = match surface.try_borrow_mut() {
        Ok(surface) => surface,
        Err(err) => {
            warn!("Can't fit the viewport while the map surface is busy: {err}");
            return FitOutcome::Failed;
        }
    };

    let graphics = match surface
        .graphics(generation.layer)
        .non_fatal(Failure::SurfaceTransient, "collecting graphics")
    {
        Some(graphics) => graphics,
        None => return FitOutcome::Failed,
    };
    let extent = match fitted_extent(&*surface, &graphics) {
        Some(extent) => extent,
        None => return FitOutcome::Empty,
    };
    match surface
        .request_extent(extent)
        .non_fatal(Failure::SurfaceTransient, "framing the viewport")
    {
        Some(()) => FitOutcome::Framed(extent),
        None => FitOutcome::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Outline, Symbol, Tag};
    use fleet::{RouteID, VehicleID};

    fn point(x: f64, y: f64) -> Graphic {
        Graphic {
            geometry: Geometry::Point(LonLat::new(x, y)),
            symbol: Symbol::Marker {
                color: Color::hex("#000000"),
                size: 10.0,
                outline: Outline {
                    color: Color::hex(Color::WHITE),
                    width: 1.0,
                },
            },
            tag: Tag::Vehicle(VehicleID::new("v")),
            popup: None,
        }
    }

    fn line(pts: Vec<(f64, f64)>) -> Graphic {
        Graphic {
            geometry: Geometry::Polyline(pts.into_iter().map(|(x, y)| LonLat::new(x, y)).collect()),
            symbol: Symbol::Line {
                color: Color::hex("#000000"),
                width: 1.0,
            },
            tag: Tag::Route(RouteID::new("r")),
            popup: None,
        }
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_point_gets_minimum_padding() {
        let extent = Extent::point(LonLat::new(10.0, 20.0)).padded();
        assert!(extent.width() >= 0.02 - 1e-9);
        assert!(extent.height() >= 0.02 - 1e-9);
        assert!(approx_eq(extent.xmin, 9.99));
        assert!(approx_eq(extent.ymax, 20.01));
    }

    #[test]
    fn wide_extents_pad_proportionally() {
        let extent = Extent {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 10.0,
            ymax: 1.0,
        }
        .padded();
        assert!(approx_eq(extent.xmin, -0.5));
        assert!(approx_eq(extent.xmax, 10.5));
        assert!(approx_eq(extent.ymin, -0.05));
        assert!(approx_eq(extent.ymax, 1.05));
    }

    #[test]
    fn union_is_componentwise() {
        let extent = Extent::from_points(&[
            LonLat::new(3.0, -1.0),
            LonLat::new(-2.0, 4.0),
            LonLat::new(1.0, 1.0),
        ])
        .unwrap();
        assert_eq!(
            extent,
            Extent {
                xmin: -2.0,
                ymin: -1.0,
                xmax: 3.0,
                ymax: 4.0,
            }
        );
        assert_eq!(Extent::from_points(&[]), None);
    }

    #[test]
    fn union_all_covers_every_extent() {
        let extent = Extent::union_all(vec![
            Extent::point(LonLat::new(-95.4, 29.0)),
            Extent {
                xmin: -95.5,
                ymin: 29.1,
                xmax: -95.45,
                ymax: 29.2,
            },
        ])
        .unwrap();
        assert!(approx_eq(extent.xmin, -95.5));
        assert!(approx_eq(extent.xmax, -95.4));
        assert!(approx_eq(extent.ymin, 29.0));
        assert!(approx_eq(extent.ymax, 29.2));
        assert_eq!(Extent::union_all(Vec::new()), None);
    }

    struct NoLineExtents;

    impl MapSurface for NoLineExtents {
        fn create_layer(&mut self) -> crate::LayerID {
            crate::LayerID(0)
        }
        fn attach_layer(&mut self, _: crate::LayerID) -> anyhow::Result<()> {
            Ok(())
        }
        fn detach_layer(&mut self, _: crate::LayerID) -> anyhow::Result<()> {
            Ok(())
        }
        fn add_graphic(&mut self, _: crate::LayerID, _: Graphic) -> anyhow::Result<()> {
            Ok(())
        }
        fn graphics(&self, _: crate::LayerID) -> anyhow::Result<Vec<Graphic>> {
            Ok(Vec::new())
        }
        fn line_extent(&self, _: &[LonLat]) -> Option<Extent> {
            None
        }
        fn on_ready(&mut self, callback: Box<dyn FnOnce()>) {
            callback();
        }
        fn when_attached(&mut self, _: crate::LayerID) -> Attached {
            futures_channel::oneshot::channel().1
        }
        fn request_extent(&mut self, _: Extent) -> anyhow::Result<()> {
            Ok(())
        }
        fn request_center(&mut self, _: LonLat, _: f64) -> anyhow::Result<()> {
            Ok(())
        }
        fn destroy(&mut self) {}
    }

    #[test]
    fn lines_without_extents_are_skipped() {
        let graphics = vec![line(vec![(0.0, 0.0), (50.0, 50.0)]), point(1.0, 2.0)];
        let extent = fitted_extent(&NoLineExtents, &graphics).unwrap();
        assert!(approx_eq(extent.xmin, 0.99));
        assert!(approx_eq(extent.xmax, 1.01));

        assert_eq!(fitted_extent(&NoLineExtents, &graphics[0..1]), None);
    }

    #[test]
    fn lines_use_their_bounding_box() {
        let surface = crate::RecordingSurface::new();
        let graphics = vec![line(vec![(0.0, 0.0), (10.0, 20.0)]), point(5.0, 5.0)];
        let extent = fitted_extent(&surface, &graphics).unwrap();
        assert!(approx_eq(extent.xmin, -0.5));
        assert!(approx_eq(extent.ymax, 21.0));
    }

    #[test]
    fn nothing_to_fit() {
        let surface = crate::RecordingSurface::new();
        assert_eq!(fitted_extent(&surface, &[]), None);
    }
}
