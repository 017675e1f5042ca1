use std::collections::BTreeSet;
use std::path::Path;

use abstutil::{Counter, Timer};
use anyhow::Result;
use geom::GPSBounds;

use crate::{routes, vehicles, Route, RouteColor, Vehicle, VehicleID, VehicleType};

/// Everything that can be drawn. Loaded once and never mutated; the order here is the draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    pub vehicles: Vec<Vehicle>,
    pub routes: Vec<Route>,
}

pub struct Summary {
    pub total_vehicles: usize,
    pub online_vehicles: usize,
    pub vehicles_per_type: Counter<VehicleType>,
    pub routes: usize,
    pub gps_bounds: GPSBounds,
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            vehicles: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn load<R1: std::io::Read, R2: std::io::Read>(
        vehicles_reader: R1,
        routes_reader: R2,
    ) -> Result<Self> {
        let vehicles = vehicles::load(vehicles_reader)?;
        let routes = routes::load(routes_reader)?;
        Ok(Self { vehicles, routes })
    }

    /// Expects `vehicles.json` and `routes.json` in the directory.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P, timer: &mut Timer) -> Result<Self> {
        let dir = dir.as_ref();
        timer.start("load catalog");
        let vehicles = vehicles::load(fs_err::File::open(dir.join("vehicles.json"))?)
            .map_err(|err| anyhow!("vehicles.json: {err}"))?;
        let routes = routes::load(fs_err::File::open(dir.join("routes.json"))?)
            .map_err(|err| anyhow!("routes.json: {err}"))?;
        timer.stop("load catalog");
        info!(
            "Loaded {} vehicles and {} routes from {}",
            vehicles.len(),
            routes.len(),
            dir.display()
        );
        Ok(Self { vehicles, routes })
    }

    pub fn vehicle(&self, id: &VehicleID) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn vehicle_types(&self) -> BTreeSet<VehicleType> {
        self.vehicles
            .iter()
            .map(|v| v.vehicle_type.clone())
            .collect()
    }

    pub fn route_colors(&self) -> BTreeSet<RouteColor> {
        self.routes.iter().map(|r| r.color.clone()).collect()
    }

    pub fn summary(&self) -> Summary {
        let mut vehicles_per_type = Counter::new();
        let mut gps_bounds = GPSBounds::new();
        let mut online_vehicles = 0;
        for v in &self.vehicles {
            vehicles_per_type.inc(v.vehicle_type.clone());
            gps_bounds.update(v.pos);
            if v.online {
                online_vehicles += 1;
            }
        }
        for r in &self.routes {
            for pt in &r.path {
                gps_bounds.update(*pt);
            }
        }
        Summary {
            total_vehicles: self.vehicles.len(),
            online_vehicles,
            vehicles_per_type,
            routes: self.routes.len(),
            gps_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn summary_counts() {
        let catalog = testdata::catalog();
        let summary = catalog.summary();
        assert_eq!(summary.total_vehicles, 4);
        assert_eq!(summary.online_vehicles, 3);
        assert_eq!(summary.vehicles_per_type.get(VehicleType::Trash), 2);
        assert_eq!(summary.vehicles_per_type.get(VehicleType::HeavyTrash), 0);
        assert_eq!(summary.routes, 3);
    }

    #[test]
    fn lookup() {
        let catalog = testdata::catalog();
        assert_eq!(catalog.vehicle(&VehicleID::new("v2")).unwrap().name, "Recycler 2");
        assert!(catalog.vehicle(&VehicleID::new("nope")).is_none());
        assert_eq!(catalog.route_colors().len(), 2);
    }
}
