#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod catalog;
mod filters;
mod ids;
mod routes;
mod vehicles;
mod visibility;

pub use catalog::{Catalog, Summary};
pub use filters::FilterState;
pub use ids::{RouteColor, RouteID, VehicleID};
pub use routes::Route;
pub use vehicles::{Vehicle, VehicleType};
pub use visibility::{resolve, VisibleSet};

#[cfg(test)]
mod testdata {
    use crate::Catalog;

    pub fn catalog() -> Catalog {
        let vehicles = r#"[
            {"id": "v1", "name": "Truck 1", "type": "Trash", "lat": 29.04, "lng": -95.41, "online": true},
            {"id": "v2", "name": "Recycler 2", "type": "Recycling", "lat": 29.05, "lng": -95.42, "online": true},
            {"id": "v3", "name": "Truck 3", "type": "Trash", "lat": 29.06, "lng": -95.43, "online": false},
            {"id": "v4", "name": "Sweeper 4", "type": "Sweeper", "lat": 29.07, "lng": -95.44, "online": true}
        ]"#;
        let routes = r##"[
            {"id": "r1", "color": "#ef4444", "path": [{"lat": 29.0, "lng": -95.5}, {"lat": 29.1, "lng": -95.4}]},
            {"id": "r2", "color": "#22c55e", "path": [{"lat": 29.2, "lng": -95.3}, {"lat": 29.3, "lng": -95.2}, {"lat": 29.4, "lng": -95.1}]},
            {"id": "r3", "color": "#EF4444", "path": []}
        ]"##;
        Catalog::load(vehicles.as_bytes(), routes.as_bytes()).unwrap()
    }
}
