use crate::{Catalog, FilterState, Route, Vehicle};

/// Exactly what should be on the map for one filter state. Always computed from scratch.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleSet<'a> {
    pub vehicles: Vec<&'a Vehicle>,
    /// Only non-empty when `show_routes` is set. Routes with an empty path may appear here; there's
    /// just nothing to draw for them.
    pub routes: Vec<&'a Route>,
    pub show_routes: bool,
    pub show_labels: bool,
}

impl<'a> VisibleSet<'a> {
    pub fn empty() -> Self {
        Self {
            vehicles: Vec::new(),
            routes: Vec::new(),
            show_routes: false,
            show_labels: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty() && self.routes.is_empty()
    }
}

/// Decide what's visible. Explicitly chosen vehicles win over vehicle types, route colors alone
/// mean only routes, and routes are an overlay that only appears with start/end points enabled and
/// something selected to anchor it.
pub fn resolve<'a>(filters: &FilterState, catalog: &'a Catalog) -> VisibleSet<'a> {
    let explicit = &filters.vehicles;
    let any_type_enabled = filters.any_type_enabled();

    let mut vehicles: Vec<&Vehicle> = if !explicit.is_empty() {
        // IDs missing from the catalog just match nothing
        catalog
            .vehicles
            .iter()
            .filter(|v| explicit.contains(&v.id))
            .collect()
    } else if any_type_enabled {
        catalog
            .vehicles
            .iter()
            .filter(|v| filters.type_enabled(&v.vehicle_type))
            .collect()
    } else {
        Vec::new()
    };

    let show_routes = filters.show_start_end
        && (!filters.route_colors.is_empty() || !explicit.is_empty() || any_type_enabled);

    // Only route colors are selected, so the user wants routes alone
    if !filters.route_colors.is_empty() && explicit.is_empty() && !any_type_enabled {
        vehicles.clear();
    }

    let routes = if !show_routes {
        Vec::new()
    } else if !filters.route_colors.is_empty() {
        catalog
            .routes
            .iter()
            .filter(|r| filters.route_colors.contains(&r.color))
            .collect()
    } else {
        // Routes are shown as context for the selected vehicles
        catalog.routes.iter().collect()
    };

    VisibleSet {
        vehicles,
        routes,
        show_routes,
        show_labels: filters.show_labels,
    }
}
