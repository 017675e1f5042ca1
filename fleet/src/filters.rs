use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Catalog, RouteColor, VehicleID, VehicleType};

/// What the user wants to see. This is an immutable value; every change produces a new state
/// through one of the setters below, and the map is redrawn from scratch.
///
/// Every field falls back to its default when missing from the serialized form, so older saved
/// states keep working as fields are added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterState {
    pub types: BTreeMap<VehicleType, bool>,
    /// Explicitly chosen vehicles. When non-empty, this overrides `types`.
    pub vehicles: BTreeSet<VehicleID>,
    pub show_start_end: bool,
    pub show_labels: bool,
    /// Reserved for historical lookups; doesn't affect what's visible.
    pub selected_date: Option<NaiveDate>,
    pub route_colors: BTreeSet<RouteColor>,
    /// Consumed by geocoding elsewhere; doesn't affect what's visible.
    pub address_search: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            types: VehicleType::known().into_iter().map(|t| (t, true)).collect(),
            vehicles: BTreeSet::new(),
            show_start_end: true,
            show_labels: true,
            selected_date: None,
            route_colors: BTreeSet::new(),
            address_search: String::new(),
        }
    }
}

impl FilterState {
    /// The default state, plus every type that appears in the catalog, all enabled.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        let mut filters = Self::default();
        for t in catalog.vehicle_types() {
            filters.types.insert(t, true);
        }
        filters
    }

    pub fn any_type_enabled(&self) -> bool {
        self.types.values().any(|enabled| *enabled)
    }

    pub fn type_enabled(&self, vehicle_type: &VehicleType) -> bool {
        self.types.get(vehicle_type).cloned().unwrap_or(false)
    }

    pub fn toggle_type(mut self, vehicle_type: &VehicleType) -> Self {
        let enabled = self.type_enabled(vehicle_type);
        self.types.insert(vehicle_type.clone(), !enabled);
        self
    }

    pub fn toggle_vehicle(mut self, id: &VehicleID) -> Self {
        if !self.vehicles.remove(id) {
            self.vehicles.insert(id.clone());
        }
        self
    }

    pub fn toggle_route_color(mut self, color: &RouteColor) -> Self {
        if !self.route_colors.remove(color) {
            self.route_colors.insert(color.clone());
        }
        self
    }

    pub fn toggle_start_end(mut self) -> Self {
        self.show_start_end = !self.show_start_end;
        self
    }

    pub fn toggle_labels(mut self) -> Self {
        self.show_labels = !self.show_labels;
        self
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.selected_date = date;
        self
    }

    pub fn with_address_search<S: Into<String>>(mut self, query: S) -> Self {
        self.address_search = query.into();
        self
    }
}
