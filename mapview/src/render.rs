use fleet::{Route, Vehicle, VehicleType, VisibleSet};

use crate::{describe, Color, Failure, Geometry, Graphic, NonFatal, Outline, Symbol, Tag};

const TRASH: &str = "#ef4444";
const RECYCLING: &str = "#22c55e";
const HEAVY_TRASH: &str = "#3b82f6";
const OTHER_VEHICLE: &str = "#6b7280";
const ROUTE_START: &str = "#32cd32";
const ROUTE_END: &str = "#ff0000";

const VEHICLE_SIZE: f64 = 14.0;
const ENDPOINT_SIZE: f64 = 10.0;
const ROUTE_WIDTH: f64 = 4.0;
const LABEL_FONT_SIZE: f64 = 10.0;
const LABEL_Y_OFFSET: f64 = -18.0;

pub fn vehicle_color(vehicle_type: &VehicleType) -> Color {
    Color::hex(match vehicle_type {
        VehicleType::Trash => TRASH,
        VehicleType::Recycling => RECYCLING,
        VehicleType::HeavyTrash => HEAVY_TRASH,
        VehicleType::Other(_) => OTHER_VEHICLE,
    })
}

/// Every graphic for one generation, in draw order: vehicles (each followed by its label), then
/// routes (each followed by its start and end markers).
pub fn materialize(visible: &VisibleSet) -> Vec<Graphic> {
    let mut graphics = Vec::new();
    for vehicle in &visible.vehicles {
        draw_vehicle(&mut graphics, vehicle, visible.show_labels);
    }
    if visible.show_routes {
        for route in &visible.routes {
            draw_route(&mut graphics, route);
        }
    }
    graphics
}

fn draw_vehicle(graphics: &mut Vec<Graphic>, vehicle: &Vehicle, label: bool) {
    graphics.push(Graphic {
        geometry: Geometry::Point(vehicle.pos),
        symbol: Symbol::Marker {
            color: vehicle_color(&vehicle.vehicle_type),
            size: VEHICLE_SIZE,
            outline: Outline {
                color: Color::hex(Color::WHITE),
                width: 1.5,
            },
        },
        tag: Tag::Vehicle(vehicle.id.clone()),
        popup: Some(describe::vehicle(vehicle)),
    });

    if label {
        graphics.push(Graphic {
            geometry: Geometry::Point(vehicle.pos),
            symbol: Symbol::Text {
                text: vehicle.name.clone(),
                color: Color::hex(Color::BLACK),
                font_size: LABEL_FONT_SIZE,
                bold: true,
                y_offset: LABEL_Y_OFFSET,
            },
            tag: Tag::VehicleLabel(vehicle.id.clone()),
            popup: None,
        });
    }
}

fn draw_route(graphics: &mut Vec<Graphic>, route: &Route) {
    let (start, end) = match route
        .start()
        .zip(route.end())
        .non_fatal(Failure::DataGap, &format!("drawing {:?}", route.id))
    {
        Some(pair) => pair,
        None => return,
    };

    graphics.push(Graphic {
        geometry: Geometry::Polyline(route.path.clone()),
        symbol: Symbol::Line {
            color: Color::from(&route.color),
            width: ROUTE_WIDTH,
        },
        tag: Tag::Route(route.id.clone()),
        popup: None,
    });
    for (pt, color, tag) in [
        (start, ROUTE_START, Tag::RouteStart(route.id.clone())),
        (end, ROUTE_END, Tag::RouteEnd(route.id.clone())),
    ] {
        graphics.push(Graphic {
            geometry: Geometry::Point(pt),
            symbol: Symbol::Marker {
                color: Color::hex(color),
                size: ENDPOINT_SIZE,
                outline: Outline {
                    color: Color::hex(Color::WHITE),
                    width: 1.0,
                },
            },
            tag,
            popup: None,
        });
    }
}

#[cfg(test)]
mod tests {
    use geom::LonLat;
    use pretty_assertions::assert_eq;

    use fleet::{RouteColor, RouteID, VehicleID};

    use super::*;

    fn vehicle(id: &str, vehicle_type: &str) -> Vehicle {
        Vehicle {
            id: VehicleID::new(id),
            name: format!("Vehicle {id}"),
            vehicle_type: VehicleType::from(vehicle_type),
            pos: LonLat::new(10.0, 20.0),
            online: true,
            last_seen: None,
        }
    }

    fn route(id: &str, path: Vec<LonLat>) -> Route {
        Route {
            id: RouteID::new(id),
            color: RouteColor::new("#8B5CF6"),
            path,
        }
    }

    #[test]
    fn colors_by_type() {
        assert_eq!(vehicle_color(&VehicleType::Trash).as_str(), TRASH);
        assert_eq!(vehicle_color(&VehicleType::Recycling).as_str(), RECYCLING);
        assert_eq!(vehicle_color(&VehicleType::HeavyTrash).as_str(), HEAVY_TRASH);
        assert_eq!(
            vehicle_color(&VehicleType::from("Sweeper")).as_str(),
            OTHER_VEHICLE
        );
    }

    #[test]
    fn vehicles_with_and_without_labels() {
        let v1 = vehicle("1", "Trash");
        let v2 = vehicle("2", "Mystery");
        let mut visible = VisibleSet {
            vehicles: vec![&v1, &v2],
            routes: Vec::new(),
            show_routes: false,
            show_labels: true,
        };
        let graphics = materialize(&visible);
        let tags: Vec<Tag> = graphics.iter().map(|g| g.tag.clone()).collect();
        assert_eq!(
            tags,
            vec![
                Tag::Vehicle(VehicleID::new("1")),
                Tag::VehicleLabel(VehicleID::new("1")),
                Tag::Vehicle(VehicleID::new("2")),
                Tag::VehicleLabel(VehicleID::new("2")),
            ]
        );
        match graphics[1].symbol {
            Symbol::Text {
                ref text, y_offset, ..
            } => {
                assert_eq!(text, "Vehicle 1");
                assert_eq!(y_offset, -18.0);
            }
            _ => panic!("expected a label, got {:?}", graphics[1]),
        }
        assert_eq!(graphics[2].color().as_str(), OTHER_VEHICLE);
        assert_eq!(
            graphics[0].popup.as_ref().unwrap().lines[2],
            "Last Seen: N/A"
        );

        visible.show_labels = false;
        assert_eq!(materialize(&visible).len(), 2);
    }

    #[test]
    fn routes_get_endpoints() {
        let r1 = route(
            "r1",
            vec![
                LonLat::new(1.0, 2.0),
                LonLat::new(3.0, 4.0),
                LonLat::new(5.0, 6.0),
            ],
        );
        let r2 = route("r2", Vec::new());
        let visible = VisibleSet {
            vehicles: Vec::new(),
            routes: vec![&r1, &r2],
            show_routes: true,
            show_labels: true,
        };
        let graphics = materialize(&visible);
        // The empty route contributes nothing
        assert_eq!(graphics.len(), 3);
        // The source's spelling of the color is kept
        assert_eq!(graphics[0].color().as_str(), "#8B5CF6");
        assert_eq!(graphics[1].geometry, Geometry::Point(LonLat::new(1.0, 2.0)));
        assert_eq!(graphics[1].color().as_str(), ROUTE_START);
        assert_eq!(graphics[2].geometry, Geometry::Point(LonLat::new(5.0, 6.0)));
        assert_eq!(graphics[2].tag, Tag::RouteEnd(RouteID::new("r1")));
    }

    #[test]
    fn routes_need_the_overlay() {
        let r1 = route("r1", vec![LonLat::new(1.0, 2.0)]);
        let visible = VisibleSet {
            vehicles: Vec::new(),
            routes: vec![&r1],
            show_routes: false,
            show_labels: false,
        };
        assert!(materialize(&visible).is_empty());
    }
}
