use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson};

use crate::{Geometry, Graphic, Symbol, Tag};

/// One feature per graphic, with its tag and color as properties.
pub fn to_geojson(graphics: &[Graphic]) -> GeoJson {
    let mut features = Vec::new();
    for graphic in graphics {
        let value = match graphic.geometry {
            Geometry::Point(pt) => geojson::Value::Point(vec![pt.x(), pt.y()]),
            Geometry::Polyline(ref pts) => {
                geojson::Value::LineString(pts.iter().map(|pt| vec![pt.x(), pt.y()]).collect())
            }
        };
        let mut feature = Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(value)),
            id: None,
            properties: None,
            foreign_members: None,
        };
        let (kind, id) = describe_tag(&graphic.tag);
        feature.set_property("type", kind);
        feature.set_property("id", id);
        feature.set_property("color", graphic.color().as_str());
        if let Symbol::Text { ref text, .. } = graphic.symbol {
            feature.set_property("text", text.as_str());
        }
        if let Some(ref popup) = graphic.popup {
            feature.set_property("title", popup.title.as_str());
        }
        features.push(feature);
    }

    GeoJson::FeatureCollection(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn write_geojson(path: &str, graphics: &[Graphic]) -> Result<()> {
    fs_err::write(path, serde_json::to_string_pretty(&to_geojson(graphics))?)?;
    info!("Wrote {} graphics to {}", graphics.len(), path);
    Ok(())
}

fn describe_tag(tag: &Tag) -> (&'static str, String) {
    match tag {
        Tag::Vehicle(id) => ("vehicle", id.to_string()),
        Tag::VehicleLabel(id) => ("vehicle label", id.to_string()),
        Tag::Route(id) => ("route", id.to_string()),
        Tag::RouteStart(id) => ("route start", id.to_string()),
        Tag::RouteEnd(id) => ("route end", id.to_string()),
    }
}
