use std::collections::BTreeSet;

use anyhow::Result;
use geom::LonLat;
use serde::Deserialize;

use crate::{RouteColor, RouteID};

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteID,
    pub color: RouteColor,
    // Can be empty; such routes have nothing to draw
    pub path: Vec<LonLat>,
}

impl Route {
    pub fn describe(&self) -> String {
        format!("Route {}", self.id)
    }

    pub fn start(&self) -> Option<LonLat> {
        self.path.first().cloned()
    }

    pub fn end(&self) -> Option<LonLat> {
        self.path.last().cloned()
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Route>> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    let mut ids = BTreeSet::new();
    let mut routes = Vec::new();
    for rec in records {
        if !ids.insert(rec.id.clone()) {
            bail!("Duplicate {:?}", rec.id);
        }
        let path: Vec<LonLat> = rec
            .path
            .into_iter()
            .map(|pt| LonLat::new(pt.lng, pt.lat))
            .collect();
        if path.is_empty() {
            warn!("{:?} has an empty path; it'll never be drawn", rec.id);
        }
        routes.push(Route {
            id: rec.id,
            color: rec.color,
            path,
        });
    }
    Ok(routes)
}

#[derive(Deserialize)]
struct Record {
    id: RouteID,
    color: RouteColor,
    #[serde(default)]
    path: Vec<PointRecord>,
}

#[derive(Deserialize)]
struct PointRecord {
    lat: f64,
    lng: f64,
}
