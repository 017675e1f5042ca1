use std::collections::BTreeMap;
use std::fmt;

use anyhow::Result;
use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::VehicleID;

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id: VehicleID,
    pub name: String,
    pub vehicle_type: VehicleType,
    pub pos: LonLat,
    pub online: bool,
    pub last_seen: Option<String>,
}

/// The set of types is open; anything unrecognized is kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleType {
    Trash,
    Recycling,
    HeavyTrash,
    Other(String),
}

impl VehicleType {
    /// The types every filter state starts with, whether or not the catalog has such vehicles.
    pub fn known() -> Vec<Self> {
        vec![VehicleType::Trash, VehicleType::Recycling, VehicleType::HeavyTrash]
    }

    pub fn name(&self) -> &str {
        match self {
            VehicleType::Trash => "Trash",
            VehicleType::Recycling => "Recycling",
            VehicleType::HeavyTrash => "Heavy Trash",
            VehicleType::Other(x) => x,
        }
    }
}

impl From<&str> for VehicleType {
    fn from(x: &str) -> Self {
        match x {
            "Trash" => VehicleType::Trash,
            "Recycling" => VehicleType::Recycling,
            "Heavy Trash" => VehicleType::HeavyTrash,
            _ => VehicleType::Other(x.to_string()),
        }
    }
}

impl From<String> for VehicleType {
    fn from(x: String) -> Self {
        VehicleType::from(x.as_str())
    }
}

impl From<VehicleType> for String {
    fn from(x: VehicleType) -> Self {
        x.name().to_string()
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Vehicle>> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    let mut seen = BTreeMap::new();
    let mut vehicles = Vec::new();
    for rec in records {
        if seen.insert(rec.id.clone(), vehicles.len()).is_some() {
            bail!("Duplicate {:?}", rec.id);
        }
        vehicles.push(Vehicle {
            id: rec.id,
            name: rec.name,
            vehicle_type: rec.vehicle_type,
            pos: LonLat::new(rec.lng, rec.lat),
            online: rec.online,
            last_seen: rec.last_seen,
        });
    }
    Ok(vehicles)
}

#[derive(Deserialize)]
struct Record {
    id: VehicleID,
    name: String,
    #[serde(rename = "type")]
    vehicle_type: VehicleType,
    lat: f64,
    lng: f64,
    #[serde(default)]
    online: bool,
    #[serde(rename = "lastSeen", default)]
    last_seen: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vehicles() {
        let json = r#"[
            {"id": 1, "name": "Truck 1", "type": "Trash", "lat": 29.04, "lng": -95.41, "online": true, "lastSeen": "2m ago"},
            {"id": "2", "name": "Truck 2", "type": "Street Sweeper", "lat": 29.05, "lng": -95.42}
        ]"#;
        let vehicles = load(json.as_bytes()).unwrap();
        assert_eq!(vehicles.len(), 2);
        assert_eq!(vehicles[0].id, VehicleID::new("1"));
        assert_eq!(vehicles[0].pos, LonLat::new(-95.41, 29.04));
        assert_eq!(vehicles[0].last_seen.as_deref(), Some("2m ago"));
        assert_eq!(
            vehicles[1].vehicle_type,
            VehicleType::Other("Street Sweeper".to_string())
        );
        assert!(!vehicles[1].online);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[
            {"id": 1, "name": "a", "type": "Trash", "lat": 0.0, "lng": 0.0},
            {"id": "1", "name": "b", "type": "Trash", "lat": 0.0, "lng": 0.0}
        ]"#;
        assert!(load(json.as_bytes()).is_err());
    }

    #[test]
    fn unrepresentable_positions_are_rejected() {
        // serde_json refuses these while parsing, so they never reach LonLat
        for lat in ["1e999", "NaN", "Infinity"] {
            let json = format!(
                r#"[{{"id": 1, "name": "a", "type": "Trash", "lat": {lat}, "lng": 0.0}}]"#
            );
            assert!(load(json.as_bytes()).is_err());
        }
    }

    #[test]
    fn type_names_round_trip() {
        for t in VehicleType::known() {
            assert_eq!(VehicleType::from(t.name()), t);
        }
        assert_eq!(String::from(VehicleType::HeavyTrash), "Heavy Trash");
    }
}
