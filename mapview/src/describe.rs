use fleet::Vehicle;

use crate::Popup;

pub fn vehicle(vehicle: &Vehicle) -> Popup {
    Popup {
        title: vehicle.name.clone(),
        lines: vec![
            format!("Type: {}", vehicle.vehicle_type),
            format!("ID: {}", vehicle.id),
            format!(
                "Last Seen: {}",
                vehicle.last_seen.as_deref().unwrap_or("N/A")
            ),
        ],
    }
}
