#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use structopt::StructOpt;

use fleet::{Catalog, FilterState, RouteColor, VehicleID, VehicleType};
use mapview::{FitOutcome, LiveMap, MapOptions, MapSurface, RecordingSurface};

#[derive(StructOpt)]
struct Args {
    /// A directory with vehicles.json and routes.json
    #[structopt(long)]
    data: String,
    /// A JSON file with filters to start from. Missing fields take their defaults.
    #[structopt(long)]
    filters: Option<String>,
    /// Show this vehicle, no matter its type. Repeat to pick more.
    #[structopt(long)]
    vehicle: Vec<String>,
    /// Hide all vehicles of this type, like "Heavy Trash"
    #[structopt(long)]
    hide_type: Vec<String>,
    /// Show routes with this color, like "#ef4444"
    #[structopt(long)]
    route_color: Vec<String>,
    /// Don't draw routes along with their start and end markers
    #[structopt(long)]
    no_start_end: bool,
    /// Don't label vehicles
    #[structopt(long)]
    no_labels: bool,
    /// Write everything drawn to this GeoJSON file
    #[structopt(long)]
    geojson: Option<String>,
}

impl Args {
    /// Start from the filter file (or the defaults) and apply the flags on top.
    fn filters(&self, catalog: &Catalog) -> Result<FilterState> {
        let mut filters = match self.filters {
            Some(ref path) => serde_json::from_reader(fs_err::File::open(path)?)
                .map_err(|err| anyhow!("{path}: {err}"))?,
            None => FilterState::for_catalog(catalog),
        };

        for id in &self.vehicle {
            let id = VehicleID::new(id.as_str());
            if catalog.vehicle(&id).is_none() {
                warn!("Vehicle {id} isn't in the catalog");
            }
            if !filters.vehicles.contains(&id) {
                filters = filters.toggle_vehicle(&id);
            }
        }
        for name in &self.hide_type {
            let vehicle_type = VehicleType::from(name.as_str());
            if !catalog.vehicle_types().contains(&vehicle_type) {
                warn!("No vehicles have type {vehicle_type}");
            }
            if filters.type_enabled(&vehicle_type) {
                filters = filters.toggle_type(&vehicle_type);
            }
        }
        for color in &self.route_color {
            let color = RouteColor::new(color);
            if !filters.route_colors.contains(&color) {
                filters = filters.toggle_route_color(&color);
            }
        }
        if self.no_start_end && filters.show_start_end {
            filters = filters.toggle_start_end();
        }
        if self.no_labels && filters.show_labels {
            filters = filters.toggle_labels();
        }
        Ok(filters)
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());

    let catalog = Catalog::load_from_dir(&args.data, &mut Timer::new("load fleet data"))?;
    if catalog.vehicles.is_empty() && catalog.routes.is_empty() {
        bail!("{} has no vehicles or routes", args.data);
    }
    let filters = args.filters(&catalog)?;
    print_summary(&catalog);

    let mut live = LiveMap::new(catalog, RecordingSurface::new(), MapOptions::default());
    let fit = match live.set_filters(filters) {
        Some(fit) => fit,
        None => bail!("The map didn't redraw"),
    };
    let outcome = pollster::block_on(fit);

    let generation = match live.current_generation() {
        Some(generation) => generation,
        None => bail!("Nothing was drawn"),
    };
    let graphics = match live.surface() {
        Some(surface) => {
            let graphics = surface.borrow().graphics(generation.layer)?;
            graphics
        }
        None => bail!("The map was torn down"),
    };
    println!("Drew {} graphics", prettyprint_usize(graphics.len()));
    match outcome {
        FitOutcome::Framed(extent) => println!(
            "Framed longitude {:.5} to {:.5}, latitude {:.5} to {:.5}",
            extent.xmin, extent.xmax, extent.ymin, extent.ymax
        ),
        FitOutcome::Empty => println!("Nothing matches these filters, so the view stays put"),
        FitOutcome::Superseded | FitOutcome::Failed => {
            warn!("Couldn't frame what was drawn: {:?}", outcome)
        }
    }

    if let Some(ref path) = args.geojson {
        mapview::export::write_geojson(path, &graphics)?;
    }

    live.destroy();
    Ok(())
}

fn print_summary(catalog: &Catalog) {
    let summary = catalog.summary();
    println!(
        "{} vehicles ({} online), {} routes",
        prettyprint_usize(summary.total_vehicles),
        prettyprint_usize(summary.online_vehicles),
        prettyprint_usize(summary.routes)
    );
    for (vehicle_type, count) in summary.vehicles_per_type.borrow() {
        println!("  {vehicle_type}: {}", prettyprint_usize(*count));
    }
}
