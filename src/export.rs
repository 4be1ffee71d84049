//! One-shot commands that read a file and print the result.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use log::info;

use crate::{
    config::Config,
    ingest::{self, RawPing},
    render::{render as render_map, GeoJsonRenderer},
    selection::SelectionState,
    trip::{aggregate_with_summaries, Position},
};

fn read_input(input: Option<&Path>, config: &Config) -> Result<Option<Vec<RawPing>>> {
    match input {
        Some(path) => ingest::read_path(path, &config.columns),
        None => ingest::read(io::stdin().lock(), &config.columns),
    }
}

fn load(input: Option<&Path>, config: &Config) -> Result<SelectionState> {
    let Some(rows) = read_input(input, config)? else {
        info!("input has no data rows");
        return Ok(SelectionState::default());
    };
    let (trips, summaries) = aggregate_with_summaries(rows);
    info!("loaded {} trips", trips.len());
    Ok(SelectionState::load_summarized(trips, summaries))
}

/// Write the GeoJSON map of one vehicle, the first in the file by default.
pub fn render(
    config: &Config,
    input: Option<&Path>,
    vehicle: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let mut state = load(input, config)?;
    if let Some(vehicle) = vehicle {
        state = state.select_vehicle(vehicle);
    }

    let [latitude, longitude] = config.map.default_center;
    let renderer = GeoJsonRenderer::from(&config.map);
    let out = render_map(&renderer, &state, Position::new(latitude, longitude)).to_string();

    match output {
        Some(path) => {
            fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))?
        }
        None => println!("{out}"),
    }

    Ok(())
}

/// Print one CSV line per vehicle with its summary.
pub fn vehicles(config: &Config, input: Option<&Path>) -> Result<()> {
    let state = load(input, config)?;
    write_summaries(&state, io::stdout().lock())
}

fn write_summaries<W: Write>(state: &SelectionState, output: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);
    for summary in state.summaries() {
        writer.serialize(summary)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_csv() {
        let rows = ingest::read(
            "vehicle_uid,latitude,longitude,gps_datetime\n\
             V1,25000000,27000000,2024-03-01T10:00:00Z\n\
             V2,25000000,27000000,nonsense\n"
                .as_bytes(),
            &Config::default().columns,
        )
        .unwrap()
        .unwrap();
        let (trips, summaries) = aggregate_with_summaries(rows);
        let state = SelectionState::load_summarized(trips, summaries);

        let mut out = Vec::new();
        write_summaries(&state, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "vehicle_id,points,length_m,first_seen,last_seen\n\
             V1,1,0.0,2024-03-01T10:00:00Z,2024-03-01T10:00:00Z\n\
             V2,1,0.0,,\n"
        );
    }

    #[test]
    fn render_to_file() {
        let dir = std::env::temp_dir().join(format!("tripline-render-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("pings.csv");
        let output = dir.join("map.geojson");
        fs::write(
            &input,
            "vehicle_uid,latitude,longitude,gps_datetime\n\
             V1,25000000,27000000,2024-03-01T10:00:00Z\n\
             V2,24000000,28000000,2024-03-01T10:00:00Z\n",
        )
        .unwrap();

        render(
            &Config::default(),
            Some(input.as_path()),
            Some("V2"),
            Some(output.as_path()),
        )
        .unwrap();
        let out: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(out["features"][0]["properties"]["vehicle"], "V2");
        assert_eq!(out["center"], serde_json::json!([24.0, 28.0]));

        fs::remove_dir_all(dir).unwrap();
    }
}
