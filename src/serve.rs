//! HTTP backend for the browser page: upload a file, pick a vehicle, fetch
//! the map.

use actix_web::{
    error::{ErrorBadRequest, ErrorInternalServerError},
    get, post, web, App, HttpResponse, HttpServer,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    ingest,
    render::{render, GeoJsonRenderer},
    selection::SelectionState,
    session::Session,
    trip::Position,
};

const UPLOAD_LIMIT: usize = 500 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct VehicleListing<'a> {
    active: Option<&'a str>,
    vehicles: Vec<VehicleEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct VehicleEntry<'a> {
    vehicle: &'a str,
    points: usize,
    length_m: Option<f64>,
    first_seen: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
}

impl<'a> From<&'a SelectionState> for VehicleListing<'a> {
    fn from(state: &'a SelectionState) -> Self {
        let summaries = state.summaries();
        let entries = state
            .all_trips()
            .iter()
            .enumerate()
            .map(|(i, trip)| {
                let summary = summaries.get(i).filter(|x| x.vehicle_id == trip.vehicle_id);
                VehicleEntry {
                    vehicle: &trip.vehicle_id,
                    points: trip.coordinates.len(),
                    length_m: summary.map(|x| x.length_m),
                    first_seen: summary.and_then(|x| x.first_seen),
                    last_seen: summary.and_then(|x| x.last_seen),
                }
            })
            .collect();

        Self {
            active: state.active_vehicle(),
            vehicles: entries,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    vehicle: String,
}

#[post("/v1/upload")]
async fn upload_service(
    body: web::Bytes,
    session: web::Data<Session>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    let rows = ingest::read(&body[..], &config.columns).map_err(ErrorBadRequest)?;
    let state = session.upload(rows);
    Ok(HttpResponse::Ok().json(VehicleListing::from(&*state)))
}

#[get("/v1/vehicles")]
async fn vehicles_service(session: web::Data<Session>) -> actix_web::Result<HttpResponse> {
    let state = session.snapshot();
    Ok(HttpResponse::Ok().json(VehicleListing::from(&*state)))
}

#[post("/v1/select")]
async fn select_service(
    data: web::Json<SelectRequest>,
    session: web::Data<Session>,
) -> actix_web::Result<HttpResponse> {
    let state = session.select_vehicle(&data.vehicle);
    Ok(HttpResponse::Ok().json(VehicleListing::from(&*state)))
}

#[get("/v1/map")]
async fn map_service(
    session: web::Data<Session>,
    config: web::Data<Config>,
) -> actix_web::Result<HttpResponse> {
    let [latitude, longitude] = config.map.default_center;
    let renderer = GeoJsonRenderer::from(&config.map);
    let out = render(&renderer, &session.snapshot(), Position::new(latitude, longitude));
    let body = serde_json::to_string(&out).map_err(ErrorInternalServerError)?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .body(body))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(UPLOAD_LIMIT))
        .service(upload_service)
        .service(vehicles_service)
        .service(select_service)
        .service(map_service);
}

pub async fn run(config: Config, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.http_port);
    let session = web::Data::new(Session::new());
    let config = web::Data::new(config);

    info!("listening on 0.0.0.0:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(session.clone())
            .app_data(config.clone())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}
