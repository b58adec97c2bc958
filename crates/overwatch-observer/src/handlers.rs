//! REST API endpoint handlers for the Observer server.
//!
//! Reads are served from the published [`PictureView`]; the CoT endpoints
//! encode on request and, for detections, hand off to the gateway.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/picture` | Entities, cones, lines and extent |
//! | `GET` | `/api/entities/{uid}` | Single entity with its representation |
//! | `GET` | `/api/map_state` | The picture in snapshot form |
//! | `POST` | `/api/detections` | Encode and transmit detections |
//! | `POST` | `/api/cot/preview` | Encode one detection to XML |
//! | `POST` | `/api/cot/sensor` | Encode one sensor to XML |
//! | `POST` | `/api/style` | Map glyphs for detections and sensors |
//! | `POST` | `/api/measure` | Measure a polyline |
//!
//! [`PictureView`]: crate::state::PictureView

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use overwatch_cot::{detection_uid, encode_detection, encode_sensor_now, to_xml};
use overwatch_geo::{
    BoundingBox, CoordinateFormat, FormattedCoordinate, MeasurementSession, MeasurementSummary,
    approx_area_km2, format_coordinate,
};
use overwatch_symbology::{
    DetectionGlyph, RepresentationVariant, detection_style, resolve, sensor_color,
};
use overwatch_sync::export_map_state;
use overwatch_types::{
    Entity, EntityUid, FieldOfViewCone, LatLon, MapStateSnapshot, RangeBearingSegment,
    RfDetection, SensorDescriptor, SensorId,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Content type of CoT previews.
const XML_CONTENT_TYPE: &str = "application/xml";

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/entities/{uid}`.
#[derive(Debug, Deserialize)]
pub struct EntityQuery {
    /// Coordinate readout style (`dd` or `dms`, default `dd`).
    pub format: Option<CoordinateFormat>,
}

/// Area covered by the located entities.
#[derive(Debug, Serialize)]
pub struct PictureExtent {
    /// Enclosing rectangle.
    pub bounds: BoundingBox,
    /// Centre of the rectangle.
    pub center: LatLon,
    /// Approximate area in square kilometres.
    pub area_km2: f64,
}

/// Body of `GET /api/picture`.
#[derive(Debug, Serialize)]
pub struct PictureResponse {
    /// Whether the startup snapshot has been merged.
    pub snapshot_merged: bool,
    /// Number of updates published so far.
    pub updates: u64,
    /// Every entity, ordered by uid.
    pub entities: Vec<Entity>,
    /// Field-of-view cones.
    pub cones: Vec<FieldOfViewCone>,
    /// Range and bearing segments.
    pub lines: Vec<RangeBearingSegment>,
    /// Extent of the located entities, if any are located.
    pub extent: Option<PictureExtent>,
}

/// Body of `GET /api/entities/{uid}`.
#[derive(Debug, Serialize)]
pub struct EntityDetail {
    /// The entity record.
    pub entity: Entity,
    /// How the entity should be drawn.
    pub representation: RepresentationVariant,
    /// Its field-of-view cone, if it has one.
    pub cone: Option<FieldOfViewCone>,
    /// Its line segment, if it is a range and bearing line.
    pub line: Option<RangeBearingSegment>,
    /// Readout of its position, if known.
    pub coordinates: Option<FormattedCoordinate>,
}

/// Body of `POST /api/detections`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectionsResponse {
    /// Detections encoded.
    pub encoded: usize,
    /// Events the server accepted.
    pub sent: usize,
}

/// Body of `POST /api/style`.
#[derive(Debug, Default, Deserialize)]
pub struct StyleRequest {
    /// Detections to style.
    #[serde(default)]
    pub detections: Vec<RfDetection>,
    /// Sensors to style.
    #[serde(default)]
    pub sensors: Vec<SensorDescriptor>,
}

/// One styled detection, keyed by its CoT uid.
#[derive(Debug, Serialize)]
pub struct StyledDetection {
    /// CoT uid the detection encodes to.
    pub uid: String,
    /// Glyph to draw.
    pub glyph: DetectionGlyph,
}

/// One styled sensor marker.
#[derive(Debug, Serialize)]
pub struct StyledSensor {
    /// Sensor id.
    pub id: SensorId,
    /// Marker colour.
    pub color_hex: &'static str,
}

/// Response of `POST /api/style`.
#[derive(Debug, Serialize)]
pub struct StyleResponse {
    /// Detections, in request order.
    pub detections: Vec<StyledDetection>,
    /// Sensors, in request order.
    pub sensors: Vec<StyledSensor>,
}

/// Body of `POST /api/measure`.
#[derive(Debug, Serialize)]
pub struct MeasureResponse {
    /// Totals.
    pub summary: MeasurementSummary,
    /// Running total after each point, in metres.
    pub running_m: Vec<f64>,
    /// Human-readable summary.
    pub display: String,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing picture status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let picture = state.picture();
    let entity_count = picture.registry.len();
    let cone_count = picture.registry.cones().count();
    let line_count = picture.registry.lines().count();
    let updates = picture.updates;
    let snapshot = if picture.snapshot_merged {
        "MERGED"
    } else {
        "PENDING"
    };
    let gateway = if state.gateway.is_some() {
        "CONFIGURED"
    } else {
        "NONE"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Overwatch Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #64ffda; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #64ffda; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Overwatch Observer</h1>

    <div>
        <div class="metric"><div class="label">Entities</div><div class="value">{entity_count}</div></div>
        <div class="metric"><div class="label">Cones</div><div class="value">{cone_count}</div></div>
        <div class="metric"><div class="label">Lines</div><div class="value">{line_count}</div></div>
        <div class="metric"><div class="label">Updates</div><div class="value">{updates}</div></div>
        <div class="metric"><div class="label">Snapshot</div><div class="value">{snapshot}</div></div>
        <div class="metric"><div class="label">CoT gateway</div><div class="value">{gateway}</div></div>
    </div>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/picture">/api/picture</a> -- Current picture</li>
        <li>GET /api/entities/{{uid}} -- Single entity detail</li>
        <li>GET <a href="/api/map_state">/api/map_state</a> -- Picture in snapshot form</li>
        <li>POST /api/detections -- Encode and transmit detections</li>
        <li>POST /api/cot/preview -- Detection CoT preview</li>
        <li>POST /api/cot/sensor -- Sensor CoT preview</li>
        <li>POST /api/measure -- Polyline measurement</li>
        <li>WS /ws/picture -- Picture change stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Picture reads
// ---------------------------------------------------------------------------

/// Return the whole published picture.
pub async fn get_picture(State(state): State<Arc<AppState>>) -> Json<PictureResponse> {
    let picture = state.picture();
    let registry = &picture.registry;

    let located: Vec<LatLon> = registry
        .entities()
        .filter_map(|e| e.position.map(|p| p.lat_lon()))
        .collect();
    let extent = BoundingBox::from_points(&located)
        .ok()
        .map(|bounds| PictureExtent {
            bounds,
            center: bounds.center(),
            area_km2: approx_area_km2(&bounds),
        });

    Json(PictureResponse {
        snapshot_merged: picture.snapshot_merged,
        updates: picture.updates,
        entities: registry.entities().cloned().collect(),
        cones: registry.cones().cloned().collect(),
        lines: registry.lines().cloned().collect(),
        extent,
    })
}

/// Return one entity with its resolved representation.
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Query(query): Query<EntityQuery>,
) -> Result<Json<EntityDetail>, ObserverError> {
    let uid = EntityUid::from(uid);
    let picture = state.picture();
    let entity = picture
        .registry
        .get(&uid)
        .cloned()
        .ok_or_else(|| ObserverError::NotFound(format!("entity {uid}")))?;

    let format = query.format.unwrap_or_default();
    let coordinates = entity
        .position
        .filter(|p| p.is_known())
        .map(|p| format_coordinate(p.lat, p.lon, format));

    Ok(Json(EntityDetail {
        representation: resolve(&entity),
        cone: picture.registry.cone(&uid).cloned(),
        line: picture.registry.line(&uid).cloned(),
        coordinates,
        entity,
    }))
}

/// Return the picture in the snapshot endpoint's shape.
pub async fn get_map_state(State(state): State<Arc<AppState>>) -> Json<MapStateSnapshot> {
    let picture = state.picture();
    Json(export_map_state(&picture.registry))
}

// ---------------------------------------------------------------------------
// CoT
// ---------------------------------------------------------------------------

/// Encode detections and send them through the gateway as one batch.
pub async fn post_detections(
    State(state): State<Arc<AppState>>,
    Json(detections): Json<Vec<RfDetection>>,
) -> Result<Json<DetectionsResponse>, ObserverError> {
    let gateway = state
        .gateway
        .as_ref()
        .ok_or(ObserverError::GatewayUnavailable)?;

    let events: Vec<_> = detections.iter().map(encode_detection).collect();
    let sent = gateway.send_batch(&events).await;
    info!(
        encoded = events.len(),
        sent,
        endpoint = gateway.endpoint(),
        "Detections dispatched"
    );

    Ok(Json(DetectionsResponse {
        encoded: events.len(),
        sent,
    }))
}

/// Encode one detection and return the XML that would be sent.
pub async fn post_cot_preview(Json(detection): Json<RfDetection>) -> impl IntoResponse {
    let xml = to_xml(&encode_detection(&detection));
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml)
}

/// Encode one sensor position report, stamped now.
pub async fn post_sensor_preview(Json(sensor): Json<SensorDescriptor>) -> impl IntoResponse {
    let xml = to_xml(&encode_sensor_now(&sensor));
    ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], xml)
}

/// Map glyphs for RF detections and sensor markers.
pub async fn post_style(Json(request): Json<StyleRequest>) -> Json<StyleResponse> {
    let detections = request
        .detections
        .iter()
        .map(|d| StyledDetection {
            uid: detection_uid(d),
            glyph: detection_style(d),
        })
        .collect();
    let sensors = request
        .sensors
        .into_iter()
        .map(|s| StyledSensor {
            color_hex: sensor_color(&s.status),
            id: s.id,
        })
        .collect();
    Json(StyleResponse {
        detections,
        sensors,
    })
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// Measure the great-circle length of a polyline.
pub async fn post_measure(
    Json(points): Json<Vec<LatLon>>,
) -> Result<Json<MeasureResponse>, ObserverError> {
    let mut session = MeasurementSession::new();
    let running_m = points
        .into_iter()
        .map(|p| session.add_point(p))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ObserverError::InvalidRequest(e.to_string()))?;

    let summary = session.summary();
    Ok(Json(MeasureResponse {
        display: summary.to_string(),
        summary,
        running_m,
    }))
}
