use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset};
use tracing_subscriber::EnvFilter;

use transit_router::cache::CachedAccessEgress;
use transit_router::config::RouterConfig;
use transit_router::domain::{
    AccessEgressKind, AccessEgressLeg, Itinerary, Leg, LegKind, Location, PageCursor,
    RouteRequest, SearchError, StreetMode,
};
use transit_router::router::{AccessEgressProvider, DirectRouter, RouterServices, RoutingWorker};
use transit_router::transit::{StopIndex, TransitData, TransitDataBuilder, TransitMode};

/// Config file read when no path is given on the command line.
const CONFIG_ENV: &str = "TRANSIT_ROUTER_CONFIG";

/// Walking time between origin and destination in the demo network.
const DIRECT_WALK_MINS: i64 = 45;

/// Access and egress legs looked up by location id.
struct FixedLegs {
    access: HashMap<String, Vec<AccessEgressLeg>>,
    egress: HashMap<String, Vec<AccessEgressLeg>>,
}

#[async_trait]
impl AccessEgressProvider for FixedLegs {
    async fn find_legs(
        &self,
        location: &Location,
        _mode: StreetMode,
        kind: AccessEgressKind,
    ) -> Result<Vec<AccessEgressLeg>, SearchError> {
        let legs = match kind {
            AccessEgressKind::Access => &self.access,
            AccessEgressKind::Egress => &self.egress,
        };
        Ok(legs.get(&location.id).cloned().unwrap_or_default())
    }
}

/// Answers direct walking requests with a fixed walking time.
struct FixedWalk;

#[async_trait]
impl DirectRouter for FixedWalk {
    async fn route(&self, request: &RouteRequest) -> Result<Vec<Itinerary>, SearchError> {
        if request.direct_mode != StreetMode::Walk {
            return Ok(Vec::new());
        }
        let walk = Duration::minutes(DIRECT_WALK_MINS);
        let (start, end) = if request.arrive_by {
            (request.date_time - walk, request.date_time)
        } else {
            (request.date_time, request.date_time + walk)
        };
        let leg = Leg::new(
            LegKind::Street(StreetMode::Walk),
            request.from.id.clone(),
            request.to.id.clone(),
            start,
            end,
        );
        let cost = (walk.num_seconds() * 4) as i32;
        let itinerary = Itinerary::new(vec![leg], cost).map_err(|e| SearchError::System(e.to_string()))?;
        Ok(vec![itinerary])
    }
}

/// No on-demand service in the demo network.
struct NoFlex;

#[async_trait]
impl DirectRouter for NoFlex {
    async fn route(&self, _request: &RouteRequest) -> Result<Vec<Itinerary>, SearchError> {
        Ok(Vec::new())
    }
}

/// A bus line B-C-D-E-F every 20 minutes and a tram from F to G.
fn demo_network() -> Result<TransitData, Box<dyn Error>> {
    let data = TransitDataBuilder::new()
        .stops(&["B", "C", "D", "E", "F", "G"])
        .route(
            "R1",
            TransitMode::Bus,
            &["B", "C", "D", "E", "F"],
            &[
                "8:10, 8:12, 8:14, 8:16, 8:18",
                "8:30, 8:32, 8:34, 8:36, 8:38",
                "8:50, 8:52, 8:54, 8:56, 8:58",
            ],
        )
        .route("T1", TransitMode::Tram, &["F", "G"], &["8:25, 8:31", "8:45, 8:51", "9:05, 9:11"])
        .build()?;
    Ok(data)
}

fn demo_stop(data: &TransitData, name: &str) -> Result<StopIndex, Box<dyn Error>> {
    data.stop_by_name(name)
        .ok_or_else(|| format!("demo network has no stop {name}").into())
}

fn demo_legs(data: &TransitData) -> Result<FixedLegs, Box<dyn Error>> {
    let access = HashMap::from([(
        "origin".to_string(),
        vec![
            AccessEgressLeg::walk(demo_stop(data, "B")?, 10 * 60, 4.0),
            AccessEgressLeg::new(demo_stop(data, "D")?, 3 * 60, 2, 720),
        ],
    )]);
    let egress = HashMap::from([(
        "destination".to_string(),
        vec![
            AccessEgressLeg::walk(demo_stop(data, "G")?, 2 * 60, 4.0),
            AccessEgressLeg::walk(demo_stop(data, "F")?, 12 * 60, 4.0),
        ],
    )]);
    Ok(FixedLegs { access, egress })
}

fn load_config() -> Result<RouterConfig, Box<dyn Error>> {
    let path = std::env::args().nth(1).or_else(|| std::env::var(CONFIG_ENV).ok());
    match path {
        Some(path) => {
            tracing::info!(%path, "loading router configuration");
            Ok(RouterConfig::load(path)?)
        }
        None => Ok(RouterConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config()?;
    let data = Arc::new(demo_network()?);
    let access_egress = CachedAccessEgress::new(demo_legs(&data)?, &config.cache);
    let services = RouterServices::new(
        config,
        data,
        Arc::new(access_egress),
        Arc::new(FixedWalk),
        Arc::new(NoFlex),
    )?;

    let departure: DateTime<FixedOffset> = DateTime::parse_from_rfc3339("2024-03-15T08:00:00+00:00")?;
    let mut request = RouteRequest::depart_after(
        Location::new("origin"),
        Location::new("destination"),
        departure,
    )
    .with_num_itineraries(3);

    // Two pages: the first one, then the one its next-page cursor points at.
    for page in 1..=2 {
        let response = RoutingWorker::new(&services, request.clone())?.route().await?;

        println!("Page {page}:");
        for itinerary in &response.itineraries {
            println!("  {itinerary}");
        }
        for error in &response.routing_errors {
            println!("  error: {error}");
        }
        if let Some(window) = response.next_search_window {
            println!("  next search window: {}m", window.num_minutes());
        }

        let Some(cursor) = response.next_page_cursor else {
            break;
        };
        let token = cursor.encode();
        println!("  next page: {token}");
        request = request.with_page_cursor(PageCursor::decode(&token)?);
    }

    Ok(())
}
