use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::config::TripParams;
use crate::errors::{ClientError, ClientResult};
use crate::map::{MapWidget, Marker};
use crate::schema::{self, ItineraryPlan};
use crate::session::Session;
use crate::types::{Endpoint, ItineraryRequest, SaveItineraryRequest};
use crate::view::{DayCard, View};

/// Builds the request body; a blank destination falls back to `fallback`.
pub(crate) fn build_request(destination: &str, fallback: &str, trip: &TripParams) -> ItineraryRequest {
    let destination = match destination.trim() {
        "" => fallback,
        given => given,
    };
    ItineraryRequest {
        destination: destination.to_string(),
        days: trip.days,
        travel_type: trip.travel_type.clone(),
        budget: trip.budget.clone(),
        mood: trip.mood.clone(),
        include_pois: trip.include_pois,
    }
}

/// Requests a plan and validates its shape. Nothing is rendered here.
pub async fn generate(
    client: &ApiClient,
    session: &Session,
    request: &ItineraryRequest,
) -> ClientResult<ItineraryPlan> {
    let body = client
        .call(session, Endpoint::Itinerary, Some(request))
        .await?;
    let plan = schema::parse_plan(body)?;
    debug!(days = plan.days.len(), "Itinerary received");
    Ok(plan)
}

/// Replaces the rendered plan and forwards usable coordinates to the map.
///
/// Places whose coordinates are missing or unusable are skipped one by one.
/// Returns the number of markers placed.
pub fn render_plan<M: MapWidget + ?Sized>(
    view: &mut View,
    map: Option<&mut M>,
    plan: &ItineraryPlan,
    requested_destination: &str,
) -> usize {
    view.plan = plan.days.iter().map(DayCard::from).collect();
    view.plan_destination = Some(
        plan.destination
            .clone()
            .unwrap_or_else(|| requested_destination.to_string()),
    );

    let Some(map) = map else {
        return 0;
    };

    map.clear_markers();
    let mut placed = 0;
    for day in &plan.days {
        for place in &day.places {
            match place.coordinates() {
                Some((lat, lng)) => {
                    map.place_marker(Marker {
                        lat,
                        lng,
                        title: place.name.clone(),
                    });
                    placed += 1;
                }
                None => warn!(day = day.day, place = %place.name, "Skipping place without usable coordinates"),
            }
        }
    }
    view.map_url = Some(map.snapshot_url());
    placed
}

/// Saves a generated plan to the account. Returns the server-assigned id when given.
pub async fn save(
    client: &ApiClient,
    session: &Session,
    destination: &str,
    plan: &ItineraryPlan,
) -> ClientResult<Option<i64>> {
    let days = u32::try_from(plan.days.len())
        .map_err(|_| ClientError::validation("Itinerary is too long to save"))?;
    let request = SaveItineraryRequest {
        destination: destination.to_string(),
        days,
        plan: plan.raw_plan.clone(),
    };
    let body = client
        .call(session, Endpoint::SaveItinerary, Some(&request))
        .await?;
    Ok(body.get("id").and_then(Value::as_i64))
}
