//! Application root: owns the session, the map and the view, and turns user
//! actions into API calls. Every failure is caught here and becomes a message.

use std::sync::Arc;

use scopeguard::ScopeGuard;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::client::ApiClient;
use crate::config::{ClientConfig, TripParams};
use crate::credential::{CredentialStore, FileCredentialStore};
use crate::errors::{ClientError, ClientResult};
use crate::itinerary;
use crate::map::{MapWidget, StaticMap};
use crate::recommend;
use crate::schema::{self, ItineraryPlan};
use crate::session::Session;
use crate::types::{AuthMode, Endpoint, PlaceKind, PlacesSearchRequest};
use crate::view::{Indicator, SavedPanel, View, SAVED_FAILURE_NOTICE};

/// A user action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login { email: String, password: String },
    Register { email: String, password: String },
    Logout,
    GenerateItinerary { destination: String },
    SaveItinerary,
    Ask { query: String },
    LoadSaved,
    SearchPlaces { lat: f64, lng: f64, kind: PlaceKind },
    Health,
}

impl Action {
    /// Prefix used for the visible error message
    fn context(&self) -> &'static str {
        match self {
            Action::Login { .. } => "Login error",
            Action::Register { .. } => "Registration error",
            Action::Logout => "Logout error",
            Action::GenerateItinerary { .. } => "Itinerary error",
            Action::SaveItinerary => "Save error",
            Action::Ask { .. } => "AI error",
            Action::LoadSaved => "Saved itineraries error",
            Action::SearchPlaces { .. } => "Places error",
            Action::Health => "Health check error",
        }
    }

    fn busy_label(&self) -> &'static str {
        match self {
            Action::Login { .. } => "Logging in...",
            Action::Register { .. } => "Creating account...",
            Action::Logout => "Logging out...",
            Action::GenerateItinerary { .. } => "Generating itinerary...",
            Action::SaveItinerary => "Saving itinerary...",
            Action::Ask { .. } => "Thinking...",
            Action::LoadSaved => "Loading saved itineraries...",
            Action::SearchPlaces { .. } => "Searching places...",
            Action::Health => "Checking API...",
        }
    }
}

/// How an action ended; the detail is already in the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Registration succeeded; the user should log in next
    Registered,
    Failed,
}

type Busy = ScopeGuard<Arc<dyn Indicator>, fn(Arc<dyn Indicator>)>;

fn release(indicator: Arc<dyn Indicator>) {
    indicator.hide();
}

fn busy(indicator: &Arc<dyn Indicator>, label: &str) -> Busy {
    indicator.show(label);
    scopeguard::guard(Arc::clone(indicator), release as fn(Arc<dyn Indicator>))
}

pub struct Controller {
    client: ApiClient,
    session: Session,
    map: Option<Box<dyn MapWidget>>,
    indicator: Arc<dyn Indicator>,
    trip: TripParams,
    fallback_destination: String,
    current_plan: Option<(String, ItineraryPlan)>,
    view: View,
}

impl Controller {
    /// Builds the application root with the on-disk credential store.
    pub fn bootstrap(config: &ClientConfig, indicator: Arc<dyn Indicator>) -> ClientResult<Self> {
        let base = config.validate()?;
        let store = FileCredentialStore::new(&config.data_dir()?, &base);
        Self::new(config, Box::new(store), indicator)
    }

    /// Fails only on configuration problems; a bad map key merely disables the map.
    pub fn new(
        config: &ClientConfig,
        store: Box<dyn CredentialStore>,
        indicator: Arc<dyn Indicator>,
    ) -> ClientResult<Self> {
        let client = ApiClient::new(config)?;
        let session = Session::restore(store);
        let mut view = View::new(session.auth_view());

        let map: Option<Box<dyn MapWidget>> =
            match StaticMap::load(config.maps_api_key.as_deref()) {
                Ok(Some(map)) => Some(Box::new(map)),
                Ok(None) => {
                    info!("No map key configured, map disabled");
                    None
                }
                Err(e) => {
                    warn!("Map failed to load: {}", e);
                    view.map_notice = Some(e.to_string());
                    None
                }
            };

        Ok(Self {
            client,
            session,
            map,
            indicator,
            trip: config.trip(),
            fallback_destination: config.default_destination().to_string(),
            current_plan: None,
            view,
        })
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn map(&self) -> Option<&dyn MapWidget> {
        self.map.as_deref()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Runs one action to completion. Never fails: errors land in the view.
    pub async fn handle(&mut self, action: Action) -> Outcome {
        let context = action.context();
        let result = {
            let _busy = busy(&self.indicator, action.busy_label());
            self.dispatch(action).await
        };
        self.view.auth = self.session.auth_view();

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{}: {}", context, e);
                self.view
                    .push_error(format!("❌ {}: {}", context, e.user_message()));
                Outcome::Failed
            }
        }
    }

    async fn dispatch(&mut self, action: Action) -> ClientResult<Outcome> {
        match action {
            Action::Login { email, password } => {
                self.client
                    .authenticate(&mut self.session, &email, &password, AuthMode::Login)
                    .await?;
                self.view.auth = self.session.auth_view();
                self.view
                    .push_assistant(format!("Logged in as {}", email.trim()));
                if let Err(e) = self.load_saved().await {
                    warn!("Could not load saved itineraries after login: {}", e);
                }
                Ok(Outcome::Completed)
            }
            Action::Register { email, password } => {
                self.client
                    .authenticate(&mut self.session, &email, &password, AuthMode::Register)
                    .await?;
                self.view.push_assistant(format!(
                    "Account created for {}. Please log in.",
                    email.trim()
                ));
                Ok(Outcome::Registered)
            }
            Action::Logout => {
                let result = self.client.logout(&mut self.session);
                self.reset_to_anonymous();
                result?;
                self.view.push_assistant("Logged out");
                Ok(Outcome::Completed)
            }
            Action::GenerateItinerary { destination } => {
                let request =
                    itinerary::build_request(&destination, &self.fallback_destination, &self.trip);
                self.view.push_user(format!(
                    "Generating itinerary for {}…",
                    request.destination
                ));
                let plan = itinerary::generate(&self.client, &self.session, &request).await?;
                let placed = itinerary::render_plan(
                    &mut self.view,
                    self.map.as_deref_mut(),
                    &plan,
                    &request.destination,
                );
                info!(days = plan.days.len(), markers = placed, "Itinerary rendered");
                let destination = plan
                    .destination
                    .clone()
                    .unwrap_or(request.destination);
                self.current_plan = Some((destination, plan));
                Ok(Outcome::Completed)
            }
            Action::SaveItinerary => {
                let (destination, plan) = self
                    .current_plan
                    .as_ref()
                    .ok_or_else(|| ClientError::validation("Generate an itinerary before saving"))?;
                let id = itinerary::save(&self.client, &self.session, destination, plan).await?;
                self.view.push_assistant(match id {
                    Some(id) => format!("Itinerary for {} saved (#{})", destination, id),
                    None => format!("Itinerary for {} saved", destination),
                });
                if let Err(e) = self.load_saved().await {
                    warn!("Could not refresh saved itineraries: {}", e);
                }
                Ok(Outcome::Completed)
            }
            Action::Ask { query } => {
                if query.trim().is_empty() {
                    return Err(ClientError::validation("Type a question first"));
                }
                self.view.push_user(query.trim());
                let text =
                    recommend::recommend(&self.client, &self.session, &query, &self.trip.chat_mood)
                        .await?;
                self.view.push_assistant(text);
                Ok(Outcome::Completed)
            }
            Action::LoadSaved => {
                self.load_saved().await?;
                Ok(Outcome::Completed)
            }
            Action::SearchPlaces { lat, lng, kind } => {
                let request = PlacesSearchRequest { lat, lng, kind };
                let body = self
                    .client
                    .call(&self.session, Endpoint::PlacesSearch, Some(&request))
                    .await?;
                let names = schema::parse_place_names(&body)?;
                let label = match kind {
                    PlaceKind::Food => "Restaurants",
                    PlaceKind::Stay => "Hotels",
                };
                self.view.push_assistant(if names.is_empty() {
                    format!("{} nearby: none found", label)
                } else {
                    format!("{} nearby: {}", label, names.join(", "))
                });
                Ok(Outcome::Completed)
            }
            Action::Health => {
                let body = self
                    .client
                    .call::<Value>(&self.session, Endpoint::Health, None)
                    .await?;
                let health = schema::parse_health(body)?;
                let mut line = format!("API status: {}", health.status);
                if let Some(app) = health.app {
                    line.push_str(&format!(" ({}", app));
                    if let Some(version) = health.version {
                        line.push_str(&format!(" {}", version));
                    }
                    line.push(')');
                }
                self.view.push_assistant(line);
                Ok(Outcome::Completed)
            }
        }
    }

    /// Refreshes the saved list; on failure the panel shows a notice instead.
    async fn load_saved(&mut self) -> ClientResult<()> {
        let result = match self
            .client
            .call::<Value>(&self.session, Endpoint::MyItineraries, None)
            .await
        {
            Ok(body) => schema::parse_saved(body),
            Err(e) => Err(e),
        };
        match result {
            Ok(saved) => {
                self.view.saved = SavedPanel::Loaded(saved);
                Ok(())
            }
            Err(e) => {
                self.view.saved = SavedPanel::Failed(SAVED_FAILURE_NOTICE.to_string());
                Err(e)
            }
        }
    }

    fn reset_to_anonymous(&mut self) {
        self.current_plan = None;
        self.view.plan.clear();
        self.view.plan_destination = None;
        self.view.saved = SavedPanel::NotLoaded;
        self.view.map_url = None;
        if let Some(map) = self.map.as_mut() {
            map.clear_markers();
        }
        self.view.auth = self.session.auth_view();
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("base_url", &self.client.base_url().as_str())
            .field("session", &self.session)
            .field("map_enabled", &self.map.is_some())
            .finish_non_exhaustive()
    }
}
