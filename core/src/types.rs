use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Remote API endpoints and their fixed access policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Register,
    Health,
    Itinerary,
    SaveItinerary,
    MyItineraries,
    Recommend,
    PlacesSearch,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/api/auth/login",
            Endpoint::Register => "/api/auth/register",
            Endpoint::Health => "/api/health",
            Endpoint::Itinerary => "/api/itinerary",
            Endpoint::SaveItinerary => "/api/itinerary/save",
            Endpoint::MyItineraries => "/api/itinerary/my",
            Endpoint::Recommend => "/api/ai/recommend",
            Endpoint::PlacesSearch => "/api/places/search",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::Health | Endpoint::MyItineraries => Method::GET,
            _ => Method::POST,
        }
    }

    /// Endpoints that are short-circuited locally when no credential exists
    pub fn requires_auth(self) -> bool {
        !matches!(
            self,
            Endpoint::Login | Endpoint::Register | Endpoint::Health
        )
    }
}

/// Whether `authenticate` logs in or creates an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

/// Result of a successful `authenticate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The credential that was issued and persisted
    LoggedIn(String),
    /// The account exists now; the caller should prompt for a login
    Registered,
}

/// OAuth2 password-form body for the login endpoint
#[derive(Serialize, Debug)]
pub(crate) struct LoginForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ItineraryRequest {
    pub destination: String,
    pub days: u32,
    pub travel_type: String,
    pub budget: String,
    pub mood: String,
    pub include_pois: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct SaveItineraryRequest {
    pub destination: String,
    pub days: u32,
    /// The plan exactly as the server produced it
    pub plan: Value,
}

#[derive(Serialize, Debug, Clone)]
pub struct RecommendRequest {
    pub mood: String,
    pub places_list: String,
}

/// Kind of place to look up around a coordinate
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    Food,
    Stay,
}

#[derive(Serialize, Debug, Clone)]
pub struct PlacesSearchRequest {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub kind: PlaceKind,
}
