// Client-side session and request orchestration for the Dishanveshi travel API:
// - Credential persistence and the session that owns it
// - The authenticated HTTP client and response validators
// - Itinerary, recommendation and saved-itinerary flows
// - The map widget collaborator and the view model the front-end renders

pub mod errors;
pub use errors::*;

pub mod config;
pub use config::*;

pub mod credential;
pub use credential::*;

pub mod session;
pub use session::*;

pub mod types;
pub use types::*;

pub mod schema;

pub mod client;
pub use client::*;

pub mod map;
pub use map::*;

pub mod view;
pub use view::*;

pub mod itinerary;
pub mod recommend;

pub mod controller;
pub use controller::*;
