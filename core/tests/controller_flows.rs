use std::sync::Arc;

use dishanveshi_core::{
    Action, AuthView, ClientConfig, Controller, CountingIndicator, FileCredentialStore, Indicator,
    MemoryCredentialStore, Outcome, PlaceKind, SavedPanel, Sender, AI_PLACEHOLDER,
    SAVED_FAILURE_NOTICE,
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_base: Some(server.uri()),
        maps_api_key: Some("test-key".to_string()),
        ..ClientConfig::default()
    }
}

fn controller(
    server: &MockServer,
    store: &MemoryCredentialStore,
) -> (Controller, Arc<CountingIndicator>) {
    let indicator = Arc::new(CountingIndicator::default());
    let controller = Controller::new(
        &config_for(server),
        Box::new(store.clone()),
        indicator.clone() as Arc<dyn Indicator>,
    )
    .unwrap();
    (controller, indicator)
}

fn three_day_plan() -> serde_json::Value {
    json!({
        "destination": "Pune",
        "plan": [
            {"day": 1, "summary": "Shaniwar Wada and the old peths", "places": [
                {"name": "Shaniwar Wada", "lat": 18.5195, "lng": 73.8553}
            ]},
            {"day": 2, "summary": "Sinhagad fort trek", "places": [
                {"name": "Sinhagad", "lat": "18.3663", "lng": "73.7559"},
                {"name": "Unknown stall", "lat": "n/a", "lng": null}
            ]},
            {"day": 3, "summary": "Aga Khan Palace, then Koregaon Park"}
        ]
    })
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_authenticates_once_and_loads_saved_list() {
    let server = MockServer::start().await;
    mount_login(&server, "jwt-abc").await;
    Mock::given(method("GET"))
        .and(path("/api/itinerary/my"))
        .and(header("authorization", "Bearer jwt-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "destination": "Goa", "days": 3}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    let (mut app, indicator) = controller(&server, &store);
    assert_eq!(app.view().auth, AuthView::Anonymous);

    let outcome = app
        .handle(Action::Login {
            email: "traveller@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(app.view().auth, AuthView::Authenticated);
    assert_eq!(store.peek().as_deref(), Some("jwt-abc"));
    let logins = app
        .view()
        .messages
        .iter()
        .filter(|m| m.text.starts_with("Logged in as"))
        .count();
    assert_eq!(logins, 1);
    match &app.view().saved {
        SavedPanel::Loaded(saved) => assert_eq!(saved[0].destination, "Goa"),
        other => panic!("saved panel not loaded: {other:?}"),
    }
    assert_eq!(indicator.shown(), 1);
    assert!(!indicator.is_active());
}

#[tokio::test]
async fn failed_login_keeps_anonymous_view() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    let (mut app, indicator) = controller(&server, &store);
    let outcome = app
        .handle(Action::Login {
            email: "a@b.c".to_string(),
            password: "nope".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(app.view().auth, AuthView::Anonymous);
    assert_eq!(store.peek(), None);
    let last = app.view().last_message().unwrap();
    assert!(last.is_error);
    assert!(last.text.contains("Incorrect email or password"));
    assert!(!indicator.is_active());
}

#[tokio::test]
async fn blank_login_is_validated_locally() {
    let server = MockServer::start().await;
    let store = MemoryCredentialStore::new();
    let (mut app, indicator) = controller(&server, &store);

    let outcome = app
        .handle(Action::Login {
            email: "  ".to_string(),
            password: "pw".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Failed);
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(app.view().last_message().unwrap().text.contains("required"));
    assert!(!indicator.is_active());
}

#[tokio::test]
async fn registration_prompts_for_login_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "email": "new@example.com"})))
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::new();
    let (mut app, _) = controller(&server, &store);
    let outcome = app
        .handle(Action::Register {
            email: "new@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Registered);
    assert_eq!(app.view().auth, AuthView::Anonymous);
    assert_eq!(store.peek(), None);
}

#[tokio::test]
async fn itinerary_renders_three_cards_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/itinerary"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_day_plan()))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_token("tok");
    let (mut app, indicator) = controller(&server, &store);
    let outcome = app
        .handle(Action::GenerateItinerary {
            destination: String::new(),
        })
        .await;

    assert_eq!(outcome, Outcome::Completed);
    let cards: Vec<_> = app
        .view()
        .plan
        .iter()
        .map(|c| (c.day, c.summary.as_str()))
        .collect();
    assert_eq!(
        cards,
        vec![
            (1, "Shaniwar Wada and the old peths"),
            (2, "Sinhagad fort trek"),
            (3, "Aga Khan Palace, then Koregaon Park"),
        ]
    );
    let markers = app.map().unwrap().markers();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[1].title, "Sinhagad");
    assert!(app.view().map_url.is_some());
    assert!(!indicator.is_active());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "destination": "Pune",
            "days": 3,
            "travel_type": "cultural",
            "budget": "medium",
            "mood": "relaxed",
            "include_pois": true
        })
    );
}

#[tokio::test]
async fn malformed_itinerary_leaves_previous_plan_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/itinerary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_day_plan()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/itinerary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"destination": "Goa"})))
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_token("tok");
    let (mut app, indicator) = controller(&server, &store);
    app.handle(Action::GenerateItinerary {
        destination: "Pune".to_string(),
    })
    .await;
    let before = app.view().plan.clone();
    let markers_before = app.map().unwrap().markers().to_vec();

    let outcome = app
        .handle(Action::GenerateItinerary {
            destination: "Goa".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(app.view().plan, before);
    assert_eq!(app.map().unwrap().markers(), markers_before.as_slice());
    let last = app.view().last_message().unwrap();
    assert!(last.is_error);
    assert!(last.text.starts_with("❌ Itinerary error"));
    assert_eq!(indicator.shown(), 2);
    assert!(!indicator.is_active());
}

#[tokio::test]
async fn api_error_clears_indicator_and_shows_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/itinerary"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid or expired token"})),
        )
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_token("stale");
    let (mut app, indicator) = controller(&server, &store);
    let outcome = app
        .handle(Action::GenerateItinerary {
            destination: "Pune".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Failed);
    assert!(app
        .view()
        .last_message()
        .unwrap()
        .text
        .contains("401 Invalid or expired token"));
    // the call itself never touches the credential
    assert_eq!(store.peek().as_deref(), Some("stale"));
    assert!(!indicator.is_active());
}

#[tokio::test]
async fn anonymous_feature_calls_ask_for_login() {
    let server = MockServer::start().await;
    let store = MemoryCredentialStore::new();
    let (mut app, indicator) = controller(&server, &store);

    for action in [
        Action::GenerateItinerary {
            destination: "Pune".to_string(),
        },
        Action::Ask {
            query: "street food".to_string(),
        },
        Action::SearchPlaces {
            lat: 18.5,
            lng: 73.8,
            kind: PlaceKind::Food,
        },
    ] {
        assert_eq!(app.handle(action).await, Outcome::Failed);
        assert!(app
            .view()
            .last_message()
            .unwrap()
            .text
            .contains("Please log in"));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(indicator.shown(), indicator.hidden());
}

#[tokio::test]
async fn empty_recommendation_shows_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ai/recommend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"recommendation": ""})))
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_token("tok");
    let (mut app, _) = controller(&server, &store);
    let outcome = app
        .handle(Action::Ask {
            query: "somewhere calm".to_string(),
        })
        .await;

    assert_eq!(outcome, Outcome::Completed);
    let messages = &app.view().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "somewhere calm");
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert_eq!(messages[1].text, AI_PLACEHOLDER);
}

#[tokio::test]
async fn saved_list_failure_shows_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/itinerary/my"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_token("tok");
    let (mut app, _) = controller(&server, &store);
    assert_eq!(app.handle(Action::LoadSaved).await, Outcome::Failed);
    assert_eq!(
        app.view().saved,
        SavedPanel::Failed(SAVED_FAILURE_NOTICE.to_string())
    );
}

#[tokio::test]
async fn save_requires_a_generated_plan_then_posts_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/itinerary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_day_plan()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/itinerary/save"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Itinerary saved", "id": 42})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/itinerary/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 42, "destination": "Pune"}])))
        .mount(&server)
        .await;

    let store = MemoryCredentialStore::with_token("tok");
    let (mut app, _) = controller(&server, &store);

    assert_eq!(app.handle(Action::SaveItinerary).await, Outcome::Failed);

    app.handle(Action::GenerateItinerary {
        destination: "Pune".to_string(),
    })
    .await;
    assert_eq!(app.handle(Action::SaveItinerary).await, Outcome::Completed);
    assert!(app
        .view()
        .messages
        .iter()
        .any(|m| m.text == "Itinerary for Pune saved (#42)"));

    let requests = server.received_requests().await.unwrap();
    let save = requests
        .iter()
        .find(|r| r.url.path() == "/api/itinerary/save")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&save.body).unwrap();
    assert_eq!(body["destination"], "Pune");
    assert_eq!(body["days"], 3);
    assert_eq!(body["plan"], three_day_plan()["plan"]);
}

#[tokio::test]
async fn logout_twice_equals_once() {
    let server = MockServer::start().await;
    let store = MemoryCredentialStore::with_token("tok");
    let (mut app, _) = controller(&server, &store);
    assert_eq!(app.view().auth, AuthView::Authenticated);

    assert_eq!(app.handle(Action::Logout).await, Outcome::Completed);
    let after_once = (app.view().auth, store.peek(), app.view().saved.clone());
    assert_eq!(app.handle(Action::Logout).await, Outcome::Completed);
    let after_twice = (app.view().auth, store.peek(), app.view().saved.clone());

    assert_eq!(after_once, after_twice);
    assert_eq!(after_twice.0, AuthView::Anonymous);
    assert_eq!(after_twice.1, None);
}

#[tokio::test]
async fn credential_survives_restart_with_file_store() {
    let server = MockServer::start().await;
    mount_login(&server, "persisted-jwt").await;
    Mock::given(method("GET"))
        .and(path("/api/itinerary/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let base = Url::parse(&server.uri()).unwrap();
    let indicator: Arc<dyn Indicator> = Arc::new(CountingIndicator::default());

    let mut first = Controller::new(
        &config_for(&server),
        Box::new(FileCredentialStore::new(dir.path(), &base)),
        indicator.clone(),
    )
    .unwrap();
    first
        .handle(Action::Login {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
        })
        .await;
    drop(first);

    let second = Controller::new(
        &config_for(&server),
        Box::new(FileCredentialStore::new(dir.path(), &base)),
        indicator,
    )
    .unwrap();
    assert_eq!(second.view().auth, AuthView::Authenticated);
    assert_eq!(second.session().token(), Some("persisted-jwt"));
}

#[tokio::test]
async fn bad_map_key_degrades_without_blocking() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok", "app": "Dishanveshi", "version": "v1.0.0"
        })))
        .mount(&server)
        .await;

    let config = ClientConfig {
        maps_api_key: Some("not a key!".to_string()),
        ..config_for(&server)
    };
    let mut app = Controller::new(
        &config,
        Box::new(MemoryCredentialStore::new()),
        Arc::new(CountingIndicator::default()),
    )
    .unwrap();

    assert!(app.map().is_none());
    assert!(app.view().map_notice.is_some());
    assert_eq!(app.handle(Action::Health).await, Outcome::Completed);
    assert_eq!(
        app.view().last_message().unwrap().text,
        "API status: ok (Dishanveshi v1.0.0)"
    );
}

#[test]
fn missing_base_url_halts_startup() {
    let result = Controller::new(
        &ClientConfig::default(),
        Box::new(MemoryCredentialStore::new()),
        Arc::new(CountingIndicator::default()),
    );
    assert!(result.is_err());
}

#[tokio::test]
async fn corrupt_credentials_file_starts_anonymous() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..config_for(&server)
    };
    let credentials = dir.path().join("credentials.json");
    std::fs::write(&credentials, "{not json").unwrap();

    let mut app =
        Controller::bootstrap(&config, Arc::new(CountingIndicator::default())).unwrap();
    assert_eq!(app.view().auth, AuthView::Anonymous);
    assert_eq!(app.session().token(), None);

    assert_eq!(app.handle(Action::Logout).await, Outcome::Completed);
    let rewritten = std::fs::read_to_string(&credentials).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&rewritten).is_ok());
    assert!(server.received_requests().await.unwrap().is_empty());
}
