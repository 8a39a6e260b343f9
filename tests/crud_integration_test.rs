// End-to-end flows against Postgres. Skipped when TEST_DATABASE_URL is unreachable.

mod common;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use chrono::{Duration, Local};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{app_with_pool, json_body, request, test_pool, token_for, TEST_JWT_SECRET};
use studio_hq::auth::{AuthError, AuthService, CreateUserRequest, UserRole};
use studio_hq::error::AppError;
use studio_hq::models::UpdateEventRequest;
use studio_hq::services::{ChangeBus, EventService};

fn date_in(days: i64) -> String {
    (Local::now().date_naive() + Duration::days(days)).to_string()
}

#[tokio::test]
async fn test_class_lifecycle() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let staff = token_for(UserRole::Staff);
    let title = format!("Sled Session {}", Uuid::new_v4());

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/classes",
            Some(json!({
                "title": title,
                "class_date": date_in(2),
                "start_time": "07:00:00",
                "duration_minutes": 60,
                "template": "hyrox-half"
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let class = json_body(response).await;
    let class_id = class["id"].as_str().unwrap().to_string();
    assert_eq!(class["status"], "draft");
    assert_eq!(class["max_participants"], 20);
    assert!(!class["workout"]["rounds"].as_array().unwrap().is_empty());

    // drafts are hidden from visitors
    let response = app
        .clone()
        .oneshot(request(Method::GET, &format!("/api/classes/{}", class_id), None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/classes/{}/approve", class_id),
            None,
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/classes", None, None))
        .await
        .unwrap();
    let listed = json_body(response).await;
    assert!(listed
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c["id"] == Value::String(class_id.clone())));

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/classes/{}", class_id),
            None,
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request(
            Method::DELETE,
            &format!("/api/classes/{}", class_id),
            None,
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_registration_until_full() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let staff = token_for(UserRole::Staff);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/events",
            Some(json!({
                "title": "Partner Hyrox Throwdown",
                "event_date": date_in(30),
                "category": "competition",
                "capacity": 1,
                "status": "published",
                "registration_required": true
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = json_body(response).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["spots_remaining"], 1);
    assert_eq!(event["registration_open"], true);

    let register = format!("/api/events/{}/register", event_id);

    let response = app
        .clone()
        .oneshot(request(Method::POST, &register, None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let event = json_body(response).await;
    assert_eq!(event["current_participants"], 1);
    assert_eq!(event["spots_remaining"], 0);

    let response = app
        .clone()
        .oneshot(request(Method::POST, &register, None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // capacity cannot drop below the registered count
    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/events/{}", event_id),
            Some(json!({ "capacity": 0 })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/events/{}/register", Uuid::new_v4()),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_past_events_complete() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let staff = token_for(UserRole::Staff);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/events",
            Some(json!({
                "title": "Last Week's Social Run",
                "event_date": date_in(-7),
                "category": "social",
                "status": "published"
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let event = json_body(response).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    assert_eq!(event["status"], "completed");

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/events/{}/register", event_id),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/events/complete-past", None, Some(&staff)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["completed"].as_u64().unwrap() >= 1);

    let response = app
        .oneshot(request(Method::GET, "/api/events?status=completed", None, None))
        .await
        .unwrap();
    let listed = json_body(response).await;
    assert!(listed
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["id"] == Value::String(event_id.clone())));
}

#[tokio::test]
async fn test_sponsorship_inquiry_flow() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let admin = token_for(UserRole::Admin);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/sponsorship-packages",
            Some(json!({
                "name": format!("Gold {}", Uuid::new_v4()),
                "price": 2500.0,
                "benefits": ["Logo on the rig", "Event naming"],
                "is_active": false
            })),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let package_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let inquiry = json!({
        "company_name": "Iron Supply Co.",
        "contact_name": "Sam Rivera",
        "email": "Sam@IronSupply.test",
        "package_id": package_id,
    });

    // inactive packages cannot be picked from the public form
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/sponsorship-inquiries", Some(inquiry.clone()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/sponsorship-packages/{}", package_id),
            Some(json!({ "is_active": true })),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/sponsorship-inquiries", Some(inquiry), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["email"], "sam@ironsupply.test");
    let inquiry_id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/sponsorship-inquiries/{}", inquiry_id),
            Some(json!({ "status": "contacted", "admin_notes": "Called on Monday" })),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "contacted");

    let response = app
        .oneshot(request(Method::GET, "/api/sponsorship-inquiries/counts", None, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let counts = json_body(response).await;
    assert!(counts["contacted"].as_i64().unwrap() >= 1);
    assert!(counts["total"].as_i64().unwrap() >= counts["contacted"].as_i64().unwrap());
}

#[tokio::test]
async fn test_playlist_settings() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let admin = token_for(UserRole::Admin);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/settings/playlists",
            Some(json!({
                "name": "Race Day",
                "url": "https://open.spotify.com/playlist/abc123"
            })),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let settings = json_body(response).await;
    let added = settings["playlists"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Race Day")
        .cloned()
        .unwrap();
    assert_eq!(added["platform"], "spotify");
    let playlist_id = added["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/settings/playlists/{}", playlist_id),
            None,
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(
            Method::DELETE,
            &format!("/api/settings/playlists/{}", playlist_id),
            None,
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn contains_id(listed: &Value, id: &str) -> bool {
    listed
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["id"] == Value::String(id.to_string()))
}

#[tokio::test]
async fn test_capacity_below_participants_is_conflict() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool.clone());
    let staff = token_for(UserRole::Staff);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/events",
            Some(json!({
                "title": "Wall Ball Ladder",
                "event_date": date_in(21),
                "category": "competition",
                "capacity": 3,
                "status": "published",
                "registration_required": true
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let event_id = json_body(response).await["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                &format!("/api/events/{}/register", event_id),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // the database refuses the write even when nothing checked beforehand
    let events = EventService::new(pool, ChangeBus::default());
    let err = events
        .update_event(
            Uuid::parse_str(&event_id).unwrap(),
            UpdateEventRequest {
                capacity: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        AppError::from(err).into_response().status(),
        StatusCode::CONFLICT
    );

    let response = app
        .oneshot(request(Method::GET, &format!("/api/events/{}", event_id), None, None))
        .await
        .unwrap();
    let event = json_body(response).await;
    assert_eq!(event["capacity"], 3);
    assert_eq!(event["current_participants"], 2);
}

#[tokio::test]
async fn test_coach_create_then_listed() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let staff = token_for(UserRole::Staff);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/coaches",
            Some(json!({
                "name": format!("Jordan Reyes {}", Uuid::new_v4()),
                "title": "Head Coach",
                "specialties": ["Hyrox", "Strength"],
                "certifications": ["CF-L2"]
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let coach = json_body(response).await;
    let coach_id = coach["id"].as_str().unwrap().to_string();
    assert_eq!(coach["is_active"], true);

    let response = app
        .oneshot(request(Method::GET, "/api/coaches", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(contains_id(&json_body(response).await, &coach_id));
}

#[tokio::test]
async fn test_sponsor_toggle_active_persists() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let admin = token_for(UserRole::Admin);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/sponsors",
            Some(json!({ "name": format!("Iron Supply {}", Uuid::new_v4()) })),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let sponsor = json_body(response).await;
    let sponsor_id = sponsor["id"].as_str().unwrap().to_string();
    assert_eq!(sponsor["is_active"], true);

    let toggle = format!("/api/sponsors/{}/toggle-active", sponsor_id);
    let path = format!("/api/sponsors/{}", sponsor_id);

    let response = app
        .clone()
        .oneshot(request(Method::POST, &toggle, None, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_active"], false);

    let response = app
        .clone()
        .oneshot(request(Method::GET, &path, None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request(Method::GET, &path, None, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["is_active"], false);

    let response = app
        .clone()
        .oneshot(request(Method::POST, &toggle, None, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["is_active"], true);

    let response = app
        .oneshot(request(Method::GET, &path, None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_package_is_gone() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let admin = token_for(UserRole::Admin);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/sponsorship-packages",
            Some(json!({
                "name": format!("Silver {}", Uuid::new_v4()),
                "price": 900.0,
                "benefits": ["Banner at events"],
                "is_active": true
            })),
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let package_id = json_body(response).await["id"].as_str().unwrap().to_string();
    let path = format!("/api/sponsorship-packages/{}", package_id);

    let response = app
        .clone()
        .oneshot(request(Method::DELETE, &path, None, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(request(Method::GET, &path, None, Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request(
            Method::GET,
            "/api/sponsorship-packages?include_inactive=true",
            None,
            Some(&admin),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!contains_id(&json_body(response).await, &package_id));
}

#[tokio::test]
async fn test_program_create_and_recalculate() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let staff = token_for(UserRole::Staff);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/programs",
            Some(json!({
                "name": format!("Race Block {}", Uuid::new_v4()),
                "start_date": date_in(-10),
                "phases": [
                    { "name": "Base", "weeks": 4, "focus": "Aerobic volume" },
                    { "name": "Build", "weeks": 3 }
                ]
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let program = json_body(response).await;
    let program_id = program["id"].as_str().unwrap().to_string();
    assert_eq!(program["total_weeks"], 7);
    assert_eq!(program["phases"][0]["start_week"], 1);
    assert_eq!(program["phases"][0]["end_week"], 4);
    assert_eq!(program["phases"][1]["start_week"], 5);
    assert_eq!(program["phases"][1]["end_week"], 7);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            &format!("/api/programs/{}/recalculate", program_id),
            None,
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let program = json_body(response).await;
    assert_eq!(program["current_week"], 2);
    assert_eq!(program["phases"][0]["status"], "current");
    assert_eq!(program["phases"][1]["status"], "upcoming");
    assert_eq!(program["current_phase"]["name"], "Base");

    let response = app
        .oneshot(request(
            Method::POST,
            &format!("/api/programs/{}/recalculate", Uuid::new_v4()),
            None,
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_text_clears_field() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let staff = token_for(UserRole::Staff);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/classes",
            Some(json!({
                "title": "Engine Room",
                "description": "Zone 2 erg work",
                "class_date": date_in(3),
                "start_time": "12:00:00",
                "duration_minutes": 45,
                "instructor": "Alex"
            })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let class_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(request(
            Method::PATCH,
            &format!("/api/classes/{}", class_id),
            Some(json!({ "instructor": "   " })),
            Some(&staff),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let class = json_body(response).await;
    assert_eq!(class["instructor"], Value::Null);
    assert_eq!(class["description"], "Zone 2 erg work");
}

#[tokio::test]
async fn test_create_user_status_and_duplicates() {
    let Some(pool) = test_pool().await else { return };
    let app = app_with_pool(pool);
    let admin = token_for(UserRole::Admin);
    let email = format!("coach-{}@studio.test", Uuid::new_v4());
    let body = json!({ "email": email, "password": "strongpass1", "role": "staff" });

    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/auth/users", Some(body.clone()), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["email"], Value::String(email));

    let response = app
        .oneshot(request(Method::POST, "/api/auth/users", Some(body), Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_concurrent_create_user_conflicts() {
    let Some(pool) = test_pool().await else { return };
    let auth = AuthService::new(pool, TEST_JWT_SECRET);
    let email = format!("race-{}@studio.test", Uuid::new_v4());
    let new_user = || CreateUserRequest {
        email: email.clone(),
        password: "strongpass1".to_string(),
        role: None,
    };

    let (first, second) = tokio::join!(auth.create_user(new_user()), auth.create_user(new_user()));

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AuthError::EmailAlreadyExists))));
}
