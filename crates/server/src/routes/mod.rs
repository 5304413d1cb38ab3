use std::time::Duration;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{delete, get, post},
    Router,
};
use shared::api::{Cron, Object, CRON_SECRET_HEADER};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::AppState;

mod activities;
mod cron;
mod evaluations;
mod extract;
pub use extract::*;
mod gym_locations;
mod ping;
mod teams;
mod users;

/// GPS batches are the largest bodies a client sends
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Result<Router, anyhow::Error> {
    let cors = CorsLayer::new()
        .allow_origin(state.args.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_bytes(CRON_SECRET_HEADER.as_bytes())?,
        ]);
    let timeout = Duration::from_secs(state.args.request_timeout_secs);

    let router = Router::new()
        .route(Object::Ping.path(), get(ping::ping))
        .route(
            Object::Me.path(),
            get(users::get_me).post(users::create_me).put(users::update_me),
        )
        .route(Object::Teams.path(), post(teams::create_team))
        .route(Object::MyTeam.path(), get(teams::get_my_team))
        .route(Object::JoinTeam.path(), post(teams::join_team))
        .route(Object::Team.path(), get(teams::get_team))
        .route(Object::TeamInvite.path(), post(teams::create_invite_code))
        .route(
            Object::TeamGoal.path(),
            get(teams::get_goal).post(teams::create_goal).put(teams::update_goal),
        )
        .route(
            Object::TeamDisband.path(),
            get(teams::get_disband_votes)
                .post(teams::vote_disband)
                .delete(teams::cancel_disband_vote),
        )
        .route(Object::TeamStatus.path(), get(evaluations::team_status))
        .route(Object::TeamEvaluations.path(), get(evaluations::list_evaluations))
        .route(Object::TeamCurrentWeek.path(), get(evaluations::current_week))
        .route(Object::TeamActivities.path(), get(activities::list_team_activities))
        .route(Object::StartRunning.path(), post(activities::start_running))
        .route(Object::ActivityGps.path(), post(activities::send_gps_points))
        .route(Object::FinishRunning.path(), post(activities::finish_running))
        .route(Object::GymCheckin.path(), post(activities::gym_checkin))
        .route(Object::GymCheckout.path(), post(activities::gym_checkout))
        .route(Object::MyActivities.path(), get(activities::list_my_activities))
        .route(Object::Activity.path(), get(activities::get_activity))
        .route(
            Object::GymLocations.path(),
            get(gym_locations::list_gym_locations).post(gym_locations::create_gym_location),
        )
        .route(Object::GymLocation.path(), delete(gym_locations::delete_gym_location))
        .route(Object::MyPrediction.path(), get(evaluations::my_prediction))
        .route(Cron::WeeklyEvaluation.path(), post(cron::weekly_evaluation))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    Ok(router)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use clap::Parser;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        auth::{tests::token_for, JwtVerifier},
        cli::Cli,
        db,
    };

    struct TestApp {
        router: Router,
        // Keeps the database file alive for the length of the test
        _dir: TempDir,
    }

    fn app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.sqlite");
        let path = path.to_str().unwrap();
        db::run_migrations(path).unwrap();

        let args = Cli::parse_from([
            "server",
            "--jwt-secret",
            "test-secret",
            "--cron-secret",
            "cron-secret",
            "--sqlite-connection-string",
            path,
        ]);
        let state = AppState {
            pool: db::create_pool(path).unwrap(),
            verifier: Arc::new(JwtVerifier::new(args.jwt_secret.as_bytes(), None)),
            args: Arc::new(args),
        };
        TestApp { router: router(state).unwrap(), _dir: dir }
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn authed(method: Method, uri: &str, uid: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", token_for(uid)));
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn ping_needs_no_credentials() {
        let app = app();
        let response = app
            .router
            .clone()
            .oneshot(Request::get(Object::Ping.path()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"pong");
    }

    #[tokio::test]
    async fn missing_or_bad_token_is_unauthenticated() {
        let app = app();
        let (status, _) = send(
            &app,
            Request::get(Object::Me.path()).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app,
            Request::get(Object::Me.path())
                .header(AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cron_requires_matching_secret() {
        let app = app();
        let (status, _) = send(
            &app,
            Request::post(Cron::WeeklyEvaluation.path())
                .header(CRON_SECRET_HEADER, "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app,
            Request::post(Cron::WeeklyEvaluation.path())
                .header(CRON_SECRET_HEADER, "cron-secret")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["evaluated_teams"], 0);
        assert_eq!(body["disbanded_teams"], 0);
    }

    #[tokio::test]
    async fn profile_then_team() {
        let app = app();

        let (status, _) = send(&app, authed(Method::GET, Object::Me.path(), "alice", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, user) = send(
            &app,
            authed(
                Method::POST,
                Object::Me.path(),
                "alice",
                Some(json!({ "name": "Alice", "age": 31 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["name"], "Alice");
        assert_eq!(user["weight"], 60);

        let (status, team) = send(
            &app,
            authed(
                Method::POST,
                Object::Teams.path(),
                "alice",
                Some(json!({ "name": "Dawn runners", "exercise_type": "running" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(team["status"], "forming");
        assert_eq!(team["members"].as_array().unwrap().len(), 1);

        let (status, mine) = send(&app, authed(Method::GET, Object::MyTeam.path(), "alice", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mine["id"], team["id"]);
    }

    #[tokio::test]
    async fn malformed_ids_are_not_found() {
        let app = app();
        let (status, _) = send(&app, authed(Method::GET, "/api/teams/not-an-id", "alice", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, authed(Method::GET, "/api/activities/nope", "alice", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let app = app();
        let request = Request::post(Object::Me.path())
            .header(AUTHORIZATION, format!("Bearer {}", token_for("alice")))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
