#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use ride_booking::build_app;
use ride_booking::clients::MockPaymentProcessor;
use ride_booking::config::environment::EnvironmentConfig;
use ride_booking::repositories::MemoryStore;
use ride_booking::state::AppState;
use ride_booking::utils::clock::FixedClock;
use ride_booking::utils::jwt::{generate_token, JwtConfig, TokenProfile};

/// App completa sobre el store en memoria y el procesador simulado,
/// con el reloj fijado el 2025-01-01
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub processor: Arc<MockPaymentProcessor>,
    jwt: JwtConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let config = EnvironmentConfig::default();
        let jwt = JwtConfig::from(&config);
        let store = Arc::new(MemoryStore::new());
        let processor = Arc::new(MockPaymentProcessor::new());
        let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()));

        let state = AppState::with_memory_store(config, store.clone(), processor.clone(), clock);

        Self {
            router: build_app(state),
            store,
            processor,
            jwt,
        }
    }

    pub fn token(&self, user_id: &str) -> String {
        let profile = TokenProfile {
            email: Some(format!("{}@example.com", user_id)),
            first_name: Some(user_id.to_string()),
            ..Default::default()
        };
        generate_token(user_id, profile, &self.jwt).unwrap()
    }

    /// Token de un usuario que ya existe y tiene rol de administrador
    pub async fn admin_token(&self, user_id: &str) -> String {
        let token = self.token(user_id);
        let response = self.get("/api/auth/user", Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK);
        self.store.set_admin(user_id, true).await.unwrap();
        token
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    /// Crear un vehículo como administrador y devolver su id
    pub async fn create_ride(&self, admin_token: &str, model: &str, price_per_day: &str) -> String {
        let response = self
            .post(
                "/api/rides",
                Some(admin_token),
                json!({
                    "model": model,
                    "category": "Sedan",
                    "imageUrl": "https://img.test/car.png",
                    "pricePerDay": price_per_day,
                    "seats": 5,
                    "transmission": "Automatic",
                    "fuelType": "Gasoline",
                    "rating": "4.5",
                    "reviewCount": 10,
                    "location": "Downtown Seattle"
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    /// Reserva del 10 al 12 de enero de 2025
    pub async fn create_booking(&self, token: &str, ride_id: &str) -> Value {
        let response = self.post("/api/bookings", Some(token), booking_body(ride_id)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body
    }
}

pub fn booking_body(ride_id: &str) -> Value {
    json!({
        "rideId": ride_id,
        "pickupDate": "2025-01-10",
        "returnDate": "2025-01-12",
        "pickupLocation": "Airport",
        "driverAge": "26-35",
        "phoneNumber": "+1 (555) 123-4567",
        "totalAmount": 1
    })
}
