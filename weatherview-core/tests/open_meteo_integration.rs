//! End-to-end lookups against a mock Open-Meteo / Nominatim server.

use weatherview_core::{
    Config, ConditionCategory, Language, LocationQuery, ProviderId, SearchOutcome, SearchSession,
    TemperatureUnit, WeatherError, WeatherService, provider::provider_from_config,
    to_display_temperature,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> WeatherService {
    let mut cfg = Config::default();
    cfg.providers.entry(ProviderId::OpenMeteo.as_str().to_string()).or_default().base_url =
        Some(server.uri());

    WeatherService::new(provider_from_config(ProviderId::OpenMeteo, &cfg).unwrap())
}

fn london_geocoding() -> serde_json::Value {
    serde_json::json!({
        "results": [
            { "id": 2643743, "name": "London", "latitude": 51.50853, "longitude": -0.12574,
              "country_code": "GB", "country": "United Kingdom" },
            { "id": 6058560, "name": "London", "latitude": 42.98339, "longitude": -81.23304,
              "country_code": "CA", "country": "Canada" }
        ],
        "generationtime_ms": 0.5
    })
}

fn current_body(temp: f64) -> serde_json::Value {
    serde_json::json!({
        "latitude": 51.5,
        "longitude": -0.12,
        "utc_offset_seconds": 0,
        "current": {
            "time": "2026-03-01T12:00",
            "interval": 900,
            "temperature_2m": temp,
            "apparent_temperature": 13.1,
            "relative_humidity_2m": 77,
            "surface_pressure": 1008.4,
            "wind_speed_10m": 5.3,
            "weather_code": 3,
            "is_day": 1,
            "precipitation_probability": 20
        }
    })
}

fn daily_body() -> serde_json::Value {
    serde_json::json!({
        "daily": {
            "time": ["2026-03-01", "2026-03-02", "2026-03-03", "2026-03-04", "2026-03-05"],
            "weather_code": [3, 61, 80, 0, 45],
            "temperature_2m_max": [16.0, 14.0, 12.5, 15.0, 11.0],
            "temperature_2m_min": [8.0, 7.5, 6.0, 5.0, 4.0],
            "precipitation_probability_max": [20, 85, 60, 0, null]
        }
    })
}

async fn mount_london(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "London"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_geocoding()))
        .mount(server)
        .await;
}

async fn mount_current(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("wind_speed_unit", "ms"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_daily(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "5"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_london_end_to_end_in_fahrenheit() {
    let server = MockServer::start().await;
    mount_london(&server).await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body(15.0))).await;
    mount_daily(&server, ResponseTemplate::new(200).set_body_json(daily_body())).await;

    let service = service_for(&server);
    let query = LocationQuery::city("London").unwrap();
    let report = service.lookup(&query).await.unwrap();

    assert_eq!(report.provider, "open-meteo");
    assert_eq!(report.place.name, "London");
    assert_eq!(report.place.country_code, "GB");
    assert_eq!(report.current.temperature_c, 15.0);
    assert_eq!(report.current.category, ConditionCategory::Clouds);
    assert_eq!(report.current.description, "Overcast");

    let shown = to_display_temperature(report.current.temperature_c, TemperatureUnit::Fahrenheit);
    assert_eq!(shown.value(), Some(59.0));
    // stored value is untouched by display conversion
    assert_eq!(report.current.temperature_c, 15.0);

    assert_eq!(report.forecast.len(), 5);
    let days = report.forecast.days();
    assert_eq!(days[1].category, ConditionCategory::Rain);
    assert_eq!(days[1].precipitation_probability_pct, 85);
    assert_eq!(days[4].category, ConditionCategory::Mist);
    assert_eq!(days[4].precipitation_probability_pct, 0);
}

#[tokio::test]
async fn test_unknown_city_clears_previous_state() {
    let server = MockServer::start().await;
    mount_london(&server).await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body(15.0))).await;
    mount_daily(&server, ResponseTemplate::new(200).set_body_json(daily_body())).await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Zzzzqx"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "generationtime_ms": 0.2 })),
        )
        .mount(&server)
        .await;

    let service = service_for(&server);
    let mut session = SearchSession::new();

    let ticket = session.begin();
    let result = service.lookup(&LocationQuery::city("London").unwrap()).await;
    assert_eq!(session.complete(ticket, result, Language::En), SearchOutcome::Shown);
    assert!(session.view().report.is_some());

    let ticket = session.begin();
    let result = service.lookup(&LocationQuery::city("Zzzzqx").unwrap()).await;
    assert!(matches!(result, Err(WeatherError::PlaceNotFound(ref q)) if q == "Zzzzqx"));

    let outcome = session.complete(ticket, result, Language::En);
    assert_eq!(outcome, SearchOutcome::Failed("City not found: Zzzzqx".to_string()));
    assert!(session.view().report.is_none());
    assert_eq!(session.view().error.as_deref(), Some("City not found: Zzzzqx"));
}

#[tokio::test]
async fn test_forecast_failure_fails_whole_lookup() {
    let server = MockServer::start().await;
    mount_london(&server).await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body(15.0))).await;
    mount_daily(&server, ResponseTemplate::new(500).set_body_string("upstream exploded")).await;

    let service = service_for(&server);
    let err = service.lookup(&LocationQuery::city("London").unwrap()).await.unwrap_err();

    match err {
        WeatherError::FetchFailed(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("expected FetchFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_geocoding_outage_is_resolver_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let err = service.lookup(&LocationQuery::city("London").unwrap()).await.unwrap_err();

    assert!(matches!(err, WeatherError::ResolverUnavailable(_)));
}

#[tokio::test]
async fn test_non_json_body_is_malformed_payload() {
    let server = MockServer::start().await;
    mount_london(&server).await;
    mount_current(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;
    mount_daily(&server, ResponseTemplate::new(200).set_body_json(daily_body())).await;

    let service = service_for(&server);
    let err = service.lookup(&LocationQuery::city("London").unwrap()).await.unwrap_err();

    assert!(matches!(err, WeatherError::MalformedPayload(_)));
}

#[tokio::test]
async fn test_sparse_current_payload_still_produces_report() {
    let server = MockServer::start().await;
    mount_london(&server).await;
    mount_current(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "temperature_2m": 9.5 }
        })),
    )
    .await;
    mount_daily(&server, ResponseTemplate::new(200).set_body_json(serde_json::json!({}))).await;

    let service = service_for(&server);
    let report = service.lookup(&LocationQuery::city("London").unwrap()).await.unwrap();

    assert_eq!(report.current.temperature_c, 9.5);
    assert_eq!(report.current.precipitation_probability_pct, 0);
    assert_eq!(report.current.humidity_pct, 0);
    assert!(report.forecast.is_empty());
}

#[tokio::test]
async fn test_coordinates_use_reverse_geocoding() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "-6.2"))
        .and(query_param("lon", "106.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "Jakarta, Indonesia",
            "address": { "city": "Jakarta", "state": "DKI Jakarta", "country_code": "id" }
        })))
        .mount(&server)
        .await;
    mount_current(&server, ResponseTemplate::new(200).set_body_json(current_body(31.0))).await;
    mount_daily(&server, ResponseTemplate::new(200).set_body_json(daily_body())).await;

    let service = service_for(&server);
    let report =
        service.lookup(&LocationQuery::coordinates(-6.2, 106.8).unwrap()).await.unwrap();

    assert_eq!(report.place.name, "Jakarta");
    assert_eq!(report.place.country_code, "ID");
    assert_eq!(report.place.latitude, -6.2);
    assert_eq!(report.current.temperature_c, 31.0);
}

#[tokio::test]
async fn test_reverse_geocoding_error_is_place_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "Unable to geocode" })),
        )
        .mount(&server)
        .await;

    let service = service_for(&server);
    let err = service.lookup(&LocationQuery::coordinates(0.0, -30.0).unwrap()).await.unwrap_err();

    assert!(matches!(err, WeatherError::PlaceNotFound(_)));
}
