//! Integration tests for the weather endpoint.
//!
//! Tests cover:
//! - Successful resolution and exact unit conversion
//! - Postal code directory not-found and failure paths
//! - Weather directory failure paths
//! - Validation before any upstream call
//! - Byte-identical responses for identical inputs

use axum::http::StatusCode;
use httpmock::prelude::*;
use shared::models::TemperatureResult;

use super::common::{
    get, get_raw, mock_city, mock_city_body, mock_temperature, mock_temperature_response,
    test_app, test_app_with_urls,
};

#[tokio::test]
async fn test_resolves_city_and_temperature() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    let city_mock = mock_city(&viacep, "87043480", "Maringá").await;
    let temp_mock = mock_temperature(&weatherapi, "Maringá", 28.5).await;
    let app = test_app(&viacep, &weatherapi);

    let (status, response) = get(app.router.clone(), "/weather?cep=87043480").await;

    assert_eq!(status, StatusCode::OK);
    let result: TemperatureResult = serde_json::from_value(response).unwrap();
    assert_eq!(result, TemperatureResult::from_celsius("Maringá", 28.5));
    assert_eq!(result.temp_f, 28.5 * 1.8 + 32.0);
    assert_eq!(result.temp_k, 28.5 + 273.15);
    city_mock.assert_async().await;
    temp_mock.assert_async().await;
}

#[tokio::test]
async fn test_negative_and_zero_temperatures() {
    for temp_c in [-12.5, 0.0] {
        let viacep = MockServer::start_async().await;
        let weatherapi = MockServer::start_async().await;
        mock_city(&viacep, "99999999", "Urupema").await;
        mock_temperature(&weatherapi, "Urupema", temp_c).await;
        let app = test_app(&viacep, &weatherapi);

        let (status, response) = get(app.router.clone(), "/weather?cep=99999999").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["temp_C"], temp_c);
        assert_eq!(response["temp_F"], temp_c * 1.8 + 32.0);
        assert_eq!(response["temp_K"], temp_c + 273.15);
    }
}

#[tokio::test]
async fn test_city_with_spaces_is_url_encoded() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_city(&viacep, "01001000", "São Paulo").await;
    let temp_mock = mock_temperature(&weatherapi, "São Paulo", 22.0).await;
    let app = test_app(&viacep, &weatherapi);

    let (status, response) = get(app.router.clone(), "/weather?cep=01001000").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["city"], "São Paulo");
    temp_mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_cep_returns_404() {
    for body in [r#"{"erro": true}"#, r#"{"erro": "true"}"#, r#"{"localidade": ""}"#] {
        let viacep = MockServer::start_async().await;
        let weatherapi = MockServer::start_async().await;
        mock_city_body(&viacep, "00000000", body).await;
        let temp_mock = mock_temperature_response(&weatherapi, 200, "{}").await;
        let app = test_app(&viacep, &weatherapi);

        let (status, response) = get(app.router.clone(), "/weather?cep=00000000").await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
        assert_eq!(response["message"], "can not find zipcode");
        temp_mock.assert_hits_async(0).await;
    }
}

#[tokio::test]
async fn test_undecodable_city_response_returns_500() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_city_body(&viacep, "87043480", "<html>bad gateway</html>").await;
    let app = test_app(&viacep, &weatherapi);

    let (status, response) = get(app.router.clone(), "/weather?cep=87043480").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["message"], "internal error");
}

#[tokio::test]
async fn test_unreachable_city_directory_returns_500() {
    let weatherapi = MockServer::start_async().await;
    let app = test_app_with_urls("http://127.0.0.1:1", &weatherapi.base_url());

    let (status, response) = get(app.router.clone(), "/weather?cep=87043480").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["message"], "internal error");
}

#[tokio::test]
async fn test_weather_directory_error_returns_500() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_city(&viacep, "87043480", "Maringá").await;
    mock_temperature_response(&weatherapi, 500, r#"{"error": "boom"}"#).await;
    let app = test_app(&viacep, &weatherapi);

    let (status, response) = get(app.router.clone(), "/weather?cep=87043480").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["message"], "internal error");
}

#[tokio::test]
async fn test_weather_directory_bad_key_returns_500() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_city(&viacep, "87043480", "Maringá").await;
    mock_temperature_response(
        &weatherapi,
        403,
        r#"{"error": {"code": 2008, "message": "API key has been disabled."}}"#,
    )
    .await;
    let app = test_app(&viacep, &weatherapi);

    let (status, response) = get(app.router.clone(), "/weather?cep=87043480").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["message"], "internal error");
}

#[tokio::test]
async fn test_undecodable_weather_response_returns_500() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_city(&viacep, "87043480", "Maringá").await;
    mock_temperature_response(&weatherapi, 200, r#"{"current": {"temp_c": "hot"}}"#).await;
    let app = test_app(&viacep, &weatherapi);

    let (status, response) = get(app.router.clone(), "/weather?cep=87043480").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["message"], "internal error");
}

#[tokio::test]
async fn test_invalid_cep_returns_422_without_upstream_calls() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    let city_mock = mock_city(&viacep, "123", "Nowhere").await;
    let app = test_app(&viacep, &weatherapi);

    for uri in [
        "/weather?cep=123",
        "/weather?cep=870434800",
        "/weather?cep=8704348a",
        "/weather?cep=",
        "/weather",
    ] {
        let (status, response) = get(app.router.clone(), uri).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(response["message"], "invalid zipcode");
    }
    city_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_identical_requests_give_identical_bodies() {
    let viacep = MockServer::start_async().await;
    let weatherapi = MockServer::start_async().await;
    mock_city(&viacep, "87043480", "Maringá").await;
    mock_temperature(&weatherapi, "Maringá", 28.5).await;
    let app = test_app(&viacep, &weatherapi);

    let (first_status, first) = get_raw(app.router.clone(), "/weather?cep=87043480", None).await;
    let (second_status, second) = get_raw(app.router.clone(), "/weather?cep=87043480", None).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
}
