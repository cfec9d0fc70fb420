//! Integration tests for the Shine HTTP client against a mock vendor.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use serde_json::json;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shinebridge::auth::Session;
use shinebridge::vendor::{ShineClient, VendorApi};

fn make_bearer_jwt(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("Bearer_{header}.{payload}.sig")
}

fn valid_session() -> Session {
    Session::new("Bearer_tok".to_string(), Utc::now() + Duration::hours(1))
}

#[tokio::test]
async fn test_login_submits_credentials_and_returns_token() {
    let server = MockServer::start().await;
    let token = make_bearer_jwt((Utc::now() + Duration::hours(1)).timestamp());

    Mock::given(method("POST"))
        .and(path("/userlogin"))
        .and(body_partial_json(json!({
            "userName": "u1@example.com",
            "version": "1.0"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": token }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let returned = client.login("u1@example.com", "encoded-secret").await.unwrap();
    assert_eq!(returned, token);
}

#[tokio::test]
async fn test_login_rejection_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/userlogin"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let err = client
        .login("u1@example.com", "encoded-secret")
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Authentication"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_login_without_token_in_body_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/userlogin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "message": "ok" }
        })))
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let err = client
        .login("u1@example.com", "encoded-secret")
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("no token"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_list_devices_sends_token_verbatim_and_collects_serials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/device/list_device_all_type"))
        .and(header("authorization", "Bearer_tok"))
        .and(body_partial_json(json!({ "pageNum": 1, "pageSize": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "dataList": [
                    { "deviceSn": "SN001", "status": "online" },
                    { "deviceSn": "SN002", "status": "offline" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let devices = client.list_devices(&valid_session()).await.unwrap();
    assert_eq!(devices, vec!["SN001".to_string(), "SN002".to_string()]);
}

#[tokio::test]
async fn test_list_devices_server_error_is_directory_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/device/list_device_all_type"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let err = client
        .list_devices(&valid_session())
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Device directory"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_list_devices_missing_list_field_is_directory_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/device/list_device_all_type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let err = client
        .list_devices(&valid_session())
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("no device list"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_fetch_snapshot_maps_battery_pack_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/device/get_device_snapshot"))
        .and(header("authorization", "Bearer_tok"))
        .and(body_partial_json(json!({
            "deviceSn": "SN001",
            "deviceType": "BP"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "productTypeEnum": "LITHIUM_BATTERY_PACK",
                "deviceSn": "SN001",
                "battVolt": "52.3",
                "battCurr": "-3.1",
                "battSoc": "87",
                "battSoh": "99",
                "ratedEnergy": "5.12",
                "energyUnit": "kWh",
                "emsVoltage": "52.1",
                "emsSoc": "86"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let snapshot = client
        .fetch_snapshot(&valid_session(), "SN001")
        .await
        .unwrap();
    assert_eq!(snapshot.device_sn, "SN001");
    assert_eq!(snapshot.batt_volt, "52.3");
    assert_eq!(snapshot.batt_soc, "87");
    assert_eq!(snapshot.ems_soc, "86");
}

#[tokio::test]
async fn test_fetch_snapshot_rejects_unsupported_category() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/device/get_device_snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "productTypeEnum": "HYBRID_INVERTER",
                "deviceSn": "SN009"
            }
        })))
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let err = client
        .fetch_snapshot(&valid_session(), "SN009")
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("HYBRID_INVERTER"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_fetch_snapshot_missing_payload_is_malformed_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/device/get_device_snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "msg": "nope" })))
        .mount(&server)
        .await;

    let client = ShineClient::new(server.uri()).unwrap();
    let err = client
        .fetch_snapshot(&valid_session(), "SN001")
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("no data payload"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_fetch_snapshot_without_valid_session_never_hits_network() {
    // No mock is mounted: any request would fail the test via a 404 rather
    // than the expected NotAuthenticated error.
    let server = MockServer::start().await;
    let client = ShineClient::new(server.uri()).unwrap();

    let expired = Session::new("Bearer_tok".to_string(), Utc::now() - Duration::hours(1));
    let err = client
        .fetch_snapshot(&expired, "SN001")
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("Not authenticated"), "unexpected error: {err}");
    assert!(server.received_requests().await.unwrap().is_empty());
}
