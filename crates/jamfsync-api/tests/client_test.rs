#![allow(clippy::unwrap_used)]
// Integration tests for `JamfClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jamfsync_api::models::{ComputerExtensionAttributeValue, MobileExtensionAttributeValue};
use jamfsync_api::{ClientCredentials, ComputerSection, Error, JamfClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, JamfClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 1199
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    (server, client)
}

fn client_for(server: &MockServer) -> JamfClient {
    let base_url = Url::parse(&server.uri()).unwrap();
    let credentials = ClientCredentials::new("client-id", "client-secret".to_string().into());
    JamfClient::with_client(reqwest::Client::new(), base_url, credentials)
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_token_is_fetched_once_and_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=client-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": 1199
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "computers": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.list_computers().await.unwrap();
    client.list_computers().await.unwrap();
}

#[tokio::test]
async fn test_bad_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.authenticate().await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_invalidate_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/invalidate-token"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate().await.unwrap();
    client.invalidate_token().await.unwrap();
    // Nothing left to revoke the second time.
    client.invalidate_token().await.unwrap();
}

// ── Classic API tests ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_computer_group() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computergroups/id/42"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "computer_group": {
                "id": 42,
                "name": "Retired Macs",
                "is_smart": false,
                "computers": [
                    { "id": 7, "name": "LAB-MBP-07", "serial_number": "C02XX" },
                    { "id": 3, "name": "LAB-MBP-03", "serial_number": "C02YY" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let group = client.get_computer_group("42").await.unwrap();

    assert_eq!(group.name, "Retired Macs");
    assert_eq!(group.computers.len(), 2);
    assert_eq!(group.computers[0].id, 7);
    assert_eq!(group.computers[1].name, "LAB-MBP-03");
}

#[tokio::test]
async fn test_missing_group_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computergroups/id/999"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html><body><p>The server has not found anything matching the request URI</p></body></html>"),
        )
        .mount(&server)
        .await;

    let err = client.get_computer_group("999").await.unwrap_err();

    assert!(err.is_not_found(), "expected 404, got: {err:?}");
    assert!(err.to_string().contains("HTTP 404"));
}

#[tokio::test]
async fn test_get_computer_general() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/computers/id/7/subset/General"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "computer": {
                "general": {
                    "id": 7,
                    "name": "LAB-MBP-07",
                    "site": { "id": 2, "name": "Eau Claire" },
                    "remote_management": { "managed": true, "management_username": "jamfadmin" },
                    "report_date": "2024-03-08 14:02:51",
                    "report_date_utc": "2024-03-08T14:02:51.000+0000"
                }
            }
        })))
        .mount(&server)
        .await;

    let general = client.get_computer_general("7").await.unwrap();

    assert_eq!(general.id, 7);
    assert!(general.remote_management.managed);
    assert_eq!(general.site.unwrap().name, "Eau Claire");
    assert_eq!(general.report_date.as_deref(), Some("2024-03-08 14:02:51"));
}

#[tokio::test]
async fn test_set_computer_managed_sends_xml() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/computers/id/7"))
        .and(header("content-type", "application/xml"))
        .and(body_string(
            "<computer><general><remote_management><managed>false</managed>\
             </remote_management></general></computer>",
        ))
        .respond_with(ResponseTemplate::new(201).set_body_string("<computer><id>7</id></computer>"))
        .expect(1)
        .mount(&server)
        .await;

    client.set_computer_managed("7", false).await.unwrap();
}

#[tokio::test]
async fn test_get_mobile_device_general() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/mobiledevices/id/12/subset/General"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mobile_device": {
                "general": {
                    "id": 12,
                    "name": "Cart-iPad-12",
                    "managed": false,
                    "site": { "id": -1, "name": "None" },
                    "last_inventory_update": "2023-11-20 08:15:00"
                }
            }
        })))
        .mount(&server)
        .await;

    let general = client.get_mobile_device_general("12").await.unwrap();

    assert!(!general.managed);
    assert_eq!(general.last_inventory_update.as_deref(), Some("2023-11-20 08:15:00"));
}

#[tokio::test]
async fn test_mobile_device_command_batches_ids() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(
            "/JSSResource/mobiledevicecommands/command/UnmanageDevice/id/12,13,21",
        ))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let ids = vec!["12".to_string(), "13".to_string(), "21".to_string()];
    client
        .send_mobile_device_command("UnmanageDevice", &ids)
        .await
        .unwrap();
}

// ── Pro API tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_computer_inventory_sections() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory/7"))
        .and(query_param("section", "HARDWARE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7",
            "general": null,
            "hardware": {
                "model": "MacBook Pro (14-inch, 2021)",
                "modelIdentifier": "MacBookPro18,3",
                "extensionAttributes": []
            },
            "operatingSystem": {
                "name": "macOS",
                "extensionAttributes": [
                    { "definitionId": "31", "name": "macOS Latest Supported", "values": ["macOS 14 Sonoma"] },
                    { "definitionId": "3", "name": "Other", "values": [] }
                ]
            }
        })))
        .mount(&server)
        .await;

    let inventory = client
        .get_computer_inventory(
            "7",
            &[ComputerSection::Hardware, ComputerSection::OperatingSystem],
        )
        .await
        .unwrap();

    assert!(inventory.general.is_none());
    assert_eq!(
        inventory.hardware.unwrap().model_identifier.as_deref(),
        Some("MacBookPro18,3")
    );
    let eas = inventory.operating_system.unwrap().extension_attributes;
    assert_eq!(eas.len(), 2);
    assert_eq!(eas[0].values, vec!["macOS 14 Sonoma".to_string()]);
}

#[tokio::test]
async fn test_get_computer_inventory_user_and_purchasing_sections() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/computers-inventory/7"))
        .and(query_param("section", "USER_AND_LOCATION"))
        .and(query_param("section", "PURCHASING"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7",
            "userAndLocation": {
                "username": "lab",
                "extensionAttributes": [
                    { "definitionId": "40", "name": "Department Code", "values": ["CHEM"] }
                ]
            },
            "purchasing": {
                "leased": false,
                "extensionAttributes": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = client
        .get_computer_inventory(
            "7",
            &[ComputerSection::UserAndLocation, ComputerSection::Purchasing],
        )
        .await
        .unwrap();

    let user = inventory.user_and_location.unwrap();
    assert_eq!(user.extension_attributes[0].definition_id, "40");
    assert!(inventory.purchasing.unwrap().extension_attributes.is_empty());
}

#[tokio::test]
async fn test_update_computer_extension_attributes() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/computers-inventory-detail/7"))
        .and(wiremock::matchers::body_json(json!({
            "extensionAttributes": [
                { "definitionId": "31", "values": ["macOS 15 Sequoia"] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "7" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_computer_extension_attributes(
            "7",
            vec![ComputerExtensionAttributeValue {
                definition_id: "31".into(),
                values: vec!["macOS 15 Sequoia".into()],
            }],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_mobile_device_detail_and_update() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/mobile-devices/12/detail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "12",
            "name": "Cart-iPad-12",
            "managed": true,
            "site": { "id": "2", "name": "Eau Claire" },
            "extensionAttributes": [
                { "id": "9", "name": "Jamf Site", "type": "STRING", "value": ["Menomonie"] }
            ],
            "ios": { "modelIdentifier": "iPad7,5" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/v2/mobile-devices/12"))
        .and(wiremock::matchers::body_json(json!({
            "updatedExtensionAttributes": [
                { "name": "Jamf Site", "type": "STRING", "value": ["Eau Claire"] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "12" })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client.get_mobile_device_detail("12").await.unwrap();
    assert_eq!(detail.site.unwrap().name.as_deref(), Some("Eau Claire"));
    assert_eq!(detail.extension_attributes[0].value, vec!["Menomonie".to_string()]);

    client
        .update_mobile_device_extension_attributes(
            "12",
            vec![MobileExtensionAttributeValue::string("Jamf Site", "Eau Claire")],
        )
        .await
        .unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_forbidden_write() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/JSSResource/mobiledevices/id/12"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = client.set_mobile_device_managed("12", false).await.unwrap_err();

    match err {
        Error::Api { status, ref message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Forbidden");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/JSSResource/mobiledevices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<mobile_devices/>"))
        .mount(&server)
        .await;

    let result = client.list_mobile_devices().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
