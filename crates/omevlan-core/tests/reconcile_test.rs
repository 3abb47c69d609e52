#![allow(clippy::unwrap_used)]
// End-to-end reconciliation against a mocked appliance.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use omevlan_api::{OmeClient, TransportConfig};
use omevlan_core::{
    APPLIED_MESSAGE, Connection, CoreError, Declaration, Mode, Outcome, ReconcileRequest,
    TaggedEntry, TemplateRef, UntaggedEntry,
};

const NIC: &str = "NIC in Mezzanine 1A";
const UPDATE_PATH: &str = "/api/TemplateService/Actions/TemplateService.UpdateNetworkConfig";

// ── Helpers ─────────────────────────────────────────────────────────

async fn mount_appliance(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/SessionService/Sessions"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Auth-Token", "tok-123")
                .set_body_json(json!({ "Id": "sess-1" })),
        )
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/SessionService/Sessions('sess-1')"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/NetworkConfigurationService/Networks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                { "Id": 100, "Name": "vlan2", "VlanMinimum": 2, "VlanMaximum": 2 },
                { "Id": 101, "Name": "vlan3", "VlanMinimum": 3, "VlanMaximum": 3 }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/TemplateService/Templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "Id": 12, "Name": "web" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(
            "/api/TemplateService/Templates(12)/Views(4)/AttributeViewDetails",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Name": "NetworkHierarchy",
            "AttributeGroups": [{
                "DisplayName": "NICModel",
                "SubAttributeGroups": [{
                    "DisplayName": NIC,
                    "SubAttributeGroups": [{
                        "GroupNameId": 1,
                        "DisplayName": "Port 1",
                        "SubAttributeGroups": [{
                            "DisplayName": "Partition 1",
                            "Attributes": [
                                { "CustomId": 2301, "DisplayName": "Vlan Untagged", "Value": "0" },
                                { "CustomId": 2301, "DisplayName": "Vlan Tagged", "Value": "101" }
                            ]
                        }]
                    }]
                }]
            }]
        })))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> Connection {
    let base_url = format!("{}/api/", server.uri()).parse().unwrap();
    let mut client = OmeClient::new(base_url, &TransportConfig::default()).unwrap();
    let secret: SecretString = "secret".to_string().into();
    client.login("admin", &secret).await.unwrap();
    Connection::from_client(client)
}

/// Port 1: no untagged VLAN, tagged replaced by `vlan2`.
fn request() -> ReconcileRequest {
    ReconcileRequest {
        template: TemplateRef::Name("web".into()),
        nic_identifier: NIC.into(),
        declaration: Declaration {
            untagged_networks: vec![UntaggedEntry {
                port: 1,
                untagged_network_id: Some(0),
                untagged_network_name: None,
            }],
            tagged_networks: vec![TaggedEntry {
                port: 1,
                tagged_network_ids: None,
                tagged_network_names: Some(vec!["vlan2".into()]),
            }],
        },
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_apply_submits_one_combined_update() {
    let server = MockServer::start().await;
    mount_appliance(&server).await;

    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .and(body_json(json!({
            "TemplateId": 12,
            "VlanAttributes": [
                { "ComponentId": 2301, "Untagged": 0, "Tagged": [100] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server).await;
    let outcome = conn.reconciler().run(&request(), Mode::Apply).await;
    conn.close().await;

    let outcome = outcome.unwrap();
    assert!(matches!(outcome, Outcome::Applied(_)));
    assert!(outcome.changed());
    assert_eq!(outcome.message(), APPLIED_MESSAGE);
    assert_eq!(outcome.plan().unwrap().ports[0].tagged, vec![100]);
}

#[tokio::test]
async fn test_dry_run_never_submits() {
    let server = MockServer::start().await;
    mount_appliance(&server).await;

    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let conn = connect(&server).await;
    let outcome = conn.reconciler().run(&request(), Mode::DryRun).await;
    conn.close().await;

    assert!(matches!(outcome.unwrap(), Outcome::Planned(_)));
}

#[tokio::test]
async fn test_rejected_update_carries_error_document() {
    let server = MockServer::start().await;
    mount_appliance(&server).await;

    let doc = json!({
        "error": {
            "code": "Base.1.0.GeneralError",
            "@Message.ExtendedInfo": [{ "MessageId": "CTEM1042" }]
        }
    });
    Mock::given(method("POST"))
        .and(path(UPDATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(&doc))
        .expect(1)
        .mount(&server)
        .await;

    let conn = connect(&server).await;
    let err = conn
        .reconciler()
        .run(&request(), Mode::Apply)
        .await
        .unwrap_err();
    conn.close().await;

    assert!(matches!(err, CoreError::Api { status: Some(400), .. }));
    assert_eq!(err.error_info(), Some(&doc));
    assert!(!err.is_validation());
}
