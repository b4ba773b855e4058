//! Tests for the Blockfrost client.

use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use progtoken_ledger::{Address, Datum, OutRef, ScriptLanguage};
use progtoken_primitives::{AssetName, Hash28, PlutusData, TxHash, Unit};
use progtoken_registry::{LedgerClient, SignedTx, Submitter};

use crate::client::BlockfrostClient;
use crate::error::BlockfrostError;
use crate::types::{BfUtxo, BlockfrostConfig};

const TX_A: &str = "1111111111111111111111111111111111111111111111111111111111111111";
const TX_B: &str = "2222222222222222222222222222222222222222222222222222222222222222";
const SCRIPT_HASH: &str = "5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c5c";

fn test_config(base_url: &str) -> BlockfrostConfig {
    BlockfrostConfig {
        base_url: base_url.to_string(),
        project_id: Some("test-project".to_string()),
        page_size: 2,
        max_pages: 10,
    }
}

fn token_unit() -> Unit {
    Unit::asset(Hash28::new([0xaa; 28]), AssetName::from_text("token").unwrap())
}

fn utxo_json(tx_hash: &str, index: u32, address: &str) -> serde_json::Value {
    serde_json::json!({
        "address": address,
        "tx_hash": tx_hash,
        "output_index": index,
        "amount": [{ "unit": "lovelace", "quantity": "2000000" }],
        "data_hash": null,
        "inline_datum": null,
        "reference_script_hash": null
    })
}

#[tokio::test]
async fn test_utxos_at_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_sender/utxos"))
        .and(query_param("page", "1"))
        .and(query_param("count", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            utxo_json(TX_A, 0, "addr_test1_sender"),
            utxo_json(TX_A, 1, "addr_test1_sender"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_sender/utxos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            utxo_json(TX_B, 4, "addr_test1_sender"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxos = client.utxos_at("addr_test1_sender").await.unwrap();

    assert_eq!(utxos.len(), 3);
    assert_eq!(utxos[2].out_ref, OutRef::new(TxHash::from_hex(TX_B).unwrap(), 4));
    assert_eq!(utxos[0].output.assets.get(&Unit::Lovelace), 2_000_000);
    assert_eq!(utxos[0].output.address, Address::new("addr_test1_sender"));
}

#[tokio::test]
async fn test_unknown_address_has_no_utxos() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_fresh/utxos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "status_code": 404,
            "error": "Not Found",
            "message": "The requested component has not been found."
        })))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxos = client.utxos_at("addr_test1_fresh").await.unwrap();
    assert!(utxos.is_empty());
}

#[tokio::test]
async fn test_utxos_with_unit_decode_tokens_and_datum() {
    let server = MockServer::start().await;
    let unit = token_unit();

    Mock::given(method("GET"))
        .and(path(format!("/addresses/addr_test1_directory/utxos/{unit}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "address": "addr_test1_directory",
            "tx_hash": TX_A,
            "output_index": 3,
            "amount": [
                { "unit": "lovelace", "quantity": "1500000" },
                { "unit": unit.to_string(), "quantity": "1" }
            ],
            "data_hash": "9e1199a988ba72ffd6e9c269cadb3b53b5f360ff99f112d9b2ee30c4d74ad88b",
            "inline_datum": "d87980",
            "reference_script_hash": null
        }])))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxos = client.utxos_at_with_unit("addr_test1_directory", &unit).await.unwrap();

    assert_eq!(utxos.len(), 1);
    let output = &utxos[0].output;
    assert_eq!(output.assets.get(&unit), 1);
    assert_eq!(output.assets.get(&Unit::Lovelace), 1_500_000);
    // Inline datum wins over the hash.
    assert_eq!(output.datum, Some(Datum::Inline(PlutusData::constr(0, vec![]))));
}

#[test]
fn test_wide_integer_datum_decodes() {
    let mut raw: BfUtxo =
        serde_json::from_value(utxo_json(TX_A, 0, "addr_test1_directory")).unwrap();
    raw.inline_datum = Some(format!("c251{}", "01".repeat(17)));

    let utxo = raw.into_utxo(None).unwrap();
    match utxo.output.datum {
        Some(Datum::Inline(PlutusData::Integer(i))) => assert_eq!(i.bits(), 129),
        other => panic!("expected inline integer datum, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undecodable_outputs_are_skipped() {
    let server = MockServer::start().await;

    let mut nested = utxo_json(TX_A, 0, "addr_test1_directory");
    nested["inline_datum"] = serde_json::json!(format!("{}00", "81".repeat(2_000)));
    let mut garbage = utxo_json(TX_A, 1, "addr_test1_directory");
    garbage["inline_datum"] = serde_json::json!("ff");

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_directory/utxos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            nested,
            garbage,
            utxo_json(TX_B, 2, "addr_test1_directory"),
        ])))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxos = client.utxos_at("addr_test1_directory").await.unwrap();

    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].out_ref, OutRef::new(TxHash::from_hex(TX_B).unwrap(), 2));
}

#[tokio::test]
async fn test_reference_scripts_fetched_once() {
    let server = MockServer::start().await;

    let mut first = utxo_json(TX_A, 0, "addr_test1_refs");
    first["reference_script_hash"] = serde_json::json!(SCRIPT_HASH);
    let mut second = utxo_json(TX_A, 1, "addr_test1_refs");
    second["reference_script_hash"] = serde_json::json!(SCRIPT_HASH);

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_refs/utxos"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([first, second])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/scripts/{SCRIPT_HASH}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "script_hash": SCRIPT_HASH,
            "type": "plutusV3",
            "serialised_size": 14
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/scripts/{SCRIPT_HASH}/cbor")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cbor": "4e4d01000033222220051200120011"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxos = client.utxos_at("addr_test1_refs").await.unwrap();

    assert_eq!(utxos.len(), 2);
    for utxo in &utxos {
        let script = utxo.output.script_ref.as_ref().unwrap();
        assert_eq!(script.language, ScriptLanguage::PlutusV3);
        assert_eq!(hex::encode(&script.bytes), "4e4d01000033222220051200120011");
    }
}

#[tokio::test]
async fn test_utxo_by_unit_requires_single_holder() {
    let server = MockServer::start().await;
    let unit = token_unit();

    Mock::given(method("GET"))
        .and(path(format!("/assets/{unit}/addresses")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "address": "addr_test1_a", "quantity": "1" },
            { "address": "addr_test1_b", "quantity": "1" }
        ])))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let err = client.utxo_by_unit(&unit).await.unwrap_err();
    assert!(matches!(err, BlockfrostError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_transfer_logic_reference_via_metadata() {
    let server = MockServer::start().await;
    let directory_policy = Hash28::new([0xdd; 28]);
    let token_policy = Hash28::new([0xbb; 28]);
    let directory_nft = Unit::asset(directory_policy, AssetName::from(token_policy));
    let marker = Unit::asset(Hash28::new([0xcc; 28]), AssetName::empty());

    Mock::given(method("GET"))
        .and(path(format!("/assets/{directory_nft}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "asset": directory_nft.to_string(),
            "policy_id": directory_policy.to_hex(),
            "asset_name": token_policy.to_hex(),
            "quantity": "1",
            "onchain_metadata": { "refUTxOToken": marker.to_string() }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/assets/{marker}/addresses")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "address": "addr_test1_logic", "quantity": "1" }
        ])))
        .mount(&server)
        .await;

    let mut holder = utxo_json(TX_B, 7, "addr_test1_logic");
    holder["amount"] = serde_json::json!([
        { "unit": "lovelace", "quantity": "20000000" },
        { "unit": marker.to_string(), "quantity": "1" }
    ]);
    Mock::given(method("GET"))
        .and(path(format!("/addresses/addr_test1_logic/utxos/{marker}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([holder])))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxo = client
        .transfer_logic_reference(&directory_policy, &token_policy)
        .await
        .unwrap();

    assert_eq!(utxo.out_ref, OutRef::new(TxHash::from_hex(TX_B).unwrap(), 7));
    assert_eq!(utxo.output.assets.get(&marker), 1);
}

#[tokio::test]
async fn test_transfer_logic_reference_without_metadata() {
    let server = MockServer::start().await;
    let directory_policy = Hash28::new([0xdd; 28]);
    let token_policy = Hash28::new([0xbb; 28]);
    let directory_nft = Unit::asset(directory_policy, AssetName::from(token_policy));

    Mock::given(method("GET"))
        .and(path(format!("/assets/{directory_nft}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "asset": directory_nft.to_string(),
            "policy_id": directory_policy.to_hex(),
            "asset_name": token_policy.to_hex(),
            "onchain_metadata": null
        })))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let err = client
        .transfer_logic_reference(&directory_policy, &token_policy)
        .await
        .unwrap_err();
    assert!(matches!(err, BlockfrostError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_submit_tx() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tx/submit"))
        .and(header("content-type", "application/cbor"))
        .and(header("project_id", "test-project"))
        .and(body_bytes(vec![0x84, 0xa0, 0xa0, 0xf5, 0xf6]))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(TX_A)))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let hash = client.submit_tx(&[0x84, 0xa0, 0xa0, 0xf5, 0xf6]).await.unwrap();
    assert_eq!(hash.to_hex(), TX_A);
}

#[tokio::test]
async fn test_submit_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tx/submit"))
        .respond_with(ResponseTemplate::new(400).set_body_string("BadInputsUTxO"))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let err = client.submit_tx(&[0x80]).await.unwrap_err();
    match err {
        BlockfrostError::ServerError { status_code, message } => {
            assert_eq!(status_code, 400);
            assert!(message.contains("BadInputsUTxO"));
        }
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_sender/utxos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let err = client.utxos_at("addr_test1_sender").await.unwrap_err();
    assert!(matches!(err, BlockfrostError::ServerError { status_code: 500, .. }));
}

#[tokio::test]
async fn test_project_id_header_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_sender/utxos"))
        .and(header("project_id", "test-project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));
    let utxos = client.utxos_at("addr_test1_sender").await.unwrap();
    assert!(utxos.is_empty());
}

#[tokio::test]
async fn test_capabilities_wrap_errors() {
    let server = MockServer::start().await;
    let unit = token_unit();

    Mock::given(method("GET"))
        .and(path("/addresses/addr_test1_sender/utxos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            utxo_json(TX_A, 0, "addr_test1_sender"),
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/assets/{unit}/addresses")))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tx/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(TX_B)))
        .mount(&server)
        .await;

    let client = BlockfrostClient::new(test_config(&server.uri()));

    let utxos = LedgerClient::outputs_at(&client, &Address::new("addr_test1_sender"))
        .await
        .unwrap();
    assert_eq!(utxos.len(), 1);

    let err = LedgerClient::output_by_unit(&client, &unit).await.unwrap_err();
    assert!(err.to_string().contains("503"));

    let hash = Submitter::submit(&client, &SignedTx { cbor: vec![0x80] }).await.unwrap();
    assert_eq!(hash.to_hex(), TX_B);
}
