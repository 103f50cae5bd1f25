mod common;

use marquee::client::{RemoteClient, RemoteStore};
use marquee::journal::{Action, Journal};
use marquee::model::{Event, PlanningEntry};
use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

const LIST_BODY: &str = r#"{
  "events": [
    {
      "id": 1730000000000,
      "name": "Harvest Dance",
      "date": "2025-10-31",
      "isTBD": false,
      "time": "7:00 PM",
      "targetAttendance": 120,
      "currentRSVPs": "45",
      "checklist": {"flyer": true, "kvmr": "TRUE"},
      "planningChecklist": "{\"av-needs\":{\"done\":true,\"note\":\"rented\"}}"
    },
    {
      "id": "1730000000001",
      "name": "Poetry Night",
      "isTBD": "TRUE",
      "checklist": "{\"email\":true}",
      "planningChecklist": ""
    },
    {
      "name": "Row without id"
    }
  ]
}"#;

fn client(server: &Server) -> RemoteClient {
    RemoteClient::new(&format!("{}/exec", server.url()), true).unwrap()
}

fn event(id: i64) -> Event {
    let mut e = Event {
        id,
        name: "Harvest Dance".into(),
        date: "2025-10-31".into(),
        ..Event::default()
    };
    e.toggle_marketing("flyer");
    e.planning_checklist.insert(
        "av-needs".into(),
        PlanningEntry {
            done: true,
            note: "rented".into(),
        },
    );
    e.flyer_image = Some("data:image/png;base64,AAAA".into());
    e
}

#[tokio::test]
async fn list_accepts_both_checklist_shapes() {
    common::init_logs();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/exec")
        .match_query(Matcher::UrlEncoded("action".into(), "list".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LIST_BODY)
        .create_async()
        .await;

    let events = client(&server).list().await.unwrap();
    mock.assert_async().await;

    assert_eq!(events.len(), 2);
    let dance = &events[0];
    assert_eq!(dance.id, 1_730_000_000_000);
    assert_eq!(dance.target_attendance, "120");
    assert!(dance.is_marketing_done("flyer"));
    assert!(dance.is_marketing_done("kvmr"));
    let av = dance.planning_entry("av-needs").unwrap();
    assert!(av.done);
    assert_eq!(av.note, "rented");

    let poetry = &events[1];
    assert_eq!(poetry.id, 1_730_000_000_001);
    assert!(poetry.is_tbd);
    assert!(poetry.is_marketing_done("email"));
    assert!(poetry.planning_checklist.is_empty());
}

#[tokio::test]
async fn list_follows_script_redirect() {
    let mut server = Server::new_async().await;
    let redirect = server
        .mock("GET", "/exec")
        .match_query(Matcher::Any)
        .with_status(302)
        .with_header("location", "/echo?user_content_key=abc")
        .create_async()
        .await;
    let echo = server
        .mock("GET", "/echo")
        .match_query(Matcher::UrlEncoded(
            "user_content_key".into(),
            "abc".into(),
        ))
        .with_status(200)
        .with_body(r#"{"events": []}"#)
        .create_async()
        .await;

    let events = client(&server).list().await.unwrap();
    assert!(events.is_empty());
    redirect.assert_async().await;
    echo.assert_async().await;
}

#[tokio::test]
async fn upsert_sends_flat_record() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/exec")
        .match_header("content-type", "text/plain;charset=utf-8")
        .match_body(Matcher::PartialJson(json!({
            "action": "upsert",
            "event": {
                "id": 7,
                "name": "Harvest Dance",
                "checklist": "{\"flyer\":true}",
                "planningChecklist": "{\"av-needs\":{\"done\":true,\"note\":\"rented\"}}"
            }
        })))
        .with_status(302)
        .with_header("location", "/echo")
        .create_async()
        .await;

    client(&server).upsert(&event(7)).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_sends_id() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/exec")
        .match_body(Matcher::Json(json!({"action": "delete", "id": 7})))
        .with_status(200)
        .create_async()
        .await;

    client(&server).delete(7).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_are_reported() {
    let mut server = Server::new_async().await;
    let _list = server
        .mock("GET", "/exec")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let _post = server
        .mock("POST", "/exec")
        .with_status(500)
        .create_async()
        .await;

    let client = client(&server);
    assert!(client.list().await.is_err());
    assert!(client.delete(1).await.is_err());
}

#[tokio::test]
async fn offline_client_fails_fast() {
    let client = RemoteClient::new("", false).unwrap();
    assert!(client.is_offline());
    assert!(client.list().await.is_err());
    assert!(client.upsert(&event(1)).await.is_err());
}

#[tokio::test]
async fn journal_writes_reach_endpoint_in_order() {
    common::init_logs();
    let mut server = Server::new_async().await;
    let upsert = server
        .mock("POST", "/exec")
        .match_body(Matcher::PartialJson(json!({"action": "upsert"})))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("POST", "/exec")
        .match_body(Matcher::PartialJson(json!({"action": "delete", "id": 7})))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let journal = Journal::spawn(Arc::new(client(&server)));
    journal.push(Action::Upsert(event(7)));
    journal.push(Action::Delete(7));
    journal.close().await;

    upsert.assert_async().await;
    delete.assert_async().await;
}
