use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn ids(body: &Value) -> Vec<i64> {
    body["queue"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn enqueue_then_play_moves_item_out_of_pending_list() {
    let app = TestApp::spawn().await;
    let song_id = app.create_song("Waterloo", "ABBA", Some("pop")).await;
    let table_id = app.create_table(2, "table2", "pw").await;

    let res = app
        .post(routes::QUEUE, &json!({"song_id": song_id, "table_id": table_id}))
        .await;
    assert_eq!(res.status, 201, "enqueue failed: {}", res.text);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["item"]["status"], "pending");
    assert_eq!(res.body["item"]["song_id"], song_id);
    assert_eq!(res.body["item"]["table_id"], table_id);
    let item_id = res.body["item"]["id"].as_i64().unwrap();

    let pending = app.get(routes::QUEUE).await;
    assert_eq!(pending.status, 200);
    assert_eq!(ids(&pending.body), [item_id]);
    let entry = &pending.body["queue"][0];
    assert_eq!(entry["table_number"], 2);
    assert_eq!(entry["song"]["title"], "Waterloo");
    assert_eq!(entry["song"]["artist"], "ABBA");
    assert_eq!(entry["song"]["genre"], "pop");
    assert_eq!(entry["song"]["file_format"], "kar");
    assert!(entry["song"]["file_url"].is_string());
    assert!(entry["played_at"].is_null());

    let res = app
        .put(routes::QUEUE, &json!({"id": item_id, "status": "playing"}))
        .await;
    assert_eq!(res.status, 200, "set status failed: {}", res.text);
    assert_eq!(res.body, json!({"success": true}));

    let pending = app.get(routes::QUEUE).await;
    assert!(ids(&pending.body).is_empty());

    let playing = app.get(&format!("{}?status=playing", routes::QUEUE)).await;
    assert_eq!(ids(&playing.body), [item_id]);
    assert_eq!(playing.body["queue"][0]["status"], "playing");
    assert!(playing.body["queue"][0]["played_at"].is_string());
}

#[tokio::test]
async fn pending_list_is_fifo_and_filters_by_table() {
    let app = TestApp::spawn().await;
    let song_id = app.create_song("Waterloo", "ABBA", None).await;
    let t1 = app.create_table(1, "table1", "pw").await;
    let t2 = app.create_table(2, "table2", "pw").await;

    let a = app.enqueue(song_id, t1).await as i64;
    let b = app.enqueue(song_id, t2).await as i64;
    let c = app.enqueue(song_id, t1).await as i64;

    let all = app.get(routes::QUEUE).await;
    assert_eq!(ids(&all.body), [a, b, c]);

    let only_t1 = app.get(&format!("{}?table_id={t1}", routes::QUEUE)).await;
    assert_eq!(ids(&only_t1.body), [a, c]);
}

#[tokio::test]
async fn table_filter_combines_with_explicit_status() {
    let app = TestApp::spawn().await;
    let song_id = app.create_song("Waterloo", "ABBA", None).await;
    let t1 = app.create_table(1, "table1", "pw").await;
    let t2 = app.create_table(2, "table2", "pw").await;

    let playing_1 = app.enqueue(song_id, t1).await as i64;
    let playing_2 = app.enqueue(song_id, t2).await as i64;
    let pending_1 = app.enqueue(song_id, t1).await as i64;
    for id in [playing_1, playing_2] {
        let res = app
            .put(routes::QUEUE, &json!({"id": id, "status": "playing"}))
            .await;
        assert_eq!(res.status, 200, "set status failed: {}", res.text);
    }

    let res = app
        .get(&format!("{}?table_id={t1}&status=playing", routes::QUEUE))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(ids(&res.body), [playing_1]);

    let res = app
        .get(&format!("{}?table_id={t2}&status=playing", routes::QUEUE))
        .await;
    assert_eq!(ids(&res.body), [playing_2]);

    let res = app
        .get(&format!("{}?table_id={t1}&status=", routes::QUEUE))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(ids(&res.body), [playing_1, pending_1]);
}

#[tokio::test]
async fn cancel_is_a_soft_status_change() {
    let app = TestApp::spawn().await;
    let song_id = app.create_song("Waterloo", "ABBA", None).await;
    let table_id = app.create_table(3, "table3", "pw").await;
    let keep = app.enqueue(song_id, table_id).await as i64;
    let cancel = app.enqueue(song_id, table_id).await as i64;

    let res = app.delete(&format!("{}?id={cancel}", routes::QUEUE)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["success"], true);

    let pending = app.get(routes::QUEUE).await;
    assert_eq!(ids(&pending.body), [keep]);

    let everything = app.get(&format!("{}?status=", routes::QUEUE)).await;
    assert_eq!(ids(&everything.body), [keep, cancel]);
    assert_eq!(everything.body["queue"][1]["status"], "cancelled");

    let cancelled = app.get(&format!("{}?status=cancelled", routes::QUEUE)).await;
    assert_eq!(ids(&cancelled.body), [cancel]);
}

#[tokio::test]
async fn any_transition_is_accepted() {
    let app = TestApp::spawn().await;
    let song_id = app.create_song("Waterloo", "ABBA", None).await;
    let table_id = app.create_table(3, "table3", "pw").await;
    let id = app.enqueue(song_id, table_id).await;

    for status in ["played", "pending", "cancelled", "playing"] {
        let res = app
            .put(routes::QUEUE, &json!({"id": id, "status": status}))
            .await;
        assert_eq!(res.status, 200, "{status}: {}", res.text);
    }
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.get(&format!("{}?status=skipped", routes::QUEUE)).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");

    let res = app
        .put(routes::QUEUE, &json!({"id": 1, "status": "skipped"}))
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn missing_ids_are_rejected() {
    let app = TestApp::spawn().await;

    let res = app.post(routes::QUEUE, &json!({"song_id": 1})).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "song_id and table_id required");

    let res = app.put(routes::QUEUE, &json!({"status": "played"})).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "id and status required");

    let res = app.delete(routes::QUEUE).await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "Queue ID required");
}

#[tokio::test]
async fn unknown_references_are_not_found() {
    let app = TestApp::spawn().await;
    let song_id = app.create_song("Waterloo", "ABBA", None).await;
    let table_id = app.create_table(3, "table3", "pw").await;

    let res = app
        .post(routes::QUEUE, &json!({"song_id": song_id + 100, "table_id": table_id}))
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");

    let res = app
        .post(routes::QUEUE, &json!({"song_id": song_id, "table_id": table_id + 100}))
        .await;
    assert_eq!(res.status, 404);

    let res = app
        .put(routes::QUEUE, &json!({"id": 999, "status": "played"}))
        .await;
    assert_eq!(res.status, 404);

    let res = app.delete(&format!("{}?id=999", routes::QUEUE)).await;
    assert_eq!(res.status, 404);
}
