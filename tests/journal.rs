//! Journal Tests
//!
//! Covers journal posting and grouping entries into day buckets.

mod common;

use axum::http::StatusCode;

use neighborhood::app::journal::JournalService;
use neighborhood::app::posts::PostService;
use neighborhood::domain::post::PostKind;

#[tokio::test]
async fn journal_entries_are_grouped_by_day_newest_first() {
    let app = common::app().await;

    let day_one_late = app.insert_post_at("wren", "journal", "2025-06-01 22:30:00").await;
    let day_one_early = app.insert_post_at("wren", "journal", "2025-06-01 08:00:00").await;
    let day_three = app.insert_post_at("wren", "journal", "2025-06-03 00:00:00").await;

    let resp = app.get("/journal").await;
    assert_eq!(resp.status, StatusCode::OK);
    let days = resp.json()["days"].as_array().unwrap().clone();
    assert_eq!(days.len(), 2);

    assert_eq!(days[0]["day_number"], 3);
    assert_eq!(days[0]["date"], "June 3, 2025");
    assert_eq!(days[0]["posts"][0]["id"], day_three);

    assert_eq!(days[1]["day_number"], 1);
    assert_eq!(days[1]["date"], "June 1, 2025");
    let ids: Vec<i64> = days[1]["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![day_one_late, day_one_early]);
}

#[tokio::test]
async fn entries_before_the_epoch_land_on_day_one() {
    let app = common::app().await;

    app.insert_post_at("wren", "journal", "2025-05-20 12:00:00").await;

    let days = app.get("/journal").await.json()["days"].clone();
    assert_eq!(days.as_array().unwrap().len(), 1);
    assert_eq!(days[0]["day_number"], 1);
    assert_eq!(days[0]["date"], "June 1, 2025");
}

#[tokio::test]
async fn rfc3339_and_date_only_timestamps_are_accepted() {
    let app = common::app().await;

    app.insert_post_at("wren", "journal", "2025-06-02T09:15:00Z").await;
    app.insert_post_at("wren", "journal", "2025-06-05").await;

    let days = app.get("/journal").await.json()["days"].clone();
    let numbers: Vec<i64> = days
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["day_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![5, 2]);
}

#[tokio::test]
async fn unparseable_timestamps_are_left_out() {
    let app = common::app().await;

    app.insert_post_at("wren", "journal", "yesterday-ish").await;
    let kept = app.insert_post_at("wren", "journal", "2025-06-01 10:00:00").await;

    let days = app.get("/journal").await.json()["days"].clone();
    assert_eq!(days.as_array().unwrap().len(), 1);
    assert_eq!(days[0]["posts"].as_array().unwrap().len(), 1);
    assert_eq!(days[0]["posts"][0]["id"], kept);
}

#[tokio::test]
async fn journal_excludes_regular_posts_and_replies() {
    let app = common::app().await;
    let wren = app.create_user("wren").await;

    app.create_post(&wren, "regular", "").await;
    let entry = app.create_journal_post(&wren, "entry").await;
    let resp = app.reply(&wren, entry, "reply to entry").await;
    assert_eq!(resp.status, StatusCode::OK);

    let days = app.get("/journal").await.json()["days"].clone();
    let posts = days[0]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], entry);
    assert_eq!(posts[0]["kind"], "journal");
    assert_eq!(posts[0]["reply_count"], 1);
}

#[tokio::test]
async fn journal_endpoint_ignores_parent_and_post_type() {
    let app = common::app().await;
    let wren = app.create_user("wren").await;
    let root = app.create_post(&wren, "root", "").await;

    let parent = root.to_string();
    let resp = app
        .post_form(
            "/journal",
            &[
                ("content", "standalone"),
                ("parent_id", &parent),
                ("post_type", "regular"),
            ],
            None,
            Some(&wren.username),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["location"], "/journal");

    assert_eq!(
        app.count("SELECT COUNT(*) FROM posts WHERE post_type = 'journal' AND parent_id IS NULL")
            .await,
        1
    );
}

#[tokio::test]
async fn timeline_flag_selects_post_kind() {
    let app = common::app().await;
    app.insert_post_at("wren", "regular", "2025-06-02 10:00:00").await;
    app.insert_post_at("wren", "journal", "2025-06-02 11:00:00").await;

    let posts = PostService::new(app.state.db.clone());
    let regular = posts.timeline(true).await.unwrap();
    let journal = posts.timeline(false).await.unwrap();

    assert_eq!(regular.len(), 1);
    assert_eq!(regular[0].kind, PostKind::Regular);
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].kind, PostKind::Journal);
}

#[tokio::test]
async fn empty_journal_has_no_days() {
    let app = common::app().await;

    let service = JournalService::new(app.state.db.clone(), app.state.journal_epoch);
    assert!(service.days().await.unwrap().is_empty());

    let resp = app.get("/journal").await;
    assert_eq!(resp.json()["days"], serde_json::json!([]));
}
