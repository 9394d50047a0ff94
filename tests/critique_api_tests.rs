
use fashion_king::{entities::critique::CritiqueResult, settings::OverwritePolicy};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn analyze_returns_a_complete_critique() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/api/analyze", &json!({ "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let critique: CritiqueResult = response.json().await.unwrap();
    assert!((0.0..=100.0).contains(&critique.total_score));
    assert_eq!(critique.total_score, 73.0);
    assert!(critique.details_as_list().iter().all(|(_, s)| (0.0..=100.0).contains(s)));
    assert!(!critique.gentle_critique.is_empty());
    assert!(!critique.sincere_critique.is_empty());
    assert!(!critique.one_liner.is_empty());
}

#[actix_rt::test]
async fn analyze_accepts_bare_base64_with_mime_type() {
    let app = TestApp::spawn().await;
    let data_url = sample_photo_data_url();
    let bare = data_url.split_once(',').unwrap().1;

    let response = app
        .post_json("/api/analyze", &json!({ "image": bare, "mimeType": "image/png" }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn analyze_rejects_empty_image() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/api/analyze", &json!({ "image": "" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
}

#[actix_rt::test]
async fn malformed_model_output_is_a_bad_gateway() {
    let app = TestApp::spawn_with(
        OverwritePolicy::Overwrite,
        FakeGeminiOptions { critique_text: Some("this is not json".into()), ..Default::default() },
    )
    .await;

    let response = app
        .post_json("/api/analyze", &json!({ "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[actix_rt::test]
async fn generate_video_stores_the_result() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/api/generate-video", &json!({ "userId": 1, "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    let url = body["url"].as_str().unwrap();
    assert!(url.ends_with("/fashion-king/1/video.mp4"));

    let video = app.client.get(url).send().await.unwrap().bytes().await.unwrap();
    assert_eq!(video.to_vec(), FAKE_VIDEO.to_vec());
    assert_eq!(app.gemini.started_models(), vec![PRIMARY_VIDEO_MODEL.to_string()]);
    assert!(app.gemini.poll_count() >= 2);
}

#[actix_rt::test]
async fn generate_video_falls_back_on_quota() {
    let app = TestApp::spawn_with(
        OverwritePolicy::Overwrite,
        FakeGeminiOptions { quota_models: vec![PRIMARY_VIDEO_MODEL.into()], ..Default::default() },
    )
    .await;

    let response = app
        .post_json("/api/generate-video", &json!({ "userId": 2, "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.gemini.started_models(),
        vec![PRIMARY_VIDEO_MODEL.to_string(), SECONDARY_VIDEO_MODEL.to_string()]
    );
}

#[actix_rt::test]
async fn generate_video_reports_quota_when_every_model_is_exhausted() {
    let app = TestApp::spawn_with(
        OverwritePolicy::Overwrite,
        FakeGeminiOptions {
            quota_models: vec![PRIMARY_VIDEO_MODEL.into(), SECONDARY_VIDEO_MODEL.into()],
            ..Default::default()
        },
    )
    .await;

    let response = app
        .post_json("/api/generate-video", &json!({ "userId": 2, "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(app.stored_objects().await.is_empty());
}

#[actix_rt::test]
async fn safety_filtered_video_is_unprocessable() {
    let app = TestApp::spawn_with(
        OverwritePolicy::Overwrite,
        FakeGeminiOptions { filtered_reason: Some("person generation blocked".into()), ..Default::default() },
    )
    .await;

    let response = app
        .post_json("/api/generate-video", &json!({ "userId": 2, "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("person generation blocked"));
    assert_eq!(app.gemini.started_models().len(), 1);
}

#[actix_rt::test]
async fn generate_video_requires_user_id() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/api/generate-video", &json!({ "image": sample_photo_data_url() }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.gemini.started_models().is_empty());
}
