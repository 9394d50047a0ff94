use std::time::Duration;

use fashion_king::{
    entities::{
        critique::{CritiqueRequest, CritiqueResult, ScoreDetails},
        submission::ImageSubmission,
        video::{VideoOperation, VideoRequest},
    },
    errors::GenAiError,
    repositories::generative::GenerativeClient,
    use_cases::critique::CritiqueHandler,
};
use mockall::{mock, predicate::*, Sequence};

mock! {
    pub Generative {}

    #[async_trait::async_trait]
    impl GenerativeClient for Generative {
        fn has_credential(&self) -> bool;
        async fn generate_critique(&self, request: &CritiqueRequest) -> Result<CritiqueResult, GenAiError>;
        async fn start_video_job(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation, GenAiError>;
        async fn poll_video_job(&self, operation_name: &str) -> Result<VideoOperation, GenAiError>;
        async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenAiError>;
    }
}

const PNG_SIGNATURE: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

fn models() -> Vec<String> {
    vec!["veo-fast".to_string(), "veo-full".to_string()]
}

fn handler(client: MockGenerative) -> CritiqueHandler<MockGenerative> {
    CritiqueHandler::new(client, models(), Duration::ZERO)
}

fn critique(total: f64) -> CritiqueResult {
    CritiqueResult {
        total_score: total,
        details: ScoreDetails { face: 70.0, color: 60.0, ratio: 80.0, combination: 75.0, item: 65.0 },
        gentle_critique: "Well balanced.".into(),
        sincere_critique: "Tragically sensible.".into(),
        one_liner: "Fine.".into(),
    }
}

fn pending(name: &str) -> VideoOperation {
    VideoOperation { name: name.to_string(), ..Default::default() }
}

fn finished(name: &str) -> VideoOperation {
    VideoOperation {
        name: name.to_string(),
        done: true,
        video_uri: Some(format!("https://files/{name}")),
        ..Default::default()
    }
}

fn quota() -> GenAiError {
    GenAiError::QuotaExhausted("RESOURCE_EXHAUSTED".into())
}

#[actix_rt::test]
async fn analyze_returns_validated_critique() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client
        .expect_generate_critique()
        .withf(|req| req.mime_type == "image/png" && !req.image_base64.is_empty())
        .times(1)
        .returning(|_| Ok(critique(64.0)));

    let submission = ImageSubmission::from_bytes(PNG_SIGNATURE.to_vec(), None, None).unwrap();
    let result = handler(client).analyze(&submission).await.unwrap();

    assert_eq!(result.total_score, 64.0);
}

#[actix_rt::test]
async fn analyze_without_credential_never_calls_the_model() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(false);
    client.expect_generate_critique().never();

    let submission = ImageSubmission::from_bytes(PNG_SIGNATURE.to_vec(), None, None).unwrap();
    let result = handler(client).analyze(&submission).await;

    assert!(matches!(result, Err(GenAiError::MissingCredential)));
}

#[actix_rt::test]
async fn analyze_rejects_scores_out_of_range() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client.expect_generate_critique().returning(|_| Ok(critique(180.0)));

    let submission = ImageSubmission::from_bytes(PNG_SIGNATURE.to_vec(), None, None).unwrap();
    let result = handler(client).analyze(&submission).await;

    assert!(matches!(result, Err(GenAiError::Decode(_))));
}

#[actix_rt::test]
async fn video_polls_until_done_then_downloads() {
    let mut client = MockGenerative::new();
    let mut seq = Sequence::new();
    client.expect_has_credential().return_const(true);
    client
        .expect_start_video_job()
        .with(eq("veo-fast"), always())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(pending("op-1")));
    client
        .expect_poll_video_job()
        .with(eq("op-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(pending("op-1")));
    client
        .expect_poll_video_job()
        .with(eq("op-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(finished("op-1")));
    client
        .expect_download_video()
        .with(eq("https://files/op-1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(b"mp4".to_vec()));

    let video = handler(client).generate_video("AAAA", "image/jpeg").await.unwrap();

    assert_eq!(video, b"mp4".to_vec());
}

#[actix_rt::test]
async fn quota_on_primary_falls_back_to_secondary() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client
        .expect_start_video_job()
        .with(eq("veo-fast"), always())
        .times(1)
        .returning(|_, _| Err(quota()));
    client
        .expect_start_video_job()
        .with(eq("veo-full"), always())
        .times(1)
        .returning(|_, _| Ok(finished("op-2")));
    client.expect_poll_video_job().never();
    client.expect_download_video().times(1).returning(|_| Ok(b"mp4".to_vec()));

    assert!(handler(client).generate_video("AAAA", "image/jpeg").await.is_ok());
}

#[actix_rt::test]
async fn other_errors_do_not_fall_back() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client
        .expect_start_video_job()
        .with(eq("veo-fast"), always())
        .times(1)
        .returning(|_, _| Err(GenAiError::InvalidCredential("Requested entity was not found.".into())));
    client
        .expect_start_video_job()
        .with(eq("veo-full"), always())
        .never();

    let result = handler(client).generate_video("AAAA", "image/jpeg").await;

    assert!(matches!(result, Err(GenAiError::InvalidCredential(_))));
}

#[actix_rt::test]
async fn quota_on_every_model_is_reported_as_quota() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client.expect_start_video_job().times(2).returning(|_, _| Err(quota()));

    let result = handler(client).generate_video("AAAA", "image/jpeg").await;

    assert!(result.unwrap_err().is_quota());
}

#[actix_rt::test]
async fn polling_error_aborts_the_job() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client.expect_start_video_job().times(1).returning(|_, _| Ok(pending("op-3")));
    client.expect_poll_video_job().times(1).returning(|name| {
        Ok(VideoOperation {
            name: name.to_string(),
            done: true,
            error: Some("Internal error while generating".into()),
            ..Default::default()
        })
    });
    client.expect_download_video().never();

    let result = handler(client).generate_video("AAAA", "image/jpeg").await;

    assert!(matches!(result, Err(GenAiError::Failed(msg)) if msg.contains("Internal error")));
}

#[actix_rt::test]
async fn poll_without_name_keeps_polling_the_same_operation() {
    let mut client = MockGenerative::new();
    client.expect_has_credential().return_const(true);
    client.expect_start_video_job().returning(|_, _| Ok(pending("op-4")));
    let mut seq = Sequence::new();
    client
        .expect_poll_video_job()
        .with(eq("op-4"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(VideoOperation::default()));
    client
        .expect_poll_video_job()
        .with(eq("op-4"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(finished("op-4")));
    client.expect_download_video().returning(|_| Ok(vec![1]));

    assert!(handler(client).generate_video("AAAA", "image/jpeg").await.is_ok());
}
