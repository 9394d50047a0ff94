use crate::{
    entities::{
        critique::CritiqueResult,
        media::{MediaKind, SaveResultRequest},
        roster::Roster,
        session::{AnalysisState, AutoSaveReport},
        submission::ImageSubmission,
        video::VideoGenerationState,
    },
    errors::AppError,
    infrastructure::imaging::{
        card::{render_result_card, CardOptions},
        crop::{crop_to_aspect, CropOptions},
        ImagingError,
    },
    repositories::{generative::GenerativeClient, result_sink::ResultSink},
    use_cases::critique::CritiqueHandler,
    utils::data_url::to_data_url,
};

/// One user's analysis cycle: idle, loading, then success or error.
///
/// A successful analysis is followed by the automatic uploads, in order: score, cropped
/// portrait, result card. Upload failures are logged and never change the state.
pub struct AnalysisSession<G, S>
where
    G: GenerativeClient,
    S: ResultSink,
{
    critique: CritiqueHandler<G>,
    sink: S,
    roster: Roster,
    user_name: String,
    crop_options: CropOptions,
    card_options: CardOptions,
    image: Option<ImageSubmission>,
    portrait: Option<Vec<u8>>,
    state: AnalysisState,
    video_state: VideoGenerationState,
    last_save: Option<AutoSaveReport>,
}

impl<G, S> AnalysisSession<G, S>
where
    G: GenerativeClient,
    S: ResultSink,
{
    pub fn new(
        critique: CritiqueHandler<G>,
        sink: S,
        roster: Roster,
        crop_options: CropOptions,
        card_options: CardOptions,
    ) -> Self {
        AnalysisSession {
            critique,
            sink,
            roster,
            user_name: String::new(),
            crop_options,
            card_options,
            image: None,
            portrait: None,
            state: AnalysisState::Idle,
            video_state: VideoGenerationState::Idle,
            last_save: None,
        }
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn video_state(&self) -> &VideoGenerationState {
        &self.video_state
    }

    pub fn last_save(&self) -> Option<&AutoSaveReport> {
        self.last_save.as_ref()
    }

    pub fn image(&self) -> Option<&ImageSubmission> {
        self.image.as_ref()
    }

    pub fn set_user_name(&mut self, name: &str) {
        self.user_name = name.trim().to_string();
    }

    /// Replaces the photo and clears any previous outcome.
    pub fn select_image(&mut self, submission: ImageSubmission) {
        self.image = Some(submission);
        self.portrait = None;
        self.last_save = None;
        self.state = AnalysisState::Idle;
        self.video_state = VideoGenerationState::Idle;
    }

    /// Runs the analysis for the selected photo, then the automatic uploads.
    pub async fn start(&mut self) -> &AnalysisState {
        if self.state.is_loading() {
            return &self.state;
        }

        let Some(submission) = self.image.as_ref() else {
            self.state = AnalysisState::Error("Select a photo first.".to_string());
            return &self.state;
        };

        self.state = AnalysisState::Loading;
        match self.critique.analyze(submission).await {
            Ok(critique) => {
                self.state = AnalysisState::Success(critique.clone());
                let report = self.auto_save(&critique).await;
                self.last_save = Some(report);
            }
            Err(e) => {
                tracing::error!("Analysis failed: {}", e);
                self.state = AnalysisState::Error(e.user_message());
            }
        }

        &self.state
    }

    /// Back to idle with the same photo.
    pub fn retry(&mut self) {
        self.state = AnalysisState::Idle;
        self.video_state = VideoGenerationState::Idle;
    }

    pub fn reset(&mut self) {
        self.image = None;
        self.portrait = None;
        self.last_save = None;
        self.state = AnalysisState::Idle;
        self.video_state = VideoGenerationState::Idle;
    }

    fn portrait(&mut self) -> Result<Vec<u8>, ImagingError> {
        if let Some(portrait) = &self.portrait {
            return Ok(portrait.clone());
        }
        let bytes = self
            .image
            .as_ref()
            .map(|i| i.bytes.as_slice())
            .ok_or_else(|| ImagingError::Decode("No image selected".to_string()))?;
        let portrait = crop_to_aspect(bytes, &self.crop_options)?;
        self.portrait = Some(portrait.clone());
        Ok(portrait)
    }

    /// Uploads score, portrait and result card for a roster member.
    pub async fn auto_save(&mut self, critique: &CritiqueResult) -> AutoSaveReport {
        let mut report = AutoSaveReport::default();

        let Some(user_id) = self.roster.user_id(&self.user_name) else {
            tracing::info!(user_name = %self.user_name, "Name is not on the roster, skipping auto-save");
            report.skipped = true;
            return report;
        };
        let user_name = self.user_name.clone();

        match self.sink.save(&SaveResultRequest::score(user_id, &user_name, critique.total_score)).await {
            Ok(_) => report.score_saved = true,
            Err(e) => tracing::warn!(user_id, "Score save failed: {}", e),
        }

        let portrait = match self.portrait() {
            Ok(portrait) => portrait,
            Err(e) => {
                tracing::warn!(user_id, "Portrait crop failed: {}", e);
                return report;
            }
        };

        let upload = SaveResultRequest::image(
            user_id,
            &user_name,
            MediaKind::UpperBody,
            to_data_url("image/jpeg", &portrait),
        );
        match self.sink.save(&upload).await {
            Ok(_) => report.portrait_saved = true,
            Err(e) => tracing::warn!(user_id, "Portrait save failed: {}", e),
        }

        let card = match render_result_card(&portrait, critique, &self.card_options) {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!(user_id, "Result card capture failed: {}", e);
                return report;
            }
        };

        let upload = SaveResultRequest::image(user_id, &user_name, MediaKind::Result, to_data_url("image/jpeg", &card));
        match self.sink.save(&upload).await {
            Ok(_) => report.result_saved = true,
            Err(e) => tracing::warn!(user_id, "Result card save failed: {}", e),
        }

        report
    }

    /// Generates the video for the selected photo and stores it for roster members.
    pub async fn generate_video(&mut self) -> Result<Vec<u8>, AppError> {
        self.video_state = VideoGenerationState::Generating;

        let outcome = match self.portrait() {
            Ok(portrait) => {
                let encoded = to_data_url("image/jpeg", &portrait);
                let payload = encoded.split_once(',').map(|(_, data)| data).unwrap_or_default();
                self.critique
                    .generate_video(payload, "image/jpeg")
                    .await
                    .map_err(AppError::from)
            }
            Err(e) => Err(AppError::from(e)),
        };

        let video = match outcome {
            Ok(video) => video,
            Err(e) => {
                self.video_state = VideoGenerationState::Error { error: e.to_string() };
                return Err(e);
            }
        };

        let url = match self.roster.user_id(&self.user_name) {
            Some(user_id) => {
                let upload = SaveResultRequest::video(user_id, &self.user_name, to_data_url("video/mp4", &video));
                match self.sink.save(&upload).await {
                    Ok(saved) => Some(saved.url),
                    Err(e) => {
                        tracing::warn!(user_id, "Video save failed: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        self.video_state = VideoGenerationState::Completed { url };
        Ok(video)
    }
}
