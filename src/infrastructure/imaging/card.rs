use image::{imageops::{self, FilterType}, Rgb, RgbImage};

use crate::{
    constants::{MAX_CARD_SCALE, SCORE_MAX},
    entities::critique::CritiqueResult,
    infrastructure::imaging::{decode_image, encode_jpeg, ImagingError},
    settings::ImagingSettings,
};

pub const CARD_BACKGROUND: Rgb<u8> = Rgb([0x11, 0x11, 0x11]);
pub const GAUGE_TRACK: Rgb<u8> = Rgb([0x1a, 0x1a, 0x1e]);
pub const GAUGE_FILL: Rgb<u8> = Rgb([0xfc, 0x6e, 0x22]);
pub const DETAIL_FILL: Rgb<u8> = Rgb([0xe5, 0xe5, 0xe5]);

// Layout in unscaled units
const CARD_WIDTH: u32 = 400;
const PORTRAIT_HEIGHT: u32 = 600;
const CARD_HEIGHT: u32 = 720;
const MARGIN: u32 = 20;
const GAUGE_TOP: u32 = 620;
const GAUGE_HEIGHT: u32 = 30;
const DETAIL_TOP: u32 = 666;
const DETAIL_HEIGHT: u32 = 36;
const DETAIL_GAP: u32 = 8;

#[derive(Debug, Clone)]
pub struct CardOptions {
    pub scale: u32,
    pub jpeg_quality: u8,
}

impl Default for CardOptions {
    fn default() -> Self {
        CardOptions::from(&ImagingSettings::default())
    }
}

impl From<&ImagingSettings> for CardOptions {
    fn from(settings: &ImagingSettings) -> Self {
        CardOptions {
            scale: settings.card_scale.clamp(1, MAX_CARD_SCALE),
            jpeg_quality: settings.card_quality,
        }
    }
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let (cw, ch) = canvas.dimensions();
    for py in y..(y + height).min(ch) {
        for px in x..(x + width).min(cw) {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn fraction(score: f64) -> f64 {
    (score / SCORE_MAX).clamp(0.0, 1.0)
}

/// Result card: the portrait on top, a total score gauge, and one column per sub-score.
pub fn compose_result_card(portrait: &RgbImage, critique: &CritiqueResult, options: &CardOptions) -> RgbImage {
    let s = options.scale.clamp(1, MAX_CARD_SCALE);
    let mut canvas = RgbImage::from_pixel(CARD_WIDTH * s, CARD_HEIGHT * s, CARD_BACKGROUND);

    let framed = imageops::resize(portrait, CARD_WIDTH * s, PORTRAIT_HEIGHT * s, FilterType::Triangle);
    imageops::overlay(&mut canvas, &framed, 0, 0);

    let track_width = CARD_WIDTH - 2 * MARGIN;
    fill_rect(&mut canvas, MARGIN * s, GAUGE_TOP * s, track_width * s, GAUGE_HEIGHT * s, GAUGE_TRACK);
    let filled = (track_width as f64 * fraction(critique.total_score)).round() as u32;
    fill_rect(&mut canvas, MARGIN * s, GAUGE_TOP * s, filled * s, GAUGE_HEIGHT * s, GAUGE_FILL);

    let details = critique.details_as_list();
    let columns = details.len() as u32;
    let column_width = (track_width - DETAIL_GAP * (columns - 1)) / columns;
    for (index, (_, score)) in details.iter().enumerate() {
        let x = MARGIN + index as u32 * (column_width + DETAIL_GAP);
        fill_rect(&mut canvas, x * s, DETAIL_TOP * s, column_width * s, DETAIL_HEIGHT * s, GAUGE_TRACK);
        let bar = (DETAIL_HEIGHT as f64 * fraction(*score)).round() as u32;
        let top = DETAIL_TOP + DETAIL_HEIGHT - bar;
        fill_rect(&mut canvas, x * s, top * s, column_width * s, bar * s, DETAIL_FILL);
    }

    canvas
}

/// Renders the capture uploaded as the `result` media object.
pub fn render_result_card(
    portrait_bytes: &[u8],
    critique: &CritiqueResult,
    options: &CardOptions,
) -> Result<Vec<u8>, ImagingError> {
    let portrait = decode_image(portrait_bytes)?.to_rgb8();
    let card = compose_result_card(&portrait, critique, options);
    encode_jpeg(&card, options.jpeg_quality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::critique::ScoreDetails;

    fn critique(total: f64) -> CritiqueResult {
        CritiqueResult {
            total_score: total,
            details: ScoreDetails { face: 100.0, color: 0.0, ratio: 50.0, combination: 50.0, item: 50.0 },
            gentle_critique: "Clean lines.".into(),
            sincere_critique: "Bold choice.".into(),
            one_liner: "Almost there.".into(),
        }
    }

    #[test]
    fn card_size_follows_scale() {
        let portrait = RgbImage::from_pixel(80, 120, Rgb([10, 200, 10]));
        let card = compose_result_card(&portrait, &critique(50.0), &CardOptions { scale: 2, jpeg_quality: 85 });
        assert_eq!(card.dimensions(), (800, 1440));
    }

    #[test]
    fn oversized_scale_is_capped() {
        let portrait = RgbImage::from_pixel(8, 12, Rgb([10, 200, 10]));
        let card = compose_result_card(&portrait, &critique(50.0), &CardOptions { scale: u32::MAX, jpeg_quality: 85 });
        assert_eq!(card.dimensions(), (CARD_WIDTH * MAX_CARD_SCALE, CARD_HEIGHT * MAX_CARD_SCALE));
    }

    #[test]
    fn gauge_fill_tracks_total_score() {
        let portrait = RgbImage::from_pixel(80, 120, Rgb([10, 200, 10]));
        let options = CardOptions { scale: 1, jpeg_quality: 85 };
        let card = compose_result_card(&portrait, &critique(50.0), &options);

        let y = GAUGE_TOP + GAUGE_HEIGHT / 2;
        assert_eq!(*card.get_pixel(MARGIN + 10, y), GAUGE_FILL);
        assert_eq!(*card.get_pixel(CARD_WIDTH - MARGIN - 10, y), GAUGE_TRACK);
        assert_eq!(*card.get_pixel(5, y), CARD_BACKGROUND);
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let portrait = RgbImage::from_pixel(8, 12, Rgb([0, 0, 0]));
        let options = CardOptions { scale: 1, jpeg_quality: 85 };
        let card = compose_result_card(&portrait, &critique(150.0), &options);
        let y = GAUGE_TOP + 1;
        assert_eq!(*card.get_pixel(CARD_WIDTH - MARGIN - 1, y), GAUGE_FILL);
        assert_eq!(*card.get_pixel(CARD_WIDTH - MARGIN, y), CARD_BACKGROUND);
    }
}
