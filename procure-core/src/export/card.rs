//! Card composition: the text a card shows and its raster layout.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;
use thiserror::Error;

use super::font::CardFont;
use crate::models::{decode_data_uri, split_color_tokens, PhotoError, ProcurementRecord};

/// Card width in layout pixels.
pub const CARD_WIDTH: u32 = 600;
/// Height of the photo banner in layout pixels.
pub const BANNER_HEIGHT: u32 = 850;
/// Height of the text block in layout pixels.
pub const TEXT_HEIGHT: u32 = 356;
/// Device pixels per layout pixel.
pub const SCALE: u32 = 2;

const PAD_X: u32 = 40;
const PAD_TOP: u32 = 32;
const MODEL_PX: f32 = 72.0;
const DETAIL_PX: f32 = 30.0;
const PRICE_PX: f32 = 60.0;
const HEADLINE_GAP: u32 = 24;
const PRICE_GAP: u32 = 32;
const STORE_LINE_HEIGHT: f32 = 36.0;
const MODEL_COLOR_GAP: u32 = 24;

const INK: Rgba<u8> = Rgba([9, 9, 11, 255]);
const INK_SOFT: Rgba<u8> = Rgba([24, 24, 27, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Error, Debug)]
pub enum CardError {
    #[error("No usable font found; set font_path in the config")]
    FontNotFound,

    #[error("Failed to load font {0}: {1}")]
    Font(String, String),

    #[error("Invalid product photo: {0}")]
    Photo(#[from] PhotoError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Re-prefixes each raw color token with a dash: `"黑色,白色"` → `"-黑色 -白色"`.
pub fn format_colors(raw: &str) -> String {
    split_color_tokens(raw)
        .iter()
        .map(|c| format!("-{}", c))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Store tokens for every store holding stock, ascending: `["1/", "3/", "20/"]`.
pub fn store_tokens(record: &ProcurementRecord) -> Vec<String> {
    record
        .allocated_stores()
        .iter()
        .map(|s| format!("{}/", s))
        .collect()
}

/// The store line as one string: `"1/ 3/ 20/"`.
pub fn format_stores(record: &ProcurementRecord) -> String {
    store_tokens(record).join(" ")
}

/// `"cost / sell"` using the shortest decimal form of each price.
pub fn format_prices(cost: f64, sell: f64) -> String {
    format!("{} / {}", cost, sell)
}

/// Name of the exported PNG: `采购_{supplier}_{model}.png`.
///
/// Characters that are unsafe in file names are replaced with `_`.
pub fn file_name(record: &ProcurementRecord) -> String {
    let raw = format!("采购_{}_{}.png", record.supplier.trim(), record.model.trim());
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Title and text handed to the share target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub title: String,
    pub text: String,
}

impl Caption {
    pub fn new(target_group: Option<&str>) -> Self {
        let text = match target_group.map(str::trim) {
            Some(group) if !group.is_empty() => format!("发送至: {}", group),
            _ => "新采购项".to_string(),
        };
        Self {
            title: "采购单".to_string(),
            text,
        }
    }
}

/// Everything the text block shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardText {
    pub model: String,
    pub colors: String,
    pub supplier: String,
    pub prices: String,
    pub stores: Vec<String>,
}

impl CardText {
    pub fn from_record(record: &ProcurementRecord) -> Self {
        Self {
            model: record.model.clone(),
            colors: format_colors(&record.color),
            supplier: record.supplier.clone(),
            prices: format_prices(record.cost_price, record.sell_price),
            stores: store_tokens(record),
        }
    }
}

/// Greedily packs space-joined tokens into lines no wider than `max_width`.
pub fn wrap_tokens<F>(tokens: &[String], max_width: u32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> u32,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for token in tokens {
        if current.is_empty() {
            current.push_str(token);
            continue;
        }
        let candidate = format!("{} {}", current, token);
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, token.clone()));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Full card size in device pixels.
pub fn card_dimensions() -> (u32, u32) {
    (CARD_WIDTH * SCALE, (BANNER_HEIGHT + TEXT_HEIGHT) * SCALE)
}

/// Renders a record into a card image.
pub fn render_card(record: &ProcurementRecord, font: &CardFont) -> Result<RgbaImage, CardError> {
    let (width, height) = card_dimensions();
    let mut canvas = RgbaImage::from_pixel(width, height, PAPER);

    let photo_bytes = decode_data_uri(&record.image)?;
    let photo = image::load_from_memory(&photo_bytes)?;
    let banner = photo
        .resize_to_fill(width, BANNER_HEIGHT * SCALE, FilterType::Lanczos3)
        .to_rgba8();
    imageops::overlay(&mut canvas, &banner, 0, 0);

    let text = CardText::from_record(record);
    draw_text_block(&mut canvas, &text, font);

    Ok(canvas)
}

/// Encodes a rendered card as PNG.
pub fn encode_png(card: RgbaImage) -> Result<Vec<u8>, CardError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(card).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn px(layout: u32) -> i32 {
    (layout * SCALE) as i32
}

fn scale(layout_px: f32) -> PxScale {
    PxScale::from(layout_px * SCALE as f32)
}

fn ascent(font: &CardFont, layout_px: f32) -> f32 {
    font.inner().as_scaled(scale(layout_px)).ascent()
}

fn draw_text_block(canvas: &mut RgbaImage, text: &CardText, font: &CardFont) {
    let face = font.inner();
    let width = canvas.width() as i32;
    let left = px(PAD_X);
    let right = width - px(PAD_X);
    let mut top = px(BANNER_HEIGHT + PAD_TOP);

    // Headline: model and colors share a baseline, supplier flush right.
    let baseline = top as f32 + ascent(font, MODEL_PX);
    draw_text_mut(canvas, INK, left, top, scale(MODEL_PX), face, &text.model);

    let detail_top = (baseline - ascent(font, DETAIL_PX)).round() as i32;
    if !text.colors.is_empty() {
        let (model_w, _) = text_size(scale(MODEL_PX), face, &text.model);
        let x = left + model_w as i32 + px(MODEL_COLOR_GAP);
        draw_text_mut(canvas, INK_SOFT, x, detail_top, scale(DETAIL_PX), face, &text.colors);
    }
    if !text.supplier.is_empty() {
        let (supplier_w, _) = text_size(scale(DETAIL_PX), face, &text.supplier);
        let x = right - supplier_w as i32;
        draw_text_mut(canvas, INK_SOFT, x, detail_top, scale(DETAIL_PX), face, &text.supplier);
    }
    top += px(MODEL_PX as u32 + HEADLINE_GAP);

    draw_text_mut(canvas, INK, left, top, scale(PRICE_PX), face, &text.prices);
    top += px(PRICE_PX as u32 + PRICE_GAP);

    let max_width = (right - left) as u32;
    let lines = wrap_tokens(&text.stores, max_width, |s| {
        text_size(scale(DETAIL_PX), face, s).0
    });
    for line in lines {
        draw_text_mut(canvas, INK, left, top, scale(DETAIL_PX), face, &line);
        top += (STORE_LINE_HEIGHT * SCALE as f32) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::font::test_font;
    use crate::models::{StoreAllocation, StoreId, Unit};

    fn record_with_stores(stores: &[u8]) -> ProcurementRecord {
        ProcurementRecord {
            id: "r".to_string(),
            timestamp: 0,
            supplier: "华南布行".to_string(),
            model: "A123".to_string(),
            color: "黑色,白色".to_string(),
            unit: Unit::Piece,
            cost_price: 35.0,
            sell_price: 89.5,
            image: String::new(),
            detail_allocations: stores
                .iter()
                .map(|s| StoreAllocation::new(StoreId::new(*s).unwrap()).with_item("黑色", 1))
                .collect(),
        }
    }

    #[test]
    fn test_format_colors() {
        assert_eq!(format_colors("黑色,白色"), "-黑色 -白色");
        assert_eq!(format_colors("黑色 白色、灰色"), "-黑色 -白色 -灰色");
        assert_eq!(format_colors(""), "");
    }

    #[test]
    fn test_store_line_ascending_with_separator() {
        let record = record_with_stores(&[3, 1, 20]);
        assert_eq!(format_stores(&record), "1/ 3/ 20/");
    }

    #[test]
    fn test_store_line_skips_unallocated() {
        let mut record = record_with_stores(&[2, 7]);
        record.detail_allocations[1].items[0].quantity = 0;
        assert_eq!(format_stores(&record), "2/");
    }

    #[test]
    fn test_format_prices() {
        assert_eq!(format_prices(35.0, 89.5), "35 / 89.5");
        assert_eq!(format_prices(0.0, 12.25), "0 / 12.25");
    }

    #[test]
    fn test_file_name() {
        let mut record = record_with_stores(&[1]);
        assert_eq!(file_name(&record), "采购_华南布行_A123.png");

        record.model = "A/B:1".to_string();
        assert_eq!(file_name(&record), "采购_华南布行_A_B_1.png");
    }

    #[test]
    fn test_caption() {
        assert_eq!(Caption::new(Some("采购一部")).text, "发送至: 采购一部");
        assert_eq!(Caption::new(Some("  ")).text, "新采购项");
        assert_eq!(Caption::new(None).text, "新采购项");
        assert_eq!(Caption::new(None).title, "采购单");
    }

    #[test]
    fn test_card_text() {
        let text = CardText::from_record(&record_with_stores(&[5, 2]));
        assert_eq!(text.model, "A123");
        assert_eq!(text.colors, "-黑色 -白色");
        assert_eq!(text.prices, "35 / 89.5");
        assert_eq!(text.stores, vec!["2/", "5/"]);
    }

    #[test]
    fn test_wrap_tokens() {
        let tokens: Vec<String> = ["1/", "2/", "3/", "10/", "11/"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let measure = |s: &str| s.chars().count() as u32 * 10;

        let lines = wrap_tokens(&tokens, 80, measure);
        assert_eq!(lines, vec!["1/ 2/ 3/", "10/ 11/"]);

        let lines = wrap_tokens(&tokens, 1000, measure);
        assert_eq!(lines, vec!["1/ 2/ 3/ 10/ 11/"]);

        assert!(wrap_tokens(&[], 100, measure).is_empty());
    }

    #[test]
    fn test_card_dimensions() {
        assert_eq!(card_dimensions(), (1200, 2412));
    }

    #[test]
    fn test_render_requires_photo() {
        let font = test_font();
        let record = record_with_stores(&[1]);
        assert!(matches!(
            render_card(&record, &font),
            Err(CardError::Photo(_))
        ));
    }

    #[test]
    fn test_render_card_dimensions() {
        let font = test_font();

        let photo = RgbaImage::from_pixel(40, 30, Rgba([200, 50, 50, 255]));
        let png = encode_png(photo).unwrap();
        let mut record = record_with_stores(&[3, 1, 20]);
        record.image = crate::models::to_data_uri(&png).unwrap();

        let card = render_card(&record, &font).unwrap();
        assert_eq!(card.dimensions(), card_dimensions());
        // Banner is covered by the photo
        let Rgba([r, g, b, _]) = *card.get_pixel(10, 10);
        assert!(r.abs_diff(200) <= 2 && g.abs_diff(50) <= 2 && b.abs_diff(50) <= 2);
    }
}
