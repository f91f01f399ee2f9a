use std::ops::RangeInclusive;

use base64::{
    Engine, alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, FieldViolation};

pub const BORDER_RANGE: RangeInclusive<i64> = 0..=50;
pub const BOX_SIZE_RANGE: RangeInclusive<i64> = 20..=100;
pub const IMAGE_ROUND_RANGE: RangeInclusive<i64> = 0..=100;
pub const IMAGE_PADDING_RANGE: RangeInclusive<i64> = 0..=100;

/// Standard alphabet with padding, tolerating non-zero trailing bits in the
/// last symbol.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Raw query parameters of `GET /create`.
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    pub data: String,
    #[serde(default = "default_border")]
    pub border: i64,
    #[serde(default = "default_box_size")]
    pub box_size: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_image_round")]
    pub image_round: i64,
    #[serde(default = "default_image_padding")]
    pub image_padding: i64,
}

fn default_border() -> i64 {
    3
}

fn default_box_size() -> i64 {
    30
}

fn default_image_round() -> i64 {
    50
}

fn default_image_padding() -> i64 {
    10
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoOptions {
    pub url: String,
    pub round: u32,
    pub padding: u32,
}

/// A validated request with `data` and the logo URL already normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub data: String,
    pub border: u32,
    pub box_size: u32,
    pub logo: Option<LogoOptions>,
}

impl GenerationRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            border: default_border() as u32,
            box_size: default_box_size() as u32,
            logo: None,
        }
    }
}

impl CreateParams {
    /// Range checks run first; a request with any violation is rejected
    /// before its text inputs are touched.
    pub fn validate(self) -> Result<GenerationRequest, ApiError> {
        let mut violations = Vec::new();
        let border = check_range("border", self.border, BORDER_RANGE, &mut violations);
        let box_size = check_range("box_size", self.box_size, BOX_SIZE_RANGE, &mut violations);
        let round = check_range(
            "image_round",
            self.image_round,
            IMAGE_ROUND_RANGE,
            &mut violations,
        );
        let padding = check_range(
            "image_padding",
            self.image_padding,
            IMAGE_PADDING_RANGE,
            &mut violations,
        );
        if !violations.is_empty() {
            return Err(ApiError::Validation(violations));
        }

        let data = decode_lenient(&self.data);
        let logo = self
            .image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(decode_lenient)
            .filter(|url| !url.is_empty())
            .map(|url| LogoOptions {
                url,
                round,
                padding,
            });

        Ok(GenerationRequest {
            data,
            border,
            box_size,
            logo,
        })
    }
}

fn check_range(
    field: &str,
    value: i64,
    range: RangeInclusive<i64>,
    violations: &mut Vec<FieldViolation>,
) -> u32 {
    if value < *range.start() {
        violations.push(FieldViolation::query(
            field,
            format!("Input should be greater than or equal to {}", range.start()),
            Some(json!(value)),
        ));
        return 0;
    }
    if value > *range.end() {
        violations.push(FieldViolation::query(
            field,
            format!("Input should be less than or equal to {}", range.end()),
            Some(json!(value)),
        ));
        return 0;
    }
    value as u32
}

/// Decodes standard padded base64 into UTF-8 text. Anything that does not
/// decode, or decodes to bytes that are not UTF-8, is returned unchanged.
pub fn decode_lenient(value: &str) -> String {
    LENIENT_BASE64
        .decode(value)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| value.to_string())
}
