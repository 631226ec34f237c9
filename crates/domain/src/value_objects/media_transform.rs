//! Media kind, crop/transform descriptor and sensitivity tags

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Broad kind of an attached media file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image (`image/*`)
    Image,
    /// Video clip (`video/*`)
    Video,
}

/// Content warning attached to a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityTag {
    Nudity,
    Violence,
    Graphic,
    Spoiler,
}

/// Crop rectangle in normalized coordinates (`0.0..=1.0` of the source)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRect {
    /// The whole source image
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Create a crop rectangle, rejecting areas outside the source
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, DomainError> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !(in_unit(x) && in_unit(y)) || width <= 0.0 || height <= 0.0 {
            return Err(DomainError::ValidationError(format!(
                "Invalid crop origin/size: ({x}, {y}, {width}, {height})"
            )));
        }
        if x + width > 1.0 + f32::EPSILON || y + height > 1.0 + f32::EPSILON {
            return Err(DomainError::ValidationError(
                "Crop rectangle exceeds source bounds".to_string(),
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Width divided by height of the cropped area
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Edits applied to a media item in the media editor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTransform {
    pub crop: CropRect,
    /// Clockwise rotation in quarter turns (0-3)
    pub quarter_turns: u8,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub zoom: f32,
}

impl Default for MediaTransform {
    fn default() -> Self {
        Self {
            crop: CropRect::FULL,
            quarter_turns: 0,
            flip_horizontal: false,
            flip_vertical: false,
            zoom: 1.0,
        }
    }
}

impl MediaTransform {
    /// Transform with only a crop applied
    pub fn cropped(crop: CropRect) -> Self {
        Self {
            crop,
            ..Self::default()
        }
    }

    /// Rotate a quarter turn clockwise
    #[must_use]
    pub const fn rotated_clockwise(mut self) -> Self {
        self.quarter_turns = (self.quarter_turns + 1) % 4;
        self
    }

    /// Check whether the transform changes anything
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}
