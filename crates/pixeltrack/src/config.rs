//! JSON run configuration and report for the `pixeltrack` CLI.

use pixeltrack_cascade::ViolaJonesParams;
use pixeltrack_color::{ColorParams, ColorRegion};
use pixeltrack_core::Detection;
use pixeltrack_keypoints::{CornerParams, Keypoint};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum TrackIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Which tracker to run and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerConfig {
    /// Cascade detection with one or more classifier JSON files.
    Object {
        classifiers: Vec<PathBuf>,
        #[serde(default)]
        params: ViolaJonesParams,
    },
    Color {
        #[serde(default)]
        params: ColorParams,
    },
    Corners {
        #[serde(default)]
        params: CornerParams,
    },
}

/// One tracking run: an input image and the tracker to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    pub image_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    /// Shrink large frames to a working resolution before tracking.
    #[serde(default)]
    pub auto_scale: bool,
    pub tracker: TrackerConfig,
}

impl TrackConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pixeltrack_report.json"))
    }
}

/// Tracker output, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum TrackResults {
    Object(Vec<Detection>),
    Color(Vec<ColorRegion>),
    Corners(Vec<Keypoint>),
}

impl TrackResults {
    pub fn len(&self) -> usize {
        match self {
            Self::Object(v) => v.len(),
            Self::Color(v) => v.len(),
            Self::Corners(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Results of one run, in source-image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub image_path: String,
    pub width: usize,
    pub height: usize,
    /// Working-resolution factor the frame was tracked at.
    pub scale: f32,
    pub results: TrackResults,
}

impl TrackReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, TrackIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), TrackIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
