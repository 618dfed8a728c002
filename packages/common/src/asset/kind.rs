use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The 3D model formats accepted for AR previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArModelKind {
    /// Binary glTF, rendered by WebXR / Android Scene Viewer.
    Glb,
    /// Zipped Universal Scene Description, rendered by iOS Quick Look.
    Usdz,
}

impl ArModelKind {
    pub const ALL: [ArModelKind; 2] = [ArModelKind::Glb, ArModelKind::Usdz];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Glb => "glb",
            Self::Usdz => "usdz",
        }
    }

    /// Case-insensitive lookup by file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    /// MIME types a client may reasonably declare for this kind.
    ///
    /// Platforms disagree on these formats, so the list is permissive.
    pub fn allowed_mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Glb => &["model/gltf-binary", "application/octet-stream"],
            Self::Usdz => &[
                "model/vnd.usdz+zip",
                "model/vnd.pixar.usd",
                "application/zip",
                "application/octet-stream",
            ],
        }
    }
}

impl fmt::Display for ArModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Error returned when a string names no known model kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown AR model kind '{}', expected glb or usdz", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for ArModelKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s.trim()).ok_or_else(|| UnknownKind(s.to_string()))
    }
}
