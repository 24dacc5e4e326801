//! Export preparation. Rasterization and PDF writing are done by the host.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A4 at 96 dpi.
pub const PAGE_WIDTH_PX: u32 = 794;
pub const PAGE_HEIGHT_PX: u32 = 1123;
pub const RENDER_SCALE: u32 = 3;

const FILE_PREFIX: &str = "ZENITH_English_Weekly_Pattern";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportFormat {
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }
}

/// What the export collaborator needs to render the poster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlan {
    pub file_name: String,
    pub format: ExportFormat,
    pub page_width_px: u32,
    pub page_height_px: u32,
    pub scale: u32,
}

impl ExportPlan {
    pub fn new(format: ExportFormat, today: NaiveDate) -> Self {
        Self {
            file_name: format!(
                "{FILE_PREFIX}_{}.{}",
                today.format("%Y%m%d"),
                format.extension()
            ),
            format,
            page_width_px: PAGE_WIDTH_PX,
            page_height_px: PAGE_HEIGHT_PX,
            scale: RENDER_SCALE,
        }
    }
}
