//! JSON output for the presentation layer.
//!
//! Bundles (`DashboardBundle`, `ForecastResult`, `ProductReport`) are plain
//! serde data; dates serialize as ISO `YYYY-MM-DD`, absent aligned values as
//! `null`.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::error::AppError;

/// Write any serializable bundle as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::new(4, format!("Failed to write JSON: {e}")))?;

    Ok(())
}
