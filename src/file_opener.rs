//! Hands the current image to the system viewer

use crate::dataset::ImageLocation;
use crate::error::{ArchflashError, Result};

/// Opens a local image with the default application, or a remote one in
/// the browser. Returns once the launcher has been spawned.
pub fn open_image(location: &ImageLocation) -> Result<()> {
    let target = match location {
        ImageLocation::Path(path) => {
            if !path.exists() {
                return Err(ArchflashError::ImageLoad(format!(
                    "{}: file does not exist",
                    path.display()
                )));
            }
            path.as_os_str().to_os_string()
        }
        ImageLocation::Url(url) => url.into(),
    };

    tracing::info!(%location, "opening image externally");
    open::that_detached(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_open_missing_file_fails_before_launching() {
        let result = open_image(&ImageLocation::Path(PathBuf::from("/nonexistent/a.jpg")));
        assert!(matches!(result, Err(ArchflashError::ImageLoad(_))));
    }
}
