use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Landing page pictures, read once at startup and embedded as data URIs so the
/// page needs no static file route. A missing file leaves its slot empty.
#[derive(Debug, Clone, Default)]
pub struct LandingAssets {
    pub hero: Option<String>,
    pub drag_and_drop: Option<String>,
    pub microscope: Option<String>,
    pub sales_representative: Option<String>,
    pub principal_engineer: Option<String>,
}

impl LandingAssets {
    #[tracing::instrument(name = "Load landing page assets")]
    pub fn load(dir: &Path) -> Self {
        LandingAssets {
            hero: load_image(dir, "hero_image.jpg"),
            drag_and_drop: load_image(dir, "draganddrop.png"),
            microscope: load_image(dir, "micro_man.png"),
            sales_representative: load_image(dir, "user1.jpeg"),
            principal_engineer: load_image(dir, "user2.jpeg"),
        }
    }
}

fn load_image(dir: &Path, file_name: &str) -> Option<String> {
    let path = dir.join(file_name);

    match image_to_data_uri(&path) {
        Ok(uri) => Some(uri),
        Err(err) => {
            tracing::info!("Landing image {} not embedded: {}", path.display(), err);
            None
        }
    }
}

pub fn image_to_data_uri(path: &Path) -> Result<String, std::io::Error> {
    let bytes = fs::read(path)?;
    let mime = match path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
