use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;

use crate::views::assets::LandingAssets;

#[derive(Template, WebTemplate)]
#[template(path = "landing.html")]
pub struct LandingPage {
    pub assets: Arc<LandingAssets>,
}

impl LandingPage {
    pub fn new(assets: Arc<LandingAssets>) -> Self {
        LandingPage { assets }
    }
}
