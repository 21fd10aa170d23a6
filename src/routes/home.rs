use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::config::StorageSettings;
use crate::routes::debug::collect_snapshot;
use crate::routes::{html_response, registry_error_message, with_registry};
use crate::startup::DebugViewEnabled;
use crate::views::admin::AdminLoginPage;
use crate::views::assets::LandingAssets;
use crate::views::debug::DebugPage;
use crate::views::landing::LandingPage;
use crate::views::unsubscribe::UnsubscribePage;

/// Query parameters of `GET /`. A flag such as `?debug` is present with an empty
/// value.
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub unsubscribe: Option<String>,
    pub debug: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Unsubscribe,
    Admin,
    Debug,
}

impl PageQuery {
    /// Debug wins over admin, which wins over unsubscribe.
    pub fn view(&self) -> View {
        let page = self.page.as_deref().map(str::trim);

        if self.debug.is_some() {
            View::Debug
        } else if page == Some("admin") {
            View::Admin
        } else if self.unsubscribe.is_some() || page == Some("unsubscribe") {
            View::Unsubscribe
        } else {
            View::Landing
        }
    }
}

#[tracing::instrument(name = "Render a page", skip(request, storage, assets, debug_view))]
pub async fn handle_home(
    request: HttpRequest,
    query: web::Query<PageQuery>,
    storage: web::Data<StorageSettings>,
    assets: web::Data<LandingAssets>,
    debug_view: web::Data<DebugViewEnabled>,
) -> HttpResponse {
    match query.view() {
        View::Landing => html_response(
            &request,
            StatusCode::OK,
            LandingPage::new(assets.into_inner()),
        ),
        View::Unsubscribe => html_response(&request, StatusCode::OK, UnsubscribePage::new(vec![])),
        View::Admin => html_response(&request, StatusCode::OK, AdminLoginPage::new(vec![])),
        View::Debug => {
            if !debug_view.0 {
                return HttpResponse::NotFound().finish();
            }

            match with_registry(&storage, |registry| Ok(collect_snapshot(registry))).await {
                Ok(page) => html_response(&request, StatusCode::OK, page),
                Err(err) => {
                    tracing::error!("Failed to load the debug view: {:?}", err);
                    html_response(
                        &request,
                        StatusCode::INTERNAL_SERVER_ERROR,
                        DebugPage::default().with_messages(vec![registry_error_message(&err)]),
                    )
                }
            }
        }
    }
}
