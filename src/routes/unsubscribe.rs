use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::StorageSettings;
use crate::domain::new_unsubscribe::{NewUnsubscribe, UnsubscribeFormData};
use crate::registry::AddOutcome;
use crate::routes::{html_response, with_registry};
use crate::views::unsubscribe::UnsubscribePage;
use crate::views::StatusMessage;

#[tracing::instrument(
    name = "Unsubscribe form submission",
    skip(request, form, storage),
    fields(subscriber_email = %form.email)
)]
pub async fn handle_unsubscribe(
    request: HttpRequest,
    form: web::Form<UnsubscribeFormData>,
    storage: web::Data<StorageSettings>,
) -> HttpResponse {
    let new_unsubscribe: NewUnsubscribe = match form.into_inner().try_into() {
        Ok(new_unsubscribe) => new_unsubscribe,
        Err(err) => {
            tracing::warn!("Validation error: {:?}", err);
            return html_response(
                &request,
                StatusCode::BAD_REQUEST,
                UnsubscribePage::new(vec![StatusMessage::Warning(err)]),
            );
        }
    };

    let outcome = with_registry(&storage, move |registry| {
        registry.add(new_unsubscribe.email, new_unsubscribe.reason)
    })
    .await;

    let (status, message) = match outcome {
        Ok(AddOutcome::Created) => (
            StatusCode::OK,
            StatusMessage::Success(String::from(
                "You have been unsubscribed. You will no longer receive emails from CellAI.",
            )),
        ),
        Ok(AddOutcome::AlreadyPresent) => (
            StatusCode::OK,
            StatusMessage::Info(String::from("This email address is already unsubscribed.")),
        ),
        Err(err) => {
            tracing::error!("Failed to store the unsubscribe request: {:?}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusMessage::Error(String::from(
                    "We could not save your request. Please try again later.",
                )),
            )
        }
    };

    html_response(&request, status, UnsubscribePage::new(vec![message]))
}
