mod admin;
mod debug;
mod health_check;
mod home;
mod unsubscribe;

pub use admin::*;
pub use debug::*;
pub use health_check::*;
pub use home::*;
pub use unsubscribe::*;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::config::StorageSettings;
use crate::registry::store::ReplicatedStore;
use crate::registry::{RegistryError, SubscriberRegistry};
use crate::views::StatusMessage;

/// Loads a fresh registry on the blocking pool and runs `operation` against it.
pub(crate) async fn with_registry<F, T>(
    storage: &StorageSettings,
    operation: F,
) -> Result<T, RegistryError>
where
    F: FnOnce(&mut SubscriberRegistry) -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    let storage = storage.clone();

    web::block(move || {
        let mut registry = SubscriberRegistry::load(ReplicatedStore::from_settings(&storage));
        operation(&mut registry)
    })
    .await
    .map_err(|_| RegistryError::WorkerUnavailable)?
}

/// Runs a mutating action and then `view` over the registry, so the page can be
/// re-rendered even when the action failed. A failed action is rolled back first.
pub(crate) async fn registry_action<A, V, T>(
    storage: &StorageSettings,
    action: A,
    view: V,
) -> Result<(StatusMessage, T), RegistryError>
where
    A: FnOnce(&mut SubscriberRegistry) -> Result<StatusMessage, RegistryError> + Send + 'static,
    V: FnOnce(&SubscriberRegistry) -> T + Send + 'static,
    T: Send + 'static,
{
    with_registry(storage, move |registry| {
        let before = registry.records().to_vec();
        let message = match action(&mut *registry) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!("Registry operation failed: {:?}", err);
                registry.rollback(before);
                registry_error_message(&err)
            }
        };

        Ok((message, view(&*registry)))
    })
    .await
}

pub(crate) fn registry_error_message(err: &RegistryError) -> StatusMessage {
    match err {
        RegistryError::Import(err) => StatusMessage::Warning(err.to_string()),
        err => StatusMessage::Error(err.to_string()),
    }
}

/// Renders a page template with a status other than the responder's default 200.
pub(crate) fn html_response<P: Responder>(
    request: &HttpRequest,
    status: StatusCode,
    page: P,
) -> HttpResponse {
    page.customize()
        .with_status(status)
        .respond_to(request)
        .map_into_boxed_body()
}
