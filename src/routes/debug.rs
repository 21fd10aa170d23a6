use std::collections::HashSet;

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::config::StorageSettings;
use crate::domain::new_unsubscribe::{NewUnsubscribe, UnsubscribeFormData};
use crate::domain::subscriber_email::SubscriberEmail;
use crate::registry::import::ImportTable;
use crate::registry::store::decode_csv;
use crate::registry::{AddOutcome, RegistryError, SubscriberRegistry};
use crate::routes::{html_response, registry_action, registry_error_message};
use crate::startup::DebugViewEnabled;
use crate::views::debug::{DebugPage, LocationStatus};
use crate::views::StatusMessage;

#[derive(Deserialize)]
pub struct DebugCsvForm {
    pub csv: String,
}

#[derive(Deserialize)]
pub struct DebugDeleteForm {
    pub email: String,
}

pub(crate) fn collect_snapshot(registry: &SubscriberRegistry) -> DebugPage {
    let working_dir = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|err| format!("unavailable ({})", err));
    let mut entries: Vec<String> = match std::fs::read_dir(".") {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(err) => {
            tracing::warn!("Failed to list the working directory: {:?}", err);
            Vec::new()
        }
    };
    entries.sort();

    let locations = registry
        .store()
        .locations()
        .map(|store| LocationStatus {
            path: store.location().display().to_string(),
            format: store.format().as_ref().to_string(),
            exists: store.location().exists(),
        })
        .collect();
    let csv_text = registry
        .export_csv()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();

    DebugPage {
        working_dir,
        entries,
        locations,
        records: registry.records().to_vec(),
        csv_text,
        messages: Vec::new(),
    }
}

async fn run_debug_action<A>(
    request: &HttpRequest,
    storage: &StorageSettings,
    action: A,
) -> HttpResponse
where
    A: FnOnce(&mut SubscriberRegistry) -> Result<StatusMessage, RegistryError> + Send + 'static,
{
    match registry_action(storage, action, collect_snapshot).await {
        Ok((message, page)) => {
            html_response(request, StatusCode::OK, page.with_messages(vec![message]))
        }
        Err(err) => {
            tracing::error!("Debug action failed: {:?}", err);
            html_response(
                request,
                StatusCode::INTERNAL_SERVER_ERROR,
                DebugPage::default().with_messages(vec![registry_error_message(&err)]),
            )
        }
    }
}

/// Replaces the whole list with the edited table.
#[tracing::instrument(name = "Debug: save edited list", skip(request, form, storage, debug_view))]
pub async fn handle_debug_save(
    request: HttpRequest,
    form: web::Form<DebugCsvForm>,
    storage: web::Data<StorageSettings>,
    debug_view: web::Data<DebugViewEnabled>,
) -> HttpResponse {
    if !debug_view.0 {
        return HttpResponse::NotFound().finish();
    }

    let records = match decode_csv(form.csv.as_bytes()) {
        Ok(records) if !records.is_empty() => records,
        Ok(_) => {
            return run_debug_action(&request, &storage, |_| {
                Ok(StatusMessage::Warning(String::from(
                    "The edited list has no valid rows; nothing was saved. Use the admin view to clear the list.",
                )))
            })
            .await;
        }
        Err(err) => {
            tracing::warn!("Edited list is not valid CSV: {:?}", err);
            return run_debug_action(&request, &storage, |_| {
                Ok(StatusMessage::Warning(String::from(
                    "The edited list is not valid CSV; nothing was saved.",
                )))
            })
            .await;
        }
    };

    run_debug_action(&request, &storage, move |registry| {
        let saved = registry.replace_all(records)?;
        Ok(StatusMessage::Success(format!("Saved {} records.", saved)))
    })
    .await
}

#[tracing::instrument(name = "Debug: delete a row", skip(request, form, storage, debug_view), fields(email = %form.email))]
pub async fn handle_debug_delete(
    request: HttpRequest,
    form: web::Form<DebugDeleteForm>,
    storage: web::Data<StorageSettings>,
    debug_view: web::Data<DebugViewEnabled>,
) -> HttpResponse {
    if !debug_view.0 {
        return HttpResponse::NotFound().finish();
    }

    let email = match SubscriberEmail::normalize(&form.email) {
        Ok(email) => email,
        Err(err) => {
            return run_debug_action(&request, &storage, move |_| {
                Ok(StatusMessage::Warning(err))
            })
            .await;
        }
    };

    run_debug_action(&request, &storage, move |registry| {
        let removed = registry.remove(&HashSet::from([email.clone()]))?;
        Ok(if removed > 0 {
            StatusMessage::Success(format!("Deleted {}.", email))
        } else {
            StatusMessage::Info(format!("{} is not in the list.", email))
        })
    })
    .await
}

#[tracing::instrument(name = "Debug: add a row", skip(request, form, storage, debug_view), fields(email = %form.email))]
pub async fn handle_debug_add(
    request: HttpRequest,
    form: web::Form<UnsubscribeFormData>,
    storage: web::Data<StorageSettings>,
    debug_view: web::Data<DebugViewEnabled>,
) -> HttpResponse {
    if !debug_view.0 {
        return HttpResponse::NotFound().finish();
    }

    let new_unsubscribe: NewUnsubscribe = match form.into_inner().try_into() {
        Ok(new_unsubscribe) => new_unsubscribe,
        Err(err) => {
            return run_debug_action(&request, &storage, move |_| {
                Ok(StatusMessage::Warning(err))
            })
            .await;
        }
    };

    run_debug_action(&request, &storage, move |registry| {
        let email = new_unsubscribe.email.to_string();
        let message = match registry.add(new_unsubscribe.email, new_unsubscribe.reason)? {
            AddOutcome::Created => StatusMessage::Success(format!("Added {}.", email)),
            AddOutcome::AlreadyPresent => {
                StatusMessage::Info(format!("{} is already in the list.", email))
            }
        };

        Ok(message)
    })
    .await
}

#[tracing::instrument(name = "Debug: upload and merge", skip(request, form, storage, debug_view))]
pub async fn handle_debug_upload(
    request: HttpRequest,
    form: web::Form<DebugCsvForm>,
    storage: web::Data<StorageSettings>,
    debug_view: web::Data<DebugViewEnabled>,
) -> HttpResponse {
    if !debug_view.0 {
        return HttpResponse::NotFound().finish();
    }

    let table = ImportTable::from_csv(form.csv.as_bytes());

    run_debug_action(&request, &storage, move |registry| {
        let summary = registry.import_bulk(&table?)?;
        Ok(StatusMessage::Success(format!(
            "Merged {} new emails from column '{}'.",
            summary.added, summary.column
        )))
    })
    .await
}
