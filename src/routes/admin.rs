use std::collections::HashSet;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::admin_gate::AdminGate;
use crate::config::StorageSettings;
use crate::domain::new_unsubscribe::{NewUnsubscribe, UnsubscribeFormData};
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::unsubscribe_record::UnsubscribeRecord;
use crate::registry::import::ImportTable;
use crate::registry::{AddOutcome, RegistryError, SubscriberRegistry};
use crate::routes::{html_response, registry_action, registry_error_message, with_registry};
use crate::views::admin::{AdminDashboardPage, AdminLoginPage};
use crate::views::StatusMessage;

#[derive(Deserialize)]
pub struct AdminLoginForm {
    pub password: String,
}

#[derive(Deserialize)]
pub struct AdminAddForm {
    pub password: String,
    pub email: String,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminRemoveForm {
    pub password: String,
    pub emails: String,
}

#[derive(Deserialize)]
pub struct AdminClearForm {
    pub password: String,
    pub confirm: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminImportForm {
    pub password: String,
    pub csv: String,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Deserialize)]
pub struct AdminExportForm {
    pub password: String,
    pub format: ExportFormat,
}

fn unauthorized(request: &HttpRequest) -> HttpResponse {
    tracing::warn!("Rejected an admin request with a wrong password");
    html_response(
        request,
        StatusCode::UNAUTHORIZED,
        AdminLoginPage::new(vec![StatusMessage::Warning(String::from(
            "Incorrect password.",
        ))]),
    )
}

fn records_snapshot(registry: &SubscriberRegistry) -> Vec<UnsubscribeRecord> {
    registry.records().to_vec()
}

async fn run_admin_action<A>(
    request: &HttpRequest,
    storage: &StorageSettings,
    password: String,
    action: A,
) -> HttpResponse
where
    A: FnOnce(&mut SubscriberRegistry) -> Result<StatusMessage, RegistryError> + Send + 'static,
{
    match registry_action(storage, action, records_snapshot).await {
        Ok((message, records)) => html_response(
            request,
            StatusCode::OK,
            AdminDashboardPage::new(password, records, vec![message]),
        ),
        Err(err) => {
            tracing::error!("Admin action failed: {:?}", err);
            html_response(
                request,
                StatusCode::INTERNAL_SERVER_ERROR,
                AdminDashboardPage::new(password, Vec::new(), vec![registry_error_message(&err)]),
            )
        }
    }
}

/// Splits on commas and whitespace; entries without an "@" are ignored.
pub fn parse_email_list(raw: &str) -> HashSet<SubscriberEmail> {
    raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|value| !value.is_empty())
        .filter_map(|value| SubscriberEmail::normalize(value).ok())
        .collect()
}

#[tracing::instrument(name = "Admin: open dashboard", skip(request, form, storage, gate))]
pub async fn handle_admin_login(
    request: HttpRequest,
    form: web::Form<AdminLoginForm>,
    storage: web::Data<StorageSettings>,
    gate: web::Data<AdminGate>,
) -> HttpResponse {
    if !gate.verify(&form.password) {
        return unauthorized(&request);
    }

    let password = form.into_inner().password;
    match with_registry(&storage, |registry| Ok(records_snapshot(registry))).await {
        Ok(records) => html_response(
            &request,
            StatusCode::OK,
            AdminDashboardPage::new(password, records, Vec::new()),
        ),
        Err(err) => {
            tracing::error!("Failed to load the unsubscribe list: {:?}", err);
            html_response(
                &request,
                StatusCode::INTERNAL_SERVER_ERROR,
                AdminDashboardPage::new(password, Vec::new(), vec![registry_error_message(&err)]),
            )
        }
    }
}

#[tracing::instrument(name = "Admin: add an email", skip(request, form, storage, gate), fields(email = %form.email))]
pub async fn handle_admin_add(
    request: HttpRequest,
    form: web::Form<AdminAddForm>,
    storage: web::Data<StorageSettings>,
    gate: web::Data<AdminGate>,
) -> HttpResponse {
    if !gate.verify(&form.password) {
        return unauthorized(&request);
    }

    let AdminAddForm {
        password,
        email,
        reason,
    } = form.into_inner();
    let parsed: Result<NewUnsubscribe, String> = UnsubscribeFormData { email, reason }.try_into();

    run_admin_action(&request, &storage, password, move |registry| {
        let new_unsubscribe = match parsed {
            Ok(new_unsubscribe) => new_unsubscribe,
            Err(err) => return Ok(StatusMessage::Warning(err)),
        };
        let email = new_unsubscribe.email.to_string();

        let message = match registry.add(new_unsubscribe.email, new_unsubscribe.reason)? {
            AddOutcome::Created => StatusMessage::Success(format!("Added {}.", email)),
            AddOutcome::AlreadyPresent => {
                StatusMessage::Info(format!("{} is already unsubscribed.", email))
            }
        };

        Ok(message)
    })
    .await
}

#[tracing::instrument(name = "Admin: remove emails", skip(request, form, storage, gate))]
pub async fn handle_admin_remove(
    request: HttpRequest,
    form: web::Form<AdminRemoveForm>,
    storage: web::Data<StorageSettings>,
    gate: web::Data<AdminGate>,
) -> HttpResponse {
    if !gate.verify(&form.password) {
        return unauthorized(&request);
    }

    let AdminRemoveForm { password, emails } = form.into_inner();
    let emails = parse_email_list(&emails);

    run_admin_action(&request, &storage, password, move |registry| {
        if emails.is_empty() {
            return Ok(StatusMessage::Warning(String::from(
                "Enter at least one email address to remove.",
            )));
        }

        let removed = registry.remove(&emails)?;

        Ok(if removed > 0 {
            StatusMessage::Success(format!("Removed {} emails.", removed))
        } else {
            StatusMessage::Info(String::from("None of those emails were in the list."))
        })
    })
    .await
}

#[tracing::instrument(name = "Admin: clear the list", skip(request, form, storage, gate))]
pub async fn handle_admin_clear(
    request: HttpRequest,
    form: web::Form<AdminClearForm>,
    storage: web::Data<StorageSettings>,
    gate: web::Data<AdminGate>,
) -> HttpResponse {
    if !gate.verify(&form.password) {
        return unauthorized(&request);
    }

    let AdminClearForm { password, confirm } = form.into_inner();
    let confirmed = confirm.is_some_and(|value| !value.trim().is_empty());

    run_admin_action(&request, &storage, password, move |registry| {
        Ok(if registry.clear(confirmed)? {
            StatusMessage::Success(String::from("The unsubscribe list was cleared."))
        } else {
            StatusMessage::Warning(String::from(
                "Tick the confirmation box to clear the list. Nothing was removed.",
            ))
        })
    })
    .await
}

#[tracing::instrument(name = "Admin: import a CSV upload", skip(request, form, storage, gate))]
pub async fn handle_admin_import(
    request: HttpRequest,
    form: web::Form<AdminImportForm>,
    storage: web::Data<StorageSettings>,
    gate: web::Data<AdminGate>,
) -> HttpResponse {
    if !gate.verify(&form.password) {
        return unauthorized(&request);
    }

    let AdminImportForm { password, csv } = form.into_inner();
    let table = ImportTable::from_csv(csv.as_bytes());

    run_admin_action(&request, &storage, password, move |registry| {
        let summary = registry.import_bulk(&table?)?;

        Ok(if summary.added > 0 {
            StatusMessage::Success(format!(
                "Imported {} new emails from column '{}'.",
                summary.added, summary.column
            ))
        } else {
            StatusMessage::Info(format!(
                "No new emails found in column '{}'.",
                summary.column
            ))
        })
    })
    .await
}

#[tracing::instrument(name = "Admin: export the list", skip(request, form, storage, gate), fields(format = ?form.format))]
pub async fn handle_admin_export(
    request: HttpRequest,
    form: web::Form<AdminExportForm>,
    storage: web::Data<StorageSettings>,
    gate: web::Data<AdminGate>,
) -> HttpResponse {
    if !gate.verify(&form.password) {
        return unauthorized(&request);
    }

    let format = form.format;
    let exported = with_registry(&storage, move |registry| match format {
        ExportFormat::Csv => registry.export_csv(),
        ExportFormat::Json => registry.export_json(),
    })
    .await;

    match exported {
        Ok(bytes) => {
            let (content_type, file_name) = match format {
                ExportFormat::Csv => ("text/csv; charset=utf-8", "unsubscribed.csv"),
                ExportFormat::Json => ("application/json", "unsubscribed.json"),
            };

            HttpResponse::Ok()
                .content_type(content_type)
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(String::from(file_name))],
                })
                .body(bytes)
        }
        Err(err) => {
            tracing::error!("Failed to export the unsubscribe list: {:?}", err);
            html_response(
                &request,
                StatusCode::INTERNAL_SERVER_ERROR,
                AdminDashboardPage::new(
                    form.into_inner().password,
                    Vec::new(),
                    vec![registry_error_message(&err)],
                ),
            )
        }
    }
}
