use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use tracing::{error, info};

use crate::models::{ContactMessagePayload, DataResponse, ErrorResponse, FieldError, ListResponse};
use crate::storage::Storage;

// POST /api/contact: отправка сообщения из контактной формы
pub async fn create_contact_message(
    storage: web::Data<dyn Storage>,
    request: web::Json<ContactMessagePayload>,
) -> impl Responder {
    // Валидация входных данных
    let new_message = match request.into_inner().validate_into() {
        Ok(new_message) => new_message,
        Err(errors) => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::with_errors("Invalid data", errors));
        }
    };

    match storage.create_contact_message(new_message) {
        Ok(message) => {
            info!(id = %message.id, "contact message received");
            HttpResponse::Created().json(DataResponse::with_message(
                "Your message has been sent successfully!",
                message,
            ))
        }
        Err(e) => {
            error!(error = %e, "failed to store contact message");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "An error occurred while sending the message.",
            ))
        }
    }
}

// GET /api/contact: все сообщения, новые первыми (без аутентификации)
pub async fn list_contact_messages(storage: web::Data<dyn Storage>) -> impl Responder {
    match storage.get_contact_messages() {
        Ok(messages) => HttpResponse::Ok().json(ListResponse::from(messages)),
        Err(e) => {
            error!(error = %e, "failed to list contact messages");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "An error occurred while fetching messages.",
            ))
        }
    }
}

// GET /api/contact/{id}
pub async fn get_contact_message(
    storage: web::Data<dyn Storage>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    match storage.get_contact_message(&id) {
        Ok(Some(message)) => HttpResponse::Ok().json(DataResponse::new(message)),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("Message not found.")),
        Err(e) => {
            error!(error = %e, id = %id, "failed to fetch contact message");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "An error occurred while fetching the message.",
            ))
        }
    }
}

// PATCH /api/contact/{id}/read: повторный вызов ничего не меняет
pub async fn mark_contact_message_read(
    storage: web::Data<dyn Storage>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    match storage.mark_message_as_read(&id) {
        Ok(Some(message)) => HttpResponse::Ok().json(DataResponse::with_message(
            "Message marked as read.",
            message,
        )),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("Message not found.")),
        Err(e) => {
            error!(error = %e, id = %id, "failed to mark contact message as read");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "An error occurred while updating the message.",
            ))
        }
    }
}

// Endpoint для проверки работоспособности
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

// JSON, который не удалось разобрать, отдаём в формате ошибок валидации
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(ErrorResponse::with_errors(
        "Invalid data",
        vec![FieldError::new("body", "invalid_json", err.to_string())],
    ));
    InternalError::from_response(err, response).into()
}

pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_error_handler)
}

// Конфигурация маршрутов
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_check))
            .route("/contact", web::post().to(create_contact_message))
            .route("/contact", web::get().to(list_contact_messages))
            .route("/contact/{id}", web::get().to(get_contact_message))
            .route("/contact/{id}/read", web::patch().to(mark_contact_message_read)),
    );
}
