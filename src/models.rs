use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationErrors};

const EMAIL_MESSAGE: &str = "Please enter a valid email address";

// Сообщение из контактной формы в том виде, в котором его хранит store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

// Тело запроса POST /api/contact в сыром виде
// Типы полей проверяются вручную, чтобы ошибка типа указывала на конкретное поле
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactMessagePayload {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub subject: Option<Value>,
    pub message: Option<Value>,
}

impl ContactMessagePayload {
    // Ошибки типов, ограничений validator и домена email, одна запись на поле
    pub fn validate_into(self) -> Result<NewContactMessage, Vec<FieldError>> {
        let mut errors = Vec::new();

        // Отсутствующие обязательные поля превращаются в "" и попадают в ошибки длины
        let request = ContactMessageRequest {
            name: text_field("name", self.name, &mut errors).unwrap_or_default(),
            email: text_field("email", self.email, &mut errors).unwrap_or_default(),
            subject: text_field("subject", self.subject, &mut errors),
            message: text_field("message", self.message, &mut errors).unwrap_or_default(),
        };

        if let Err(validation) = request.validate() {
            for error in field_errors(&validation) {
                if !errors.iter().any(|e: &FieldError| e.field == error.field) {
                    errors.push(error);
                }
            }
        }

        if !errors.iter().any(|e| e.field == "email") && !has_dotted_domain(&request.email) {
            errors.push(FieldError::new("email", "email", EMAIL_MESSAGE));
        }

        if errors.is_empty() {
            Ok(request.into())
        } else {
            errors.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
            Err(errors)
        }
    }
}

fn text_field(field: &str, value: Option<Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        other => {
            errors.push(FieldError::new(
                field,
                "invalid_type",
                format!("Expected string, received {}", json_type(&other)),
            ));
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// validator пропускает адреса вида a@localhost, форма требует точку в домене
pub fn has_dotted_domain(email: &str) -> bool {
    email.rsplit_once('@').map_or(false, |(_, domain)| {
        domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    })
}

// Проверяемые ограничения контактной формы
#[derive(Debug, Clone, Default, Validate)]
pub struct ContactMessageRequest {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    pub subject: Option<String>,

    #[validate(length(min = 10, message = "Message must be at least 10 characters"))]
    pub message: String,
}

// Данные, прошедшие валидацию, для сохранения в store
#[derive(Debug, Clone, PartialEq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

impl From<ContactMessageRequest> for NewContactMessage {
    fn from(request: ContactMessageRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            subject: request.subject.filter(|subject| !subject.is_empty()),
            message: request.message,
        }
    }
}

// Пользователь (для будущей аутентификации, HTTP-маршрутов нет)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

// Ошибка валидации одного поля
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

// Одна запись на каждое нарушенное ограничение, отсортировано по имени поля
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut result: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, violations)| {
            let field = field.to_string();
            violations.iter().map(move |violation| {
                let message = violation
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                FieldError::new(field.clone(), violation.code.to_string(), message)
            })
        })
        .collect();

    result.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    result
}

// Успешный ответ с одной записью
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

// Успешный ответ со списком
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

// Общий ответ об ошибке
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: Some(errors),
        }
    }
}
