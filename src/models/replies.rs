use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Reason phrases for the statuses the service actually replies with.
pub const fn status_name(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        406 => "Not Acceptable",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Substitutes `{{key}}` flags inside a message template.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut message = template.to_owned();
    for (key, value) in values {
        message = message.replace(&format!("{{{{{key}}}}}"), value);
    }
    message
}

#[derive(Clone, Copy)]
pub enum SuccessCode {
    Ok,
    UserRegistered,
    UserLoggedIn,
    UserProfile,
    ReplayRegistered,
}

impl SuccessCode {
    pub const fn code(&self) -> &'static str {
        match self {
            SuccessCode::Ok => "ok",
            SuccessCode::UserRegistered => "success_user_register",
            SuccessCode::UserLoggedIn => "success_user_login",
            SuccessCode::UserProfile => "success_user_profile",
            SuccessCode::ReplayRegistered => "success_replay_register",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            SuccessCode::Ok => "Request completed",
            SuccessCode::UserRegistered => "Your profile was created successfully",
            SuccessCode::UserLoggedIn => "You're logged in",
            SuccessCode::UserProfile => {
                "Profile data from user {{username}} has been retrieved successfully"
            }
            SuccessCode::ReplayRegistered => "Your score was registered successfully",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            SuccessCode::Ok | SuccessCode::UserLoggedIn | SuccessCode::UserProfile => {
                StatusCode::OK
            }
            SuccessCode::UserRegistered | SuccessCode::ReplayRegistered => StatusCode::CREATED,
        }
    }
}

pub struct Reply;

impl Reply {
    pub fn ok<T: Serialize>(data: T) -> Response {
        Self::with(SuccessCode::Ok, data)
    }

    pub fn with<T: Serialize>(code: SuccessCode, data: T) -> Response {
        Self::with_values(code, data, &[])
    }

    pub fn with_values<T: Serialize>(
        code: SuccessCode,
        data: T,
        values: &[(&str, &str)],
    ) -> Response {
        let message = render_template(code.message(), values);
        let data = serde_json::to_value(data).unwrap_or(Value::Null);
        Self::build(code.http_status_code(), code.code(), message, data)
    }

    /// Every reply carries the same envelope; `data` fields (when the value
    /// is an object) are flattened next to it.
    pub fn build(status: StatusCode, code: &'static str, message: String, data: Value) -> Response {
        let name = status_name(status);
        let mut body = Map::new();
        body.insert("statusCode".to_owned(), json!(status.as_u16()));
        body.insert("statusName".to_owned(), json!(name));
        body.insert(
            "statusFullName".to_owned(),
            json!(format!("{} {name}", status.as_u16())),
        );
        body.insert("code".to_owned(), json!(code));
        body.insert("message".to_owned(), json!(message));
        if let Value::Object(fields) = data {
            body.extend(fields);
        }
        (status, Json(Value::Object(body))).into_response()
    }
}

/// Common listing envelope: the page of entries plus totals computed from
/// the same filter.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T: Serialize> {
    pub total_entries: i64,
    pub total_pages: i64,
    pub page: u32,
    pub limit: u32,
    pub entries: Vec<T>,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(total_entries: i64, page: u32, limit: u32, entries: Vec<T>) -> Self {
        let total_pages = (total_entries + limit as i64 - 1) / limit as i64;
        Self {
            total_entries,
            total_pages,
            page,
            limit,
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_rounds_total_pages_up() {
        let page: Paginated<i32> = Paginated::new(51, 1, 25, vec![]);
        assert_eq!(page.total_pages, 3);
        let page: Paginated<i32> = Paginated::new(50, 1, 25, vec![]);
        assert_eq!(page.total_pages, 2);
        let page: Paginated<i32> = Paginated::new(0, 1, 25, vec![]);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn render_template_substitutes_all_flags() {
        let message = render_template(
            "Provided username {{username}} is already being used by {{username}}",
            &[("username", "phantom")],
        );
        assert_eq!(
            message,
            "Provided username phantom is already being used by phantom"
        );
    }

    #[test]
    fn render_template_leaves_unknown_flags_alone() {
        let message = render_template("missing: {{params}}", &[("other", "x")]);
        assert_eq!(message, "missing: {{params}}");
    }

    #[test]
    fn status_names_cover_reply_statuses() {
        assert_eq!(status_name(StatusCode::OK), "OK");
        assert_eq!(
            status_name(StatusCode::UNPROCESSABLE_ENTITY),
            "Unprocessable Entity"
        );
        assert_eq!(status_name(StatusCode::IM_A_TEAPOT), "Unknown");
    }
}
