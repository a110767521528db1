use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,
    Unauthorized,
    DecodingRequestFailed,
    InternalServerError(&'static str),

    ConversationsNotFound,
    ConversationsNotParticipant,
    ConversationsTooFewParticipants,
    ConversationsUnknownParticipant,

    MessagesNotFound,
    MessagesNotAllowed,
    MessagesNotSender,
    MessagesOwnMessage,
    MessagesEmpty,
    MessagesTooLong,
    MessagesInvalidParent,
    MessagesInvalidFilter,

    NotificationsNotFound,

    SessionsInvalidCredentials,
    SessionsNotFound,

    UsersNotFound,
    UsersEmailTaken,
    UsersInvalidEmail,
    UsersInvalidName,
    UsersInvalidRole,
    UsersPasswordTooShort,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",
            AppError::DecodingRequestFailed => "decoding_request_failed",
            AppError::InternalServerError(_) => "internal_server_error",

            AppError::ConversationsNotFound => "conversations.not_found",
            AppError::ConversationsNotParticipant => "conversations.not_participant",
            AppError::ConversationsTooFewParticipants => "conversations.too_few_participants",
            AppError::ConversationsUnknownParticipant => "conversations.unknown_participant",

            AppError::MessagesNotFound => "messages.not_found",
            AppError::MessagesNotAllowed => "messages.not_allowed",
            AppError::MessagesNotSender => "messages.not_sender",
            AppError::MessagesOwnMessage => "messages.own_message",
            AppError::MessagesEmpty => "messages.empty",
            AppError::MessagesTooLong => "messages.too_long",
            AppError::MessagesInvalidParent => "messages.invalid_parent",
            AppError::MessagesInvalidFilter => "messages.invalid_filter",

            AppError::NotificationsNotFound => "notifications.not_found",

            AppError::SessionsInvalidCredentials => "sessions.invalid_credentials",
            AppError::SessionsNotFound => "sessions.not_found",

            AppError::UsersNotFound => "users.not_found",
            AppError::UsersEmailTaken => "users.email_taken",
            AppError::UsersInvalidEmail => "users.invalid_email",
            AppError::UsersInvalidName => "users.invalid_name",
            AppError::UsersInvalidRole => "users.invalid_role",
            AppError::UsersPasswordTooShort => "users.password_too_short",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "Authentication credentials were not provided.",
            AppError::DecodingRequestFailed => "Failed to decode request",
            AppError::InternalServerError(_) => "An internal server error has occurred.",

            AppError::ConversationsNotFound => "Conversation not found.",
            AppError::ConversationsNotParticipant => {
                "You are not a participant of this conversation."
            }
            AppError::ConversationsTooFewParticipants => {
                "A conversation must include at least two participants."
            }
            AppError::ConversationsUnknownParticipant => {
                "One or more participants do not exist."
            }

            AppError::MessagesNotFound => "Message not found.",
            AppError::MessagesNotAllowed => "Not allowed",
            AppError::MessagesNotSender => "Only the sender can modify this message.",
            AppError::MessagesOwnMessage => "You cannot mark your own message as read.",
            AppError::MessagesEmpty => "The message body may not be blank.",
            AppError::MessagesTooLong => "Your message was too long. It has not been sent.",
            AppError::MessagesInvalidParent => {
                "The parent message does not belong to this conversation."
            }
            AppError::MessagesInvalidFilter => "Invalid message filter.",

            AppError::NotificationsNotFound => "Notification not found.",

            AppError::SessionsInvalidCredentials => "You have entered an invalid email or password.",
            AppError::SessionsNotFound => "Your session has expired. Please log in again.",

            AppError::UsersNotFound => "This user does not exist.",
            AppError::UsersEmailTaken => "A user with this email already exists.",
            AppError::UsersInvalidEmail => "Enter a valid email address.",
            AppError::UsersInvalidName => "First and last name may not be blank.",
            AppError::UsersInvalidRole => "Unknown role.",
            AppError::UsersPasswordTooShort => "Passwords must be at least 8 characters long.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::ConversationsTooFewParticipants
            | AppError::ConversationsUnknownParticipant
            | AppError::MessagesEmpty
            | AppError::MessagesTooLong
            | AppError::MessagesInvalidParent
            | AppError::MessagesInvalidFilter
            | AppError::UsersInvalidEmail
            | AppError::UsersInvalidName
            | AppError::UsersInvalidRole
            | AppError::UsersPasswordTooShort => StatusCode::BAD_REQUEST,

            AppError::Unauthorized
            | AppError::SessionsInvalidCredentials
            | AppError::SessionsNotFound => StatusCode::UNAUTHORIZED,

            AppError::ConversationsNotParticipant
            | AppError::MessagesNotAllowed
            | AppError::MessagesNotSender
            | AppError::MessagesOwnMessage => StatusCode::FORBIDDEN,

            AppError::ConversationsNotFound
            | AppError::MessagesNotFound
            | AppError::NotificationsNotFound
            | AppError::UsersNotFound => StatusCode::NOT_FOUND,

            AppError::UsersEmailTaken => StatusCode::CONFLICT,

            AppError::Unexpected | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
