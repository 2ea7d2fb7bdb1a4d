use crate::models::replies::{Reply, render_template};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse = ServiceResult<Response>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,
    /// Same class as `Unexpected` but carries diagnostic detail into the
    /// reply body. Only constructed when dev mode is on.
    UnexpectedDetailed(String),
    InvalidInput,
    /// 0: comma separated names of the missing/invalid parameters
    InvalidQuery(String),
    EmptyBody,

    AuthRequired,
    AuthInvalidFormat,
    AuthInvalidToken,
    AuthAdminRequired,

    UsersNotFound,
    UsersInactive,
    /// 0: the username that was already taken
    UsersDuplicateUsername(String),
    UsersDuplicateEmail,
    UsersUsernameTooSmall,
    UsersUsernameTooBig,
    UsersUsernameHasSpaces,
    UsersUsernameForbiddenSymbols,
    UsersUsernameBadEdges,
    UsersPasswordTooSmall,
    UsersPasswordTooBig,
    UsersPasswordNoLowercase,
    UsersPasswordNoUppercase,
    UsersPasswordNoNumber,
    UsersPasswordNoSpecialChar,
    UsersInvalidEmail,
    /// 0: the username that is not registered
    UsersLoginNotFound(String),
    UsersLoginPasswordMismatch,

    EmailTokensInvalid,

    ReplaysNoReqType,
    ReplaysNoFileUploaded,
    ReplaysDuplicateScore,
    ReplaysInvalidReplayMagic,
    ReplaysInvalidMidiMagic,
    ReplaysInvalidChartMagic,
    ReplaysSongDataRequired,
    /// 0: checksum claimed by the replay, 1: checksum of the uploaded chart
    ReplaysSongHashMismatch(String, String),
    ReplaysNoNotesHit,
    ReplaysNoValidPlayers,

    SongsNotFound,
    SongsDuplicate,
    SongsDataRequired,

    ScoresNotFound,

    AdminUserAlreadyInState,

    FilesNotFound,
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
            AppError::Unexpected | AppError::UnexpectedDetailed(_) => "err_unknown",
            AppError::InvalidInput => "err_invalid_input",
            AppError::InvalidQuery(_) => "err_invalid_query",
            AppError::EmptyBody => "err_empty_json_body",

            AppError::AuthRequired => "err_auth_required",
            AppError::AuthInvalidFormat => "err_invalid_auth_format",
            AppError::AuthInvalidToken => "err_invalid_auth",
            AppError::AuthAdminRequired => "err_admin_required",

            AppError::UsersNotFound => "err_user_notfound",
            AppError::UsersInactive => "err_login_user_inactive",
            AppError::UsersDuplicateUsername(_) => "err_user_register_duplicated_username",
            AppError::UsersDuplicateEmail => "err_user_register_duplicated_email",
            AppError::UsersUsernameTooSmall => "err_user_register_username_toosmall",
            AppError::UsersUsernameTooBig => "err_user_register_username_toobig",
            AppError::UsersUsernameHasSpaces => "err_user_register_username_nospace",
            AppError::UsersUsernameForbiddenSymbols => "err_user_register_username_invalid_type1",
            AppError::UsersUsernameBadEdges => "err_user_register_username_invalid_type2",
            AppError::UsersPasswordTooSmall => "err_user_register_password_toosmall",
            AppError::UsersPasswordTooBig => "err_user_register_password_toobig",
            AppError::UsersPasswordNoLowercase => "err_user_register_password_nolowercase",
            AppError::UsersPasswordNoUppercase => "err_user_register_password_nouppercase",
            AppError::UsersPasswordNoNumber => "err_user_register_password_nonumber",
            AppError::UsersPasswordNoSpecialChar => "err_user_register_password_nospecialchar",
            AppError::UsersInvalidEmail => "err_user_register_invalid_email",
            AppError::UsersLoginNotFound(_) => "err_login_user_notfound",
            AppError::UsersLoginPasswordMismatch => "err_login_password_validation",

            AppError::EmailTokensInvalid => "err_invalid_auth_token",

            AppError::ReplaysNoReqType => "err_replay_register_no_reqtype",
            AppError::ReplaysNoFileUploaded => "err_replay_no_replay_uploaded",
            AppError::ReplaysDuplicateScore => "err_replay_duplicated_score",
            AppError::ReplaysInvalidReplayMagic => "err_replay_invalid_replay_file",
            AppError::ReplaysInvalidMidiMagic => "err_replay_invalid_midi_file",
            AppError::ReplaysInvalidChartMagic => "err_replay_invalid_chart_file",
            AppError::ReplaysSongDataRequired => "err_replay_songdata_required",
            AppError::ReplaysSongHashMismatch(_, _) => "err_replay_songhash_nomatch",
            AppError::ReplaysNoNotesHit => "err_replay_no_notes_hit",
            AppError::ReplaysNoValidPlayers => "err_replay_no_valid_players",

            AppError::SongsNotFound => "err_song_notfound",
            AppError::SongsDuplicate => "err_song_duplicated_song",
            AppError::SongsDataRequired => "err_song_songdata_required",

            AppError::ScoresNotFound => "err_score_notfound",

            AppError::AdminUserAlreadyInState => "err_admin_user_already_in_state",

            AppError::FilesNotFound => "err_file_notfound",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected | AppError::UnexpectedDetailed(_) => {
                "An unknown error occurred, please try again later"
            }
            AppError::InvalidInput => {
                "Some request validation method on the server declined your request due to validation errors on fields"
            }
            AppError::InvalidQuery(_) => "Required parameters missing or invalid: {{params}}",
            AppError::EmptyBody => {
                "Body cannot be empty when content-type is set to 'application/json'"
            }

            AppError::AuthRequired => "No authorization string found on request headers",
            AppError::AuthInvalidFormat => {
                "Invalid authorization string format found on request headers"
            }
            AppError::AuthInvalidToken => {
                "The provided authorization token is not valid. Please logout this session, validate a new login and try again"
            }
            AppError::AuthAdminRequired => {
                "You do not have sufficient privileges to perform this action"
            }

            AppError::UsersNotFound => "This user does not exist",
            AppError::UsersInactive => {
                "The registered user has been deactivated and is unable to login"
            }
            AppError::UsersDuplicateUsername(_) => {
                "Provided username {{username}} is already being used"
            }
            AppError::UsersDuplicateEmail => "Provided email address is already being used",
            AppError::UsersUsernameTooSmall => "Provided username must have at least 3 characters",
            AppError::UsersUsernameTooBig => "Provided username can't have more than 32 characters",
            AppError::UsersUsernameHasSpaces => "Provided username can't have space characters",
            AppError::UsersUsernameForbiddenSymbols => {
                "Provided username is not valid due to forbidden symbols: # % +"
            }
            AppError::UsersUsernameBadEdges => {
                "Provided username can't start or end with period, underscore, or hyphen"
            }
            AppError::UsersPasswordTooSmall => "Provided password must have at least 8 characters",
            AppError::UsersPasswordTooBig => "Provided password can't have more than 48 characters",
            AppError::UsersPasswordNoLowercase => {
                "Provided password must contain at least one lowercase character"
            }
            AppError::UsersPasswordNoUppercase => {
                "Provided password must contain at least one uppercase character"
            }
            AppError::UsersPasswordNoNumber => {
                "Provided password must contain at least one numeric digit"
            }
            AppError::UsersPasswordNoSpecialChar => {
                "Provided password must contain at least one special character"
            }
            AppError::UsersInvalidEmail => "Provided email address is not valid",
            AppError::UsersLoginNotFound(_) => "The provided username {{username}} is not registered",
            AppError::UsersLoginPasswordMismatch => {
                "The provided password and the registered user's password don't match"
            }

            AppError::EmailTokensInvalid => {
                "The provided token is invalid, expired or has already been used"
            }

            AppError::ReplaysNoReqType => "No reqType provided for replay registering",
            AppError::ReplaysNoFileUploaded => {
                "No replay file provided on the request body to register"
            }
            AppError::ReplaysDuplicateScore => "Provided replay file has already been registered",
            AppError::ReplaysInvalidReplayMagic => "Provided replay file is invalid",
            AppError::ReplaysInvalidMidiMagic => "Provided MIDI file is invalid",
            AppError::ReplaysInvalidChartMagic => "Provided chart file is invalid",
            AppError::ReplaysSongDataRequired => {
                "The chart and song metadata files of the song are required to validate this replay"
            }
            AppError::ReplaysSongHashMismatch(_, _) => {
                "The provided chart file can't validate the provided replay file"
            }
            AppError::ReplaysNoNotesHit => "The provided replay did not hit any notes",
            AppError::ReplaysNoValidPlayers => {
                "The provided replay has no players with a supported engine"
            }

            AppError::SongsNotFound => "Song could not be found",
            AppError::SongsDuplicate => "Provided chart file has already been registered",
            AppError::SongsDataRequired => {
                "The chart and song metadata files are required to register a song"
            }

            AppError::ScoresNotFound => "Score could not be found",

            AppError::AdminUserAlreadyInState => "User already in requested active state",

            AppError::FilesNotFound => "Requested file could not be found",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput
            | AppError::InvalidQuery(_)
            | AppError::EmptyBody
            | AppError::UsersUsernameTooSmall
            | AppError::UsersUsernameTooBig
            | AppError::UsersUsernameHasSpaces
            | AppError::UsersUsernameForbiddenSymbols
            | AppError::UsersUsernameBadEdges
            | AppError::UsersPasswordTooSmall
            | AppError::UsersPasswordTooBig
            | AppError::UsersPasswordNoLowercase
            | AppError::UsersPasswordNoUppercase
            | AppError::UsersPasswordNoNumber
            | AppError::UsersPasswordNoSpecialChar
            | AppError::UsersInvalidEmail
            | AppError::UsersLoginNotFound(_)
            | AppError::ReplaysNoReqType
            | AppError::ReplaysNoFileUploaded
            | AppError::ReplaysNoNotesHit
            | AppError::ReplaysNoValidPlayers
            | AppError::SongsDataRequired
            | AppError::AdminUserAlreadyInState => StatusCode::BAD_REQUEST,

            AppError::AuthRequired
            | AppError::AuthInvalidFormat
            | AppError::AuthInvalidToken
            | AppError::UsersInactive
            | AppError::UsersLoginPasswordMismatch
            | AppError::EmailTokensInvalid => StatusCode::UNAUTHORIZED,

            AppError::AuthAdminRequired => StatusCode::FORBIDDEN,

            AppError::UsersNotFound
            | AppError::SongsNotFound
            | AppError::ScoresNotFound
            | AppError::FilesNotFound => StatusCode::NOT_FOUND,

            AppError::ReplaysSongDataRequired => StatusCode::NOT_ACCEPTABLE,

            AppError::UsersDuplicateUsername(_)
            | AppError::UsersDuplicateEmail
            | AppError::ReplaysDuplicateScore
            | AppError::SongsDuplicate => StatusCode::CONFLICT,

            AppError::ReplaysInvalidReplayMagic
            | AppError::ReplaysInvalidMidiMagic
            | AppError::ReplaysInvalidChartMagic
            | AppError::ReplaysSongHashMismatch(_, _) => StatusCode::UNPROCESSABLE_ENTITY,

            AppError::Unexpected | AppError::UnexpectedDetailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn rendered_message(&self) -> String {
        match self {
            AppError::InvalidQuery(params) => {
                render_template(self.message(), &[("params", params.as_str())])
            }
            AppError::UsersDuplicateUsername(username)
            | AppError::UsersLoginNotFound(username) => {
                render_template(self.message(), &[("username", username.as_str())])
            }
            _ => self.message().to_owned(),
        }
    }

    fn data(&self) -> serde_json::Value {
        match self {
            AppError::UnexpectedDetailed(detail) => json!({ "error": detail }),
            AppError::ReplaysSongHashMismatch(song_hash, chart_file_hash) => {
                json!({ "songHash": song_hash, "chartFileHash": chart_file_hash })
            }
            _ => serde_json::Value::Null,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Reply::build(
            self.http_status_code(),
            self.code(),
            self.rendered_message(),
            self.data(),
        )
    }
}
