use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::model::{CollectionName, UserType};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("failed to parse ID: {0}")]
    InvalidId(String),

    #[error("document with ID {id} not found in collection {collection}")]
    NotFound {
        id: String,
        collection: CollectionName,
    },

    #[error("{0} not found")]
    RouteNotFound(Uri),

    #[error("{0} must unique")]
    MustUniqueError(String),

    #[error("user type must be {expected}, got {found}")]
    RoleMismatch { expected: UserType, found: UserType },

    #[error("collection {0} does not exist")]
    UnknownCollection(String),

    #[error("missing {0} parameter")]
    MissingParameter(&'static str),

    #[error("invalid filter format: {0}")]
    InvalidFilter(String),

    #[error("failed to decode request body: {0}")]
    InvalidBody(String),

    #[error("update must set at least one field")]
    EmptyUpdate,

    #[error("field {0} cannot be updated")]
    ImmutableField(String),

    #[error("lookup in collection {0} timed out")]
    Timeout(CollectionName),

    #[error("error retrieving the file")]
    MissingFile,

    #[error("file type not allowed")]
    FileTypeNotAllowed,

    #[error("file size exceeds the maximum allowed size")]
    FileTooLarge,

    #[error("error parsing multipart form: {0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    DatabaseError(#[from] mongodb::error::Error),

    #[error("{0}")]
    BSONSerError(#[from] bson::ser::Error),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<serde_json::Value>,
    r#type: String,
    message: String,
}

impl ErrorJson {
    pub fn r#type(&self) -> &str {
        &self.r#type
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ErrorJson {
    fn from(err: Error) -> Self {
        let r#type = err.to_string_variant();

        // server side failures are logged, not echoed back to the caller
        let message = if err.status().is_server_error() {
            "internal server error".to_string()
        } else {
            err.to_string()
        };

        let errors = match err {
            Error::ValidationError(err) => serde_json::to_value(err).ok(),
            _ => None,
        };

        Self {
            errors,
            message,
            r#type,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("error: {:?}", self);
        } else {
            tracing::debug!("rejected request: {}", self);
        }

        let error = ErrorJson::from(self);

        (status, Json(error)).into_response()
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(..)
            | Self::UnknownCollection(..)
            | Self::MissingParameter(..)
            | Self::InvalidFilter(..)
            | Self::InvalidBody(..)
            | Self::EmptyUpdate
            | Self::ImmutableField(..)
            | Self::MissingFile
            | Self::FileTypeNotAllowed
            | Self::FileTooLarge
            | Self::Multipart(..) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::RouteNotFound(..) => StatusCode::NOT_FOUND,
            Self::MustUniqueError(..) => StatusCode::CONFLICT,
            Self::ValidationError(..) | Self::RoleMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Timeout(..) => StatusCode::GATEWAY_TIMEOUT,
            Self::Io(..) | Self::DatabaseError(..) | Self::BSONSerError(..) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_string_variant(&self) -> String {
        macro_rules! match_var {
            ($id:ident !) => {
                Self::$id
            };
            ($id:ident (..)) => {
                Self::$id(..)
            };
            ($id:ident {..}) => {
                Self::$id { .. }
            };
        }

        macro_rules! variant {
            ($($name:ident $tt:tt),+) => {
                match self {
                    $(
                        match_var!($name $tt) => {
                            stringify!($name)
                       }
                    )+
                }
            };
        }

        variant! {
            ValidationError(..),
            InvalidId(..),
            NotFound{..},
            RouteNotFound(..),
            MustUniqueError(..),
            RoleMismatch{..},
            UnknownCollection(..),
            MissingParameter(..),
            InvalidFilter(..),
            InvalidBody(..),
            EmptyUpdate!,
            ImmutableField(..),
            Timeout(..),
            MissingFile!,
            FileTypeNotAllowed!,
            FileTooLarge!,
            Multipart(..),
            Io(..),
            DatabaseError(..),
            BSONSerError(..)
        }
        .to_string()
    }
}

impl From<JsonRejection> for Error {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidBody(value.body_text())
    }
}
