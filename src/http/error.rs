use rouille::Response;

use crate::{feedback, widget::WidgetError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Busy(String),
    Unprocessable(String),
    BadGateway(String),
    Internal(String),
}

impl From<WidgetError> for ApiError {
    fn from(err: WidgetError) -> Self {
        let message = err.user_message().to_string();
        match err {
            WidgetError::Busy => ApiError::Busy(message),
            WidgetError::EmptyInput | WidgetError::UnsupportedUrl(_) => {
                ApiError::Unprocessable(message)
            }
            WidgetError::Fetch(_) => ApiError::BadGateway(message),
            WidgetError::Reconcile(_) => ApiError::Internal(feedback::ERROR_NOTIFICATION.into()),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Busy(_) => 409,
            ApiError::Unprocessable(_) => 422,
            ApiError::BadGateway(_) => 502,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Busy(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::BadGateway(msg)
            | ApiError::Internal(msg) => Response::text(msg).with_status_code(status),
        }
    }
}
