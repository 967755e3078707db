use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::HttpConfig, form::TrackForm, http::error::ApiError, reconcile::FillCounts,
    widget::Widget,
};

/// Exposes the widget to a page integration holding a form snapshot.
pub struct HttpServer {
    widget: Arc<Widget>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(widget: Widget, config: HttpConfig) -> Self {
        Self {
            widget: Arc::new(widget),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let response = if request.method() == "OPTIONS" {
            Response::empty_204().with_status_code(200)
        } else {
            rouille::router!(request,
                (POST) (/fill) => {
                    self.handle_fill(request)
                },
                (GET) (/providers) => {
                    self.handle_providers()
                },
                (GET) (/status) => {
                    Response::json(&StatusResponse {
                        input_enabled: self.widget.is_input_enabled(),
                        feedback: self.widget.feedback(),
                    })
                },
                (GET) (/healthz) => {
                    Response::empty_204().with_status_code(200)
                },
                _ => Response::empty_404()
            )
        };
        let response = Self::with_cors(response);

        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn with_cors(response: Response) -> Response {
        response
            .with_additional_header("Access-Control-Allow-Origin", "*")
            .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .with_additional_header(
                "Access-Control-Allow-Headers",
                "Accept, Content-Type, Content-Length",
            )
    }

    /// returns filled form, or ApiError
    fn fill(&self, request: &Request) -> Result<FillResponse, ApiError> {
        let FillRequest { url, mut form } = rouille::input::json_input::<FillRequest>(request)
            .map_err(|e| ApiError::BadRequest(format!("invalid fill request: {e}")))?;

        let report = self.widget.process_input(&url, &mut form)?;

        Ok(FillResponse {
            provider: report.provider.to_string(),
            kind: report.kind.to_string(),
            total: report.total,
            message: report.message,
            counts: report.counts,
            form,
        })
    }

    fn handle_fill(&self, request: &Request) -> Response {
        match self.fill(request) {
            Ok(body) => Response::json(&body),
            Err(e) => e.into_response(),
        }
    }

    fn handle_providers(&self) -> Response {
        let providers: Vec<ProviderResponse> = self
            .widget
            .registry()
            .providers()
            .map(|provider| ProviderResponse {
                identifier: provider.identifier().to_string(),
                icon: provider.icon().to_string(),
                kinds: provider
                    .supported_kinds()
                    .iter()
                    .map(|kind| kind.to_string())
                    .collect(),
            })
            .collect();
        Response::json(&providers)
    }
}

#[derive(Deserialize)]
struct FillRequest {
    url: String,
    #[serde(default)]
    form: TrackForm,
}

#[derive(Serialize, Deserialize)]
struct FillResponse {
    provider: String,
    kind: String,
    total: usize,
    message: String,
    counts: FillCounts,
    form: TrackForm,
}

/// Lets a page integration poll the feedback line while a fill is running.
#[derive(Serialize, Deserialize)]
struct StatusResponse {
    #[serde(rename = "inputEnabled")]
    input_enabled: bool,
    feedback: String,
}

#[derive(Serialize, Deserialize)]
struct ProviderResponse {
    identifier: String,
    icon: String,
    kinds: Vec<String>,
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
