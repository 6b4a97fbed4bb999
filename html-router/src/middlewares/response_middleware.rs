use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Extension,
};
use common::{
    error::AppError,
    storage::{
        session::{load_corpus, SessionType},
        types::corpus_entry::CorpusEntry,
    },
    utils::template_engine::{ProvidesTemplateEngine, Value},
};
use minijinja::context;
use serde::Serialize;
use tracing::error;

#[derive(Clone, Debug)]
pub enum TemplateKind {
    Full(String),
    Error(StatusCode),
}

#[derive(Clone)]
pub struct TemplateResponse {
    template_kind: TemplateKind,
    context: Value,
}

impl TemplateResponse {
    pub fn new_template<T: Serialize>(name: impl Into<String>, context: T) -> Self {
        Self {
            template_kind: TemplateKind::Full(name.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn error(status: StatusCode, title: &str, description: &str) -> Self {
        let ctx = context! {
            status_code => status.as_u16(),
            title => title,
            description => description
        };
        Self {
            template_kind: TemplateKind::Error(status),
            context: ctx,
        }
    }

    pub fn not_found(description: &str) -> Self {
        Self::error(StatusCode::NOT_FOUND, "Document Not Found", description)
    }

    pub fn server_error() -> Self {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Something went wrong on our end.",
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(StatusCode::BAD_REQUEST, "Bad Request", message)
    }
}

impl IntoResponse for TemplateResponse {
    fn into_response(self) -> Response {
        Extension(self).into_response()
    }
}

/// A document of the session's corpus, as listed on every page.
#[derive(Serialize)]
struct LoadedDocument {
    index: usize,
    file_name: String,
    uploaded_at: String,
}

impl From<&CorpusEntry> for LoadedDocument {
    fn from(entry: &CorpusEntry) -> Self {
        Self {
            index: entry.index(),
            file_name: entry.file_name().to_string(),
            uploaded_at: entry.created_at().format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

#[derive(Serialize)]
struct ContextWrapper {
    loaded_documents: Vec<LoadedDocument>,
    #[serde(flatten)]
    context: HashMap<String, Value>,
}

fn loaded_documents(session: Option<&SessionType>) -> Vec<LoadedDocument> {
    session.map_or_else(Vec::new, |session| {
        load_corpus(session)
            .entries()
            .map(LoadedDocument::from)
            .collect()
    })
}

fn context_to_map(value: &Value) -> Result<HashMap<String, Value>, minijinja::value::ValueKind> {
    match value.kind() {
        minijinja::value::ValueKind::Map => {
            let mut map = HashMap::new();
            if let Ok(keys) = value.try_iter() {
                for key in keys {
                    if let Ok(val) = value.get_item(&key) {
                        map.insert(key.to_string(), val);
                    }
                }
            }
            Ok(map)
        }
        minijinja::value::ValueKind::None | minijinja::value::ValueKind::Undefined => {
            Ok(HashMap::new())
        }
        other => Err(other),
    }
}

/// Renders any `TemplateResponse` a handler returned, adding the session's document list.
pub async fn with_template_response<S>(
    State(state): State<S>,
    req: Request,
    next: Next,
) -> Response
where
    S: ProvidesTemplateEngine + Clone + Send + Sync + 'static,
{
    let session = req.extensions().get::<SessionType>().cloned();

    let response = next.run(req).await;

    let Some(template_response) = response.extensions().get::<TemplateResponse>().cloned() else {
        return response;
    };
    let template_engine = state.template_engine();

    let context_map = match context_to_map(&template_response.context) {
        Ok(map) => map,
        Err(kind) => {
            error!(
                "Template context must be a map or unit, got kind={:?} for template_kind={:?}",
                kind, template_response.template_kind
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response();
        }
    };

    // Read after the handler ran, so a fresh upload is already listed.
    let context = Value::from_serialize(&ContextWrapper {
        loaded_documents: loaded_documents(session.as_ref()),
        context: context_map,
    });

    match &template_response.template_kind {
        TemplateKind::Full(name) => match template_engine.render(name, &context) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("Failed to render template '{}': {:?}", name, e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response()
            }
        },
        TemplateKind::Error(status) => match template_engine.render("errors/error.html", &context)
        {
            Ok(html) => (*status, Html(html)).into_response(),
            Err(e) => {
                error!("Critical: Failed to render 'errors/error.html': {:?}", e);
                (*status, Html(fallback_error())).into_response()
            }
        },
    }
}

#[derive(Debug)]
pub enum HtmlError {
    AppError(AppError),
    TemplateError(String),
}

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self::AppError(err)
    }
}

impl From<minijinja::Error> for HtmlError {
    fn from(err: minijinja::Error) -> Self {
        Self::TemplateError(err.to_string())
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        match self {
            Self::AppError(err) => match err {
                AppError::NotFound(msg) => TemplateResponse::not_found(&msg).into_response(),
                AppError::Validation(msg) => TemplateResponse::bad_request(&msg).into_response(),
                _ => {
                    error!("Internal error: {:?}", err);
                    TemplateResponse::server_error().into_response()
                }
            },
            Self::TemplateError(err) => {
                error!("Template error: {}", err);
                TemplateResponse::server_error().into_response()
            }
        }
    }
}

fn fallback_error() -> String {
    r#"
    <html>
        <body>
            <main class="page">
                <h1>Error</h1>
                <p>Sorry, something went wrong displaying this page.</p>
            </main>
        </body>
    </html>
    "#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_errors_map_to_status_codes() {
        let status_of = |err: AppError| {
            let response = HtmlError::from(err).into_response();
            response
                .extensions()
                .get::<TemplateResponse>()
                .map(|template| template.template_kind.clone())
        };

        assert!(matches!(
            status_of(AppError::NotFound("no document at index 99".into())),
            Some(TemplateKind::Error(StatusCode::NOT_FOUND))
        ));
        assert!(matches!(
            status_of(AppError::Validation("No selected files".into())),
            Some(TemplateKind::Error(StatusCode::BAD_REQUEST))
        ));
        assert!(matches!(
            status_of(AppError::Upstream("timeout".into())),
            Some(TemplateKind::Error(StatusCode::INTERNAL_SERVER_ERROR))
        ));
    }

    #[test]
    fn loaded_document_shows_upload_time() {
        let entry = CorpusEntry::new(
            2,
            "bio.pdf".into(),
            "text".into(),
            "summary".into(),
            "questions".into(),
        );

        let document = LoadedDocument::from(&entry);

        assert_eq!(document.index, 2);
        assert_eq!(document.file_name, "bio.pdf");
        assert_eq!(
            document.uploaded_at,
            entry.created_at().format("%Y-%m-%d %H:%M UTC").to_string()
        );
        assert!(document.uploaded_at.ends_with(" UTC"));
    }

    #[test]
    fn unit_context_becomes_an_empty_map() {
        let map = context_to_map(&Value::from_serialize(())).expect("unit is accepted");

        assert!(map.is_empty());
    }

    #[test]
    fn scalar_context_is_rejected() {
        assert!(context_to_map(&Value::from(3)).is_err());
    }
}
