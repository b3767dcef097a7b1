use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Remote service error: {0}")]
    Remote(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone)]
pub struct ResolutionMessage {
    pub message: String,
    pub source: Option<String>,
}

impl ResolutionMessage {
    pub fn new(message: impl Into<String>, source: Option<String>) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }
}

/// Record of branches the resolver skipped instead of failing on. Only the
/// root template is allowed to abort a resolution; everything downstream
/// degrades to a warning here.
#[derive(Debug, Default, Clone)]
pub struct ResolutionState {
    warnings: Vec<ResolutionMessage>,
}

impl ResolutionState {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>, source: Option<String>) {
        self.warnings.push(ResolutionMessage::new(message, source));
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn get_warnings(&self) -> &[ResolutionMessage] {
        &self.warnings
    }
}
