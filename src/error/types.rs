use thiserror::Error;

/// Unified result type for the panel stack crate.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors surfaced by the registry and the transition orchestrator.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("duplicate panel name `{0}`")]
    DuplicatePanelName(String),
    #[error("panel `{0}` not found")]
    PanelNotFound(String),
    #[error("transition {active} still in flight; request for `{requested}` rejected")]
    TransitionInFlight { active: u64, requested: String },
    #[error("transition {transition} stalled at {stage} on panel `{panel}`")]
    StalledTransition {
        transition: u64,
        panel: String,
        stage: String,
    },
    #[error("panel `{0}` lock poisoned")]
    Poisoned(String),
    #[error("invalid stack settings: {0}")]
    Settings(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
