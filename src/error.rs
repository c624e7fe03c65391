/// Errors raised while bringing up or feeding the engine.
///
/// The public control surface mostly swallows these: `initialize()` logs and
/// returns `false`, trigger paths log and skip. They stay typed so callers
/// that want the detail can use the `try_` variants.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no default output device available")]
    NoOutputDevice,

    #[error("failed to query default output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("unsupported output sample format: {0}")]
    UnsupportedSampleFormat(cpal::SampleFormat),

    #[error("render command queue is full")]
    QueueFull,

    #[error("audio engine is not initialized")]
    NotInitialized,

    #[error("audio engine is already initialized")]
    AlreadyInitialized,
}
