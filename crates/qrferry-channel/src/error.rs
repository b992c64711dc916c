/// Errors that can occur at the optical channel boundary.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel is gone: the camera feed stopped or the display
    /// surface was torn down.
    #[error("optical channel closed: {0}")]
    Closed(String),

    /// Rendering the code failed.
    #[error("display failed: {0}")]
    DisplayFailed(String),
}
