//! Errors returned by session actions.

use backend::BackendError;

/// Returned by the actions that re-raise after recording the failure in
/// state (`sign_in`, `sign_up`, `send_magic_link`, `update_profile`).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}
