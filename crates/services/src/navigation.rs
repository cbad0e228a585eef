use async_trait::async_trait;

use crate::error::NavigationError;

/// Moves the user to the results view once a survey has been submitted.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Called exactly once per successful submission, after both results are persisted.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` if the results view cannot be shown.
    async fn navigate_to_results(&self) -> Result<(), NavigationError>;
}
