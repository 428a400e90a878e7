use async_trait::async_trait;

use super::SessionEvent;

/// Handles session events asynchronously.
///
/// # Example
///
/// ```rust,ignore
/// use pantry::events::{Listener, SessionEvent};
/// use async_trait::async_trait;
///
/// struct AnalyticsListener;
///
/// #[async_trait]
/// impl Listener for AnalyticsListener {
///     async fn handle(&self, event: &SessionEvent) {
///         if let SessionEvent::LoginFailed { code, .. } = event {
///             // count failed sign-ins per code
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Called for every dispatched event. Match on the variant to filter.
    ///
    /// Runs while the manager's transition is still in progress, so calling
    /// back into the [`SessionManager`](crate::SessionManager) from here
    /// waits forever.
    async fn handle(&self, event: &SessionEvent);
}
