// Dialog interception
//
// Native confirm dialogs guard every destructive action in the board
// application. The interceptor installs a single `page.on_dialog` handler per
// session and resolves dialogs against an explicitly armed, one-shot
// expectation:
//
//   let ticket = dialogs.arm(DialogDisposition::Accept)?;
//   delete_button.click(None).await?;
//   ticket.settled(budget).await?;
//
// At most one expectation can be pending. Dropping an unsettled ticket
// discards the expectation without error.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use playwright_rs::protocol::{Dialog, Page};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

/// How an armed dialog is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogDisposition {
    /// Press OK
    Accept,
    /// Type into a prompt, then press OK
    AcceptWith(String),
    /// Press Cancel
    Dismiss,
}

/// A dialog that was resolved against an expectation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedDialog {
    /// `alert`, `confirm`, `prompt` or `beforeunload`
    pub kind: String,
    pub message: String,
    pub disposition: DialogDisposition,
}

#[derive(Debug)]
struct Pending {
    token: u64,
    disposition: DialogDisposition,
    resolved: oneshot::Sender<ObservedDialog>,
}

/// The single pending-expectation slot of a session
#[derive(Debug, Default)]
struct DialogSlot {
    pending: Mutex<Option<Pending>>,
    next_token: AtomicU64,
    stray: AtomicUsize,
}

impl DialogSlot {
    fn arm(
        &self,
        disposition: DialogDisposition,
    ) -> Result<(u64, oneshot::Receiver<ObservedDialog>)> {
        let mut pending = self.pending.lock();
        if pending.is_some() {
            return Err(Error::DialogAlreadyArmed);
        }
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        *pending = Some(Pending {
            token,
            disposition,
            resolved: tx,
        });
        Ok((token, rx))
    }

    /// Consumes the pending expectation, if any.
    fn take(&self) -> Option<Pending> {
        self.pending.lock().take()
    }

    /// Clears the slot only if it still holds the expectation `token` armed.
    fn discard(&self, token: u64) -> bool {
        let mut pending = self.pending.lock();
        if pending.as_ref().is_some_and(|p| p.token == token) {
            *pending = None;
            true
        } else {
            false
        }
    }

    fn is_armed(&self) -> bool {
        self.pending.lock().is_some()
    }
}

/// Per-session dialog handler with a one-shot expectation slot
#[derive(Debug, Clone, Default)]
pub struct DialogInterceptor {
    slot: Arc<DialogSlot>,
}

impl DialogInterceptor {
    /// Creates an interceptor and registers its handler on `page`.
    pub async fn install(page: &Page) -> Result<Self> {
        let interceptor = Self::default();
        let slot = Arc::clone(&interceptor.slot);

        page.on_dialog(move |dialog: Dialog| {
            let slot = Arc::clone(&slot);
            async move { resolve(&slot, dialog).await }
        })
        .await?;

        Ok(interceptor)
    }

    /// Registers the disposition for the next dialog.
    ///
    /// Must be called before the action that raises the dialog.
    pub fn arm(&self, disposition: DialogDisposition) -> Result<DialogTicket> {
        let (token, resolved) = self.slot.arm(disposition.clone())?;
        tracing::debug!(?disposition, "dialog expectation armed");
        Ok(DialogTicket {
            slot: Arc::clone(&self.slot),
            token,
            resolved: Some(resolved),
        })
    }

    /// True while an expectation is waiting for its dialog.
    pub fn is_armed(&self) -> bool {
        self.slot.is_armed()
    }

    /// Number of dialogs that arrived with nothing armed (each was dismissed).
    pub fn stray_dialogs(&self) -> usize {
        self.slot.stray.load(Ordering::Relaxed)
    }
}

async fn resolve(slot: &DialogSlot, dialog: Dialog) -> playwright_rs::Result<()> {
    let kind = dialog.type_().to_string();
    let message = dialog.message().to_string();

    let Some(pending) = slot.take() else {
        slot.stray.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(%kind, %message, "dialog arrived with no expectation armed; dismissing");
        return dialog.dismiss().await;
    };

    let outcome = match &pending.disposition {
        DialogDisposition::Accept => dialog.accept(None).await,
        DialogDisposition::AcceptWith(text) => dialog.accept(Some(text.as_str())).await,
        DialogDisposition::Dismiss => dialog.dismiss().await,
    };
    complete(pending, kind, message, outcome)
}

/// Reports a resolution attempt to the waiting ticket.
///
/// On failure the expectation is dropped unsent, so the ticket settles with
/// `DialogTimeout`; the driver error is logged here since only the dialog
/// callback receives it.
fn complete(
    pending: Pending,
    kind: String,
    message: String,
    outcome: playwright_rs::Result<()>,
) -> playwright_rs::Result<()> {
    if let Err(e) = &outcome {
        tracing::warn!(%kind, %message, disposition = ?pending.disposition, error = %e, "failed to resolve armed dialog");
        return outcome;
    }
    tracing::debug!(%kind, %message, disposition = ?pending.disposition, "dialog resolved");

    // The ticket may already be gone; nobody is waiting then.
    let _ = pending.resolved.send(ObservedDialog {
        kind,
        message,
        disposition: pending.disposition,
    });
    Ok(())
}

/// Handle for one armed expectation
#[derive(Debug)]
pub struct DialogTicket {
    slot: Arc<DialogSlot>,
    token: u64,
    resolved: Option<oneshot::Receiver<ObservedDialog>>,
}

impl DialogTicket {
    /// Waits for the armed dialog to be resolved.
    ///
    /// Fails with [`Error::DialogTimeout`] if no dialog arrives within
    /// `budget`; the expectation is discarded in that case.
    pub async fn settled(mut self, budget: Duration) -> Result<ObservedDialog> {
        let Some(resolved) = self.resolved.take() else {
            return Err(Error::DialogTimeout { budget });
        };
        match tokio::time::timeout(budget, resolved).await {
            Ok(Ok(observed)) => Ok(observed),
            // Sender dropped without resolving, or the budget ran out.
            Ok(Err(_)) | Err(_) => Err(Error::DialogTimeout { budget }),
        }
    }
}

impl Drop for DialogTicket {
    fn drop(&mut self) {
        if self.slot.discard(self.token) {
            tracing::debug!("unsettled dialog expectation discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fire(slot: &DialogSlot, kind: &str, message: &str) -> bool {
        match slot.take() {
            Some(pending) => {
                complete(pending, kind.to_string(), message.to_string(), Ok(())).unwrap();
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_only_one_expectation_may_be_pending() {
        let interceptor = DialogInterceptor::default();
        let _ticket = interceptor.arm(DialogDisposition::Accept).unwrap();
        assert!(interceptor.is_armed());
        assert!(matches!(
            interceptor.arm(DialogDisposition::Dismiss),
            Err(Error::DialogAlreadyArmed)
        ));
    }

    #[test]
    fn test_dropping_ticket_discards_expectation() {
        let interceptor = DialogInterceptor::default();
        let ticket = interceptor.arm(DialogDisposition::Accept).unwrap();
        drop(ticket);
        assert!(!interceptor.is_armed());
        interceptor.arm(DialogDisposition::Accept).unwrap();
    }

    #[test]
    fn test_stale_ticket_does_not_clear_newer_expectation() {
        let interceptor = DialogInterceptor::default();
        let first = interceptor.arm(DialogDisposition::Accept).unwrap();
        assert!(fire(&interceptor.slot, "confirm", "삭제하시겠습니까?"));

        let _second = interceptor.arm(DialogDisposition::Dismiss).unwrap();
        drop(first);
        assert!(interceptor.is_armed());
    }

    #[tokio::test]
    async fn test_settled_returns_observed_dialog() {
        let interceptor = DialogInterceptor::default();
        let ticket = interceptor.arm(DialogDisposition::Accept).unwrap();
        assert!(fire(&interceptor.slot, "confirm", "정말 삭제하시겠습니까?"));

        let observed = ticket.settled(Duration::from_secs(1)).await.unwrap();
        assert_eq!(observed.kind, "confirm");
        assert_eq!(observed.message, "정말 삭제하시겠습니까?");
        assert_eq!(observed.disposition, DialogDisposition::Accept);
        assert!(!interceptor.is_armed());
    }

    #[tokio::test]
    async fn test_settled_times_out_without_dialog() {
        let interceptor = DialogInterceptor::default();
        let ticket = interceptor.arm(DialogDisposition::Accept).unwrap();

        let err = ticket
            .settled(Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DialogTimeout { .. }));
        assert!(!interceptor.is_armed(), "timed-out expectation must not linger");
    }

    #[test]
    fn test_unarmed_dialog_is_not_consumed() {
        let interceptor = DialogInterceptor::default();
        assert!(!fire(&interceptor.slot, "confirm", "?"));
    }

    #[tokio::test]
    async fn test_failed_resolution_settles_ticket_immediately() {
        let interceptor = DialogInterceptor::default();
        let ticket = interceptor.arm(DialogDisposition::Accept).unwrap();
        let pending = interceptor.slot.take().unwrap();

        let outcome = complete(
            pending,
            "confirm".into(),
            "삭제하시겠습니까?".into(),
            Err(playwright_rs::Error::ProtocolError("Target page has been closed".into())),
        );
        assert!(outcome.is_err());

        // Sender dropped: no need to wait out the budget
        let started = std::time::Instant::now();
        let err = ticket.settled(Duration::from_secs(10)).await.unwrap_err();
        assert!(matches!(err, Error::DialogTimeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!interceptor.is_armed());
    }
}
