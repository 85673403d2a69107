//! Bounded condition waits
//!
//! Poll an observable signal until it holds or the bound runs out.

use std::future::Future;
use std::time::Duration;

use crate::browser::Page;
use crate::core::{ArchiverError, Result};

/// Run `fut` with an upper bound, mapping expiry to a timeout error
pub async fn bounded<T, Fut>(what: &str, bound: Duration, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(bound, fut).await {
        Ok(result) => result,
        Err(_) => Err(ArchiverError::timeout(what, bound)),
    }
}

/// Poll `check` every `interval` until it yields `Some`, bounded by `bound`.
///
/// Errors from `check` end the wait immediately.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    bound: Duration,
    interval: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let polling = async {
        loop {
            if let Some(value) = check().await? {
                return Ok(value);
            }
            tokio::time::sleep(interval).await;
        }
    };

    bounded(what, bound, polling).await
}

/// Wait for the page URL to differ from `from` and return the new URL
pub async fn wait_for_url_change<P>(
    page: &P,
    from: &str,
    bound: Duration,
    interval: Duration,
) -> Result<String>
where
    P: Page + ?Sized,
{
    poll_until("URL change", bound, interval, move || async move {
        let url = page.current_url().await?;
        Ok((url != from).then_some(url))
    })
    .await
}
