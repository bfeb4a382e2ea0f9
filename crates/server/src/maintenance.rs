//! One-off maintenance tasks run from the command line.

use portrait_core::rewrite_legacy_url;
use portrait_store::{PortraitRepository, RepositoryError};
use tracing::{debug, info};

/// Outcome of [`rewrite_urls`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Records whose URL was rewritten.
    pub rewritten: usize,
    /// Records left alone (already rewritten or foreign).
    pub skipped: usize,
}

/// Rewrite every record whose `image_url` points straight at storage
/// (`<legacy_base>/<key>`) into the retrieval-route form
/// (`<public_base>/<key>`). Timestamps are not touched.
///
/// With `dry_run` set, nothing is written but the summary is still computed.
pub async fn rewrite_urls(
    repository: &dyn PortraitRepository,
    legacy_base: &str,
    public_base: &str,
    dry_run: bool,
) -> Result<RewriteSummary, RepositoryError> {
    let mut summary = RewriteSummary::default();

    for record in repository.list_all().await? {
        let Some(new_url) = rewrite_legacy_url(&record.image_url, legacy_base, public_base) else {
            debug!(address = %record.address, url = %record.image_url, "skipping");
            summary.skipped += 1;
            continue;
        };

        info!(address = %record.address, from = %record.image_url, to = %new_url, dry_run, "rewriting image url");
        if !dry_run {
            repository.set_image_url(&record.address, &new_url).await?;
        }
        summary.rewritten += 1;
    }

    Ok(summary)
}
