use std::sync::Arc;

use chrono::{DateTime, Duration, DurationRound, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{error, info, warn};

use gridpost_core::deliver::Delivery;
use gridpost_store::PostStore;

use crate::{
    error::{PublisherError, Result},
    types::{Outcome, PostOutcome, RunReport},
};

/// Periodic publisher: matches due posts and drives delivery through the
/// configured backend.
pub struct PublisherEngine {
    posts: PostStore,
    delivery: Arc<dyn Delivery>,
    interval: std::time::Duration,
}

impl PublisherEngine {
    pub fn new(posts: PostStore, delivery: Arc<dyn Delivery>, interval: std::time::Duration) -> Self {
        Self {
            posts,
            delivery,
            interval,
        }
    }

    /// Main event loop. Ticks on the configured cadence until `shutdown`
    /// broadcasts `true`. The tokio interval tolerates jitter: a late wake
    /// still anchors its window to the wall clock, not the tick count.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(backend = self.delivery.name(), "publisher engine started");

        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.tick(Utc::now()).await {
                        Ok(report) if report.attempted > 0 => {
                            info!(
                                delivered = report.delivered,
                                failed = report.failed,
                                skipped = report.skipped,
                                "publish run complete"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => error!("publisher tick error: {e}"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("publisher engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One matcher run anchored at `now`.
    ///
    /// Loads every unpublished post (publish status is the only stored
    /// filter — absolute "now" differs per owner timezone), selects those
    /// due before the end of the current minute window in their owner's
    /// zone, and claim-then-delivers each. A failed delivery releases the
    /// claim; one post's failure never aborts the rest of the run.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let window_start = now
            .duration_trunc(Duration::minutes(1))
            .map_err(|e| PublisherError::Window(e.to_string()))?;
        let window_end = window_start + Duration::minutes(1);
        let mut report = RunReport::new(window_start, window_end);

        // Read errors propagate: without data the run cannot proceed.
        let pending = self.posts.pending_with_accounts()?;

        for (post, account) in pending {
            let tz: Tz = match account.timezone.parse() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        owner = %account.username,
                        timezone = %account.timezone,
                        "unknown account timezone — evaluating window in UTC"
                    );
                    chrono_tz::UTC
                }
            };

            // Due = scheduled strictly before the window end, compared in
            // the owner's local representation. Anything older than the
            // window is still eligible; its delivery failed or the daemon
            // was down, and "due and unpublished" is what counts.
            if post.scheduled_at.with_timezone(&tz) >= window_end.with_timezone(&tz) {
                continue;
            }
            report.attempted += 1;

            // Claim before delivering. Losing the claim means another run
            // already owns this post — never a second delivery call.
            match self.posts.claim(&post.id) {
                Ok(true) => {}
                Ok(false) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(post_id = %post.id, "claim failed: {e}");
                    report.failed += 1;
                    report.outcomes.push(PostOutcome {
                        post_id: post.id.clone(),
                        owner: post.owner.clone(),
                        outcome: Outcome::Failed {
                            error: e.to_string(),
                        },
                    });
                    continue;
                }
            }

            match self.delivery.deliver(&account, &post.content).await {
                Ok(remote_id) => {
                    info!(
                        post_id = %post.id,
                        owner = %account.username,
                        %remote_id,
                        "post published"
                    );
                    report.delivered += 1;
                    report.outcomes.push(PostOutcome {
                        post_id: post.id,
                        owner: post.owner,
                        outcome: Outcome::Delivered { remote_id },
                    });
                }
                Err(e) => {
                    warn!(post_id = %post.id, owner = %account.username, "delivery failed: {e}");
                    // Put the post back so the next run retries it.
                    if let Err(release_err) = self.posts.release(&post.id) {
                        error!(
                            post_id = %post.id,
                            "release after failed delivery also failed — post stuck published: {release_err}"
                        );
                    }
                    report.failed += 1;
                    report.outcomes.push(PostOutcome {
                        post_id: post.id,
                        owner: post.owner,
                        outcome: Outcome::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(report)
    }
}
