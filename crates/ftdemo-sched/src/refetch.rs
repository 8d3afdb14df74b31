//! Re-fetching of jobs that timed out.

use tracing::{debug, info, instrument};

use ftdemo_hal::{Backend, JobStatus};

use crate::error::SchedResult;
use crate::handler::write_dump;
use crate::idlist::{append_id, read_ids, write_ids};
use crate::layout::DataLayout;

/// Query every job listed in `list` once.
///
/// Completed jobs get an API dump and move to `completed_<list>`; the
/// others stay listed. Returns the number of jobs newly fetched.
#[instrument(skip(backend, layout))]
pub async fn refetch_pending<B: Backend + ?Sized>(backend: &B, layout: &DataLayout, list: &str) -> SchedResult<usize> {
    let path = layout.id_list(list);
    let ids = read_ids(&path).await?;
    let mut still_pending = Vec::new();
    let mut fetched = 0;

    for id in ids {
        match backend.status(&id).await? {
            JobStatus::Completed => {
                let result = backend.result(&id).await?;
                write_dump(layout, &result).await?;
                append_id(&layout.refetched_list(list), &id).await?;
                fetched += 1;
                debug!(job = %id, "re-fetched job");
            }
            status => {
                debug!(job = %id, %status, "job still not available");
                still_pending.push(id);
            }
        }
    }

    write_ids(&path, &still_pending).await?;
    info!(fetched, pending = still_pending.len(), "re-fetch pass finished");
    Ok(fetched)
}
