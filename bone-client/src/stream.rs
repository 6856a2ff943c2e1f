use std::time::Duration;

use bone_rs_protocol::{Position, SyncData};
use futures_core::Stream;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::BoneClient;
use crate::error::ClientError;

/// Poll `sync` repeatedly, threading the position cursor between requests.
///
/// Each item is the cursor returned with that block plus the decoded block.
/// Waits `interval` between requests (`Duration::ZERO` polls back to back).
/// The stream ends after the first error.
pub fn sync_stream<'a, S>(
    client: &'a BoneClient<S>,
    amount: u32,
    start: Position,
    filter: Vec<String>,
    interval: Duration,
) -> impl Stream<Item = Result<(Position, SyncData), ClientError>> + 'a
where
    S: AsyncRead + AsyncWrite + Unpin + 'a,
{
    async_stream::try_stream! {
        let mut position = start;
        loop {
            let (next, data) = client.sync(amount, position, filter.as_slice()).await?;
            position = next;
            yield (next, data);
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> BoneClient<S> {
    /// Borrow this client as a [`Stream`] of `sync` blocks; see [`sync_stream`].
    pub fn sync_stream<F: AsRef<str>>(
        &self,
        amount: u32,
        start: Position,
        filter: &[F],
        interval: Duration,
    ) -> impl Stream<Item = Result<(Position, SyncData), ClientError>> + '_ {
        let filter = filter.iter().map(|f| f.as_ref().to_owned()).collect();
        sync_stream(self, amount, start, filter, interval)
    }
}
