//! Batch fetch seam used by the refresh controller.

use crate::client::ApiClient;
use satvis_core::{BatchResult, RequestSpec};
use std::future::Future;
use std::sync::Arc;

/// Something that can execute a batch of category requests.
///
/// Implemented by [`ApiClient`]; tests substitute scripted fetchers.
pub trait BatchFetcher: Send + Sync + 'static {
    fn fetch_batch(&self, requests: &[RequestSpec]) -> impl Future<Output = BatchResult> + Send;
}

impl BatchFetcher for ApiClient {
    fn fetch_batch(&self, requests: &[RequestSpec]) -> impl Future<Output = BatchResult> + Send {
        self.batch(requests)
    }
}

impl<T: BatchFetcher> BatchFetcher for Arc<T> {
    fn fetch_batch(&self, requests: &[RequestSpec]) -> impl Future<Output = BatchResult> + Send {
        (**self).fetch_batch(requests)
    }
}
