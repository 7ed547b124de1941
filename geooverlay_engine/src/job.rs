use crate::{ComposeRequest, ComposedFrame, compose};
use anyhow::Result;
use geooverlay_raster::RasterSource;
use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};
use tokio::{
	runtime::Handle,
	sync::oneshot::{self, error::TryRecvError},
};

/// Shared flag telling a running recomposition to give up.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

pub(crate) type JobResult = Result<Option<ComposedFrame>>;

/// A recomposition running on the blocking pool of a tokio runtime.
///
/// The result comes back over a oneshot channel tagged with the generation
/// the job was started for.
#[derive(Debug)]
pub(crate) struct RecomposeJob {
	generation: u64,
	cancel: CancelToken,
	receiver: oneshot::Receiver<JobResult>,
}

impl RecomposeJob {
	pub fn spawn(runtime: &Handle, source: Arc<dyn RasterSource>, request: ComposeRequest, generation: u64) -> Self {
		let (sender, receiver) = oneshot::channel();
		let cancel = CancelToken::new();
		let token = cancel.clone();
		log::trace!("spawning recomposition #{generation} for {:?}", request.target);
		runtime.spawn_blocking(move || {
			let result = compose(source.as_ref(), &request, &token);
			if sender.send(result).is_err() {
				log::trace!("recomposition #{generation} finished after its receiver was dropped");
			}
		});
		Self {
			generation,
			cancel,
			receiver,
		}
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Non-blocking check for the result. `None` while the job is running.
	pub fn try_finish(&mut self) -> Option<JobResult> {
		match self.receiver.try_recv() {
			Ok(result) => Some(result),
			Err(TryRecvError::Empty) => None,
			Err(TryRecvError::Closed) => Some(Err(anyhow::anyhow!(
				"recomposition #{} ended without a result",
				self.generation
			))),
		}
	}

	/// Waits for the result.
	pub async fn finish(&mut self) -> JobResult {
		match (&mut self.receiver).await {
			Ok(result) => result,
			Err(_) => Err(anyhow::anyhow!("recomposition #{} ended without a result", self.generation)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use geooverlay_core::ScreenSize;
	use geooverlay_image::ResampleFilter;
	use geooverlay_raster::MemoryRaster;
	use image::GenericImageView;

	fn request() -> ComposeRequest {
		ComposeRequest {
			target: ScreenSize::new(6, 3),
			filter: ResampleFilter::Bilinear,
			max_buffer_dimension: 8192,
		}
	}

	#[test]
	fn token_is_shared() {
		let token = CancelToken::new();
		let clone = token.clone();
		assert!(!clone.is_cancelled());
		token.cancel();
		assert!(clone.is_cancelled());
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn job_delivers_frame() {
		let source: Arc<dyn RasterSource> = Arc::new(MemoryRaster::filled("a.tif", 2, 1, &[9]));
		let mut job = RecomposeJob::spawn(&Handle::current(), source, request(), 7);
		assert_eq!(job.generation(), 7);
		let frame = job.finish().await.unwrap().unwrap();
		assert_eq!(frame.image.dimensions(), (6, 3));
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn cancelled_job_delivers_nothing() {
		let raster = Arc::new(MemoryRaster::filled("a.tif", 2, 1, &[9]));
		let source: Arc<dyn RasterSource> = raster.clone();
		let cancel = CancelToken::new();
		cancel.cancel();
		let result = tokio::task::spawn_blocking(move || compose(source.as_ref(), &request(), &cancel))
			.await
			.unwrap();
		assert!(result.unwrap().is_none());
		assert_eq!(raster.reads(), 0);
	}
}
