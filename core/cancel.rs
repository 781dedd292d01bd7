use crate::{TrainError, TrainOptions};
use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	time::Instant,
};

/// A `CancellationToken` lets a caller stop a training run from another thread. Clones share the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Return an error if the run was cancelled or its deadline has passed.
pub(crate) fn check(options: &TrainOptions) -> Result<(), TrainError> {
	if let Some(cancellation) = &options.cancellation {
		if cancellation.is_cancelled() {
			return Err(TrainError::Cancelled);
		}
	}
	if let Some(deadline) = options.deadline {
		if Instant::now() >= deadline {
			return Err(TrainError::DeadlineExceeded);
		}
	}
	Ok(())
}

#[test]
fn test_check() {
	let token = CancellationToken::new();
	let options = TrainOptions {
		cancellation: Some(token.clone()),
		..Default::default()
	};
	assert!(check(&options).is_ok());
	token.cancel();
	assert!(matches!(check(&options), Err(TrainError::Cancelled)));
	let options = TrainOptions {
		deadline: Some(Instant::now()),
		..Default::default()
	};
	assert!(matches!(check(&options), Err(TrainError::DeadlineExceeded)));
}
