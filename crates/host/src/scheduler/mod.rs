use std::time::Duration;

use parking_lot::Mutex;

/// A deferred one-shot unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Deferred one-shot execution.
///
/// Scheduled tasks are fire-and-forget: no handle is returned and they
/// cannot be cancelled.
pub trait Scheduler: Send + Sync {
	fn schedule(&self, delay: Duration, task: Task);
}

/// Virtual-clock scheduler driven explicitly with [`ManualScheduler::advance`].
#[derive(Default)]
pub struct ManualScheduler {
	state: Mutex<Clock>,
}

#[derive(Default)]
struct Clock {
	now: Duration,
	next_seq: u64,
	pending: Vec<Pending>,
}

struct Pending {
	due: Duration,
	seq: u64,
	task: Task,
}

impl ManualScheduler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Virtual time elapsed since creation.
	pub fn now(&self) -> Duration {
		self.state.lock().now
	}

	/// Number of tasks not yet run.
	pub fn pending(&self) -> usize {
		self.state.lock().pending.len()
	}

	/// Moves the clock forward by `by`, running every task that falls due.
	///
	/// Tasks run in due order, ties in scheduling order, with the clock set
	/// to each task's due time. Tasks scheduled while advancing run too if
	/// they fall within the window. Returns how many tasks ran.
	pub fn advance(&self, by: Duration) -> usize {
		let until = self.state.lock().now + by;
		let mut ran = 0;
		loop {
			let task = {
				let mut clock = self.state.lock();
				let next = clock
					.pending
					.iter()
					.enumerate()
					.filter(|(_, p)| p.due <= until)
					.min_by_key(|(_, p)| (p.due, p.seq))
					.map(|(i, _)| i);
				match next {
					Some(index) => {
						let pending = clock.pending.swap_remove(index);
						clock.now = pending.due;
						pending.task
					}
					None => {
						clock.now = until;
						break;
					}
				}
			};
			task();
			ran += 1;
		}
		ran
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&self, delay: Duration, task: Task) {
		let mut clock = self.state.lock();
		let due = clock.now + delay;
		let seq = clock.next_seq;
		clock.next_seq += 1;
		clock.pending.push(Pending { due, seq, task });
		tracing::trace!(?delay, ?due, "task scheduled");
	}
}

/// Scheduler that sleeps on a tokio runtime before running each task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
	handle: tokio::runtime::Handle,
}

impl TokioScheduler {
	pub fn new(handle: tokio::runtime::Handle) -> Self {
		Self { handle }
	}

	/// Binds to the runtime of the calling context, if any.
	pub fn current() -> Option<Self> {
		tokio::runtime::Handle::try_current().ok().map(Self::new)
	}
}

impl Scheduler for TokioScheduler {
	fn schedule(&self, delay: Duration, task: Task) {
		self.handle.spawn(async move {
			tokio::time::sleep(delay).await;
			task();
		});
	}
}
