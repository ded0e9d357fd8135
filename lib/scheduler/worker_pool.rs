//! A fixed-size pool of worker threads fed from one queue.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct PoolState {
	queue: VecDeque<Job>,
	shutdown: bool,
}

struct PoolShared {
	state: Mutex<PoolState>,
	condvar: Condvar,
}

pub struct WorkerPool {
	shared: Arc<PoolShared>,
	threads: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
	pub fn new(num_threads: usize) -> WorkerPool {
		let shared = Arc::new(PoolShared {
			state: Mutex::new(PoolState {
				queue: VecDeque::new(),
				shutdown: false,
			}),
			condvar: Condvar::new(),
		});
		let mut threads = Vec::with_capacity(num_threads);
		for _ in 0..num_threads {
			let shared = shared.clone();
			threads.push(thread::spawn(move || worker_main(&shared)));
		}
		WorkerPool {
			shared,
			threads: Mutex::new(threads),
		}
	}

	pub fn post_task(&self, job: Job) {
		let mut state = self.shared.state.lock().unwrap();
		debug_assert!(!state.shutdown, "post_task after shutdown");
		state.queue.push_back(job);
		drop(state);
		self.shared.condvar.notify_one();
	}

	/// Run the remaining queue to completion and join all threads.
	/// Idempotent; later calls do nothing.
	pub fn shutdown(&self) {
		{
			let mut state = self.shared.state.lock().unwrap();
			state.shutdown = true;
		}
		self.shared.condvar.notify_all();
		let threads: Vec<JoinHandle<()>> = {
			let mut threads = self.threads.lock().unwrap();
			threads.drain(..).collect()
		};
		for thread in threads {
			let _ = thread.join();
		}
	}
}

fn worker_main(shared: &PoolShared) {
	let mut state = shared.state.lock().unwrap();
	loop {
		if let Some(job) = state.queue.pop_front() {
			drop(state);
			job();
			state = shared.state.lock().unwrap();
		} else if state.shutdown {
			break;
		} else {
			state = shared.condvar.wait(state).unwrap();
		}
	}
}
