//! The process-wide coordinator for emission.
//!
//! The scheduler owns the worker pool that runs one task per target, the
//! main-thread message loop that serializes logging and failure output, a
//! work-count refcount that decides when the message loop stops, and the
//! registries the front-end and the validation passes read back after the
//! pool drains.
//!
//! Ordering guarantees: [`log`][Scheduler::log] and
//! [`fail_with_error`][Scheduler::fail_with_error] are serialized through
//! the message loop. The recorders promise only that every mutation is
//! visible once [`wait_for_pool_tasks`][Scheduler::wait_for_pool_tasks]
//! returns.

mod msg_loop;
mod worker_pool;

use self::msg_loop::MsgLoop;
use self::worker_pool::WorkerPool;
use crate::error::Error;
use crate::label::Label;
use crate::output_file::OutputFile;
use crate::source_file::SourceFile;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

#[derive(Default)]
struct SchedulerState {
	first_error: Option<Error>,
	gen_dependencies: Vec<PathBuf>,
	written_files: Vec<SourceFile>,
	write_runtime_deps_targets: Vec<Label>,
	generated_files: Vec<(OutputFile, Label)>,
	unknown_generated_inputs: Vec<(SourceFile, Label)>,
}

/// Tracks in-flight pool tasks and signals drain. Shared with the tasks
/// themselves, which may outlive a borrow of the scheduler.
struct PoolCounter {
	count: AtomicI32,
	lock: Mutex<()>,
	condvar: Condvar,
}

pub struct Scheduler {
	msg_loop: MsgLoop,
	pool: WorkerPool,
	/// Things left to do before the process may exit. Reaching zero stops
	/// the message loop.
	work_count: AtomicI32,
	pool_counter: Arc<PoolCounter>,
	failed: AtomicBool,
	verbose_logging: AtomicBool,
	suppress_output_for_testing: AtomicBool,
	state: Mutex<SchedulerState>,
}

impl Scheduler {
	pub fn new() -> Arc<Scheduler> {
		let num_threads = thread::available_parallelism().map(|n| n.get()).unwrap_or(8);
		Scheduler::with_num_threads(num_threads)
	}

	pub fn with_num_threads(num_threads: usize) -> Arc<Scheduler> {
		Arc::new(Scheduler {
			msg_loop: MsgLoop::new(),
			pool: WorkerPool::new(num_threads),
			work_count: AtomicI32::new(0),
			pool_counter: Arc::new(PoolCounter {
				count: AtomicI32::new(0),
				lock: Mutex::new(()),
				condvar: Condvar::new(),
			}),
			failed: AtomicBool::new(false),
			verbose_logging: AtomicBool::new(false),
			suppress_output_for_testing: AtomicBool::new(false),
			state: Mutex::new(SchedulerState::default()),
		})
	}

	/// Run the message loop until the work count reaches zero. Returns
	/// whether emission succeeded.
	pub fn run(&self) -> bool {
		self.msg_loop.run();
		!self.is_failed()
	}

	pub fn is_failed(&self) -> bool {
		self.failed.load(Ordering::SeqCst)
	}

	pub fn set_verbose_logging(&self, verbose: bool) {
		self.verbose_logging.store(verbose, Ordering::SeqCst);
	}

	pub fn verbose_logging(&self) -> bool {
		self.verbose_logging.load(Ordering::SeqCst)
	}

	pub fn suppress_output_for_testing(&self, suppress: bool) {
		self.suppress_output_for_testing.store(suppress, Ordering::SeqCst);
	}

	/// Submit a task to the worker pool. Tasks run in parallel with each
	/// other and with the caller.
	pub fn schedule_work(&self, work: impl FnOnce() + Send + 'static) {
		self.pool_counter.count.fetch_add(1, Ordering::SeqCst);
		let counter = Arc::clone(&self.pool_counter);
		self.pool.post_task(Box::new(move || {
			work();
			if counter.count.fetch_sub(1, Ordering::SeqCst) == 1 {
				let _lock = counter.lock.lock().unwrap();
				counter.condvar.notify_all();
			}
		}));
	}

	/// Block until every task submitted via
	/// [`schedule_work`][Self::schedule_work] has finished.
	pub fn wait_for_pool_tasks(&self) {
		let mut lock = self.pool_counter.lock.lock().unwrap();
		while self.pool_counter.count.load(Ordering::SeqCst) != 0 {
			lock = self.pool_counter.condvar.wait(lock).unwrap();
		}
	}

	pub fn increment_work_count(&self) {
		self.work_count.fetch_add(1, Ordering::SeqCst);
	}

	pub fn decrement_work_count(&self) {
		if self.work_count.fetch_sub(1, Ordering::SeqCst) == 1 {
			self.msg_loop.post_quit();
		}
	}

	/// Print a verb/message pair on the main thread. Suppressed in testing
	/// mode; callers gate on [`verbose_logging`][Self::verbose_logging].
	pub fn log(&self, verb: &str, msg: &str) {
		if self.suppress_output_for_testing.load(Ordering::SeqCst) {
			return;
		}
		let line = format!("{} {}", verb, msg);
		self.msg_loop.post_task(move || {
			println!("{}", line);
		});
	}

	/// Record a failure. Only the first error is kept and reported; later
	/// calls set nothing but the flag, which is already set.
	pub fn fail_with_error(&self, err: Error) {
		if self.failed.swap(true, Ordering::SeqCst) {
			return;
		}
		{
			let mut state = self.state.lock().unwrap();
			state.first_error = Some(err.clone());
		}
		if !self.suppress_output_for_testing.load(Ordering::SeqCst) {
			self.msg_loop.post_task(move || {
				eprintln!("{}", err);
			});
		}
	}

	/// The error that marked the scheduler failed, if any.
	pub fn first_error(&self) -> Option<Error> {
		self.state.lock().unwrap().first_error.clone()
	}

	/// Run the remaining pool queue and join the worker threads. Idempotent,
	/// and safe to call from drop paths of tests that never ran the loop.
	pub fn shutdown(&self) {
		self.pool.shutdown();
	}

	// Recorders. Each is guarded by the scheduler lock; getters return
	// sorted snapshot copies so emission that consumes them is
	// deterministic.

	/// Declare that reading `path` affected the build output. Callers pass
	/// absolute paths; values are stored verbatim.
	pub fn add_gen_dependency(&self, path: PathBuf) {
		self.state.lock().unwrap().gen_dependencies.push(path);
	}

	pub fn gen_dependencies(&self) -> Vec<PathBuf> {
		let mut copy = self.state.lock().unwrap().gen_dependencies.clone();
		copy.sort();
		copy
	}

	/// Track a `write_file` output, for resolving unknown generated inputs.
	pub fn add_written_file(&self, file: SourceFile) {
		self.state.lock().unwrap().written_files.push(file);
	}

	pub fn written_files(&self) -> Vec<SourceFile> {
		let mut copy = self.state.lock().unwrap().written_files.clone();
		copy.sort();
		copy
	}

	/// Schedule a runtime-deps file write for a target that asked for one.
	pub fn add_write_runtime_deps_target(&self, target: &Label) {
		self.state
			.lock()
			.unwrap()
			.write_runtime_deps_targets
			.push(target.clone());
	}

	pub fn write_runtime_deps_targets(&self) -> Vec<Label> {
		let mut copy = self.state.lock().unwrap().write_runtime_deps_targets.clone();
		copy.sort();
		copy
	}

	pub fn add_generated_file(&self, target: &Label, file: OutputFile) {
		self.state
			.lock()
			.unwrap()
			.generated_files
			.push((file, target.clone()));
	}

	pub fn generated_files(&self) -> Vec<(OutputFile, Label)> {
		let mut copy = self.state.lock().unwrap().generated_files.clone();
		copy.sort();
		copy
	}

	/// The target that generates `file`, if any target recorded it.
	pub fn is_file_generated_by_target(&self, file: &OutputFile) -> Option<Label> {
		let state = self.state.lock().unwrap();
		state
			.generated_files
			.iter()
			.find(|(generated, _)| generated == file)
			.map(|(_, label)| label.clone())
	}

	/// Record a build-dir input no dependency is known to generate. Checked
	/// against the written-files and generated-files registries after the
	/// pool drains.
	pub fn add_unknown_generated_input(&self, target: &Label, file: SourceFile) {
		self.state
			.lock()
			.unwrap()
			.unknown_generated_inputs
			.push((file, target.clone()));
	}

	pub fn unknown_generated_inputs(&self) -> Vec<(SourceFile, Label)> {
		let mut copy = self.state.lock().unwrap().unknown_generated_inputs.clone();
		copy.sort();
		copy
	}

	/// For testing.
	pub fn clear_unknown_generated_inputs_and_written_files(&self) {
		let mut state = self.state.lock().unwrap();
		state.unknown_generated_inputs.clear();
		state.written_files.clear();
	}
}

impl Drop for Scheduler {
	fn drop(&mut self) {
		self.shutdown();
	}
}
