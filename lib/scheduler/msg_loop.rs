//! A message loop for side effects that must happen on one thread.

use crossbeam::channel::{unbounded, Receiver, Sender};

enum Message {
	Task(Box<dyn FnOnce() + Send + 'static>),
	Quit,
}

/// Tasks posted from any thread run, in order, on whichever thread calls
/// [`run`][MsgLoop::run].
pub struct MsgLoop {
	tx: Sender<Message>,
	rx: Receiver<Message>,
}

impl MsgLoop {
	pub fn new() -> MsgLoop {
		let (tx, rx) = unbounded();
		MsgLoop { tx, rx }
	}

	pub fn post_task(&self, task: impl FnOnce() + Send + 'static) {
		let _ = self.tx.send(Message::Task(Box::new(task)));
	}

	pub fn post_quit(&self) {
		let _ = self.tx.send(Message::Quit);
	}

	/// Process messages until a quit is posted.
	pub fn run(&self) {
		while let Ok(message) = self.rx.recv() {
			match message {
				Message::Task(task) => task(),
				Message::Quit => break,
			}
		}
	}
}
