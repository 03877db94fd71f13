//! User feedback: transient alert notices and the fetch-busy overlay.

use std::time::Duration;

use leptos::prelude::*;

use crate::linkage::error::LinkageError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
	Default,
	Red,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
	pub id: u64,
	pub message: String,
	pub severity: Severity,
}

/// Fire-and-forget notification stack, handed around through context.
#[derive(Clone, Copy)]
pub struct Notices {
	stack: RwSignal<Vec<Notice>>,
	next_id: StoredValue<u64>,
}

impl Notices {
	pub fn provide() -> Self {
		let notices = Self {
			stack: RwSignal::new(Vec::new()),
			next_id: StoredValue::new(0),
		};
		provide_context(notices);
		notices
	}

	pub fn expect() -> Self {
		expect_context()
	}

	/// Show `message` for `seconds`, then drop it. Safe to call from
	/// async completions after the page moved on.
	pub fn push(&self, message: impl Into<String>, severity: Severity, seconds: u64) {
		let id = self
			.next_id
			.try_update_value(|n| {
				*n += 1;
				*n
			})
			.unwrap_or(0);
		let message = message.into();
		let _ = self.stack.try_update(|stack| {
			stack.push(Notice {
				id,
				message,
				severity,
			})
		});

		let stack = self.stack;
		set_timeout(
			move || {
				let _ = stack.try_update(|stack| stack.retain(|n| n.id != id));
			},
			Duration::from_secs(seconds),
		);
	}

	pub fn info(&self, message: impl Into<String>) {
		self.push(message, Severity::Default, 3);
	}

	/// Surface a linkage error. Leaf notices linger a little longer so
	/// the user sees why nothing happened.
	pub fn linkage_error(&self, err: &LinkageError) {
		let seconds = if err.is_benign() { 5 } else { 3 };
		self.push(err.to_string(), Severity::Red, seconds);
	}

	pub fn snapshot(&self) -> Vec<Notice> {
		self.stack.get()
	}
}

#[component]
pub fn NoticeHost() -> impl IntoView {
	let notices = Notices::expect();

	view! {
		<div class="notice-stack">
			{move || {
				notices
					.snapshot()
					.into_iter()
					.map(|n| {
						let class = match n.severity {
							Severity::Red => "notice notice-red",
							Severity::Default => "notice",
						};
						view! { <div class=class>{n.message}</div> }
					})
					.collect::<Vec<_>>()
			}}
		</div>
	}
}

/// In-flight fetch counter behind the page freeze overlay.
#[derive(Clone, Copy)]
pub struct Busy {
	count: RwSignal<i32>,
}

impl Busy {
	pub fn provide() -> Self {
		let busy = Self {
			count: RwSignal::new(0),
		};
		provide_context(busy);
		busy
	}

	pub fn expect() -> Self {
		expect_context()
	}

	pub fn start(&self) {
		let _ = self.count.try_update(|c| *c += 1);
	}

	pub fn finish(&self) {
		let _ = self.count.try_update(|c| *c = (*c - 1).max(0));
	}

	pub fn active(&self) -> bool {
		self.count.get() > 0
	}
}

#[component]
pub fn FreezeOverlay() -> impl IntoView {
	let busy = Busy::expect();

	view! {
		<Show when=move || busy.active()>
			<div class="freeze-overlay">
				<span>"Fetching linked documents..."</span>
			</div>
		</Show>
	}
}
