//! Per-node expansion state and request-token supersession.
//!
//! Fetch completions run in a later turn of the event loop, so a user
//! can re-activate a node (or change the root) while a request is in
//! flight. Every fetch carries a token; issuing a new token for a node
//! invalidates the previous one, and completions for stale tokens must
//! mutate nothing.

use std::collections::HashMap;

use log::debug;

use super::error::LinkageError;

/// Monotonic per-node request tokens.
#[derive(Debug, Default)]
pub struct TokenRegistry {
	current: HashMap<String, u64>,
	next: u64,
}

impl TokenRegistry {
	/// Issue a token for `node`, superseding any in-flight one.
	pub fn issue(&mut self, node: &str) -> u64 {
		self.next += 1;
		self.current.insert(node.to_string(), self.next);
		self.next
	}

	pub fn is_current(&self, node: &str, token: u64) -> bool {
		self.current.get(node) == Some(&token)
	}

	/// Drop every outstanding token. `next` keeps counting, so tokens
	/// issued before the reset can never match again.
	pub fn reset(&mut self) {
		self.current.clear();
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
	/// Nothing fetched yet (also the state after a failed or empty
	/// fetch: the next activation retries).
	NotLoaded,
	Loading(u64),
	/// Children fetched and visible.
	Open,
	/// Children fetched but hidden; reopening is a class toggle, not a
	/// re-fetch.
	Closed,
	Leaf,
}

/// What the view must do in response to an activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
	StartFetch(u64),
	Reopen,
	Close,
	LeafNotice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
	Expanded,
	/// Empty or no-connections response; the node stays retryable.
	NoChildren,
	Failed,
}

impl FetchOutcome {
	/// Classify a fetch result for [`ExpansionMachine::complete`].
	pub fn from_result<T>(result: &Result<T, LinkageError>) -> Self {
		match result {
			Ok(_) => FetchOutcome::Expanded,
			Err(LinkageError::EmptyResult | LinkageError::NoConnections) => {
				FetchOutcome::NoChildren
			}
			Err(_) => FetchOutcome::Failed,
		}
	}
}

/// The per-node state machine:
/// `NotLoaded -> Loading -> {Open | NotLoaded | Leaf}`, with
/// `Open <-> Closed` toggling on later activations.
#[derive(Debug, Default)]
pub struct ExpansionMachine {
	states: HashMap<String, NodeState>,
	tokens: TokenRegistry,
}

impl ExpansionMachine {
	pub fn state(&self, id: &str) -> NodeState {
		self.states.get(id).copied().unwrap_or(NodeState::NotLoaded)
	}

	/// React to a user activation of `id`. Non-expandable nodes pin to
	/// `Leaf` and only ever produce the leaf notice.
	pub fn activate(&mut self, id: &str, expandable: bool) -> Activation {
		if !expandable {
			self.states.insert(id.to_string(), NodeState::Leaf);
			return Activation::LeafNotice;
		}
		match self.state(id) {
			// Activating mid-load supersedes the in-flight request.
			NodeState::NotLoaded | NodeState::Loading(_) => {
				let token = self.tokens.issue(id);
				self.states.insert(id.to_string(), NodeState::Loading(token));
				Activation::StartFetch(token)
			}
			NodeState::Open => {
				self.states.insert(id.to_string(), NodeState::Closed);
				Activation::Close
			}
			NodeState::Closed => {
				self.states.insert(id.to_string(), NodeState::Open);
				Activation::Reopen
			}
			NodeState::Leaf => Activation::LeafNotice,
		}
	}

	/// Apply a fetch completion. Returns false (and changes nothing)
	/// when `token` is no longer current for the node.
	pub fn complete(&mut self, id: &str, token: u64, outcome: FetchOutcome) -> bool {
		if !self.tokens.is_current(id, token) {
			debug!("dropping stale completion for {id} (token {token})");
			return false;
		}
		let state = match outcome {
			FetchOutcome::Expanded => NodeState::Open,
			FetchOutcome::NoChildren | FetchOutcome::Failed => NodeState::NotLoaded,
		};
		self.states.insert(id.to_string(), state);
		true
	}

	/// Forget a node's cached subtree; the next activation re-fetches.
	pub fn discard(&mut self, id: &str) {
		self.states.insert(id.to_string(), NodeState::NotLoaded);
	}

	/// Root selection changed: every node and token is void.
	pub fn reset(&mut self) {
		self.states.clear();
		self.tokens.reset();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_activation_fetches_then_toggles_without_refetch() {
		let mut machine = ExpansionMachine::default();

		let Activation::StartFetch(token) = machine.activate("SO-0001", true) else {
			panic!("expected a fetch");
		};
		assert!(machine.complete("SO-0001", token, FetchOutcome::Expanded));
		assert_eq!(machine.state("SO-0001"), NodeState::Open);

		// Open -> Closed -> Open purely by toggling.
		assert_eq!(machine.activate("SO-0001", true), Activation::Close);
		assert_eq!(machine.activate("SO-0001", true), Activation::Reopen);
		assert_eq!(machine.state("SO-0001"), NodeState::Open);
	}

	#[test]
	fn superseded_fetch_is_ignored() {
		let mut machine = ExpansionMachine::default();

		let Activation::StartFetch(first) = machine.activate("MR-01", true) else {
			panic!("expected a fetch");
		};
		let Activation::StartFetch(second) = machine.activate("MR-01", true) else {
			panic!("expected a superseding fetch");
		};
		assert_ne!(first, second);

		// The stale completion mutates nothing.
		assert!(!machine.complete("MR-01", first, FetchOutcome::Expanded));
		assert_eq!(machine.state("MR-01"), NodeState::Loading(second));

		assert!(machine.complete("MR-01", second, FetchOutcome::Expanded));
		assert_eq!(machine.state("MR-01"), NodeState::Open);
	}

	#[test]
	fn leaf_nodes_never_fetch() {
		let mut machine = ExpansionMachine::default();
		assert_eq!(machine.activate("SINV-01", false), Activation::LeafNotice);
		assert_eq!(machine.state("SINV-01"), NodeState::Leaf);
		// Repeat activations stay leaves.
		assert_eq!(machine.activate("SINV-01", false), Activation::LeafNotice);
	}

	#[test]
	fn empty_and_failed_fetches_stay_retryable() {
		let mut machine = ExpansionMachine::default();

		for outcome in [FetchOutcome::NoChildren, FetchOutcome::Failed] {
			let Activation::StartFetch(token) = machine.activate("PO-01", true) else {
				panic!("expected a fetch");
			};
			assert!(machine.complete("PO-01", token, outcome));
			assert_eq!(machine.state("PO-01"), NodeState::NotLoaded);
		}
	}

	#[test]
	fn reset_voids_in_flight_completions() {
		let mut machine = ExpansionMachine::default();
		let Activation::StartFetch(token) = machine.activate("SO-0001", true) else {
			panic!("expected a fetch");
		};

		machine.reset();
		assert!(!machine.complete("SO-0001", token, FetchOutcome::Expanded));
		assert_eq!(machine.state("SO-0001"), NodeState::NotLoaded);
	}

	#[test]
	fn discard_forces_a_refetch() {
		let mut machine = ExpansionMachine::default();
		let Activation::StartFetch(token) = machine.activate("SO-0001", true) else {
			panic!("expected a fetch");
		};
		machine.complete("SO-0001", token, FetchOutcome::Expanded);

		machine.discard("SO-0001");
		assert!(matches!(
			machine.activate("SO-0001", true),
			Activation::StartFetch(_)
		));
	}
}
