//! Collapsible indented tree renderer with manual pan/zoom.
//!
//! Each node is a related document plus its item rows. Activating an
//! unfetched node resolves its linkage and appends a child list;
//! activating an already-fetched node only toggles visibility through a
//! class flip. A re-fetch replaces the stale child list wholesale
//! before the fresh one is attached.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use web_sys::{MouseEvent, WheelEvent};

use crate::components::force_graph::ViewTransform;
use crate::components::notices::{Busy, Notices, Severity};
use crate::linkage::aggregate::{DocGroup, collect_groups};
use crate::linkage::client::LinkClient;
use crate::linkage::doctype::DocType;
use crate::linkage::error::LinkageError;
use crate::linkage::escape::class_selector;
use crate::linkage::expand::{Activation, ExpansionMachine, FetchOutcome};

/// Zoom clamp for the tree viewport.
const TREE_SCALE_MIN: f64 = 0.1;
const TREE_SCALE_MAX: f64 = 5.0;

/// Mouse travel below this many pixels still counts as a click.
const PAN_SLOP: f64 = 3.0;

#[derive(Clone, Copy, Debug, Default)]
struct PanDrag {
	active: bool,
	/// Survives until the next mousedown so the click that ends a pan
	/// does not activate a node.
	moved: bool,
	start_x: f64,
	start_y: f64,
	origin_x: f64,
	origin_y: f64,
}

#[component]
pub fn LinkTree(doctype: DocType, name: String, client: LinkClient) -> impl IntoView {
	let notices = Notices::expect();
	let busy = Busy::expect();
	let machine = StoredValue::new(ExpansionMachine::default());
	let transform = RwSignal::new(ViewTransform::default());
	let pan = StoredValue::new(PanDrag::default());
	let viewport_ref = NodeRef::<leptos::html::Div>::new();

	let children = RwSignal::new(None::<Vec<DocGroup>>);

	// Resolve the root immediately; unsupported roots are a leaf notice,
	// not a request.
	if !doctype.is_expandable() {
		notices.linkage_error(&LinkageError::UnsupportedDocumentType(
			doctype.label().to_string(),
		));
	} else if let Some(Activation::StartFetch(token)) =
		machine.try_update_value(|m| m.activate(&name, true))
	{
		let client_root = client.clone();
		let doctype_root = doctype.clone();
		let name_root = name.clone();
		busy.start();
		spawn_local(async move {
			let result = client_root.fetch_links(&doctype_root, &name_root).await;
			busy.finish();
			let outcome = FetchOutcome::from_result(&result);
			let current = machine
				.try_update_value(|m| m.complete(&name_root, token, outcome))
				.unwrap_or(false);
			if !current {
				debug!("dropping stale root fetch for {name_root}");
				return;
			}
			match result {
				Ok(groups) => {
					let _ = children.try_set(Some(collect_groups(&groups)));
				}
				Err(err) => notices.linkage_error(&err),
			}
		});
	}

	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let t = transform.get_untracked();
		pan.set_value(PanDrag {
			active: true,
			moved: false,
			start_x: ev.client_x() as f64,
			start_y: ev.client_y() as f64,
			origin_x: t.x,
			origin_y: t.y,
		});
	};

	let on_mousemove = move |ev: MouseEvent| {
		let mut p = pan.get_value();
		if !p.active {
			return;
		}
		let (dx, dy) = (
			ev.client_x() as f64 - p.start_x,
			ev.client_y() as f64 - p.start_y,
		);
		if dx.abs().max(dy.abs()) > PAN_SLOP && !p.moved {
			p.moved = true;
			pan.set_value(p);
		}
		transform.update(|t| {
			t.x = p.origin_x + dx;
			t.y = p.origin_y + dy;
		});
	};

	let end_pan = move |_: MouseEvent| {
		let mut p = pan.get_value();
		p.active = false;
		pan.set_value(p);
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(viewport) = viewport_ref.get() else {
			return;
		};
		let rect = viewport.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		transform.update(|t| t.zoom_at(x, y, factor, TREE_SCALE_MIN, TREE_SCALE_MAX));
	};

	let root_label = format!("{name} ({})", doctype.label());
	let branch_client = client.clone();

	view! {
		<div
			class="tree-viewport"
			node_ref=viewport_ref
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=end_pan
			on:mouseleave=end_pan
			on:wheel=on_wheel
		>
			<div
				class="tree-canvas"
				style=move || {
					let t = transform.get();
					format!("transform: translate({}px, {}px) scale({});", t.x, t.y, t.k)
				}
			>
				<ul class="trace-tree">
					<li class="trace-node trace-root">
						<span class="trace-label">{root_label}</span>
						{move || {
							children
								.get()
								.map(|groups| {
									branch_view(
										groups,
										branch_client.clone(),
										machine,
										notices,
										busy,
										pan,
									)
								})
						}}
					</li>
				</ul>
			</div>
		</div>
	}
}

fn branch_view(
	groups: Vec<DocGroup>,
	client: LinkClient,
	machine: StoredValue<ExpansionMachine>,
	notices: Notices,
	busy: Busy,
	pan: StoredValue<PanDrag>,
) -> AnyView {
	view! {
		<ul class="trace-branch">
			{groups
				.into_iter()
				.map(|group| node_view(group, client.clone(), machine, notices, busy, pan))
				.collect::<Vec<_>>()}
		</ul>
	}
	.into_any()
}

fn node_view(
	group: DocGroup,
	client: LinkClient,
	machine: StoredValue<ExpansionMachine>,
	notices: Notices,
	busy: Busy,
	pan: StoredValue<PanDrag>,
) -> AnyView {
	let children = RwSignal::new(None::<Vec<DocGroup>>);
	let open = RwSignal::new(false);
	let loading = RwSignal::new(false);

	let name = group.name.clone();
	let doctype = group.doctype();
	let expandable = doctype.is_expandable();
	let color = group.kind().map(|k| k.color()).unwrap_or("#69b3a2");

	let activate = {
		let name = name.clone();
		let client = client.clone();
		move |_: MouseEvent| {
			if pan.get_value().moved {
				return;
			}
			let Some(action) = machine.try_update_value(|m| m.activate(&name, expandable))
			else {
				return;
			};
			match action {
				Activation::LeafNotice => notices.push("This is the last node.", Severity::Red, 5),
				Activation::Close => open.set(false),
				Activation::Reopen => open.set(true),
				Activation::StartFetch(token) => {
					loading.set(true);
					busy.start();
					let client = client.clone();
					let name = name.clone();
					let doctype = doctype.clone();
					spawn_local(async move {
						let result = client.fetch_links(&doctype, &name).await;
						busy.finish();
						let outcome = FetchOutcome::from_result(&result);
						let current = machine
							.try_update_value(|m| m.complete(&name, token, outcome))
							.unwrap_or(false);
						let _ = loading.try_set(false);
						if !current {
							debug!("dropping stale expansion for {name}");
							return;
						}
						match result {
							Ok(groups) => {
								// Replaces any stale child list before
								// the fresh one is attached.
								let _ = children.try_set(Some(collect_groups(&groups)));
								let _ = open.try_set(true);
								reveal(&name);
							}
							Err(err) => notices.linkage_error(&err),
						}
					});
				}
			}
		}
	};

	let rows = group
		.rows
		.iter()
		.map(|row| {
			view! {
				<span class="trace-row">{format!("{} [Qty: {}]", row.item_code, row.quantity)}</span>
			}
		})
		.collect::<Vec<_>>();

	let child_client = client.clone();
	let node_class = format!("trace-node {}", group.name);

	view! {
		<li class=node_class>
			<span
				class="trace-label"
				class:open=move || open.get()
				class:loading=move || loading.get()
				class:leaf=!expandable
				style=format!("border-left-color: {color};")
				on:click=activate
			>
				<span class="trace-doc">{group.name.clone()}</span>
				{rows}
			</span>
			{move || {
				children
					.get()
					.map(|groups| {
						view! {
							<div class="trace-children" class:collapsed=move || !open.get()>
								{branch_view(
									groups,
									child_client.clone(),
									machine,
									notices,
									busy,
									pan,
								)}
							</div>
						}
						.into_any()
					})
			}}
		</li>
	}
	.into_any()
}

/// Scroll a freshly expanded node into view, looked up through its
/// raw-name class token.
fn reveal(name: &str) {
	let selector = format!(".trace-node{}", class_selector(name));
	if let Ok(Some(element)) = document().query_selector(&selector) {
		element.scroll_into_view();
	}
}
