use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info};

use crate::components::doc_picker::DocPicker;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::link_tree::LinkTree;
use crate::components::notices::{Busy, FreezeOverlay, NoticeHost, Notices, Severity};
use crate::linkage::aggregate::GraphBuilder;
use crate::linkage::client::LinkClient;
use crate::linkage::doctype::DocType;
use crate::linkage::expand::TokenRegistry;
use crate::linkage::model::{GraphData, GraphNode, LinkKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewMode {
	Graph,
	Tree,
}

/// The traceability page: root picker, view-mode toggle and whichever
/// renderer is active. Owns the session context - re-selecting the root
/// tears the visualization down and rebuilds from scratch.
#[component]
pub fn Home() -> impl IntoView {
	Notices::provide();
	Busy::provide();
	let client = LinkClient::from_window();

	let selection = RwSignal::new(None::<(DocType, String)>);
	let mode = RwSignal::new(ViewMode::Graph);

	let on_select = move |(doctype, name): (DocType, String)| {
		// Re-picking the same document changes nothing.
		if selection.get_untracked() == Some((doctype.clone(), name.clone())) {
			return;
		}
		info!("tracing {doctype} {name}");
		selection.set(Some((doctype, name)));
	};

	let shell_client = client.clone();
	let shell = move || match (selection.get(), mode.get()) {
		(None, _) => view! {
			<p class="trace-placeholder">
				"Pick a document type and document to trace its links."
			</p>
		}
		.into_any(),
		(Some((doctype, name)), ViewMode::Graph) => view! {
			<TraceGraph doctype=doctype name=name client=shell_client.clone() />
		}
		.into_any(),
		(Some((doctype, name)), ViewMode::Tree) => view! {
			<LinkTree doctype=doctype name=name client=shell_client.clone() />
		}
		.into_any(),
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="trace-page">
				<div class="trace-toolbar">
					<DocPicker client=client.clone() on_select=on_select />
					<div class="mode-toggle">
						<button
							class:active=move || mode.get() == ViewMode::Graph
							on:click=move |_| mode.set(ViewMode::Graph)
						>
							"Graph"
						</button>
						<button
							class:active=move || mode.get() == ViewMode::Tree
							on:click=move |_| mode.set(ViewMode::Tree)
						>
							"Tree"
						</button>
					</div>
				</div>
				<div class="trace-canvas-shell">{shell}</div>
				<NoticeHost />
				<FreezeOverlay />
			</div>
		</ErrorBoundary>
	}
}

/// Graph-mode controller: seeds the accumulated graph for the selected
/// root and merges node expansions into it. The whole component is
/// recreated on root change, which is what resets the dedup scope.
#[component]
fn TraceGraph(doctype: DocType, name: String, client: LinkClient) -> impl IntoView {
	let notices = Notices::expect();
	let busy = Busy::expect();

	let builder = StoredValue::new(GraphBuilder::new());
	let data = RwSignal::new(GraphData::default());
	let epoch = RwSignal::new(0u64);
	let tokens = StoredValue::new(TokenRegistry::default());

	match &doctype {
		// Sales orders have a flat resolver covering the whole chain in
		// one response.
		DocType::SalesOrder => {
			let seed_client = client.clone();
			let seed_name = name.clone();
			busy.start();
			spawn_local(async move {
				let result = seed_client.fetch_item_links(&seed_name).await;
				busy.finish();
				match result {
					Ok(items) => {
						let graph = builder.try_update_value(|b| {
							b.add_root_items(&items);
							b.graph()
						});
						if let Some(graph) = graph {
							let _ = epoch.try_update(|e| *e += 1);
							let _ = data.try_set(graph);
						}
					}
					Err(err) => notices.linkage_error(&err),
				}
			});
		}
		// Other expandable roots start as a bare node and expand once.
		DocType::MaterialRequest | DocType::PurchaseOrder => {
			let kind = LinkKind::from_parenttype(doctype.label())
				.unwrap_or(LinkKind::PurchaseOrder);
			let root_id = builder
				.try_update_value(|b| b.add_root_document(kind, &name))
				.unwrap_or_default();
			let _ = epoch.try_update(|e| *e += 1);
			let _ = data.try_set(builder.with_value(|b| b.graph()));
			expand_graph_node(
				client.clone(),
				builder,
				data,
				tokens,
				busy,
				notices,
				root_id,
				doctype.clone(),
				name.clone(),
			);
		}
		DocType::Other(_) => {
			notices.push("This is the last node.", Severity::Red, 5);
		}
	}

	let activate_client = client.clone();
	let on_activate = move |node: GraphNode| match node.expansion_target() {
		None => notices.push("This is the last node.", Severity::Red, 5),
		Some((doctype, doc_name)) => {
			let doc_name = doc_name.to_string();
			expand_graph_node(
				activate_client.clone(),
				builder,
				data,
				tokens,
				busy,
				notices,
				node.id.clone(),
				doctype,
				doc_name,
			);
		}
	};

	view! {
		<div class="trace-graph">
			<ForceGraphCanvas data=data epoch=epoch on_activate=Callback::new(on_activate) />
		</div>
	}
}

/// Fetch one node's linkage and merge it into the accumulated graph.
/// The node's request token is reissued per activation; a completion
/// whose token is no longer current mutates nothing.
#[allow(clippy::too_many_arguments)]
fn expand_graph_node(
	client: LinkClient,
	builder: StoredValue<GraphBuilder>,
	data: RwSignal<GraphData>,
	tokens: StoredValue<TokenRegistry>,
	busy: Busy,
	notices: Notices,
	node_id: String,
	doctype: DocType,
	doc_name: String,
) {
	let Some(token) = tokens.try_update_value(|t| t.issue(&node_id)) else {
		return;
	};
	busy.start();
	spawn_local(async move {
		let result = client.fetch_links(&doctype, &doc_name).await;
		busy.finish();

		let current = tokens
			.try_with_value(|t| t.is_current(&node_id, token))
			.unwrap_or(false);
		if !current {
			debug!("dropping stale graph expansion for {node_id}");
			return;
		}

		match result {
			Ok(groups) => {
				let graph = builder.try_update_value(|b| {
					let appended = b.add_groups(&node_id, &groups);
					b.mark_expanded(&node_id);
					debug!("appended {appended} children under {node_id}");
					b.graph()
				});
				if let Some(graph) = graph {
					let _ = data.try_set(graph);
				}
			}
			Err(err) => notices.linkage_error(&err),
		}
	});
}
