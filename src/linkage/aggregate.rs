//! Graph aggregation: deduplicated nodes and edges out of raw linkage
//! records, plus the grouped form the tree renderer consumes.

use std::collections::HashSet;

use log::{debug, warn};

use super::doctype::DocType;
use super::model::{GraphData, GraphLink, GraphNode, LinkKind, edge_id, node_id};
use super::records::{LinkGroups, LinkRow, PurchaseOrderLink, RootItem};

/// Accumulates one traversal's worth of nodes and edges.
///
/// Both dedup sets live for the whole traversal: a document reached
/// through two paths becomes one node with edges from both parents,
/// and repeating an insertion is a no-op.
#[derive(Debug, Default)]
pub struct GraphBuilder {
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	seen_nodes: HashSet<String>,
	seen_links: HashSet<String>,
}

impl GraphBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of the accumulated graph for the renderer.
	pub fn graph(&self) -> GraphData {
		GraphData {
			nodes: self.nodes.clone(),
			links: self.links.clone(),
		}
	}

	fn push_node(&mut self, id: &str, label: String, kind: LinkKind, name: &str) -> bool {
		if !self.seen_nodes.insert(id.to_string()) {
			return false;
		}
		self.nodes.push(GraphNode {
			id: id.to_string(),
			label,
			kind,
			name: name.to_string(),
			expanded: false,
		});
		true
	}

	fn push_link(&mut self, source: &str, target: &str) -> bool {
		if !self.seen_links.insert(edge_id(source, target)) {
			return false;
		}
		self.links.push(GraphLink {
			source: source.to_string(),
			target: target.to_string(),
		});
		true
	}

	fn add_child(&mut self, parent_id: &str, kind: LinkKind, name: &str, qty: f64) -> String {
		let id = node_id(kind, name);
		self.push_node(&id, format!("{name} [Qty: {qty}]"), kind, name);
		self.push_link(parent_id, &id);
		id
	}

	fn add_purchase_order(&mut self, parent_id: &str, po: &PurchaseOrderLink) {
		let po_id = self.add_child(parent_id, LinkKind::PurchaseOrder, &po.purchase_order, po.qty);
		for pi in &po.purchase_invoices {
			self.add_child(
				&po_id,
				LinkKind::PurchaseInvoice,
				&pi.purchase_invoice,
				pi.qty,
			);
		}
	}

	/// Flat pass over a root document's items: covers the whole chain
	/// root item -> category record -> nested purchase orders -> nested
	/// purchase invoices in one call. Every level goes through the same
	/// dedup rule, so insertion order never affects the result set.
	pub fn add_root_items(&mut self, items: &[RootItem]) {
		for item in items {
			let root_id = node_id(LinkKind::SalesOrderItem, &item.item_code);
			self.push_node(
				&root_id,
				format!(
					"{}\n({}) [Qty: {}]",
					item.item_name, item.item_code, item.sales_order_qty
				),
				LinkKind::SalesOrderItem,
				&item.item_code,
			);

			for si in &item.sales_invoices {
				self.add_child(&root_id, LinkKind::SalesInvoice, &si.sales_invoice, si.qty);
			}
			for dn in &item.delivery_notes {
				self.add_child(&root_id, LinkKind::DeliveryNote, &dn.delivery_note, dn.qty);
			}
			for mr in &item.material_requests {
				let mr_id =
					self.add_child(&root_id, LinkKind::MaterialRequest, &mr.material_request, mr.qty);
				for po in &mr.purchase_orders {
					self.add_purchase_order(&mr_id, po);
				}
			}
			for po in &item.purchase_orders {
				self.add_purchase_order(&root_id, po);
			}
		}
		debug!(
			"aggregated {} items into {} nodes / {} links",
			items.len(),
			self.nodes.len(),
			self.links.len()
		);
	}

	/// Seeds a bare root node for a document that has no flat item
	/// response (material request or purchase order roots).
	pub fn add_root_document(&mut self, kind: LinkKind, name: &str) -> String {
		let id = node_id(kind, name);
		self.push_node(&id, name.to_string(), kind, name);
		id
	}

	/// Merges a tree-shaped expansion response under `parent_id`:
	/// one child per related document, keyed by the rows' parenttype.
	/// Returns how many children were appended. Groups with no rows are
	/// skipped entirely rather than rendered empty.
	pub fn add_groups(&mut self, parent_id: &str, groups: &LinkGroups) -> usize {
		let mut appended = 0;
		for group in groups {
			for (name, rows) in group {
				if rows.is_empty() {
					continue;
				}
				let Some(kind) = LinkKind::from_parenttype(&rows[0].parenttype) else {
					warn!("dropping group {name}: unknown parenttype {:?}", rows[0].parenttype);
					continue;
				};
				let qty: f64 = rows.iter().map(|r| r.quantity).sum();
				let id = node_id(kind, name);
				self.push_node(&id, format!("{name} [Qty: {qty}]"), kind, name);
				if self.push_link(parent_id, &id) {
					appended += 1;
				}
			}
		}
		appended
	}

	pub fn mark_expanded(&mut self, id: &str) {
		if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
			node.expanded = true;
		}
	}
}

/// One related document and its item rows, ready for the tree renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct DocGroup {
	pub name: String,
	pub parenttype: String,
	pub rows: Vec<LinkRow>,
}

impl DocGroup {
	pub fn kind(&self) -> Option<LinkKind> {
		LinkKind::from_parenttype(&self.parenttype)
	}

	/// The document type the next expansion routes through.
	pub fn doctype(&self) -> DocType {
		DocType::parse(&self.parenttype)
	}
}

/// Flattens a tree-mode response into per-document groups, skipping
/// logically-empty values and deduplicating repeated names within the
/// subtree.
pub fn collect_groups(groups: &LinkGroups) -> Vec<DocGroup> {
	let mut seen = HashSet::new();
	let mut out = Vec::new();
	for group in groups {
		for (name, rows) in group {
			if rows.is_empty() || !seen.insert(name.clone()) {
				continue;
			}
			out.push(DocGroup {
				name: name.clone(),
				parenttype: rows[0].parenttype.clone(),
				rows: rows.clone(),
			});
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linkage::records::{MaterialRequestLink, PurchaseInvoiceLink, SalesInvoiceLink};
	use serde_json::json;

	fn root_item() -> RootItem {
		RootItem {
			item_code: "ITEM-A".into(),
			item_name: "Widget".into(),
			sales_order_qty: 5.0,
			sales_invoices: vec![],
			delivery_notes: vec![],
			material_requests: vec![],
			purchase_orders: vec![],
		}
	}

	#[test]
	fn single_invoice_yields_two_nodes_one_edge() {
		let mut item = root_item();
		item.sales_invoices = vec![SalesInvoiceLink {
			sales_invoice: "SINV-01".into(),
			qty: 5.0,
		}];

		let mut builder = GraphBuilder::new();
		builder.add_root_items(&[item]);
		let graph = builder.graph();

		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.links.len(), 1);
		assert_eq!(graph.nodes[0].id, "sales_order_item-ITEM-A");
		assert_eq!(graph.nodes[1].id, "sales_invoice-SINV-01");
		assert_eq!(graph.links[0].source, "sales_order_item-ITEM-A");
		assert_eq!(graph.links[0].target, "sales_invoice-SINV-01");
	}

	#[test]
	fn material_request_chain_yields_root_mr_po() {
		let mut item = root_item();
		item.material_requests = vec![MaterialRequestLink {
			material_request: "MR-01".into(),
			qty: 2.0,
			purchase_orders: vec![PurchaseOrderLink {
				purchase_order: "PO-01".into(),
				qty: 2.0,
				purchase_invoices: vec![],
			}],
		}];

		let mut builder = GraphBuilder::new();
		builder.add_root_items(&[item]);
		let graph = builder.graph();

		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.links.len(), 2);
		let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(
			ids,
			[
				"sales_order_item-ITEM-A",
				"material_request-MR-01",
				"purchase_order-PO-01"
			]
		);
		assert_eq!(graph.links[0].target, "material_request-MR-01");
		assert_eq!(graph.links[1].source, "material_request-MR-01");
		assert_eq!(graph.links[1].target, "purchase_order-PO-01");
	}

	#[test]
	fn shared_documents_collapse_to_one_node_and_edge_set() {
		// The same purchase order reached via the material request and
		// directly from the root item.
		let shared_po = PurchaseOrderLink {
			purchase_order: "PO-01".into(),
			qty: 2.0,
			purchase_invoices: vec![PurchaseInvoiceLink {
				purchase_invoice: "PINV-01".into(),
				qty: 2.0,
			}],
		};
		let mut item = root_item();
		item.material_requests = vec![MaterialRequestLink {
			material_request: "MR-01".into(),
			qty: 2.0,
			purchase_orders: vec![shared_po.clone()],
		}];
		item.purchase_orders = vec![shared_po];

		let mut builder = GraphBuilder::new();
		builder.add_root_items(&[item]);
		let graph = builder.graph();

		let po_nodes = graph
			.nodes
			.iter()
			.filter(|n| n.id == "purchase_order-PO-01")
			.count();
		assert_eq!(po_nodes, 1);

		let mut edge_ids: Vec<String> = graph
			.links
			.iter()
			.map(|l| edge_id(&l.source, &l.target))
			.collect();
		let total = edge_ids.len();
		edge_ids.sort();
		edge_ids.dedup();
		assert_eq!(edge_ids.len(), total, "duplicate edges survived");

		// PO-01 keeps an incoming edge from both parents.
		let incoming = graph
			.links
			.iter()
			.filter(|l| l.target == "purchase_order-PO-01")
			.count();
		assert_eq!(incoming, 2);
	}

	#[test]
	fn aggregation_is_idempotent_and_order_independent() {
		let mut item = root_item();
		item.sales_invoices = vec![
			SalesInvoiceLink {
				sales_invoice: "SINV-02".into(),
				qty: 1.0,
			},
			SalesInvoiceLink {
				sales_invoice: "SINV-01".into(),
				qty: 4.0,
			},
		];

		let mut once = GraphBuilder::new();
		once.add_root_items(std::slice::from_ref(&item));
		let first = once.graph();

		// Same input twice through the same builder changes nothing.
		once.add_root_items(std::slice::from_ref(&item));
		assert_eq!(once.graph(), first);

		// Reversed category order produces the same sets.
		item.sales_invoices.reverse();
		let mut reversed = GraphBuilder::new();
		reversed.add_root_items(&[item]);
		let second = reversed.graph();

		let ids = |g: &GraphData| {
			let mut v: Vec<String> = g.nodes.iter().map(|n| n.id.clone()).collect();
			v.sort();
			v
		};
		assert_eq!(ids(&first), ids(&second));
	}

	#[test]
	fn root_never_gains_incoming_edges() {
		let mut item = root_item();
		item.sales_invoices = vec![SalesInvoiceLink {
			sales_invoice: "SINV-01".into(),
			qty: 5.0,
		}];
		let mut builder = GraphBuilder::new();
		builder.add_root_items(&[item]);

		let graph = builder.graph();
		assert!(
			graph
				.links
				.iter()
				.all(|l| l.target != "sales_order_item-ITEM-A")
		);
	}

	#[test]
	fn group_merge_dedups_and_skips_empty_values() {
		let groups: LinkGroups = serde_json::from_value(json!([
			{"DN-01": [{"item_code": "ITEM-A", "quantity": 3, "parenttype": "Delivery Note"}]},
			{"DN-02": []},
			{"DN-01": [{"item_code": "ITEM-A", "quantity": 3, "parenttype": "Delivery Note"}]}
		]))
		.unwrap();

		let mut builder = GraphBuilder::new();
		let root = builder.add_root_document(LinkKind::PurchaseOrder, "PO-01");
		let appended = builder.add_groups(&root, &groups);

		// DN-01 twice collapses to one node and one edge; DN-02 is empty
		// and never rendered.
		assert_eq!(appended, 1);
		let graph = builder.graph();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.links.len(), 1);
	}

	#[test]
	fn collect_groups_skips_empty_and_repeated_names() {
		let groups: LinkGroups = serde_json::from_value(json!([
			{"SINV-01": [{"item_code": "ITEM-A", "quantity": 5, "parenttype": "Sales Invoice"}]},
			{"MR-01": []},
			{"SINV-01": [{"item_code": "ITEM-A", "quantity": 5, "parenttype": "Sales Invoice"}]}
		]))
		.unwrap();

		let collected = collect_groups(&groups);
		assert_eq!(collected.len(), 1);
		assert_eq!(collected[0].name, "SINV-01");
		assert_eq!(collected[0].kind(), Some(LinkKind::SalesInvoice));
		assert!(!collected[0].doctype().is_expandable());
	}

	#[test]
	fn expanded_flag_is_per_node() {
		let mut builder = GraphBuilder::new();
		let root = builder.add_root_document(LinkKind::MaterialRequest, "MR-01");
		builder.mark_expanded(&root);

		let graph = builder.graph();
		assert!(graph.nodes[0].expanded);
	}
}
