//! Graph data model shared by both renderers.

use super::doctype::DocType;

/// Kind tag carried by every node, used for color and for routing the
/// next expansion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
	SalesOrderItem,
	SalesInvoice,
	DeliveryNote,
	MaterialRequest,
	PurchaseOrder,
	PurchaseInvoice,
	PurchaseReceipt,
}

impl LinkKind {
	/// Stable tag used in node identifiers.
	pub fn tag(self) -> &'static str {
		match self {
			LinkKind::SalesOrderItem => "sales_order_item",
			LinkKind::SalesInvoice => "sales_invoice",
			LinkKind::DeliveryNote => "delivery_note",
			LinkKind::MaterialRequest => "material_request",
			LinkKind::PurchaseOrder => "purchase_order",
			LinkKind::PurchaseInvoice => "purchase_invoice",
			LinkKind::PurchaseReceipt => "purchase_receipt",
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			LinkKind::SalesOrderItem => "#69b3a2",
			LinkKind::SalesInvoice => "#3498db",
			LinkKind::DeliveryNote => "#e74c3c",
			LinkKind::MaterialRequest => "#f39c12",
			LinkKind::PurchaseOrder => "#2ecc71",
			LinkKind::PurchaseInvoice => "#9b59b6",
			LinkKind::PurchaseReceipt => "#e67e22",
		}
	}

	/// Maps a backend `parenttype` value to a kind.
	pub fn from_parenttype(parenttype: &str) -> Option<Self> {
		match parenttype {
			"Sales Invoice" => Some(LinkKind::SalesInvoice),
			"Delivery Note" => Some(LinkKind::DeliveryNote),
			"Material Request" => Some(LinkKind::MaterialRequest),
			"Purchase Order" => Some(LinkKind::PurchaseOrder),
			"Purchase Invoice" => Some(LinkKind::PurchaseInvoice),
			"Purchase Receipt" => Some(LinkKind::PurchaseReceipt),
			_ => None,
		}
	}

	/// The document type this kind expands through. Item rows are not
	/// documents and have none.
	pub fn doctype(self) -> Option<DocType> {
		match self {
			LinkKind::SalesOrderItem => None,
			LinkKind::SalesInvoice => Some(DocType::parse("Sales Invoice")),
			LinkKind::DeliveryNote => Some(DocType::parse("Delivery Note")),
			LinkKind::MaterialRequest => Some(DocType::MaterialRequest),
			LinkKind::PurchaseOrder => Some(DocType::PurchaseOrder),
			LinkKind::PurchaseInvoice => Some(DocType::parse("Purchase Invoice")),
			LinkKind::PurchaseReceipt => Some(DocType::parse("Purchase Receipt")),
		}
	}
}

/// Node id: `"{kind_tag}-{external}"`. The same rule covers root item
/// nodes, so two renders of one document always agree on identity.
pub fn node_id(kind: LinkKind, external: &str) -> String {
	format!("{}-{}", kind.tag(), external)
}

/// Edge id: `"{source}->{target}"`.
pub fn edge_id(source: &str, target: &str) -> String {
	format!("{source}->{target}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	pub kind: LinkKind,
	/// External document identifier (item code for root item nodes).
	pub name: String,
	pub expanded: bool,
}

impl GraphNode {
	/// Where activating this node leads, if anywhere. `None` means the
	/// node is a leaf and activation only raises a notice.
	pub fn expansion_target(&self) -> Option<(DocType, &str)> {
		let doctype = self.kind.doctype()?;
		doctype.resolver()?;
		Some((doctype, self.name.as_str()))
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn id_rules_match_the_wire_contract() {
		assert_eq!(
			node_id(LinkKind::SalesInvoice, "SINV-01"),
			"sales_invoice-SINV-01"
		);
		assert_eq!(
			edge_id("sales_order_item-ITEM-A", "sales_invoice-SINV-01"),
			"sales_order_item-ITEM-A->sales_invoice-SINV-01"
		);
	}

	#[test]
	fn only_resolver_backed_kinds_expand() {
		let node = |kind| GraphNode {
			id: node_id(kind, "X"),
			label: String::new(),
			kind,
			name: "X".into(),
			expanded: false,
		};

		assert!(node(LinkKind::MaterialRequest).expansion_target().is_some());
		assert!(node(LinkKind::PurchaseOrder).expansion_target().is_some());
		assert!(node(LinkKind::SalesInvoice).expansion_target().is_none());
		assert!(node(LinkKind::PurchaseReceipt).expansion_target().is_none());
		assert!(node(LinkKind::SalesOrderItem).expansion_target().is_none());
	}

	#[test]
	fn parenttype_mapping_covers_every_linked_kind() {
		for (value, kind) in [
			("Sales Invoice", LinkKind::SalesInvoice),
			("Delivery Note", LinkKind::DeliveryNote),
			("Material Request", LinkKind::MaterialRequest),
			("Purchase Order", LinkKind::PurchaseOrder),
			("Purchase Invoice", LinkKind::PurchaseInvoice),
			("Purchase Receipt", LinkKind::PurchaseReceipt),
		] {
			assert_eq!(LinkKind::from_parenttype(value), Some(kind));
		}
		assert_eq!(LinkKind::from_parenttype("Stock Entry"), None);
	}
}
