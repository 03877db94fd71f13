//! Wire shapes returned by the linkage resolvers.

use std::collections::BTreeMap;

use serde::Deserialize;

/// The RPC transport wraps every payload in a `message` key.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
	#[serde(default)]
	pub message: Option<T>,
}

/// Flat response used to seed graph mode: every root item with its
/// full multi-level chain inlined.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemLinks {
	#[serde(default)]
	pub items: Vec<RootItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootItem {
	pub item_code: String,
	#[serde(default)]
	pub item_name: String,
	#[serde(default)]
	pub sales_order_qty: f64,
	#[serde(default)]
	pub sales_invoices: Vec<SalesInvoiceLink>,
	#[serde(default)]
	pub delivery_notes: Vec<DeliveryNoteLink>,
	#[serde(default)]
	pub material_requests: Vec<MaterialRequestLink>,
	#[serde(default)]
	pub purchase_orders: Vec<PurchaseOrderLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesInvoiceLink {
	pub sales_invoice: String,
	#[serde(default)]
	pub qty: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryNoteLink {
	pub delivery_note: String,
	#[serde(default)]
	pub qty: f64,
}

/// Material requests nest the purchase orders raised against them.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialRequestLink {
	pub material_request: String,
	#[serde(default)]
	pub qty: f64,
	#[serde(default)]
	pub purchase_orders: Vec<PurchaseOrderLink>,
}

/// Purchase orders nest the invoices billed against them.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseOrderLink {
	pub purchase_order: String,
	#[serde(default)]
	pub qty: f64,
	#[serde(default)]
	pub purchase_invoices: Vec<PurchaseInvoiceLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseInvoiceLink {
	pub purchase_invoice: String,
	#[serde(default)]
	pub qty: f64,
}

/// One item row inside a related document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkRow {
	#[serde(default)]
	pub item_code: String,
	#[serde(default)]
	pub quantity: f64,
	#[serde(default)]
	pub parenttype: String,
}

/// Tree-mode response: one map per linkage category, each keyed by
/// related-document name.
pub type LinkGroups = Vec<BTreeMap<String, Vec<LinkRow>>>;

/// Names for the document-name listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList {
	#[serde(default)]
	pub data: Vec<DocName>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocName {
	pub name: String,
}

/// True when the resolver answered but every category map is empty:
/// the document exists and has no connections at all.
pub fn logically_empty(groups: &LinkGroups) -> bool {
	groups.iter().all(BTreeMap::is_empty)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn flat_shape_parses_with_nested_chains() {
		let value = json!({
			"message": {
				"items": [{
					"item_code": "ITEM-A",
					"item_name": "Widget",
					"sales_order_qty": 5,
					"sales_invoices": [{"sales_invoice": "SINV-01", "qty": 5}],
					"delivery_notes": [],
					"material_requests": [{
						"material_request": "MR-01",
						"qty": 2,
						"purchase_orders": [{
							"purchase_order": "PO-01",
							"qty": 2,
							"purchase_invoices": [{"purchase_invoice": "PINV-01", "qty": 2}]
						}]
					}],
					"purchase_orders": []
				}]
			}
		});

		let envelope: Envelope<ItemLinks> = serde_json::from_value(value).unwrap();
		let items = envelope.message.unwrap().items;
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].sales_invoices[0].sales_invoice, "SINV-01");
		assert_eq!(
			items[0].material_requests[0].purchase_orders[0].purchase_invoices[0]
				.purchase_invoice,
			"PINV-01"
		);
	}

	#[test]
	fn tree_shape_parses_grouped_rows() {
		let value = json!([
			{"DN-01": [{"item_code": "ITEM-A", "quantity": 3, "parenttype": "Delivery Note"}]},
			{},
			{"MR-01": [
				{"item_code": "ITEM-A", "quantity": 1, "parenttype": "Material Request"},
				{"item_code": "ITEM-B", "quantity": 2, "parenttype": "Material Request"}
			]}
		]);

		let groups: LinkGroups = serde_json::from_value(value).unwrap();
		assert_eq!(groups.len(), 3);
		assert_eq!(groups[0]["DN-01"][0].parenttype, "Delivery Note");
		assert_eq!(groups[2]["MR-01"].len(), 2);
		assert!(!logically_empty(&groups));
	}

	#[test]
	fn all_empty_groups_are_logically_empty() {
		let groups: LinkGroups = serde_json::from_value(json!([{}, {}, {}, {}])).unwrap();
		assert!(logically_empty(&groups));
		assert!(logically_empty(&LinkGroups::new()));
	}

	#[test]
	fn missing_message_key_is_tolerated() {
		let envelope: Envelope<ItemLinks> = serde_json::from_value(json!({})).unwrap();
		assert!(envelope.message.is_none());
	}
}
