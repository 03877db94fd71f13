//! Typed routing from document types to backend resolvers.

use std::fmt;

/// Document types the traceability page understands.
///
/// Only the three variants with a mapped resolver can be expanded
/// further; every other type is a terminal leaf and never reaches the
/// backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DocType {
	SalesOrder,
	MaterialRequest,
	PurchaseOrder,
	Other(String),
}

/// Resolver lookup table: human label to whitelisted backend method.
const RESOLVERS: &[(&str, &str)] = &[
	("Sales Order", "get_sales_order_links"),
	("Material Request", "get_material_request_links"),
	("Purchase Order", "get_purchase_order_links"),
];

/// Document types offered by the root picker.
pub const SELECTABLE: &[&str] = &[
	"Sales Order",
	"Purchase Order",
	"Sales Invoice",
	"Purchase Invoice",
	"Material Request",
	"Delivery Note",
];

impl DocType {
	pub fn parse(label: &str) -> Self {
		match label {
			"Sales Order" => DocType::SalesOrder,
			"Material Request" => DocType::MaterialRequest,
			"Purchase Order" => DocType::PurchaseOrder,
			other => DocType::Other(other.to_string()),
		}
	}

	pub fn label(&self) -> &str {
		match self {
			DocType::SalesOrder => "Sales Order",
			DocType::MaterialRequest => "Material Request",
			DocType::PurchaseOrder => "Purchase Order",
			DocType::Other(label) => label,
		}
	}

	/// Backend method serving this type's linkage, if any.
	///
	/// `Other` can never appear in [`RESOLVERS`], so unsupported types
	/// short-circuit before a request is ever built.
	pub fn resolver(&self) -> Option<&'static str> {
		RESOLVERS
			.iter()
			.find(|(label, _)| *label == self.label())
			.map(|(_, method)| *method)
	}

	pub fn is_expandable(&self) -> bool {
		self.resolver().is_some()
	}
}

impl fmt::Display for DocType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_round_trips_known_labels() {
		for label in ["Sales Order", "Material Request", "Purchase Order"] {
			assert_eq!(DocType::parse(label).label(), label);
		}
	}

	#[test]
	fn resolver_set_is_the_superset_contract() {
		assert_eq!(
			DocType::SalesOrder.resolver(),
			Some("get_sales_order_links")
		);
		assert_eq!(
			DocType::MaterialRequest.resolver(),
			Some("get_material_request_links")
		);
		assert_eq!(
			DocType::PurchaseOrder.resolver(),
			Some("get_purchase_order_links")
		);
	}

	#[test]
	fn unmapped_types_are_leaves() {
		for label in ["Sales Invoice", "Purchase Invoice", "Delivery Note", "Item"] {
			let doctype = DocType::parse(label);
			assert_eq!(doctype, DocType::Other(label.to_string()));
			assert!(doctype.resolver().is_none());
			assert!(!doctype.is_expandable());
		}
	}
}
