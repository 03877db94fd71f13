use thiserror::Error;

/// Everything that can go wrong between picking a document and showing
/// its links. All variants are recovered at the point of detection and
/// surfaced as a transient notice; none of them tear down the page.
///
/// The `Display` strings double as the user-facing notice text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkageError {
	#[error("No document specified.")]
	MissingInput,

	/// The document type has no resolver. Benign: the node is a leaf,
	/// not a failure.
	#[error("This is the last node.")]
	UnsupportedDocumentType(String),

	#[error("No items to display.")]
	EmptyResult,

	/// The resolver answered, but every group it returned was empty.
	#[error("No connections found for this document.")]
	NoConnections,

	#[error("Invalid data format: {0}")]
	MalformedResponse(String),

	#[error("Failed to fetch linked documents: {0}")]
	Transport(String),
}

impl LinkageError {
	/// Leaf notices are expected behavior; everything else is a fault.
	pub fn is_benign(&self) -> bool {
		matches!(self, LinkageError::UnsupportedDocumentType(_))
	}
}
