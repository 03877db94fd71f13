pub mod doc_picker;
pub mod force_graph;
pub mod link_tree;
pub mod notices;
