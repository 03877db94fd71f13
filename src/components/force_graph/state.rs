use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::linkage::model::{GraphData, GraphNode};

use super::types::{DragState, HIT_RADIUS, HoverState, NodeInfo, PanState, ViewTransform};

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	id_to_idx: HashMap<String, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	edge_set: HashSet<(DefaultNodeIdx, DefaultNodeIdx)>,
	spawn_angle: f64,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64) -> Self {
		let graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});

		let mut state = Self {
			graph,
			transform: ViewTransform::new(width / 2.0, height / 2.0, 1.0),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			id_to_idx: HashMap::new(),
			edges: Vec::new(),
			edge_set: HashSet::new(),
			spawn_angle: 0.0,
		};

		// Seed the initial nodes on a ring around the graph origin; the
		// simulation spreads them out from there.
		let count = data.nodes.len().max(1);
		for (i, node) in data.nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / count as f64;
			state.insert_node(node, (100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32);
		}
		state.add_missing_edges(data);
		state
	}

	fn insert_node(&mut self, node: &GraphNode, x: f32, y: f32) -> DefaultNodeIdx {
		let idx = self.graph.add_node(NodeData {
			x,
			y,
			mass: 10.0,
			is_anchor: false,
			user_data: NodeInfo {
				color: node.kind.color().to_string(),
				node: node.clone(),
			},
		});
		self.id_to_idx.insert(node.id.clone(), idx);
		idx
	}

	fn add_missing_edges(&mut self, data: &GraphData) {
		for link in &data.links {
			let (Some(&src), Some(&tgt)) = (
				self.id_to_idx.get(&link.source),
				self.id_to_idx.get(&link.target),
			) else {
				continue;
			};
			if self.edge_set.insert((src, tgt)) {
				self.graph.add_edge(src, tgt, EdgeData::default());
				self.edges.push((src, tgt));
			}
		}
	}

	/// Fold freshly aggregated data into the running simulation without
	/// disturbing nodes that are already placed. New nodes spawn next
	/// to their first already-present parent.
	pub fn merge(&mut self, data: &GraphData) {
		for node in &data.nodes {
			if let Some(&idx) = self.id_to_idx.get(&node.id) {
				let expanded = node.expanded;
				self.graph.visit_nodes_mut(|n| {
					if n.index() == idx {
						n.data.user_data.node.expanded = expanded;
					}
				});
				continue;
			}

			let anchor = data
				.links
				.iter()
				.find(|l| l.target == node.id)
				.and_then(|l| self.id_to_idx.get(&l.source).copied())
				.and_then(|idx| self.node_position(idx))
				.unwrap_or((0.0, 0.0));

			self.spawn_angle += 2.4;
			let (x, y) = (
				anchor.0 + (80.0 * self.spawn_angle.cos()) as f32,
				anchor.1 + (80.0 * self.spawn_angle.sin()) as f32,
			);
			self.insert_node(node, x, y);
		}
		self.add_missing_edges(data);
	}

	fn node_position(&self, idx: DefaultNodeIdx) -> Option<(f32, f32)> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x(), node.y()));
			}
		});
		found
	}

	pub fn node_info(&self, idx: DefaultNodeIdx) -> Option<GraphNode> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.node.clone());
			}
		});
		found
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	/// Dragging pins the node; releasing hands it back to the
	/// simulation.
	pub fn release_drag(&mut self) {
		if let Some(idx) = self.drag.node_idx {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = false;
				}
			});
		}
		self.drag = DragState::default();
	}

	pub fn set_hover(&mut self, node: Option<DefaultNodeIdx>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Save previous state for fade-out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.node = node;
		self.hover.neighbors.clear();

		if let Some(idx) = node {
			if !was_hovering {
				self.hover.delay_t = 0.0;
			}
			for &(src, tgt) in &self.edges {
				if src == idx {
					self.hover.neighbors.insert(tgt);
				} else if tgt == idx {
					self.hover.neighbors.insert(src);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx)
			|| self.hover.neighbors.contains(&idx)
			|| self.hover.prev_node == Some(idx)
			|| self.hover.prev_neighbors.contains(&idx)
	}

	pub fn is_hovered(&self, idx: DefaultNodeIdx) -> bool {
		self.hover.node == Some(idx) || self.hover.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.flow_time += dt as f64;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt as f64).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt as f64;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.prev_node = None;
				self.hover.prev_neighbors.clear();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
