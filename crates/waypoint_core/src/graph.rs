//! Navigation graph: nodes, directed edges and their segment membership.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Handles are never reused,
//! so a deleted node's handle stays dead for the lifetime of the graph.
//! Edges are stored in their source node's outgoing list as
//! `(from, to, distance, angle)` records; there are no back-pointers.
//!
//! Each node is also registered in exactly one spatial segment, computed
//! once from its position at creation. Segment member lists keep insertion
//! order, which makes neighbour enumeration (and everything built on it)
//! deterministic.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::collision::{probe_straight_line, CollisionFilter, CollisionWorld};
use crate::error::{NavError, Result};
use crate::level::{Level, LevelGeometry, SegmentCoord};
use crate::math::{Rect, Vec2};

/// Stable handle to a node in a [`NavGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Directional filter applied when connecting a node to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Any direction.
    AllDirections,
    /// Only 0, 90, 180 and -90 degrees.
    #[default]
    CardinalOnly,
    /// Only 45, 135, -45 and -135 degrees.
    DiagonalOnly,
    /// Cardinal or diagonal directions.
    CardinalAndDiagonal,
}

impl ConnectionMode {
    /// Returns true if a neighbour at `degrees` (rounded) may be connected.
    #[must_use]
    pub const fn accepts(self, degrees: i32) -> bool {
        let cardinal = matches!(degrees, 0 | 90 | 180 | -90 | -180);
        let diagonal = matches!(degrees, 45 | -45 | 135 | -135);
        match self {
            Self::AllDirections => true,
            Self::CardinalOnly => cardinal,
            Self::DiagonalOnly => diagonal,
            Self::CardinalAndDiagonal => cardinal || diagonal,
        }
    }

    /// Returns true if diagonal neighbours are requested explicitly.
    #[must_use]
    pub const fn includes_diagonals(self) -> bool {
        matches!(self, Self::DiagonalOnly | Self::CardinalAndDiagonal)
    }
}

/// A directed, collision-validated connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Euclidean distance between the node centers.
    pub distance: f64,
    /// Direction from source to target in radians.
    pub angle: f64,
}

/// A point of walkable space.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    position: Vec2,
    radius: f64,
    connection_radius: f64,
    node_type: Option<String>,
    collision: CollisionFilter,
    segment: SegmentCoord,
    edges: Vec<Edge>,
}

impl Node {
    /// Handle of this node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Center of the node.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Half-size of the node's bounding square.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Longest edge this node will attempt.
    #[must_use]
    pub const fn connection_radius(&self) -> f64 {
        self.connection_radius
    }

    /// Free-form classification tag.
    #[must_use]
    pub fn node_type(&self) -> Option<&str> {
        self.node_type.as_deref()
    }

    /// Geometry the node's edge probes collide with.
    #[must_use]
    pub const fn collision(&self) -> CollisionFilter {
        self.collision
    }

    /// Segment the node was registered in at creation.
    #[must_use]
    pub const fn segment(&self) -> SegmentCoord {
        self.segment
    }

    /// Outgoing edges in creation order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Bounding square used for probing and rect queries.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.radius * 2.0, self.radius * 2.0)
    }

    /// Returns true if this node has an outgoing edge to `target`.
    #[must_use]
    pub fn has_edge_to(&self, target: NodeId) -> bool {
        self.edges.iter().any(|e| e.to == target)
    }

    /// Targets of outgoing edges in edge order.
    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.edges.iter().map(|e| e.to)
    }
}

/// Parameters for creating a node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    /// Center of the node.
    pub position: Vec2,
    /// Half-size of the node's bounding square.
    pub radius: f64,
    /// Longest edge the node will attempt.
    pub connection_radius: f64,
    /// Optional classification tag.
    pub node_type: Option<String>,
    /// Geometry the node's edge probes collide with.
    pub collision: CollisionFilter,
}

impl NodeSpec {
    /// Spec with the default node shape (radius 1, reach 50).
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            radius: 1.0,
            connection_radius: 50.0,
            node_type: None,
            collision: CollisionFilter::default(),
        }
    }

    /// Set the bounding radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the connection radius.
    #[must_use]
    pub fn with_connection_radius(mut self, connection_radius: f64) -> Self {
        self.connection_radius = connection_radius;
        self
    }

    /// Set the classification tag.
    #[must_use]
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Set the collision filter used for edge probes.
    #[must_use]
    pub fn with_collision(mut self, collision: CollisionFilter) -> Self {
        self.collision = collision;
        self
    }
}

/// A tagged region of the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Area covered by the zone.
    pub rect: Rect,
    /// Free-form zone classification.
    pub zone_type: String,
}

/// The navigation graph of one level.
#[derive(Debug, Clone)]
pub struct NavGraph {
    geometry: LevelGeometry,
    /// Node arena; `None` marks a deleted node.
    slots: Vec<Option<Node>>,
    /// Live nodes in insertion order.
    order: Vec<NodeId>,
    /// Node members per segment, indexed by [`LevelGeometry::flat_index`].
    segments: Vec<Vec<NodeId>>,
    zones: Vec<Zone>,
}

impl NavGraph {
    /// Create an empty graph for a level.
    pub fn new<L: Level + ?Sized>(level: &L) -> Self {
        Self::with_geometry(level.geometry())
    }

    /// Create an empty graph for a level layout.
    #[must_use]
    pub fn with_geometry(geometry: LevelGeometry) -> Self {
        Self {
            geometry,
            slots: Vec::new(),
            order: Vec::new(),
            segments: vec![Vec::new(); geometry.segment_count()],
            zones: Vec::new(),
        }
    }

    /// Layout of the owning level.
    #[must_use]
    pub const fn geometry(&self) -> &LevelGeometry {
        &self.geometry
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the graph holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes().map(|n| n.edges.len()).sum()
    }

    /// Returns true if `id` names a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Look up a live node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(NavError::UnknownNode(id))
    }

    fn require(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(NavError::UnknownNode(id))
    }

    /// Live node handles in insertion order.
    #[must_use]
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order.iter().filter_map(|&id| self.node(id))
    }

    /// Node members of a segment in insertion order.
    #[must_use]
    pub fn segment_nodes(&self, segment: SegmentCoord) -> &[NodeId] {
        if segment.sx >= self.geometry.columns || segment.sy >= self.geometry.rows {
            return &[];
        }
        &self.segments[self.geometry.flat_index(segment)]
    }

    /// Create a node and register it in its segment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the position is not finite, a radius
    /// is negative, or the position lies outside the level's segment grid.
    pub fn add_node(&mut self, spec: NodeSpec) -> Result<NodeId> {
        if !spec.position.is_finite() {
            return Err(NavError::Configuration(format!(
                "node position must be finite, got {}",
                spec.position
            )));
        }
        if !(spec.radius >= 0.0 && spec.connection_radius >= 0.0) {
            return Err(NavError::Configuration(format!(
                "node radii must be non-negative, got radius {} and connection radius {}",
                spec.radius, spec.connection_radius
            )));
        }

        let (sx, sy) = self.geometry.segment_index(spec.position);
        let segment = self
            .geometry
            .checked_segment(sx, sy)
            .ok_or(NavError::SegmentOutOfBounds {
                sx,
                sy,
                columns: self.geometry.columns,
                rows: self.geometry.rows,
            })?;

        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(Node {
            id,
            position: spec.position,
            radius: spec.radius,
            connection_radius: spec.connection_radius,
            node_type: spec.node_type,
            collision: spec.collision,
            segment,
            edges: Vec::new(),
        }));
        self.order.push(id);
        let flat = self.geometry.flat_index(segment);
        self.segments[flat].push(id);
        Ok(id)
    }

    /// Add a single directed edge `from -> to`.
    ///
    /// Self-loops are rejected and an existing edge is never duplicated.
    /// Returns true if an edge was added.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Result<bool> {
        let target = self.require(to)?.position;
        let source = self.node_mut(from)?;
        if from == to || source.has_edge_to(to) {
            return Ok(false);
        }

        let origin = source.position;
        source.edges.push(Edge {
            from,
            to,
            distance: origin.distance(target),
            angle: origin.angle_to(target),
        });
        Ok(true)
    }

    /// Add edges in both directions between `a` and `b`.
    pub fn connect_pair(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        self.require(a)?;
        self.require(b)?;
        self.add_edge(a, b)?;
        self.add_edge(b, a)?;
        Ok(())
    }

    /// Candidate neighbours of a node: every other node registered in the
    /// segments overlapping its rect inflated by its connection radius.
    fn candidates(&self, node: &Node) -> Vec<NodeId> {
        let reach = node.connection_radius * 2.0;
        let query = node.rect().inflate(reach, reach);
        self.geometry
            .segments_overlapping(query)
            .flat_map(|segment| self.segment_nodes(segment).iter().copied())
            .filter(|&other| other != node.id)
            .collect()
    }

    /// Connect a node to every eligible neighbour it can walk to in a
    /// straight line.
    ///
    /// A neighbour is eligible if its rounded direction passes `mode` and it
    /// lies within the node's connection radius. Each eligible neighbour is
    /// validated with a probe shaped like the node's rect; only a move that
    /// is unobstructed on both axes creates the edge pair. Returns the number
    /// of neighbours newly connected.
    pub fn connect<W>(&mut self, id: NodeId, mode: ConnectionMode, world: &mut W) -> Result<usize>
    where
        W: CollisionWorld + ?Sized,
    {
        let node = self.require(id)?;
        let origin = node.position;
        let rect = node.rect();
        let reach = node.connection_radius;
        let filter = node.collision;

        let mut connected = 0;
        for other in self.candidates(node) {
            let Some(candidate) = self.node(other) else {
                continue;
            };
            let target = candidate.position;
            if !mode.accepts(origin.angle_to_degrees(target)) {
                continue;
            }
            if origin.distance(target) > reach {
                continue;
            }
            if self.require(id)?.has_edge_to(other) && candidate.has_edge_to(id) {
                continue;
            }

            let result = probe_straight_line(world, rect, target - origin, filter)?;
            if result.unobstructed() {
                trace!(from = %id, to = %other, "edge validated");
                self.connect_pair(id, other)?;
                connected += 1;
            } else {
                trace!(
                    from = %id,
                    to = %other,
                    moved_x = result.moved_x,
                    moved_y = result.moved_y,
                    "edge rejected"
                );
            }
        }
        Ok(connected)
    }

    /// Remove every outgoing edge of a node. Incoming edges are untouched.
    pub fn clear_edges(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.edges.clear();
        Ok(())
    }

    /// Remove a node's outgoing edges and the reverse edges its neighbours
    /// hold back to it.
    ///
    /// Unlike [`NavGraph::refresh_connections`], this leaves no one-way edge
    /// into the node from a former neighbour.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        let outgoing = std::mem::take(&mut self.node_mut(id)?.edges);
        for edge in outgoing {
            if let Some(Some(neighbor)) = self.slots.get_mut(edge.to.0 as usize) {
                neighbor.edges.retain(|e| e.to != id);
            }
        }
        Ok(())
    }

    /// Rebuild a node's connectivity against current geometry.
    ///
    /// Clears the node's outgoing edges, then runs [`NavGraph::connect`].
    /// Edges neighbours hold into the node are kept, so a neighbour the node
    /// no longer reaches keeps a one-way edge to it.
    pub fn refresh_connections<W>(
        &mut self,
        id: NodeId,
        mode: ConnectionMode,
        world: &mut W,
    ) -> Result<usize>
    where
        W: CollisionWorld + ?Sized,
    {
        self.clear_edges(id)?;
        self.connect(id, mode, world)
    }

    /// Delete a node and every edge that references it.
    ///
    /// The node leaves the graph's node list and its segment; every live
    /// node drops its edges targeting the deleted node, including one-way
    /// edges the deleted node had no reverse for.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        let node = self
            .slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(NavError::UnknownNode(id))?;

        self.order.retain(|&n| n != id);
        let flat = self.geometry.flat_index(node.segment);
        self.segments[flat].retain(|&n| n != id);
        for other in self.slots.iter_mut().flatten() {
            other.edges.retain(|e| e.to != id);
        }
        Ok(node)
    }

    /// Register a zone.
    pub fn add_zone(&mut self, rect: Rect, zone_type: impl Into<String>) {
        self.zones.push(Zone {
            rect,
            zone_type: zone_type.into(),
        });
    }

    /// Zones in registration order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zones containing a point.
    pub fn zones_containing(&self, pos: Vec2) -> impl Iterator<Item = &Zone> + '_ {
        self.zones.iter().filter(move |z| z.rect.contains_point(pos))
    }

    /// Start and end positions of every edge, for debug drawing.
    pub fn edge_segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.nodes().flat_map(move |node| {
            node.edges.iter().filter_map(move |edge| {
                self.node(edge.to).map(|target| (node.position, target.position))
            })
        })
    }

    /// Waypoint positions of a path; dead handles are skipped.
    #[must_use]
    pub fn path_positions(&self, path: &[NodeId]) -> Vec<Vec2> {
        path.iter()
            .filter_map(|&id| self.node(id).map(Node::position))
            .collect()
    }
}
