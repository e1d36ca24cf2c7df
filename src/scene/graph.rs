//! Retained scene graph
//!
//! Nodes live in an arena and are addressed by `NodeId` handles. A node is
//! always inserted after its parent, so world transforms resolve in a single
//! forward pass. Entities compose handles instead of extending a node type.

use glam::{Mat4, Quat, Vec3};

use crate::renderer::shapes::{Bounds, MeshData};
use crate::renderer::vertex::Material;

/// Handle to a node in a `SceneGraph`
///
/// Only valid for the graph that issued it; using a foreign handle panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to mesh data stored in a `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local transform relative to the parent node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Two-point line with bounds kept in step with its vertices
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    points: [Vec3; 2],
    pub color: [f32; 4],
    bounds: Bounds,
}

impl LineSegment {
    pub fn new(a: Vec3, b: Vec3, color: [f32; 4]) -> Self {
        Self {
            points: [a, b],
            color,
            bounds: Bounds::from_points([a, b]),
        }
    }

    pub fn points(&self) -> [Vec3; 2] {
        self.points
    }

    /// Move one endpoint (0 or 1) and recompute bounds
    pub fn set_point(&mut self, index: usize, point: Vec3) {
        self.points[index] = point;
        self.bounds = Bounds::from_points(self.points);
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Center and radius of the bounding sphere
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        (self.bounds.center(), self.bounds.radius())
    }
}

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh { mesh: MeshId, material: Material },
    Line(LineSegment),
}

#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Arena of nodes plus the meshes they reference
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    meshes: Vec<MeshData>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root group
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                transform: Transform::default(),
                visible: true,
                kind: NodeKind::Group,
            }],
            meshes: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root is always present
        false
    }

    pub fn add_mesh_data(&mut self, data: MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(data);
        id
    }

    pub fn mesh(&self, id: MeshId) -> &MeshData {
        &self.meshes[id.index()]
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        assert!(parent.index() < self.nodes.len(), "unknown parent {parent:?}");
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: Some(parent),
            transform: Transform::default(),
            visible: true,
            kind,
        });
        id
    }

    pub fn add_group(&mut self, parent: NodeId) -> NodeId {
        self.push(parent, NodeKind::Group)
    }

    pub fn add_mesh(&mut self, parent: NodeId, mesh: MeshId, material: Material) -> NodeId {
        self.push(parent, NodeKind::Mesh { mesh, material })
    }

    pub fn add_line(&mut self, parent: NodeId, a: Vec3, b: Vec3, color: [f32; 4]) -> NodeId {
        self.push(parent, NodeKind::Line(LineSegment::new(a, b, color)))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn position(&self, id: NodeId) -> Vec3 {
        self.node(id).transform.translation
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        self.node_mut(id).transform.translation = position;
    }

    pub fn rotation(&self, id: NodeId) -> Quat {
        self.node(id).transform.rotation
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) {
        self.node_mut(id).transform.rotation = rotation;
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).visible
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.node_mut(id).visible = visible;
    }

    pub fn line(&self, id: NodeId) -> Option<&LineSegment> {
        match &self.node(id).kind {
            NodeKind::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn line_mut(&mut self, id: NodeId) -> Option<&mut LineSegment> {
        match &mut self.node_mut(id).kind {
            NodeKind::Line(line) => Some(line),
            _ => None,
        }
    }

    /// World matrix of every node, indexed by `NodeId::index`
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = node.transform.matrix();
            let m = match node.parent {
                Some(p) => world[p.index()] * local,
                None => local,
            };
            world.push(m);
        }
        world
    }

    /// Effective visibility (a hidden ancestor hides the subtree)
    pub fn world_visibility(&self) -> Vec<bool> {
        let mut visible: Vec<bool> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let v = match node.parent {
                Some(p) => visible[p.index()] && node.visible,
                None => node.visible,
            };
            visible.push(v);
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shapes::sphere;
    use crate::renderer::vertex::materials;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_new_graph_has_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.node(graph.root()).parent().is_none());
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_group(root);
        let b = graph.add_group(a);
        graph.set_position(a, Vec3::new(0.0, 3.0, 0.0));
        graph.set_rotation(a, Quat::from_rotation_y(FRAC_PI_2));
        graph.set_position(b, Vec3::new(1.0, 0.0, 0.0));

        let world = graph.world_matrices();
        let p = world[b.index()].transform_point3(Vec3::ZERO);
        // +X rotated a quarter turn about Y lands on -Z
        assert!(approx(p, Vec3::new(0.0, 3.0, -1.0)));
    }

    #[test]
    fn test_hidden_parent_hides_children() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_group(root);
        let child = graph.add_line(group, Vec3::ZERO, Vec3::X, [1.0; 4]);
        graph.set_visible(group, false);

        let visible = graph.world_visibility();
        assert!(visible[root.index()]);
        assert!(!visible[group.index()]);
        assert!(!visible[child.index()]);
        assert!(graph.is_visible(child));
    }

    #[test]
    fn test_line_bounds_follow_vertices() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let id = graph.add_line(root, Vec3::ZERO, Vec3::ZERO, [1.0; 4]);
        assert_eq!(graph.line(id).unwrap().bounds().max, Vec3::ZERO);

        graph.line_mut(id).unwrap().set_point(1, Vec3::new(0.0, 2.0, 0.0));
        let line = graph.line(id).unwrap();
        assert_eq!(line.points()[1], Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(line.bounds().max, Vec3::new(0.0, 2.0, 0.0));
        let (center, radius) = line.bounding_sphere();
        assert_eq!(center, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(radius, 1.0);
    }

    #[test]
    fn test_line_accessor_on_mesh_node() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let mesh = graph.add_mesh_data(sphere(1.0, 8, 4));
        let node = graph.add_mesh(root, mesh, materials::CARBON);
        assert!(graph.line(node).is_none());
        assert!(graph.line_mut(node).is_none());
        assert_eq!(graph.mesh(mesh).vertices.len(), 8 * 4 * 6);
    }

    #[test]
    #[should_panic]
    fn test_foreign_parent_panics() {
        let mut big = SceneGraph::new();
        let root = big.root();
        let g = big.add_group(root);
        let mut small = SceneGraph::new();
        small.add_group(g);
    }
}
