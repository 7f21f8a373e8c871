//! Scene graph: an arena of parented nodes plus camera, lights and the
//! theme-controlled environment.
//!
//! The graph owns every node for its whole lifetime. Builders hand out
//! [`NodeId`]s; animation passes only mutate transforms of nodes that are
//! already registered. Geometry and material resources live in side tables
//! so several meshes can share one primitive, and each resource is released
//! at most once by [`SceneGraph::dispose`].

mod camera;
mod geometry;
mod light;
mod transform;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;

pub use camera::{Camera, Projected};
pub use geometry::{Geometry, Material};
pub use light::{AmbientLight, DirectionalLight, Environment, Fog};
pub use transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    released: bool,
}

/// Counts of resources freed by one [`SceneGraph::dispose`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposeReport {
    pub geometries: usize,
    pub materials: usize,
}

/// A mesh resolved to world space, ready for a render pass.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance<'a> {
    pub node: NodeId,
    pub world: Mat4,
    pub geometry: &'a Geometry,
    pub material: &'a Material,
}

pub struct SceneGraph {
    nodes: Vec<Node>,
    root: NodeId,
    geometries: Vec<Slot<Geometry>>,
    materials: Vec<Slot<Material>>,
    pub camera: Camera,
    pub lights: Vec<DirectionalLight>,
    environment: Rc<RefCell<Environment>>,
}

impl SceneGraph {
    pub fn new(camera: Camera, environment: Environment) -> Self {
        let root = Node {
            name: "scene".to_string(),
            transform: Transform::IDENTITY,
            kind: NodeKind::Group,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            geometries: Vec::new(),
            materials: Vec::new(),
            camera,
            lights: Vec::new(),
            environment: Rc::new(RefCell::new(environment)),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(Slot {
            value: geometry,
            released: false,
        });
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(Slot {
            value: material,
            released: false,
        });
        MaterialId(self.materials.len() - 1)
    }

    /// Live geometry, `None` once released
    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0).filter(|s| !s.released).map(|s| &s.value)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0).filter(|s| !s.released).map(|s| &s.value)
    }

    pub fn add_group(&mut self, parent: NodeId, name: &str, transform: Transform) -> NodeId {
        self.insert(parent, name, transform, NodeKind::Group)
    }

    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
        transform: Transform,
    ) -> NodeId {
        self.insert(parent, name, transform, NodeKind::Mesh { geometry, material })
    }

    fn insert(&mut self, parent: NodeId, name: &str, transform: Transform, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            transform,
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn transform(&self, id: NodeId) -> &Transform {
        &self.nodes[id.0].transform
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Mesh { .. }))
            .count()
    }

    /// Depth-first, parents before children
    pub fn traverse(&self, from: NodeId, visit: &mut impl FnMut(NodeId, &Node)) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            visit(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Parent chain composed down to `id`
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id.0].transform.matrix();
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            matrix = self.nodes[parent.0].transform.matrix() * matrix;
            cursor = self.nodes[parent.0].parent;
        }
        matrix
    }

    /// All meshes whose resources are still live, with world matrices
    pub fn meshes(&self) -> Vec<MeshInstance<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.matrix();
            if let NodeKind::Mesh { geometry, material } = node.kind {
                if let (Some(geometry), Some(material)) = (self.geometry(geometry), self.material(material)) {
                    out.push(MeshInstance {
                        node: id,
                        world,
                        geometry,
                        material,
                    });
                }
            }
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
        out
    }

    /// Shared handle used by the theme binder
    pub fn environment(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.environment)
    }

    pub fn environment_snapshot(&self) -> Environment {
        *self.environment.borrow()
    }

    /// Release every geometry and material reachable from the root,
    /// depth-first. Resources already released are skipped, so repeated
    /// calls are no-ops.
    pub fn dispose(&mut self) -> DisposeReport {
        let mut reachable = Vec::new();
        self.traverse(self.root, &mut |_, node| {
            if let NodeKind::Mesh { geometry, material } = node.kind {
                reachable.push((geometry, material));
            }
        });

        let mut report = DisposeReport::default();
        for (geometry, material) in reachable {
            let g = &mut self.geometries[geometry.0];
            if !g.released {
                g.released = true;
                report.geometries += 1;
            }
            let m = &mut self.materials[material.0];
            if !m.released {
                m.released = true;
                report.materials += 1;
            }
        }
        report
    }

    /// `(geometries, materials)` not yet released
    pub fn live_resources(&self) -> (usize, usize) {
        (
            self.geometries.iter().filter(|s| !s.released).count(),
            self.materials.iter().filter(|s| !s.released).count(),
        )
    }
}
