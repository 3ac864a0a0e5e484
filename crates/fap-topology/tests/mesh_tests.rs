use approx::assert_relative_eq;
use fap_core::traits::Validate;
use fap_topology::{
    fan_start, fan_surrounding_vertices, incident_edges, surrounding_vertices, Mesh,
    MeshTraversal, Point3, VertexId, VertexParent,
};

fn dvec3(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn make_quad_mesh() -> (Mesh, [VertexId; 4]) {
    let mut mesh = Mesh::new();
    let v0 = mesh.add_vertex(dvec3(0.0, 0.0, 0.0));
    let v1 = mesh.add_vertex(dvec3(1.0, 0.0, 0.0));
    let v2 = mesh.add_vertex(dvec3(1.0, 1.0, 0.0));
    let v3 = mesh.add_vertex(dvec3(0.0, 1.0, 0.0));
    (mesh, [v0, v1, v2, v3])
}

fn vertex_ids(mesh: &Mesh) -> Vec<VertexId> {
    mesh.vertices.keys().collect()
}

#[test]
fn test_single_quad_creation() {
    let (mut mesh, v) = make_quad_mesh();
    let face_id = mesh.make_face(&v).unwrap();

    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.faces.len(), 1);
    // Boundary edges carry a single half-edge
    assert_eq!(mesh.halfedges.len(), 4);
    assert_eq!(mesh.faces[face_id].ptex_index, 0);

    mesh.validate().unwrap();
}

#[test]
fn test_quad_face_halfedge_traversal() {
    let (mut mesh, v) = make_quad_mesh();
    let face_id = mesh.make_face(&v).unwrap();

    let halfedges: Vec<_> = (0..4).map(|i| mesh.face_edge(face_id, i)).collect();
    assert_eq!(halfedges, mesh.faces[face_id].halfedges);

    for (i, &he_id) in halfedges.iter().enumerate() {
        assert_eq!(mesh.edge_face(he_id), face_id);
        assert_eq!(mesh.edge_next(he_id), halfedges[(i + 1) % 4]);
        assert_eq!(mesh.edge_prev(he_id), halfedges[(i + 3) % 4]);
    }
}

#[test]
fn test_quad_face_vertex_traversal() {
    let (mut mesh, v) = make_quad_mesh();
    let face_id = mesh.make_face(&v).unwrap();

    for i in 0..4 {
        assert_eq!(mesh.face_vertex(face_id, i), v[i]);
        assert_eq!(mesh.edge_dest(mesh.face_edge(face_id, i)), v[(i + 1) % 4]);
    }
}

#[test]
fn test_two_adjacent_quads_shared_edge() {
    let mesh = Mesh::quad_grid(2, 1).unwrap();

    assert_eq!(mesh.vertices.len(), 6);
    assert_eq!(mesh.faces.len(), 2);
    assert_eq!(mesh.halfedges.len(), 8);

    let shared: Vec<_> = mesh
        .halfedges
        .iter()
        .filter(|(_, he)| he.twin.is_some())
        .collect();
    assert_eq!(shared.len(), 2, "Only the middle edge is shared");

    let (a, he) = shared[0];
    let b = he.twin.unwrap();
    assert_ne!(mesh.halfedges[a].face, mesh.halfedges[b].face);
    assert_eq!(mesh.edge_right_face(a), Some(mesh.halfedges[b].face));

    mesh.validate().unwrap();
}

#[test]
fn test_interior_vertex_neighbors() {
    let mesh = Mesh::quad_grid(2, 2).unwrap();
    let ids = vertex_ids(&mesh);
    let center = ids[4];

    let ring: Vec<_> = surrounding_vertices(&mesh, center).collect();
    assert_eq!(ring, vec![ids[3], ids[1], ids[5], ids[7]]);
    assert_eq!(incident_edges(&mesh, center).count(), 4);

    assert!(!mesh.vertex_on_boundary(center));
    assert_eq!(mesh.vertex_valence(center), 4);
    assert!(!mesh.vertex_is_extraordinary(center));
    assert!(!mesh.vertex_is_singular(center));
}

#[test]
fn test_boundary_vertex_neighbors() {
    let mesh = Mesh::quad_grid(2, 2).unwrap();
    let ids = vertex_ids(&mesh);

    // Edge-middle vertex: two faces, three neighbors
    let ring: Vec<_> = surrounding_vertices(&mesh, ids[1]).collect();
    assert_eq!(ring, vec![ids[2], ids[4], ids[0]]);
    assert!(mesh.vertex_on_boundary(ids[1]));
    assert!(!mesh.vertex_is_extraordinary(ids[1]));

    // Corner vertex: one face, two neighbors
    let ring: Vec<_> = surrounding_vertices(&mesh, ids[0]).collect();
    assert_eq!(ring, vec![ids[1], ids[3]]);
    assert_eq!(mesh.vertex_valence(ids[0]), 2);

    // The incident edge is the outgoing boundary half-edge
    let e = mesh.vertex_incident_edge(ids[1]).unwrap();
    assert!(mesh.edge_opposite(e).is_none());
    assert_eq!(mesh.edge_dest(e), ids[2]);
}

#[test]
fn test_cube_vertices_are_extraordinary() {
    let mesh = Mesh::cube().unwrap();
    for v in vertex_ids(&mesh) {
        assert!(!mesh.vertex_on_boundary(v));
        assert_eq!(mesh.vertex_valence(v), 3);
        assert!(mesh.vertex_is_extraordinary(v));
    }
}

#[test]
fn test_torus_is_regular() {
    let mesh = Mesh::torus(6, 4).unwrap();
    assert_eq!(mesh.faces.len(), 24);
    for v in vertex_ids(&mesh) {
        assert_eq!(mesh.vertex_valence(v), 4);
        assert!(!mesh.vertex_is_extraordinary(v));
    }
}

#[test]
fn test_bowtie_vertex_is_singular() {
    let positions = [
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(1.0, 1.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
        dvec3(2.0, 1.0, 0.0),
        dvec3(2.0, 2.0, 0.0),
        dvec3(1.0, 2.0, 0.0),
    ];
    let mesh = Mesh::from_polygons(&positions, &[vec![0, 1, 2, 3], vec![2, 4, 5, 6]]).unwrap();
    let ids = vertex_ids(&mesh);

    assert!(mesh.vertex_is_singular(ids[2]));
    assert!(!mesh.vertex_is_singular(ids[1]));
}

#[test]
fn test_fan_walks_stay_in_their_fan() {
    let positions = [
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(1.0, 1.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
        dvec3(2.0, 1.0, 0.0),
        dvec3(2.0, 2.0, 0.0),
        dvec3(1.0, 2.0, 0.0),
    ];
    let mesh = Mesh::from_polygons(&positions, &[vec![0, 1, 2, 3], vec![2, 4, 5, 6]]).unwrap();
    let ids = vertex_ids(&mesh);
    let faces = mesh.face_ids();

    // Vertex 2 is corner 2 of the first face and corner 0 of the second
    let first = mesh.face_edge(faces[0], 2);
    let second = mesh.face_edge(faces[1], 0);
    assert_eq!(fan_start(&mesh, first), first);
    assert_eq!(fan_start(&mesh, second), second);

    let ring: Vec<_> = fan_surrounding_vertices(&mesh, first).collect();
    assert_eq!(ring, vec![ids[3], ids[1]]);
    let ring: Vec<_> = fan_surrounding_vertices(&mesh, second).collect();
    assert_eq!(ring, vec![ids[4], ids[6]]);
}

#[test]
fn test_fan_start_matches_incident_edge_on_manifold_vertices() {
    let mesh = Mesh::quad_grid(2, 2).unwrap();
    let ids = vertex_ids(&mesh);

    for &v in &[ids[4], ids[1], ids[0]] {
        let incident = mesh.vertex_incident_edge(v).unwrap();
        for e in incident_edges(&mesh, v) {
            assert_eq!(fan_start(&mesh, e), incident);
            let fan: Vec<_> = fan_surrounding_vertices(&mesh, e).collect();
            let ring: Vec<_> = surrounding_vertices(&mesh, v).collect();
            assert_eq!(fan, ring);
        }
    }
}

#[test]
fn test_halfedge_target() {
    let (mut mesh, v) = make_quad_mesh();
    mesh.make_face(&v).unwrap();

    let he_id = mesh.find_halfedge(v[0], v[1]).unwrap();
    assert_eq!(mesh.halfedges[he_id].origin, v[0]);
    assert_eq!(mesh.halfedge_target(he_id), v[1]);
    assert!(mesh.find_halfedge(v[1], v[0]).is_none());
}

#[test]
fn test_validate_fails_for_broken_twin() {
    let mut mesh = Mesh::quad_grid(2, 1).unwrap();

    let (he, twin) = mesh
        .halfedges
        .iter()
        .find_map(|(id, he)| he.twin.map(|t| (id, t)))
        .unwrap();
    mesh.halfedges[twin].twin = None;
    assert!(mesh.halfedges[he].twin.is_some());

    assert!(mesh.validate().is_err());
}

#[test]
fn test_make_face_rejects_bad_input() {
    let (mut mesh, v) = make_quad_mesh();

    assert!(mesh.make_face(&v[..2]).is_err());
    assert!(mesh.make_face(&[v[0], v[1], v[1], v[2]]).is_err());

    mesh.make_face(&v).unwrap();
    // Same winding again would put two faces on one half-edge
    assert!(mesh.make_face(&v).is_err());
    assert_eq!(mesh.faces.len(), 1);
}

#[test]
fn test_ptex_indices_count_non_quads() {
    let positions = [
        dvec3(0.0, 0.0, 0.0),
        dvec3(1.0, 0.0, 0.0),
        dvec3(1.0, 1.0, 0.0),
        dvec3(0.0, 1.0, 0.0),
        dvec3(2.0, 0.5, 0.0),
    ];
    let mesh =
        Mesh::from_polygons(&positions, &[vec![1, 4, 2], vec![0, 1, 2, 3]]).unwrap();
    let faces = mesh.face_ids();

    assert_eq!(mesh.face_ptex_index(faces[0]), 0);
    assert_eq!(mesh.face_ptex_index(faces[1]), 3);
    assert!(mesh.face_is_extraordinary(faces[0]));
    assert!(!mesh.face_is_extraordinary(faces[1]));
}

#[test]
fn test_refinement_links() {
    let mut mesh = Mesh::quad_grid(1, 1).unwrap();
    let face = mesh.face_ids()[0];
    let children = mesh.refine_face(face).unwrap();

    for (i, &child) in children.iter().enumerate() {
        assert_eq!(mesh.face_parent(child), Some(face));
        assert_eq!(mesh.face_child_index(child), Some(i));
        assert_eq!(mesh.face_ptex_index(child), 0);
    }

    let center = mesh.faces[face].child_vertex.unwrap();
    assert_eq!(mesh.vertices[center].parent, Some(VertexParent::Face(face)));
    assert_relative_eq!(mesh.vertices[center].position.x, 0.5);

    // Child faces meet at the centroid with valence 4
    assert_eq!(mesh.vertex_valence(center), 4);
    assert!(!mesh.vertex_on_boundary(center));

    for e in 0..4 {
        assert!(mesh.edge_has_child(mesh.face_edge(face, e)));
    }
    mesh.validate().unwrap();
}

#[test]
fn test_forced_children_are_idempotent() {
    let mut mesh = Mesh::quad_grid(1, 1).unwrap();
    let face = mesh.face_ids()[0];
    let e = mesh.face_edge(face, 0);
    let v = mesh.face_vertex(face, 0);

    let a = MeshTraversal::subdivide_edge(&mut mesh, e);
    let b = MeshTraversal::subdivide_edge(&mut mesh, e);
    assert_eq!(a, b);

    let c = mesh.subdivide_vertex(v);
    assert_eq!(mesh.vertex_child(v), Some(c));
    assert_eq!(mesh.vertices.len(), 6);
}

#[test]
fn test_face_varying_access() {
    let mut mesh = Mesh::with_face_varying_width(2);
    let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .iter()
        .map(|&(x, y)| mesh.add_vertex(dvec3(x, y, 0.0)))
        .collect();
    let face = mesh.make_face(&v).unwrap();

    assert_eq!(mesh.face_varying(face, 3), &[0.0, 0.0]);
    mesh.set_face_varying(face, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
        .unwrap();
    assert_eq!(mesh.face_varying(face, 2), &[1.0, 1.0]);
    assert!(mesh.set_face_varying(face, &[0.0; 3]).is_err());
}

#[test]
fn test_tags_and_remap() {
    let mut mesh = Mesh::quad_grid(2, 1).unwrap();
    let faces = mesh.face_ids();
    let ids = vertex_ids(&mesh);

    mesh.tag_face(faces[1]).unwrap();
    mesh.tag_vertex(ids[2]).unwrap();
    mesh.set_hole(faces[0], true).unwrap();

    assert!(mesh.face_is_tagged(faces[1]));
    assert!(!mesh.face_is_tagged(faces[0]));
    assert!(mesh.face_is_hole(faces[0]));
    assert!(mesh.vertex_is_tagged(ids[2]));
    assert!(!mesh.vertex_was_tagged(ids[2]));

    let remap = mesh.vertex_remap();
    assert_eq!(remap.len(), 6);
    for (i, &v) in ids.iter().enumerate() {
        assert_eq!(remap[v], i as u32);
    }
}
