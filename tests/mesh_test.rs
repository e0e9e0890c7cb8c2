use lab_ngin::{
    error::Error,
    gpu::{BufferKind, GpuBackend, ObjectUniform, VertexLayout},
    math::{Vec2, Vec3},
    resources::{
        mesh::{Mesh, SubMesh, load_mesh, load_mesh_data},
        texture::load_texture,
    },
    shader::ShaderProgram,
};

use crate::common::{
    fixtures::{self, QUAD_OBJ, TWO_MATERIAL_MTL, TWO_MATERIAL_OBJ},
    mock_gpu::MockGpu,
};

mod common;

fn triangle() -> Mesh {
    Mesh::from_data(
        "triangle",
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        vec![],
        vec![],
        vec![0, 1, 2],
        vec![],
    )
    .expect("valid triangle")
}

#[test]
fn should_load_quad_with_four_vertices_and_six_indices() {
    let dir = fixtures::temp_dir("quad");
    let path = fixtures::write(&dir, "quad.obj", QUAD_OBJ);

    let data = load_mesh_data(&path).unwrap();
    assert_eq!(data.name, "quad");
    assert_eq!(data.vertices.len(), 4);
    assert_eq!(data.tex_coords.len(), 4);
    assert_eq!(data.normals.len(), 4);
    assert_eq!(data.indices.len(), 6);
    assert!(data.indices.iter().all(|&i| i < 4));
    assert_eq!(data.submeshes.len(), 1);
    assert_eq!(data.submeshes[0].texture_path, None);
}

#[test]
fn should_flip_v_coordinate() {
    let dir = fixtures::temp_dir("flip_v");
    let path = fixtures::write(&dir, "quad.obj", QUAD_OBJ);

    let data = load_mesh_data(&path).unwrap();
    for (position, uv) in data.vertices.iter().zip(&data.tex_coords) {
        // vt (0,0) sits at y = -1 in the fixture
        let expected_v = if position.y < 0.0 { 1.0 } else { 0.0 };
        assert_eq!(uv.y, expected_v);
    }
}

#[test]
fn should_fan_triangulate_polygons() {
    let dir = fixtures::temp_dir("pentagon");
    let path = fixtures::write(
        &dir,
        "pentagon.obj",
        "v 0 0 0\nv 1 0 0\nv 1.5 1 0\nv 0.5 2 0\nv -0.5 1 0\nf 1 2 3 4 5\n",
    );

    let data = load_mesh_data(&path).unwrap();
    assert_eq!(data.indices.len(), 9);
    assert_eq!(data.vertices.len(), 5);
    // every triangle of the fan shares the first corner
    let first = data.indices[0];
    assert!(data.indices.chunks(3).all(|tri| tri.contains(&first)));
}

#[test]
fn should_default_missing_normals_and_uvs() {
    let dir = fixtures::temp_dir("bare");
    let path = fixtures::write(&dir, "bare.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

    let data = load_mesh_data(&path).unwrap();
    assert!(data.normals.iter().all(|n| *n == Vec3::new(0.0, 0.0, 1.0)));
    assert!(data.tex_coords.iter().all(|uv| *uv == Vec2::new(0.0, 0.0)));
}

#[test]
fn should_reject_out_of_range_face_index() {
    let dir = fixtures::temp_dir("out_of_range");
    let path = fixtures::write(
        &dir,
        "broken.obj",
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 9/1\n",
    );

    let err = load_mesh_data(&path).unwrap_err();
    assert!(err.is_load(), "expected a load error, got {err}");
}

#[test]
fn should_reject_face_with_two_vertices() {
    let dir = fixtures::temp_dir("short_face");
    let path = fixtures::write(&dir, "line.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 # edge\nf 1 2 3\n");

    match load_mesh_data(&path).unwrap_err() {
        Error::Load { reason, .. } => assert!(reason.contains("line 4"), "{reason}"),
        other => panic!("expected load error, got {other}"),
    }
}

#[test]
fn should_drop_uvs_present_on_only_some_faces() {
    let dir = fixtures::temp_dir("partial_uvs");
    let path = fixtures::write(
        &dir,
        "partial.obj",
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0.5 0.75\nf 1/1 2/1 3/1\nf 1 3 4\n",
    );

    let data = load_mesh_data(&path).unwrap();
    assert_eq!(data.vertices.len(), 6);
    assert_eq!(data.tex_coords.len(), data.vertices.len());
    assert!(data.tex_coords.iter().all(|uv| *uv == Vec2::new(0.0, 0.0)));
    assert_eq!(data.indices.len(), 6);
}

#[test]
fn should_report_missing_file_as_load_error() {
    let dir = fixtures::temp_dir("missing_obj");
    let mut gpu = MockGpu::new();

    let err = load_mesh(&mut gpu, dir.join("nope.obj")).unwrap_err();
    match err {
        Error::Load { path, .. } => assert!(path.ends_with("nope.obj")),
        other => panic!("expected load error, got {other}"),
    }
    assert_eq!(gpu.live_resources(), 0);
}

#[test]
fn should_share_texture_between_submeshes() {
    let dir = fixtures::temp_dir("shared_texture");
    let path = fixtures::write(&dir, "two.obj", TWO_MATERIAL_OBJ);
    fixtures::write(&dir, "two.mtl", TWO_MATERIAL_MTL);
    fixtures::write_png(&dir, "shared.png", 4, 4, [200, 10, 10, 255]);
    let mut gpu = MockGpu::new();

    let mesh = load_mesh(&mut gpu, &path).unwrap();
    assert_eq!(mesh.submeshes.len(), 2);
    assert_eq!(gpu.textures_created, 1);

    let first = mesh.submeshes[0].texture.expect("red is textured");
    let second = mesh.submeshes[1].texture.expect("blue is textured");
    assert_eq!(first.handle, second.handle);
    assert_eq!((first.width, first.height), (4, 4));
    assert_eq!(mesh.submeshes[0].material.as_deref(), Some("red"));
    assert_eq!(mesh.submeshes[1].material.as_deref(), Some("blue"));
}

#[test]
fn should_delete_shared_texture_exactly_once() {
    let dir = fixtures::temp_dir("destroy_shared");
    let path = fixtures::write(&dir, "two.obj", TWO_MATERIAL_OBJ);
    fixtures::write(&dir, "two.mtl", TWO_MATERIAL_MTL);
    fixtures::write_png(&dir, "shared.png", 2, 2, [0, 0, 255, 255]);
    let mut gpu = MockGpu::new();

    let mut mesh = load_mesh(&mut gpu, &path).unwrap();
    mesh.upload(&mut gpu).unwrap();
    let texture = mesh.submeshes[0].texture.unwrap();

    mesh.destroy(&mut gpu);
    assert_eq!(gpu.deletes_of(texture.handle), 1);
    assert_eq!(gpu.live_resources(), 0);
    assert_eq!(gpu.stale_deletes, 0);

    mesh.destroy(&mut gpu);
    assert_eq!(gpu.deletes_of(texture.handle), 1);
    assert_eq!(gpu.stale_deletes, 0);
}

#[test]
fn should_keep_distinct_textures_separate() {
    let dir = fixtures::temp_dir("distinct_textures");
    let path = fixtures::write(&dir, "two.obj", TWO_MATERIAL_OBJ);
    fixtures::write(
        &dir,
        "two.mtl",
        "newmtl red\nmap_Kd red.png\n\nnewmtl blue\nmap_Kd blue.png\n",
    );
    fixtures::write_png(&dir, "red.png", 1, 1, [255, 0, 0, 255]);
    fixtures::write_png(&dir, "blue.png", 1, 1, [0, 0, 255, 255]);
    let mut gpu = MockGpu::new();

    let mut mesh = load_mesh(&mut gpu, &path).unwrap();
    assert_eq!(gpu.textures_created, 2);
    mesh.destroy(&mut gpu);
    assert_eq!(gpu.texture_deletes.len(), 2);
    assert!(gpu.texture_deletes.values().all(|&n| n == 1));
}

#[test]
fn should_draw_untextured_when_texture_missing() {
    let dir = fixtures::temp_dir("missing_texture");
    let path = fixtures::write(&dir, "two.obj", TWO_MATERIAL_OBJ);
    fixtures::write(&dir, "two.mtl", TWO_MATERIAL_MTL);
    let mut gpu = MockGpu::new();

    let mesh = load_mesh(&mut gpu, &path).unwrap();
    assert_eq!(gpu.textures_created, 0);
    assert!(mesh.submeshes.iter().all(|s| s.texture.is_none()));
}

#[test]
fn should_load_without_material_library() {
    let dir = fixtures::temp_dir("missing_mtl");
    let path = fixtures::write(&dir, "two.obj", TWO_MATERIAL_OBJ);
    let mut gpu = MockGpu::new();

    let mesh = load_mesh(&mut gpu, &path).unwrap();
    assert_eq!(mesh.indices.len(), 12);
    assert!(mesh.submeshes.iter().all(|s| s.texture.is_none()));
}

#[test]
fn should_interleave_position_uv_normal() {
    let mesh = Mesh::from_data(
        "one",
        vec![Vec3::new(1.0, 2.0, 3.0); 3],
        vec![Vec2::new(0.25, 0.75); 3],
        vec![Vec3::new(0.0, 1.0, 0.0); 3],
        vec![0, 1, 2],
        vec![],
    )
    .unwrap();

    let data = mesh.interleaved_vertices();
    assert_eq!(data.len(), 3 * VertexLayout::FLOATS_PER_VERTEX);
    assert_eq!(&data[..8], &[1.0, 2.0, 3.0, 0.25, 0.75, 0.0, 1.0, 0.0]);
}

#[test]
fn should_validate_geometry_built_in_code() {
    let bad_index = Mesh::from_data(
        "bad",
        vec![Vec3::new(0.0, 0.0, 0.0); 3],
        vec![],
        vec![],
        vec![0, 1, 3],
        vec![],
    );
    assert!(matches!(bad_index, Err(Error::InvalidMesh { .. })));

    let partial_triangle = Mesh::from_data("bad", vec![Vec3::new(0.0, 0.0, 0.0); 3], vec![], vec![], vec![0, 1], vec![]);
    assert!(partial_triangle.is_err());

    let bad_range = Mesh::from_data(
        "bad",
        vec![Vec3::new(0.0, 0.0, 0.0); 3],
        vec![],
        vec![],
        vec![0, 1, 2],
        vec![SubMesh::untextured(0, 6)],
    );
    assert!(bad_range.is_err());

    let short_normals = Mesh::from_data(
        "bad",
        vec![Vec3::new(0.0, 0.0, 0.0); 3],
        vec![],
        vec![Vec3::new(0.0, 0.0, 1.0)],
        vec![0, 1, 2],
        vec![],
    );
    assert!(short_normals.is_err());
}

#[test]
fn should_upload_buffers_and_vertex_array() {
    let mut gpu = MockGpu::new();
    let mut mesh = triangle();
    mesh.upload(&mut gpu).unwrap();

    let objects = *mesh.gpu().unwrap();
    assert_eq!(gpu.buffers[&objects.vertex_buffer].0, BufferKind::Vertex);
    assert_eq!(gpu.buffers[&objects.index_buffer].0, BufferKind::Index);
    assert_eq!(gpu.vertex_data(objects.vertex_buffer), mesh.interleaved_vertices());
    assert_eq!(gpu.index_data(objects.index_buffer), vec![0, 1, 2]);
    assert_eq!(gpu.vertex_arrays.len(), 1);
}

#[test]
fn should_replace_previous_upload() {
    let mut gpu = MockGpu::new();
    let mut mesh = triangle();
    mesh.upload(&mut gpu).unwrap();
    let first = *mesh.gpu().unwrap();

    mesh.upload(&mut gpu).unwrap();
    let second = *mesh.gpu().unwrap();
    assert_ne!(first, second);
    assert_eq!(gpu.buffers.len(), 2);
    assert_eq!(gpu.vertex_arrays.len(), 1);
    assert_eq!(gpu.buffer_deletes, 2);
    assert_eq!(gpu.vertex_array_deletes, 1);
}

#[test]
fn should_release_partial_upload_on_failure() {
    let mut gpu = MockGpu::new();
    gpu.fail_buffer = Some(BufferKind::Index);
    let mut mesh = triangle();

    assert!(mesh.upload(&mut gpu).is_err());
    assert!(!mesh.is_uploaded());
    assert_eq!(gpu.live_resources(), 0);

    gpu.fail_buffer = None;
    gpu.fail_vertex_array = true;
    assert!(mesh.upload(&mut gpu).is_err());
    assert_eq!(gpu.live_resources(), 0);
}

#[test]
fn should_issue_one_draw_per_submesh() {
    let dir = fixtures::temp_dir("draw_submeshes");
    let path = fixtures::write(&dir, "two.obj", TWO_MATERIAL_OBJ);
    fixtures::write(&dir, "two.mtl", TWO_MATERIAL_MTL);
    fixtures::write_png(&dir, "shared.png", 2, 2, [9, 9, 9, 255]);
    let mut gpu = MockGpu::new();
    let program = ShaderProgram::from_sources(&mut gpu, "fn vs_main() {}", "fn fs_main() {}").unwrap();

    let mut mesh = load_mesh(&mut gpu, &path).unwrap();
    mesh.upload(&mut gpu).unwrap();
    mesh.draw(&mut gpu, program.handle(), ObjectUniform::default()).unwrap();

    assert_eq!(gpu.draws.len(), 2);
    assert_eq!((gpu.draws[0].first_index, gpu.draws[0].index_count), (0, 6));
    assert_eq!((gpu.draws[1].first_index, gpu.draws[1].index_count), (6, 6));
    assert!(gpu.draws.iter().all(|d| d.texture == mesh.submeshes[0].texture.map(|t| t.handle)));
    assert!(gpu.draws.iter().all(|d| d.vertex_array == mesh.gpu().unwrap().vertex_array));
}

#[test]
fn should_draw_whole_mesh_without_submeshes() {
    let mut gpu = MockGpu::new();
    let program = ShaderProgram::from_sources(&mut gpu, "fn vs_main() {}", "fn fs_main() {}").unwrap();
    let mut mesh = triangle();
    mesh.upload(&mut gpu).unwrap();

    let calls = mesh.draw_calls(program.handle(), ObjectUniform::default()).unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].first_index, 0);
    assert_eq!(calls[0].index_count, 3);
    assert_eq!(calls[0].texture, None);
}

#[test]
fn should_refuse_to_draw_before_upload() {
    let mut gpu = MockGpu::new();
    let program = ShaderProgram::from_sources(&mut gpu, "fn vs_main() {}", "fn fs_main() {}").unwrap();
    let mesh = triangle();

    let err = mesh.draw(&mut gpu, program.handle(), ObjectUniform::default()).unwrap_err();
    assert!(matches!(err, Error::GpuResource(_)));
    assert!(gpu.draws.is_empty());
}

#[test]
fn should_not_own_textures_loaded_separately() {
    let dir = fixtures::temp_dir("separate_texture");
    let png = fixtures::write_png(&dir, "solo.png", 8, 8, [1, 2, 3, 255]);
    let mut gpu = MockGpu::new();

    let texture = load_texture(&mut gpu, &png).unwrap();
    let mut mesh = triangle();
    mesh.upload(&mut gpu).unwrap();
    mesh.destroy(&mut gpu);

    assert_eq!(gpu.deletes_of(texture.handle), 0);
    assert_eq!(gpu.live_resources(), 1);
    gpu.delete_texture(texture.handle);
}
