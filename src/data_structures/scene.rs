//! Named objects placed in the world, plus the lights shining on them.

use crate::{
    camera::{Camera, CameraUniform, Projection},
    data_structures::transform::Transform,
    error::Result,
    gpu::{GpuBackend, ObjectUniform},
    lighting::Lighting,
    resources::mesh::Mesh,
    shader::ShaderProgram,
};

#[derive(Debug)]
pub struct SceneObject {
    pub name: String,
    pub mesh: Mesh,
    pub transform: Transform,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, mesh: Mesh, transform: Transform) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform,
        }
    }

    pub fn uniforms(&self, camera: &Camera, projection: &Projection) -> ObjectUniform {
        ObjectUniform::for_camera(
            camera,
            projection,
            self.transform.to_matrix(),
            self.transform.normal_matrix(),
        )
    }
}

/// Owns its objects' meshes; [`Scene::destroy`] must run before the backend
/// goes away.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    pub lighting: Lighting,
}

impl Scene {
    pub fn new(lighting: Lighting) -> Self {
        Self {
            objects: Vec::new(),
            lighting,
        }
    }

    /// Returns the object's index.
    pub fn add(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// First object called `name`.
    pub fn find(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name == name)
    }

    /// Take an object out of the scene. Its mesh is still live and now
    /// belongs to the caller.
    pub fn remove(&mut self, index: usize) -> Option<SceneObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    /// Upload every mesh that is not on the GPU yet.
    pub fn upload_all(&mut self, gpu: &mut dyn GpuBackend) -> Result<()> {
        for object in self.objects.iter_mut().filter(|o| !o.mesh.is_uploaded()) {
            object.mesh.upload(gpu)?;
        }
        Ok(())
    }

    /// Push the current lighting and issue every object's draw calls.
    pub fn draw(
        &self,
        gpu: &mut dyn GpuBackend,
        program: &ShaderProgram,
        camera: &Camera,
        projection: &Projection,
    ) -> Result<()> {
        gpu.set_lighting(&self.lighting.to_uniform());
        let mut frame = CameraUniform::new();
        frame.update_view_proj(camera, projection);
        for object in &self.objects {
            let uniforms = ObjectUniform::with_camera(
                &frame,
                object.transform.to_matrix(),
                object.transform.normal_matrix(),
            );
            object.mesh.draw(gpu, program.handle(), uniforms)?;
        }
        Ok(())
    }

    pub fn destroy(&mut self, gpu: &mut dyn GpuBackend) {
        for object in &mut self.objects {
            object.mesh.destroy(gpu);
        }
        self.objects.clear();
    }
}
