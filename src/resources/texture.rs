use std::path::Path;

use image::GenericImageView;

use crate::{
    error::{Error, Result},
    gpu::{GpuBackend, TextureDesc, TextureHandle},
};

/// A texture living on the GPU.
///
/// `Copy` so that several submeshes can refer to the same upload; exactly one
/// owner must call [`destroy`](Self::destroy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn from_image(gpu: &mut dyn GpuBackend, img: &image::DynamicImage, label: &str) -> Result<Self> {
        Self::from_image_with(gpu, img, &TextureDesc::labeled(label))
    }

    /// Upload with explicit sampling and mipmap settings.
    pub fn from_image_with(
        gpu: &mut dyn GpuBackend,
        img: &image::DynamicImage,
        desc: &TextureDesc,
    ) -> Result<Self> {
        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();
        let handle = gpu.create_texture(&rgba, desc)?;
        Ok(Self { handle, width, height })
    }

    pub fn destroy(self, gpu: &mut dyn GpuBackend) {
        gpu.delete_texture(self.handle);
    }
}

/// Decode an image file. Any failure, including a missing file, is a load error.
pub fn decode_image(path: impl AsRef<Path>) -> Result<image::DynamicImage> {
    let path = path.as_ref();
    image::open(path).map_err(|e| Error::load(path, e))
}

/// Load an image file as a mipmapped, repeating, trilinear-filtered texture.
///
/// No placeholder is ever substituted: callers that can live without the
/// texture decide that themselves.
pub fn load_texture(gpu: &mut dyn GpuBackend, path: impl AsRef<Path>) -> Result<Texture> {
    let path = path.as_ref();
    let desc = TextureDesc::labeled(path.display().to_string());
    load_texture_with(gpu, path, &desc)
}

pub fn load_texture_with(
    gpu: &mut dyn GpuBackend,
    path: impl AsRef<Path>,
    desc: &TextureDesc,
) -> Result<Texture> {
    let path = path.as_ref();
    let img = decode_image(path)?;
    let texture = Texture::from_image_with(gpu, &img, desc)?;
    log::info!(
        "loaded texture {} ({}x{})",
        path.display(),
        texture.width,
        texture.height
    );
    Ok(texture)
}
