//! Static 2D textures.
//!
//! `Texture::create` decodes an image file to tightly packed RGBA8 and
//! uploads it with this fixed sampling setup:
//!
//! - wrap S/T: clamp to edge
//! - min filter: linear-mipmap-nearest
//! - mag filter: nearest (animated frames use linear)
//! - one storage level, then mipmap generation
//!
//! Every step is error-checked. A failing step releases the texture
//! before the error is returned.

use std::path::Path;
use crate::device::{
    check_graphics, null_handle, GraphicsDevice, NativeHandle, PixelFormat, Rollback,
    TextureFilter, TextureParameter, TextureWrap,
};
use crate::error::Result;
use crate::engine_err;

const SOURCE: &str = "lumen::Texture";

// ===== DECODED IMAGE =====

/// RGBA8 pixels, 4 bytes per pixel, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decode any supported image file (png, jpeg, gif first frame)
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| {
            engine_err!(SOURCE, DecodeFailed, "Failed to load image '{}': {}", path.display(), e)
        })?;

        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(engine_err!(
                SOURCE,
                DecodeFailed,
                "Invalid RGBA8 image {}x{} with {} bytes (expected {})",
                width,
                height,
                pixels.len(),
                expected
            ));
        }
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

// ===== UPLOAD =====

pub(crate) fn release_texture<D: GraphicsDevice + ?Sized>(device: &mut D, texture: NativeHandle) {
    device.delete_texture(texture);
    let _ = check_graphics(device, "delete_texture");
}

/// Create, configure and fill one texture.
///
/// The new handle is registered on `rollback` before anything else can
/// fail, so the caller's guard owns the cleanup.
pub(crate) fn upload_rgba<D: GraphicsDevice + ?Sized>(
    rollback: &mut Rollback<'_, D>,
    width: u32,
    height: u32,
    pixels: &[u8],
    mag_filter: TextureFilter,
) -> Result<NativeHandle> {
    let texture = rollback.device().create_texture();
    rollback.defer(texture, release_texture::<D>);

    let device = rollback.device();
    check_graphics(device, "create_texture")?;
    if texture.is_none() {
        return Err(null_handle(SOURCE, "create_texture"));
    }

    let parameters = [
        TextureParameter::WrapS(TextureWrap::ClampToEdge),
        TextureParameter::WrapT(TextureWrap::ClampToEdge),
        TextureParameter::MinFilter(TextureFilter::LinearMipmapNearest),
        TextureParameter::MagFilter(mag_filter),
    ];
    for parameter in parameters {
        device.texture_parameter(texture, parameter);
        check_graphics(device, "texture_parameter")?;
    }

    device.texture_storage(texture, 1, PixelFormat::Rgba8, width, height);
    check_graphics(device, "texture_storage")?;

    device.texture_sub_image(texture, width, height, pixels);
    check_graphics(device, "texture_sub_image")?;

    device.generate_mipmap(texture);
    check_graphics(device, "generate_mipmap")?;

    Ok(texture)
}

// ===== TEXTURE =====

/// Owner of one native texture
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Texture {
    handle: NativeHandle,
}

impl Texture {
    /// Decode `path` and upload it.
    ///
    /// A decode failure is reported before any native call is made.
    pub fn create<D: GraphicsDevice + ?Sized>(device: &mut D, path: impl AsRef<Path>) -> Result<Self> {
        let image = DecodedImage::open(path)?;
        Self::from_image(device, &image)
    }

    pub fn from_image<D: GraphicsDevice + ?Sized>(device: &mut D, image: &DecodedImage) -> Result<Self> {
        let mut rollback = Rollback::new(device);
        let handle = upload_rgba(
            &mut rollback,
            image.width,
            image.height,
            &image.pixels,
            TextureFilter::Nearest,
        )?;
        rollback.commit();

        crate::engine_debug!(SOURCE, "Texture {} uploaded ({}x{})", handle, image.width, image.height);
        Ok(Self { handle })
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    /// Bind to texture unit `unit`
    pub fn bind<D: GraphicsDevice + ?Sized>(&self, device: &mut D, unit: u32) -> Result<()> {
        device.active_texture(unit);
        check_graphics(device, "active_texture")?;
        device.bind_texture(self.handle);
        check_graphics(device, "bind_texture")
    }

    /// Clear the binding of texture unit `unit`
    pub fn unbind<D: GraphicsDevice + ?Sized>(device: &mut D, unit: u32) -> Result<()> {
        device.active_texture(unit);
        check_graphics(device, "active_texture")?;
        device.bind_texture(NativeHandle::NONE);
        check_graphics(device, "bind_texture")
    }

    /// Width of level 0, or 0 when there is no texture or the query fails
    pub fn width<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> i32 {
        self.level_size(device).0
    }

    /// Height of level 0, or 0 when there is no texture or the query fails
    pub fn height<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> i32 {
        self.level_size(device).1
    }

    fn level_size<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> (i32, i32) {
        if self.handle.is_none() {
            return (0, 0);
        }
        let size = device.texture_level_size(self.handle);
        match check_graphics(device, "texture_level_size") {
            Ok(()) => size,
            Err(_) => (0, 0),
        }
    }

    /// Release the native texture. Calling it again is a no-op.
    pub fn destroy<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }
        device.delete_texture(self.handle);
        check_graphics(device, "delete_texture")?;
        self.handle = NativeHandle::NONE;
        Ok(())
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
