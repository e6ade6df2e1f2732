//! Animated textures: one native texture per decoded frame plus a
//! per-frame delay, advanced by `update`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use crate::device::{check_graphics, GraphicsDevice, NativeHandle, Rollback, TextureFilter};
use crate::error::Result;
use crate::resource::texture::upload_rgba;
use crate::{engine_bail, engine_err};

const SOURCE: &str = "lumen::AnimatedTexture";

/// Tolerance on elapsed milliseconds, absorbs f64 subtraction error
const DELAY_EPSILON_MS: f64 = 1e-6;

// ===== DECODED ANIMATION =====

/// All frames of an animation as one RGBA8 buffer.
///
/// Frame `i` starts at byte `width * height * 4 * i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAnimation {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    delays: Vec<u32>,
}

impl DecodedAnimation {
    /// Decode an animated GIF; every frame is composited to full size
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            engine_err!(SOURCE, DecodeFailed, "Failed to open animation '{}': {}", path.display(), e)
        })?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| {
            engine_err!(SOURCE, DecodeFailed, "Failed to read animation '{}': {}", path.display(), e)
        })?;
        let frames = decoder.into_frames().collect_frames().map_err(|e| {
            engine_err!(SOURCE, DecodeFailed, "Failed to decode frames of '{}': {}", path.display(), e)
        })?;

        let Some(first) = frames.first() else {
            engine_bail!(SOURCE, DecodeFailed, "Animation '{}' has no frames", path.display());
        };
        let (width, height) = first.buffer().dimensions();

        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4 * frames.len());
        let mut delays = Vec::with_capacity(frames.len());
        for frame in frames {
            let (numer, denom) = frame.delay().numer_denom_ms();
            delays.push(if denom == 0 { 0 } else { numer / denom });
            pixels.extend_from_slice(frame.buffer().as_raw());
        }

        Self::from_frames(width, height, pixels, delays)
    }

    /// Wrap already decoded frames; `pixels` must hold exactly one
    /// `width * height` RGBA8 image per delay
    pub fn from_frames(width: u32, height: u32, pixels: Vec<u8>, delays: Vec<u32>) -> Result<Self> {
        let frame_len = width as usize * height as usize * 4;
        if frame_len == 0 || delays.is_empty() || pixels.len() != frame_len * delays.len() {
            engine_bail!(
                SOURCE,
                DecodeFailed,
                "Invalid animation: {}x{}, {} frames, {} bytes",
                width,
                height,
                delays.len(),
                pixels.len()
            );
        }
        Ok(Self { width, height, pixels, delays })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }

    /// Delay of each frame in milliseconds
    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Pixels of frame `index`
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        let frame_len = self.width as usize * self.height as usize * 4;
        self.pixels.get(frame_len * index..frame_len * (index + 1))
    }
}

// ===== ANIMATED TEXTURE =====

#[derive(Debug, Default)]
pub struct AnimatedTexture {
    frames: Vec<NativeHandle>,
    delays: Vec<u32>,
    current_frame: usize,
    /// Time of the last frame switch, in seconds
    current_time: f64,
}

impl AnimatedTexture {
    pub fn create<D: GraphicsDevice + ?Sized>(device: &mut D, path: impl AsRef<Path>) -> Result<Self> {
        let animation = DecodedAnimation::open(path)?;
        Self::from_animation(device, &animation)
    }

    /// Upload every frame. If frame `k` fails, frames `0..=k` are released.
    pub fn from_animation<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        animation: &DecodedAnimation,
    ) -> Result<Self> {
        let mut rollback = Rollback::new(device);
        let mut frames = Vec::with_capacity(animation.frame_count());

        for index in 0..animation.frame_count() {
            let Some(pixels) = animation.frame(index) else {
                engine_bail!(SOURCE, DecodeFailed, "Frame {} is out of range", index);
            };
            let frame = upload_rgba(
                &mut rollback,
                animation.width,
                animation.height,
                pixels,
                TextureFilter::Linear,
            )?;
            frames.push(frame);
        }
        rollback.commit();

        crate::engine_debug!(
            SOURCE,
            "Animated texture uploaded ({} frames, {}x{})",
            frames.len(),
            animation.width,
            animation.height
        );

        Ok(Self {
            frames,
            delays: animation.delays.clone(),
            current_frame: 0,
            current_time: 0.0,
        })
    }

    /// Advance to the next frame (wrapping) once the current frame's delay
    /// has elapsed since the last switch. `time` is in seconds.
    pub fn update(&mut self, time: f64) {
        let Some(&delay) = self.delays.get(self.current_frame) else {
            return;
        };
        let elapsed_ms = (time - self.current_time) * 1000.0;
        if elapsed_ms + DELAY_EPSILON_MS >= delay as f64 {
            self.current_frame = (self.current_frame + 1) % self.frames.len();
            self.current_time = time;
        }
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Texture of the current frame, `NONE` when empty
    pub fn current_handle(&self) -> NativeHandle {
        self.frames.get(self.current_frame).copied().unwrap_or(NativeHandle::NONE)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[NativeHandle] {
        &self.frames
    }

    pub fn delays(&self) -> &[u32] {
        &self.delays
    }

    /// Bind the current frame to texture unit `unit`
    pub fn bind<D: GraphicsDevice + ?Sized>(&self, device: &mut D, unit: u32) -> Result<()> {
        device.active_texture(unit);
        check_graphics(device, "active_texture")?;
        device.bind_texture(self.current_handle());
        check_graphics(device, "bind_texture")
    }

    /// Release every frame. Frames whose release fails are kept so the
    /// call can be retried; the first failure is returned.
    pub fn destroy<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> Result<()> {
        let mut first_error = None;
        self.frames.retain(|&frame| {
            device.delete_texture(frame);
            match check_graphics(device, "delete_texture") {
                Ok(()) => false,
                Err(e) => {
                    first_error.get_or_insert(e);
                    true
                }
            }
        });

        if self.frames.is_empty() {
            self.delays.clear();
            self.current_frame = 0;
            self.current_time = 0.0;
        }

        match first_error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "animated_texture_tests.rs"]
mod tests;
