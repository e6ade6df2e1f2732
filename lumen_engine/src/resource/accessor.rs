//! Typed, strided reads out of glTF buffer views.
//!
//! Element `k` of an accessor starts `offset + k * stride` bytes into its
//! buffer view. The stride defaults to the packed element size when the
//! view does not declare one; interleaved views declare a larger one.

use std::mem;
use bytemuck::Pod;
use gltf::accessor::DataType;
use crate::error::Result;
use crate::engine_bail;

const SOURCE: &str = "lumen::Accessor";

/// Encoding of one accessor component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Size in bytes
    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::U32 | ComponentType::F32 => 4,
        }
    }
}

impl From<DataType> for ComponentType {
    fn from(data_type: DataType) -> Self {
        match data_type {
            DataType::I8 => ComponentType::I8,
            DataType::U8 => ComponentType::U8,
            DataType::I16 => ComponentType::I16,
            DataType::U16 => ComponentType::U16,
            DataType::U32 => ComponentType::U32,
            DataType::F32 => ComponentType::F32,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AccessorView<'a> {
    bytes: &'a [u8],
    offset: usize,
    stride: usize,
    count: usize,
    component_type: ComponentType,
    components: usize,
}

impl<'a> AccessorView<'a> {
    /// `bytes` is the whole buffer view; `stride` of `None` means packed
    pub fn new(
        bytes: &'a [u8],
        offset: usize,
        stride: Option<usize>,
        count: usize,
        component_type: ComponentType,
        components: usize,
    ) -> Self {
        Self {
            bytes,
            offset,
            stride: stride.unwrap_or(component_type.size() * components),
            count,
            component_type,
            components,
        }
    }

    /// View over the loaded buffers, `None` for accessors without a buffer
    /// view (sparse-only).
    ///
    /// A view that does not fit inside its buffer is a decode failure.
    pub fn from_accessor(accessor: &gltf::Accessor<'_>, buffers: &'a [gltf::buffer::Data]) -> Result<Option<Self>> {
        let Some(view) = accessor.view() else {
            return Ok(None);
        };

        let bytes = view
            .offset()
            .checked_add(view.length())
            .and_then(|end| buffers.get(view.buffer().index())?.get(view.offset()..end));
        let Some(bytes) = bytes else {
            engine_bail!(
                SOURCE,
                DecodeFailed,
                "Buffer view {} ({} bytes at {}) lies outside buffer {}",
                view.index(),
                view.length(),
                view.offset(),
                view.buffer().index()
            );
        };

        Ok(Some(Self::new(
            bytes,
            accessor.offset(),
            view.stride(),
            accessor.count(),
            accessor.data_type().into(),
            accessor.dimensions().multiplicity(),
        )))
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Components per element (3 for a VEC3)
    pub fn components(&self) -> usize {
        self.components
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Copy every element into a flat `count * components` array.
    ///
    /// `T` must have the size of the component type.
    pub fn read<T: Pod>(&self) -> Result<Vec<T>> {
        let size = self.component_type.size();
        if mem::size_of::<T>() != size {
            engine_bail!(
                SOURCE,
                Unsupported,
                "Cannot read {:?} components as {}-byte values",
                self.component_type,
                mem::size_of::<T>()
            );
        }
        if self.count == 0 {
            return Ok(Vec::new());
        }

        let element_size = self.components * size;
        if self.stride < element_size {
            engine_bail!(
                SOURCE,
                DecodeFailed,
                "Stride {} is shorter than the {}-byte element",
                self.stride,
                element_size
            );
        }

        // Counts and offsets come from the file and may be arbitrarily large
        let end = (self.count - 1)
            .checked_mul(self.stride)
            .and_then(|span| span.checked_add(self.offset))
            .and_then(|span| span.checked_add(element_size));
        match end {
            Some(end) if end <= self.bytes.len() => {}
            _ => engine_bail!(
                SOURCE,
                DecodeFailed,
                "Accessor of {} elements (stride {}, offset {}) overruns its {}-byte view",
                self.count,
                self.stride,
                self.offset,
                self.bytes.len()
            ),
        }

        let mut values = Vec::with_capacity(self.count * self.components);
        for element in 0..self.count {
            let start = self.offset + element * self.stride;
            for component in 0..self.components {
                let at = start + component * size;
                values.push(bytemuck::pod_read_unaligned::<T>(&self.bytes[at..at + size]));
            }
        }
        Ok(values)
    }
}

/// Map an unsigned 16-bit color channel to float.
///
/// The mapping is `256 / (v / 256)` with 0 kept at 0. It is not the usual
/// `v / 65535`: full intensity gives slightly above 1 and small values
/// grow large.
pub fn normalize_color_channel(value: u16) -> f32 {
    if value == 0 {
        0.0
    } else {
        256.0 / (value as f32 / 256.0)
    }
}

#[cfg(test)]
#[path = "accessor_tests.rs"]
mod tests;
