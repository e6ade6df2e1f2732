//! Scope guard for multi-step native acquisitions.
//!
//! Each acquired handle is registered together with the function that
//! releases it. If the guard is dropped before `commit`, every pending
//! release runs in reverse acquisition order. `commit` keeps everything.
//!
//! ```ignore
//! let mut rollback = Rollback::new(device);
//! let vao = rollback.device().create_vertex_array();
//! rollback.defer(vao, release_vertex_array);
//! step_that_may_fail(rollback.device())?;   // vao released on early return
//! rollback.commit();
//! ```

use crate::device::NativeHandle;

pub struct Rollback<'d, D: ?Sized> {
    device: &'d mut D,
    pending: Vec<(NativeHandle, fn(&mut D, NativeHandle))>,
}

impl<'d, D: ?Sized> Rollback<'d, D> {
    pub fn new(device: &'d mut D) -> Self {
        Self {
            device,
            pending: Vec::new(),
        }
    }

    /// Device the guarded acquisitions are made on
    pub fn device(&mut self) -> &mut D {
        self.device
    }

    /// Register `handle` for release. `NONE` is ignored.
    pub fn defer(&mut self, handle: NativeHandle, release: fn(&mut D, NativeHandle)) {
        if handle.is_some() {
            self.pending.push((handle, release));
        }
    }

    /// Number of releases that would run on drop
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Keep every acquisition
    pub fn commit(mut self) {
        self.pending.clear();
    }
}

impl<D: ?Sized> Drop for Rollback<'_, D> {
    fn drop(&mut self) {
        while let Some((handle, release)) = self.pending.pop() {
            release(self.device, handle);
        }
    }
}

#[cfg(test)]
#[path = "rollback_tests.rs"]
mod tests;
