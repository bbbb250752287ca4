//! Position publishing to an external renderer.
//!
//! The stepper calls [`PositionSink::set_position`] once per particle at the
//! end of every tick. The position is 3D for renderers that draw in 3D space;
//! `z` is always 0.

/// Receives final particle positions after each tick.
pub trait PositionSink {
    /// Move the visual representation of `particle_id` to `position`.
    fn set_position(&mut self, particle_id: usize, position: [f32; 3]);
}

impl<S: PositionSink + ?Sized> PositionSink for &mut S {
    fn set_position(&mut self, particle_id: usize, position: [f32; 3]) {
        (**self).set_position(particle_id, position);
    }
}

impl<S: PositionSink + ?Sized> PositionSink for Box<S> {
    fn set_position(&mut self, particle_id: usize, position: [f32; 3]) {
        (**self).set_position(particle_id, position);
    }
}

/// Discards every position. For headless runs that read particle state
/// directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PositionSink for NullSink {
    fn set_position(&mut self, _particle_id: usize, _position: [f32; 3]) {}
}

/// Keeps the most recently published position of every particle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBuffer {
    positions: Vec<[f32; 3]>,
    writes: u64,
}

impl FrameBuffer {
    /// Create an empty frame buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest positions, indexed by particle id.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Total number of `set_position` calls received.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl PositionSink for FrameBuffer {
    fn set_position(&mut self, particle_id: usize, position: [f32; 3]) {
        if particle_id >= self.positions.len() {
            self.positions.resize(particle_id + 1, [0.0; 3]);
        }
        self.positions[particle_id] = position;
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_grows_and_overwrites() {
        let mut frame = FrameBuffer::new();
        frame.set_position(2, [1.0, 2.0, 0.0]);
        assert_eq!(frame.positions().len(), 3);
        frame.set_position(2, [3.0, 4.0, 0.0]);
        assert_eq!(frame.positions()[2], [3.0, 4.0, 0.0]);
        assert_eq!(frame.writes(), 2);
    }

    #[test]
    fn borrowed_sink_forwards() {
        fn publish<S: PositionSink>(mut sink: S) {
            sink.set_position(0, [0.5, 0.5, 0.0]);
        }

        let mut frame = FrameBuffer::new();
        publish(&mut frame);
        let boxed: Box<dyn PositionSink> = Box::new(NullSink);
        publish(boxed);
        assert_eq!(frame.positions(), &[[0.5, 0.5, 0.0]]);
    }
}
