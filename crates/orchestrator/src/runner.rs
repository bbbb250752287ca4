//! Simulation runner with lifecycle management
//!
//! This module provides the `SimulationRunner` which steps a simulation in a
//! background thread, including start, pause, resume, stop, and status
//! tracking. The latest particle frame is shared with the controlling thread
//! every `frame_interval` ticks.

use fluidsim_kernel::{ParticleArrays, SimulationKernel, StepMetrics};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::OrchestratorError;

/// Runner state enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunnerState {
    /// Simulation created but not yet started
    Created,
    /// Simulation actively running
    Running,
    /// Simulation paused
    Paused,
    /// Simulation finished (stop condition reached or stopped by the caller)
    Finished,
    /// A particle position became non-finite
    Error,
}

/// When a run ends on its own. Both `None` means run until stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunLimits {
    /// Stop after this many timesteps
    pub max_timesteps: Option<u64>,
    /// Stop after this much simulated time (seconds)
    pub max_time: Option<f64>,
}

impl RunLimits {
    fn reached(&self, tick: u64, sim_time: f64) -> bool {
        self.max_timesteps.is_some_and(|max| tick >= max)
            || self.max_time.is_some_and(|max| sim_time >= max)
    }
}

/// Point-in-time copy of the runner's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerStatus {
    /// Lifecycle state
    pub state: RunnerState,
    /// Completed timesteps
    pub tick: u64,
    /// Simulated time (seconds)
    pub sim_time: f64,
    /// Diagnostics from the last published frame
    pub metrics: Option<StepMetrics>,
    /// Why the run failed, if state is `Error`
    pub error_message: Option<String>,
}

/// Shared state between the runner thread and control interface
struct SharedState {
    state: RunnerState,
    tick: u64,
    sim_time: f64,
    metrics: Option<StepMetrics>,
    frame: Vec<[f32; 3]>,
    error_message: Option<String>,
}

/// Lock the shared state, recovering it if a previous holder panicked.
fn lock(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for controlling and querying a running simulation
pub struct SimulationRunner {
    /// Shared state (protected by mutex)
    shared: Arc<Mutex<SharedState>>,
    /// Handle to the background thread
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl SimulationRunner {
    /// Create a runner for `kernel`. The thread waits in `Created` until
    /// [`start`](Self::start) is called.
    ///
    /// `frame_interval` is clamped to at least 1.
    pub fn new(
        mut kernel: Box<dyn SimulationKernel + Send>,
        limits: RunLimits,
        frame_interval: u64,
    ) -> Self {
        let shared = Arc::new(Mutex::new(SharedState {
            state: RunnerState::Created,
            tick: kernel.tick(),
            sim_time: kernel.elapsed(),
            metrics: Some(kernel.metrics()),
            frame: snapshot(kernel.particles()),
            error_message: None,
        }));

        let shared_clone = Arc::clone(&shared);
        let frame_interval = frame_interval.max(1);

        let thread_handle = thread::spawn(move || {
            run_simulation_loop(kernel.as_mut(), &shared_clone, limits, frame_interval);
        });

        Self {
            shared,
            thread_handle: Some(thread_handle),
        }
    }

    /// Get current runner state
    pub fn state(&self) -> RunnerState {
        lock(&self.shared).state
    }

    /// Get current simulation time (seconds)
    pub fn sim_time(&self) -> f64 {
        lock(&self.shared).sim_time
    }

    /// Get current timestep count
    pub fn timestep_count(&self) -> u64 {
        lock(&self.shared).tick
    }

    /// Get error message if state is Error
    pub fn error_message(&self) -> Option<String> {
        lock(&self.shared).error_message.clone()
    }

    /// Most recently published positions, `[x, y, 0]` per particle.
    pub fn latest_frame(&self) -> Vec<[f32; 3]> {
        lock(&self.shared).frame.clone()
    }

    /// Snapshot of state, progress and diagnostics.
    pub fn status(&self) -> RunnerStatus {
        let guard = lock(&self.shared);
        RunnerStatus {
            state: guard.state,
            tick: guard.tick,
            sim_time: guard.sim_time,
            metrics: guard.metrics,
            error_message: guard.error_message.clone(),
        }
    }

    /// Start the simulation (transition from Created to Running)
    pub fn start(&self) {
        self.transition(RunnerState::Created, RunnerState::Running);
    }

    /// Pause the simulation
    pub fn pause(&self) {
        self.transition(RunnerState::Running, RunnerState::Paused);
    }

    /// Resume the simulation
    pub fn resume(&self) {
        self.transition(RunnerState::Paused, RunnerState::Running);
    }

    /// Stop the simulation. The step in flight, if any, completes first.
    pub fn stop(&self) {
        let mut guard = lock(&self.shared);
        if matches!(
            guard.state,
            RunnerState::Created | RunnerState::Running | RunnerState::Paused
        ) {
            tracing::info!("Simulation stopped at tick {}", guard.tick);
            guard.state = RunnerState::Finished;
        }
    }

    fn transition(&self, from: RunnerState, to: RunnerState) {
        let mut guard = lock(&self.shared);
        if guard.state == from {
            tracing::debug!("Runner {:?} -> {:?}", from, to);
            guard.state = to;
        }
    }

    /// Block until the simulation thread exits and return the final status.
    ///
    /// The runner stays queryable afterwards, so the final frame can still be
    /// read with [`latest_frame`](Self::latest_frame).
    pub fn wait(&mut self) -> Result<RunnerStatus, OrchestratorError> {
        if let Some(handle) = self.thread_handle.take() {
            handle.join().map_err(|_| OrchestratorError::ThreadPanicked)?;
        }
        Ok(self.status())
    }

    /// Wait for the simulation thread to complete and return its final status
    pub fn join(mut self) -> Result<RunnerStatus, OrchestratorError> {
        self.wait()
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        // Signal the thread to exit
        let mut guard = lock(&self.shared);
        if matches!(
            guard.state,
            RunnerState::Created | RunnerState::Running | RunnerState::Paused
        ) {
            guard.state = RunnerState::Finished;
        }
    }
}

/// Render positions of every particle.
fn snapshot(particles: &ParticleArrays) -> Vec<[f32; 3]> {
    (0..particles.len())
        .map(|i| particles.render_position(i))
        .collect()
}

/// First particle whose position is NaN or infinite.
fn first_non_finite(particles: &ParticleArrays) -> Option<usize> {
    (0..particles.len()).find(|&i| !(particles.x[i].is_finite() && particles.y[i].is_finite()))
}

fn publish(kernel: &dyn SimulationKernel, shared: &Mutex<SharedState>) {
    let frame = snapshot(kernel.particles());
    let metrics = kernel.metrics();
    let mut guard = lock(shared);
    guard.frame = frame;
    guard.metrics = Some(metrics);
}

/// Main simulation loop executed in background thread
fn run_simulation_loop(
    kernel: &mut dyn SimulationKernel,
    shared: &Mutex<SharedState>,
    limits: RunLimits,
    frame_interval: u64,
) {
    // Wait for start signal
    loop {
        match lock(shared).state {
            RunnerState::Created => thread::sleep(Duration::from_millis(5)),
            RunnerState::Running => break,
            _ => return,
        }
    }

    tracing::info!(
        "Simulation started: {} particles, limits {:?}",
        kernel.particle_count(),
        limits
    );
    let start_wall_time = Instant::now();

    loop {
        let current_state = lock(shared).state;

        match current_state {
            RunnerState::Running => {
                kernel.step();
                let tick = kernel.tick();
                let sim_time = kernel.elapsed();

                if let Some(i) = first_non_finite(kernel.particles()) {
                    let message = format!("particle {i} has a non-finite position at tick {tick}");
                    tracing::error!("Simulation failed: {}", message);
                    publish(kernel, shared);
                    let mut guard = lock(shared);
                    guard.tick = tick;
                    guard.sim_time = sim_time;
                    guard.state = RunnerState::Error;
                    guard.error_message = Some(message);
                    break;
                }

                let finished = limits.reached(tick, sim_time);
                if finished || tick % frame_interval == 0 {
                    publish(kernel, shared);
                }

                {
                    let mut guard = lock(shared);
                    guard.tick = tick;
                    guard.sim_time = sim_time;
                    if finished && guard.state == RunnerState::Running {
                        guard.state = RunnerState::Finished;
                    }
                }

                if finished {
                    tracing::info!(
                        "Simulation finished: {} timesteps, {:.4}s simulated",
                        tick,
                        sim_time
                    );
                    break;
                }

                // Log progress periodically
                if tick % 100 == 0 {
                    tracing::debug!(
                        "Step {}: sim_time={:.4}s, wall_time={:.2}s",
                        tick,
                        sim_time,
                        start_wall_time.elapsed().as_secs_f64(),
                    );
                }
            }
            RunnerState::Paused => thread::sleep(Duration::from_millis(5)),
            RunnerState::Finished | RunnerState::Error | RunnerState::Created => break,
        }
    }

    // Make the final state visible even when stopped between frames
    publish(kernel, shared);

    tracing::info!(
        "Simulation thread exiting after {:.2}s wall time",
        start_wall_time.elapsed().as_secs_f64()
    );
}
