use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::camera::backend::CameraBackend;
use crate::camera::compress;
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CaptureConstraints, Frame, StillImage};

/// Thread-safe ring buffer for camera frames.
///
/// Holds the last few frames and overwrites the oldest when full. Frames are
/// wrapped in `Arc` so a snapshot never copies the pixel buffer while the
/// capture thread is writing.
pub struct FrameBuffer {
    slots: Mutex<Ring>,
    /// Monotonic counter incremented on each push.
    sequence: AtomicU64,
}

struct Ring {
    frames: Vec<Option<Arc<Frame>>>,
    write_idx: usize,
}

impl FrameBuffer {
    /// Create a new ring buffer with the given capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Mutex::new(Ring {
                frames: (0..capacity).map(|_| None).collect(),
                write_idx: 0,
            }),
            sequence: AtomicU64::new(0),
        }
    }

    /// Push a new frame into the buffer, overwriting the oldest if full.
    pub fn push(&self, frame: Frame) {
        let mut ring = self.slots.lock();
        let idx = ring.write_idx;
        ring.frames[idx] = Some(Arc::new(frame));
        ring.write_idx = (idx + 1) % ring.frames.len();
        self.sequence.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of frames pushed so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Get the most recently pushed frame, if any.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        let ring = self.slots.lock();
        let len = ring.frames.len();
        let latest_idx = (ring.write_idx + len - 1) % len;
        ring.frames[latest_idx].clone()
    }
}

/// Startup deadlines for a capture session.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    /// Maximum time for the backend to open the device.
    pub startup: Duration,
    /// Time to wait for the first frame once the device is open.
    pub first_frame: Duration,
    /// Poll interval while waiting for the first frame.
    pub poll_interval: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            startup: Duration::from_secs(30),
            first_frame: Duration::from_secs(5),
            poll_interval: Duration::from_millis(20),
        }
    }
}

/// How stills are encoded for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillOptions {
    pub jpeg_quality: u8,
    /// Frames wider than this are downscaled first; 0 disables scaling.
    pub max_width: u32,
}

impl Default for StillOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            max_width: 1280,
        }
    }
}

/// An acquired camera: owns the device through its capture thread.
///
/// Dropping the session releases the device.
pub struct CaptureSession {
    device_name: String,
    constraints: CaptureConstraints,
    still: StillOptions,
    buffer: Arc<FrameBuffer>,
    /// True while the capture loop is delivering frames.
    running: Arc<AtomicBool>,
    /// Signals the capture loop to stop.
    shutdown: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<CameraError>>>,
    thread: Option<JoinHandle<()>>,
}

impl CaptureSession {
    /// Open a device through `backend` and wait for its first frame.
    ///
    /// The backend's `open` runs on a dedicated capture thread that then
    /// pushes frames into the session's ring buffer until the session is
    /// released.
    pub fn start(
        backend: Arc<dyn CameraBackend>,
        constraints: CaptureConstraints,
        still: StillOptions,
        timeouts: SessionTimeouts,
    ) -> Result<Self> {
        let buffer = Arc::new(FrameBuffer::new(3));
        let running = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(AtomicBool::new(false));
        let last_error = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<String>>();

        let thread = {
            let backend = Arc::clone(&backend);
            let constraints = constraints.clone();
            let buffer = Arc::clone(&buffer);
            let running = Arc::clone(&running);
            let shutdown = Arc::clone(&shutdown);
            let last_error = Arc::clone(&last_error);

            std::thread::Builder::new()
                .name(format!("capture-{}", backend.name()))
                .spawn(move || {
                    let mut source = match backend.open(&constraints) {
                        Ok(source) => source,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    // Acquisition may have been abandoned while `open` blocked.
                    if shutdown.load(Ordering::Acquire)
                        || ready_tx.send(Ok(source.device_name())).is_err()
                    {
                        source.close();
                        info!("closed '{}' opened after startup timeout", source.device_name());
                        return;
                    }
                    running.store(true, Ordering::Release);

                    while !shutdown.load(Ordering::Acquire) {
                        match source.read_frame() {
                            Ok(frame) if frame.is_well_formed() => buffer.push(frame),
                            Ok(frame) => {
                                warn!(
                                    "dropping malformed {}x{} frame ({} bytes)",
                                    frame.width,
                                    frame.height,
                                    frame.data.len()
                                );
                            }
                            Err(e) => {
                                warn!("capture loop stopping: {e}");
                                *last_error.lock() = Some(e);
                                break;
                            }
                        }
                    }

                    source.close();
                    running.store(false, Ordering::Release);
                })
                .map_err(|e| CameraError::Unsupported(format!("cannot spawn capture thread: {e}")))?
        };

        let device_name = match ready_rx.recv_timeout(timeouts.startup) {
            Ok(Ok(name)) => name,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The thread may still be blocked inside `open`. It closes the
                // device as soon as `open` returns and exits.
                shutdown.store(true, Ordering::Release);
                return Err(CameraError::StartupTimeout(timeouts.startup));
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                let _ = thread.join();
                return Err(CameraError::FrameRead("capture thread exited".to_string()));
            }
        };

        let mut session = Self {
            device_name,
            constraints,
            still,
            buffer,
            running,
            shutdown,
            last_error,
            thread: Some(thread),
        };

        if let Err(e) = session.wait_for_first_frame(timeouts) {
            session.release_all();
            return Err(e);
        }

        info!(
            "camera '{}' acquired at {}x{}",
            session.device_name, session.constraints.width, session.constraints.height
        );
        Ok(session)
    }

    fn wait_for_first_frame(&self, timeouts: SessionTimeouts) -> Result<()> {
        let deadline = Instant::now() + timeouts.first_frame;
        loop {
            if self.buffer.sequence() > 0 {
                return Ok(());
            }
            if !self.running.load(Ordering::Acquire) {
                return Err(self
                    .last_error
                    .lock()
                    .clone()
                    .unwrap_or(CameraError::NoFrames(timeouts.first_frame)));
            }
            if Instant::now() >= deadline {
                warn!(
                    "no frames received within {:?} from '{}'",
                    timeouts.first_frame, self.device_name
                );
                return Err(CameraError::NoFrames(timeouts.first_frame));
            }
            std::thread::sleep(timeouts.poll_interval);
        }
    }

    /// Friendly name of the acquired device.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Whether the device is still delivering frames.
    pub fn is_active(&self) -> bool {
        self.thread.is_some() && self.running.load(Ordering::Acquire)
    }

    /// The newest frame, shared with the ring buffer.
    pub fn latest_frame(&self) -> Result<Arc<Frame>> {
        if self.thread.is_none() {
            return Err(CameraError::Released);
        }
        if !self.running.load(Ordering::Acquire) {
            return Err(self
                .last_error
                .lock()
                .clone()
                .unwrap_or_else(|| CameraError::FrameRead("camera stopped".to_string())));
        }
        self.buffer
            .latest()
            .ok_or_else(|| CameraError::FrameRead("no frame available".to_string()))
    }

    /// Encoding settings for stills from this session.
    pub fn still_options(&self) -> StillOptions {
        self.still
    }

    /// Sample the current frame into a JPEG still.
    ///
    /// Safe to call repeatedly: each call encodes whatever frame is newest
    /// and leaves the live stream untouched.
    pub fn capture_still_frame(&self) -> Result<StillImage> {
        let frame = self.latest_frame()?;
        compress::encode_still(&frame, self.still.jpeg_quality, self.still.max_width)
    }

    /// Stop every owned device track. Idempotent.
    pub fn release_all(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
            info!("camera '{}' released", self.device_name);
        }
        self.running.store(false, Ordering::Release);
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release_all();
    }
}
