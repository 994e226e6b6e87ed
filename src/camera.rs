//! Webcam pose source: `OpenCV` capture plus an `ONNX` hand landmark model.
//!
//! The landmark model sees the whole frame (no palm crop) and reports 21
//! points in model input pixels, which are scaled back to capture pixels.
//! Capture and inference are blocking and run on tokio's blocking pool; the
//! device and the session sit behind one mutex so a single estimation is in
//! flight at a time.

use crate::config::{CameraConfig, ModelConfig};
use crate::constants::NUM_HAND_LANDMARKS;
use crate::landmarks::{Hand, Landmark};
use crate::pose_source::{FacingMode, PoseSource};
use crate::{Error, Result};
use log::{debug, info, warn};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Size, Vec3f, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH};
use ort::{Environment, GraphOptimizationLevel, LoggingLevel, Session, SessionBuilder, Value};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

/// Values per landmark in the model output (x, y, z)
const LANDMARK_STRIDE: usize = 3;

/// 21-point hand landmark model
struct HandLandmarker {
    session: Session,
    input_size: i32,
    presence_threshold: f32,
}

impl HandLandmarker {
    fn load(config: &ModelConfig) -> Result<Self> {
        info!(
            "Initializing hand landmark model: {}",
            config.hand_landmarks.display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("hand_landmarks")
                .with_log_level(LoggingLevel::Warning)
                .build()?,
        );

        let session = SessionBuilder::new(&environment)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_model_from_file(&config.hand_landmarks)?;

        if session.outputs.is_empty() {
            return Err(Error::ModelLoadFailure("Model has no outputs".to_string()));
        }

        let input_size = i32::try_from(config.input_size)
            .map_err(|_| Error::ModelLoadFailure(format!("Input size {} too large", config.input_size)))?;

        Ok(Self {
            session,
            input_size,
            presence_threshold: config.presence_threshold,
        })
    }

    /// Resize, convert BGR to RGB and scale to [0, 1], NHWC layout
    #[allow(clippy::cast_sign_loss)] // Input size is validated positive
    fn preprocess(&self, frame: &Mat) -> Result<Array4<f32>> {
        let size = self.input_size as usize;

        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            Size::new(self.input_size, self.input_size),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut rgb = Mat::default();
        imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let mut float_image = Mat::default();
        rgb.convert_to(&mut float_image, CV_32F, 1.0 / 255.0, 0.0)?;

        let mut data = Vec::with_capacity(size * size * 3);
        for row in 0..self.input_size {
            for col in 0..self.input_size {
                let pixel = float_image.at_2d::<Vec3f>(row, col)?;
                data.extend_from_slice(&[pixel[0], pixel[1], pixel[2]]);
            }
        }

        Array4::from_shape_vec((1, size, size, 3), data)
            .map_err(|e| Error::EstimationError(format!("Failed to build input tensor: {e}")))
    }

    fn detect(&self, frame: &Mat) -> Result<Vec<Hand>> {
        let input = self.preprocess(frame)?;
        let cow = CowArray::from(input.into_dyn());
        let tensor = Value::from_array(self.session.allocator(), &cow)?;
        let outputs = self.session.run(vec![tensor])?;

        if let Some(presence) = outputs.get(1) {
            let score = presence.try_extract::<f32>()?;
            let score = score.view().iter().next().copied().unwrap_or(0.0);
            if score < self.presence_threshold {
                return Ok(Vec::new());
            }
        }

        let raw = outputs
            .first()
            .ok_or_else(|| Error::EstimationError("No output from model".to_string()))?
            .try_extract::<f32>()?;
        let view = raw.view();
        let values: Vec<f32> = view.iter().copied().collect();
        if values.len() < NUM_HAND_LANDMARKS * LANDMARK_STRIDE {
            return Err(Error::EstimationError(format!(
                "Expected {} landmark values, got {}",
                NUM_HAND_LANDMARKS * LANDMARK_STRIDE,
                values.len()
            )));
        }

        let scale_x = f64::from(frame.cols()) / f64::from(self.input_size);
        let scale_y = f64::from(frame.rows()) / f64::from(self.input_size);
        let landmarks = values
            .chunks_exact(LANDMARK_STRIDE)
            .take(NUM_HAND_LANDMARKS)
            .map(|p| Landmark::with_depth(f64::from(p[0]) * scale_x, f64::from(p[1]) * scale_y, f64::from(p[2])))
            .collect();

        Ok(vec![Hand::from_landmarks(landmarks)?])
    }
}

#[derive(Default)]
struct Inner {
    capture: Option<VideoCapture>,
    model: Option<HandLandmarker>,
}

/// Live webcam source
pub struct CameraSource {
    camera: CameraConfig,
    model: ModelConfig,
    inner: Arc<Mutex<Inner>>,
    running: bool,
}

fn lock(inner: &Mutex<Inner>) -> Result<MutexGuard<'_, Inner>> {
    inner
        .lock()
        .map_err(|_| Error::EstimationError("Camera state poisoned by an earlier panic".to_string()))
}

impl CameraSource {
    #[must_use]
    pub fn new(camera: CameraConfig, model: ModelConfig) -> Self {
        Self {
            camera,
            model,
            inner: Arc::new(Mutex::new(Inner::default())),
            running: false,
        }
    }

    fn open(&self, facing: FacingMode) -> Result<VideoCapture> {
        info!("Opening camera {} ({:?} facing)", self.camera.index, facing);
        let mut cap = VideoCapture::new(self.camera.index, videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(Error::CameraUnavailable(format!(
                "Camera {} could not be opened",
                self.camera.index
            )));
        }
        cap.set(CAP_PROP_FRAME_WIDTH, f64::from(self.camera.width))?;
        cap.set(CAP_PROP_FRAME_HEIGHT, f64::from(self.camera.height))?;
        // Reduce buffer size for lower latency
        cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
        Ok(cap)
    }
}

impl PoseSource for CameraSource {
    async fn load(&mut self) -> Result<()> {
        let config = self.model.clone();
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let model = HandLandmarker::load(&config).map_err(|e| match e {
                Error::ModelLoadFailure(_) => e,
                other => Error::ModelLoadFailure(other.to_string()),
            })?;
            lock(&inner)?.model = Some(model);
            Ok(())
        })
        .await
        .map_err(|e| Error::ModelLoadFailure(format!("Model loading task failed: {e}")))?
    }

    fn start(&mut self, facing: FacingMode) -> Result<()> {
        let cap = self.open(facing).map_err(|e| match e {
            Error::CameraUnavailable(_) => e,
            other => Error::CameraUnavailable(other.to_string()),
        })?;
        lock(&self.inner)?.capture = Some(cap);
        self.running = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.running
    }

    async fn estimate(&mut self) -> Result<Vec<Hand>> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&inner)?;
            let Inner { capture, model } = &mut *guard;
            let (Some(capture), Some(model)) = (capture.as_mut(), model.as_ref()) else {
                return Err(Error::EstimationError("Camera or model not initialized".to_string()));
            };

            let mut frame = Mat::default();
            if !capture.read(&mut frame)? || frame.empty() {
                debug!("Camera returned no frame");
                return Ok(Vec::new());
            }
            model.detect(&frame)
        })
        .await
        .map_err(|e| Error::EstimationError(format!("Estimation task failed: {e}")))?
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        release_when_free(&self.inner, release_capture);
    }
}

fn release_capture(inner: &mut Inner) {
    if let Some(mut cap) = inner.capture.take() {
        if let Err(e) = cap.release() {
            warn!("Failed to release camera: {e}");
        }
    }
    info!("Camera released");
}

/// Run `release` on the shared state without blocking an async worker.
///
/// A cancelled estimation keeps running on the blocking pool and holds the
/// lock until its inference returns; in that case the release is queued
/// behind it on the blocking pool. Outside a runtime it waits for the lock.
fn release_when_free<T: Send + 'static>(shared: &Arc<Mutex<T>>, release: fn(&mut T)) {
    match shared.try_lock() {
        Ok(mut guard) => release(&mut guard),
        Err(TryLockError::Poisoned(poisoned)) => release(&mut poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => {
            let shared = Arc::clone(shared);
            let deferred = move || match shared.lock() {
                Ok(mut guard) => release(&mut guard),
                Err(poisoned) => release(&mut poisoned.into_inner()),
            };
            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    debug!("Estimation in flight, deferring release");
                    drop(runtime.spawn_blocking(deferred));
                }
                Err(_) => deferred(),
            }
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn mark(log: &mut Vec<&'static str>) {
        log.push("released");
    }

    #[test]
    fn test_release_when_free_runs_inline() {
        let shared = Arc::new(Mutex::new(Vec::new()));
        release_when_free(&shared, mark);
        assert_eq!(*shared.lock().unwrap(), vec!["released"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_release_waits_for_inference_off_the_worker() {
        let shared = Arc::new(Mutex::new(Vec::new()));
        let (locked_tx, locked_rx) = tokio::sync::oneshot::channel();
        let busy = Arc::clone(&shared);
        let inference = tokio::task::spawn_blocking(move || {
            let mut guard = busy.lock().unwrap();
            let _ = locked_tx.send(());
            std::thread::sleep(Duration::from_millis(200));
            guard.push("inference");
        });
        locked_rx.await.unwrap();

        let started = std::time::Instant::now();
        release_when_free(&shared, mark);
        assert!(started.elapsed() < Duration::from_millis(100), "release blocked the async worker");

        inference.await.unwrap();
        for _ in 0..50 {
            if shared.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(*shared.lock().unwrap(), vec!["inference", "released"]);
    }
}
