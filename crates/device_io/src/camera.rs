//! Webcam capture through nokhwa.

use image::RgbImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};
use shared::domain::FrameSize;
use tracing::{debug, info, warn};

use crate::{DeviceError, DeviceResult, FrameSource};

const REQUESTED_FPS: u32 = 30;

pub struct NokhwaCamera {
    camera: Camera,
    released: bool,
}

impl NokhwaCamera {
    /// Opens camera `index` and starts streaming at the closest supported
    /// format to `size`.
    pub fn open(index: u32, size: FrameSize) -> DeviceResult<Self> {
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(size.width, size.height),
                FrameFormat::MJPEG,
                REQUESTED_FPS,
            ),
        ));
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|err| DeviceError::Camera(format!("failed to open camera {index}: {err}")))?;
        camera
            .open_stream()
            .map_err(|err| DeviceError::Camera(format!("failed to start stream: {err}")))?;

        let resolution = camera.resolution();
        info!(
            index,
            width = resolution.width(),
            height = resolution.height(),
            "camera stream opened"
        );

        Ok(Self {
            camera,
            released: false,
        })
    }
}

impl FrameSource for NokhwaCamera {
    fn read_frame(&mut self) -> DeviceResult<RgbImage> {
        if self.released {
            return Err(DeviceError::Camera("camera already released".to_string()));
        }
        let buffer = self
            .camera
            .frame()
            .map_err(|err| DeviceError::Camera(format!("frame read failed: {err}")))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|err| DeviceError::Camera(format!("frame decode failed: {err}")))?;
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            DeviceError::Camera(format!("decoded frame {width}x{height} has a short buffer"))
        })
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match self.camera.stop_stream() {
            Ok(()) => debug!("camera stream stopped"),
            Err(err) => warn!("failed to stop camera stream cleanly: {err}"),
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.release();
    }
}
