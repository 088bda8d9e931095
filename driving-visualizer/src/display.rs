//! Where rendered frames go once the viewer has drawn them.

use anyhow::{Context, Result};
use image::RgbaImage;
use log::{debug, info};
use minimp4::Mp4Muxer;
use openh264::encoder::{BitRate, Encoder, EncoderConfig, FrameRate};
use openh264::formats::YUVBuffer;
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sink for finished frames.
pub trait Display {
    /// Presents the frame drawn for `time`.
    fn show(&mut self, frame: &RgbaImage, time: u32) -> Result<()>;

    /// Ends the display. Closing twice is a no-op. Whether a later `show` reopens
    /// it depends on the backend.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;

    /// Whether the animation loop should wait out the frame interval in real time.
    fn paced(&self) -> bool {
        false
    }
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn show(&mut self, frame: &RgbaImage, time: u32) -> Result<()> {
        (**self).show(frame, time)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn paced(&self) -> bool {
        (**self).paced()
    }
}

/// Writes frames as PNG images to a single path.
///
/// A still display keeps whatever was shown last. A live display is meant to be
/// watched by an image viewer that reloads the file, so the animation is paced.
/// Showing a frame after close reopens the display.
pub struct PngDisplay {
    path: PathBuf,
    live: bool,
    closed: bool,
    frames_written: usize,
}

impl PngDisplay {
    pub fn still<P: AsRef<Path>>(path: P) -> Self {
        PngDisplay { path: path.as_ref().to_path_buf(), live: false, closed: false, frames_written: 0 }
    }

    pub fn live<P: AsRef<Path>>(path: P) -> Self {
        PngDisplay { path: path.as_ref().to_path_buf(), live: true, closed: false, frames_written: 0 }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl Display for PngDisplay {
    fn show(&mut self, frame: &RgbaImage, time: u32) -> Result<()> {
        if self.closed {
            debug!("Reopening {}", self.path.display());
            self.closed = false;
        }
        frame
            .save(&self.path)
            .with_context(|| format!("Failed to write frame {} to {}", time, self.path.display()))?;
        self.frames_written += 1;
        debug!("Frame {} written to {}", time, self.path.display());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            info!("Closed {} after {} frame(s)", self.path.display(), self.frames_written);
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn paced(&self) -> bool {
        self.live
    }
}

/// Keeps every shown frame in memory. Showing a frame after close reopens it.
#[derive(Default)]
pub struct MemoryDisplay {
    frames: Vec<(u32, RgbaImage)>,
    closed: bool,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[(u32, RgbaImage)] {
        &self.frames
    }

    /// Timesteps shown, in order.
    pub fn times(&self) -> Vec<u32> {
        self.frames.iter().map(|(t, _)| *t).collect()
    }
}

impl Display for MemoryDisplay {
    fn show(&mut self, frame: &RgbaImage, time: u32) -> Result<()> {
        self.closed = false;
        self.frames.push((time, frame.clone()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Encodes frames to H.264 and writes an MP4 when closed. A written video is final:
/// showing a frame after close is an error.
pub struct VideoDisplay {
    path: PathBuf,
    width: u32,
    height: u32,
    encoder: Encoder,
    h264_data: Vec<u8>,
    frame_count: usize,
    closed: bool,
}

impl VideoDisplay {
    /// `interval` is the duration of one frame; the video plays at its inverse.
    pub fn new<P: AsRef<Path>>(path: P, width: u32, height: u32, interval: Duration) -> Result<Self> {
        if width % 2 != 0 || height % 2 != 0 {
            anyhow::bail!("video frames must have even dimensions, got {}x{}", width, height);
        }
        let fps = frames_per_second(interval);
        info!("Setting up video encoder: {}x{} px at {:.2} fps", width, height, fps);

        let encoder = Encoder::with_api_config(
            openh264::OpenH264API::from_source(),
            EncoderConfig::new()
                .max_frame_rate(FrameRate::from_hz(fps))
                .bitrate(BitRate::from_bps(5_000_000)), // 5 Mbps
        )
        .context("Failed to initialize H.264 encoder")?;

        Ok(VideoDisplay {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            encoder,
            h264_data: Vec::new(),
            frame_count: 0,
            closed: false,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn write_mp4(&mut self) -> Result<()> {
        let mut video_buffer = Cursor::new(Vec::new());
        let mut mp4muxer = Mp4Muxer::new(&mut video_buffer);
        let description = format!("Driving simulation - {} frames", self.frame_count);
        mp4muxer.init_video(self.width as i32, self.height as i32, false, &description);
        mp4muxer.write_video(&self.h264_data);
        mp4muxer.close();

        video_buffer.seek(SeekFrom::Start(0))?;
        let mut video_bytes = Vec::new();
        video_buffer.read_to_end(&mut video_bytes)?;

        fs::write(&self.path, &video_bytes)
            .with_context(|| format!("Failed to write video file to {}", self.path.display()))?;
        Ok(())
    }
}

impl Display for VideoDisplay {
    fn show(&mut self, frame: &RgbaImage, time: u32) -> Result<()> {
        if self.closed {
            anyhow::bail!("video {} is already written", self.path.display());
        }
        if frame.dimensions() != (self.width, self.height) {
            anyhow::bail!(
                "frame {} is {}x{}, video expects {}x{}",
                time,
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
        }
        let yuv = rgb_to_yuv420(frame);
        let yuv_source = YUVBuffer::from_vec(yuv, self.width as usize, self.height as usize);
        let bitstream = self
            .encoder
            .encode(&yuv_source)
            .with_context(|| format!("Failed to encode frame {}", time))?;
        bitstream.write_vec(&mut self.h264_data);
        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        info!("Creating MP4 file...");
        self.write_mp4()?;
        self.closed = true;
        info!("Video with {} frame(s) saved to {}", self.frame_count, self.path.display());
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Frame rate matching a per-frame interval; a zero interval plays at 1000 fps.
pub fn frames_per_second(interval: Duration) -> f32 {
    let millis = interval.as_millis().max(1) as f32;
    1000.0 / millis
}

/// RGB to YUV 4:2:0 conversion (BT.601) for video encoding.
pub fn rgb_to_yuv420(image: &RgbaImage) -> Vec<u8> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    // Y plane is full size, U and V are quarter size
    let y_plane_size = width * height;
    let mut yuv = vec![0u8; y_plane_size + y_plane_size / 2];

    for y in 0..height {
        for x in 0..width {
            let pixel = image.get_pixel(x as u32, y as u32);
            let r = pixel[0] as f32;
            let g = pixel[1] as f32;
            let b = pixel[2] as f32;
            yuv[y * width + x] = (0.299 * r + 0.587 * g + 0.114 * b).round() as u8;
        }
    }

    let u_plane_offset = y_plane_size;
    let v_plane_offset = y_plane_size + y_plane_size / 4;
    let uv_width = width / 2;

    // Average U and V over each 2x2 block
    for y in (0..height).step_by(2) {
        for x in (0..width).step_by(2) {
            let mut sum_u = 0f32;
            let mut sum_v = 0f32;
            let mut count = 0;

            for dy in 0..2 {
                for dx in 0..2 {
                    if y + dy < height && x + dx < width {
                        let pixel = image.get_pixel((x + dx) as u32, (y + dy) as u32);
                        let r = pixel[0] as f32;
                        let g = pixel[1] as f32;
                        let b = pixel[2] as f32;
                        sum_u += -0.169 * r - 0.331 * g + 0.5 * b + 128.0;
                        sum_v += 0.5 * r - 0.419 * g - 0.081 * b + 128.0;
                        count += 1;
                    }
                }
            }

            let idx = (y / 2) * uv_width + x / 2;
            yuv[u_plane_offset + idx] = (sum_u / count as f32).round() as u8;
            yuv[v_plane_offset + idx] = (sum_v / count as f32).round() as u8;
        }
    }

    yuv
}
