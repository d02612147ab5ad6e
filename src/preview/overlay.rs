//! Preview annotation
//!
//! The annotated frame is a copy of the raw frame with a status border drawn
//! into it. The timestamp and status label travel with it as text, and the
//! preview surface draws them in fixed corners.

use crate::capture::Frame;
use chrono::{DateTime, Local};
use image::Rgb;

/// Timestamp shown in the bottom-right corner
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Border thickness in pixels
const BORDER_WIDTH: u32 = 4;

/// Whether the current frame is being recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Recording,
    Standby,
}

impl Status {
    pub fn from_writing(is_writing: bool) -> Self {
        if is_writing {
            Status::Recording
        } else {
            Status::Standby
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Recording => "Recording",
            Status::Standby => "Standby",
        }
    }

    pub fn color(self) -> Rgb<u8> {
        match self {
            Status::Recording => Rgb([255, 0, 0]),
            Status::Standby => Rgb([0, 255, 0]),
        }
    }
}

/// A frame ready for display
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub image: Frame,
    pub status: Status,
    pub timestamp: String,
}

/// Copy `frame` and mark it with the recording status
pub fn annotate(frame: &Frame, is_writing: bool, now: DateTime<Local>) -> AnnotatedFrame {
    let status = Status::from_writing(is_writing);
    let mut image = frame.clone();
    draw_border(&mut image, status.color(), BORDER_WIDTH);

    AnnotatedFrame {
        image,
        status,
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
    }
}

fn draw_border(image: &mut Frame, color: Rgb<u8>, width: u32) {
    let (w, h) = image.dimensions();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if x < width || y < width || x + width >= w || y + width >= h {
            *pixel = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap()
    }

    #[test]
    fn test_recording_frame() {
        let frame = Frame::from_pixel(32, 24, Rgb([10, 20, 30]));

        let annotated = annotate(&frame, true, sample_time());

        assert_eq!(annotated.status, Status::Recording);
        assert_eq!(annotated.status.label(), "Recording");
        assert_eq!(annotated.timestamp, "07/03/2024 14:05:09");
        assert_eq!(*annotated.image.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*annotated.image.get_pixel(31, 23), Rgb([255, 0, 0]));
        assert_eq!(*annotated.image.get_pixel(16, 12), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_standby_frame() {
        let frame = Frame::from_pixel(16, 16, Rgb([0, 0, 0]));
        let annotated = annotate(&frame, false, sample_time());

        assert_eq!(annotated.status.label(), "Standby");
        assert_eq!(*annotated.image.get_pixel(3, 8), Rgb([0, 255, 0]));
        assert_eq!(*annotated.image.get_pixel(4, 8), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_raw_frame_is_untouched() {
        let frame = Frame::from_pixel(8, 8, Rgb([7, 7, 7]));
        let _ = annotate(&frame, true, sample_time());
        assert!(frame.pixels().all(|p| *p == Rgb([7, 7, 7])));
    }
}
