use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::error::{EngineError, Result};

/// Consumer of one height buffer per rendered frame.
pub trait ColumnSink {
    fn render(&mut self, heights: &[u32]);
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // 0RGB, the layout softbuffer presents
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub ceiling: u32,
    pub wall: u32,
    pub floor: u32,
}

impl Palette {
    /// Builds a palette from `#RRGGBB` strings.
    pub fn from_hex(ceiling: &str, wall: &str, floor: &str) -> Option<Self> {
        Some(Self {
            ceiling: parse_hex(ceiling)?,
            wall: parse_hex(wall)?,
            floor: parse_hex(floor)?,
        })
    }
}

fn parse_hex(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let v = u32::from_str_radix(digits, 16).ok()?;
    let [_, r, g, b] = v.to_be_bytes();
    Some(pack_rgb(r, g, b))
}

/// Paints ceiling, wall and floor spans for every column into an owned
/// framebuffer. Each call repaints the whole surface.
pub struct ColumnCompositor {
    fb: Vec<u32>,
    width: usize,
    height: usize,
    half_height: usize,
    palette: Palette,
    // per column [top, bottom) of the wall span
    spans: Vec<(usize, usize)>,
}

impl ColumnCompositor {
    pub fn new(width: usize, height: usize, palette: Palette) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidConfig(
                "compositor width and height must be non-zero".into(),
            ));
        }
        Ok(Self {
            fb: vec![palette.ceiling; width * height],
            width,
            height,
            half_height: height / 2,
            palette,
            spans: vec![(0, 0); width],
        })
    }

    #[inline]
    pub fn framebuffer(&self) -> &[u32] {
        &self.fb
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.fb[y * self.width + x]
    }
}

impl ColumnSink for ColumnCompositor {
    fn render(&mut self, heights: &[u32]) {
        let half = self.half_height;
        // Odd heights put the extra row below the horizon, so a clamped
        // height still covers the whole column.
        let max_h = self.height - half;
        for (span, &h) in self.spans.iter_mut().zip(heights) {
            let h = (h as usize).min(max_h);
            *span = (half.saturating_sub(h), half + h);
        }
        // Columns the buffer does not cover get no wall.
        for span in self.spans.iter_mut().skip(heights.len()) {
            *span = (half, half);
        }

        let spans = &self.spans;
        let Palette {
            ceiling,
            wall,
            floor,
        } = self.palette;

        // Rows in parallel for cache friendly writes
        self.fb
            .par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (px, &(top, bottom)) in row.iter_mut().zip(spans) {
                    *px = if y < top {
                        ceiling
                    } else if y < bottom {
                        wall
                    } else {
                        floor
                    };
                }
            });
    }
}

/// Keeps the most recent buffer it was handed and counts frames.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    last: Vec<u32>,
    frames: usize,
}

impl FrameRecorder {
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames
    }

    pub fn last(&self) -> Option<&[u32]> {
        (self.frames > 0).then_some(self.last.as_slice())
    }
}

impl ColumnSink for FrameRecorder {
    fn render(&mut self, heights: &[u32]) {
        self.last.clear();
        self.last.extend_from_slice(heights);
        self.frames += 1;
    }
}
