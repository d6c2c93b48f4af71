//! Sprite sheet geometry and the canvas frame renderer.

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Grid layout of a sprite sheet: fixed-size cells addressed by (column, row).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSheet {
    pub frame_width: u32,
    pub frame_height: u32,
    pub scale: u32,
}

impl SpriteSheet {
    pub fn new(frame_width: u32, frame_height: u32, scale: u32) -> Self {
        Self { frame_width, frame_height, scale }
    }

    /// Cell (col, row) inside the source image.
    pub fn source_rect(&self, col: u32, row: u32) -> Rect {
        Rect {
            x: f64::from(col) * f64::from(self.frame_width),
            y: f64::from(row) * f64::from(self.frame_height),
            w: f64::from(self.frame_width),
            h: f64::from(self.frame_height),
        }
    }

    /// Scaled destination rectangle with its top-left corner at (x, y).
    pub fn dest_rect(&self, x: f64, y: f64) -> Rect {
        Rect {
            x,
            y,
            w: f64::from(self.frame_width) * f64::from(self.scale),
            h: f64::from(self.frame_height) * f64::from(self.scale),
        }
    }
}

/// Draws single sprite cells onto a canvas. The image must have finished
/// loading before `draw_frame` is called; the idle loop only starts from the
/// image's `load` event.
pub struct FrameRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    image: HtmlImageElement,
    sheet: SpriteSheet,
}

impl FrameRenderer {
    pub fn new(
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        image: HtmlImageElement,
        sheet: SpriteSheet,
    ) -> Self {
        Self { canvas, ctx, image, sheet }
    }

    pub fn clear(&self) {
        self.ctx.clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    pub fn draw_frame(&self, col: u32, row: u32, x: f64, y: f64) {
        let src = self.sheet.source_rect(col, row);
        let dst = self.sheet.dest_rect(x, y);
        if let Err(err) = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.image,
                src.x,
                src.y,
                src.w,
                src.h,
                dst.x,
                dst.y,
                dst.w,
                dst.h,
            )
        {
            log::warn!("drawImage failed for frame ({col},{row}): {err:?}");
        }
    }
}
