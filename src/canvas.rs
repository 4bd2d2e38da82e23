// Surface over a CanvasRenderingContext2d, drawing paths directly

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::color::Color;
use crate::config::FillStyle;
use crate::error::Error;
use crate::surface::Surface;

pub struct CanvasSurface {
    context: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, context: CanvasRenderingContext2d) -> Self {
        CanvasSurface { context, canvas }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) -> Result<(), Error> {
        self.context.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
        Ok(())
    }

    #[allow(deprecated)]
    fn fill_circle(
        &mut self,
        center: [f64; 2],
        radius: f64,
        color: Color,
        alpha: f64,
        style: FillStyle,
    ) -> Result<(), Error> {
        if !(radius > 0.0) || alpha <= 0.0 {
            return Ok(());
        }
        let [x, y] = center;
        match style {
            FillStyle::Solid => {
                self.context
                    .set_fill_style(&JsValue::from_str(&color.to_css(alpha)));
            }
            FillStyle::Glow => {
                let gradient = self
                    .context
                    .create_radial_gradient(x, y, 0.0, x, y, radius)?;
                gradient.add_color_stop(0.0, &color.to_css(alpha))?;
                gradient.add_color_stop(1.0, "transparent")?;
                self.context.set_fill_style(&gradient);
            }
        }
        self.context.begin_path();
        self.context.arc(x, y, radius, 0.0, PI * 2.0)?;
        self.context.fill();
        Ok(())
    }

    #[allow(deprecated)]
    fn stroke_line(
        &mut self,
        from: [f64; 2],
        to: [f64; 2],
        color: Color,
        alpha: f64,
        width: f64,
    ) -> Result<(), Error> {
        if alpha <= 0.0 {
            return Ok(());
        }
        self.context
            .set_stroke_style(&JsValue::from_str(&color.to_css(alpha)));
        self.context.set_line_width(width);
        self.context.begin_path();
        self.context.move_to(from[0], from[1]);
        self.context.line_to(to[0], to[1]);
        self.context.stroke();
        Ok(())
    }
}
