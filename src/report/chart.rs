//! Chart rendering
//!
//! Consumes the assembled [`ChartSpec`] and produces an in-memory PNG:
//! one stacked panel per report item, probability as a percentage, the last
//! observation highlighted with a marker line and value label. Panels
//! without data show their placeholder text instead of a series.
//!
//! Text needs a TTF font; one is picked up from the usual system locations
//! at first use. Without one the chart still renders, just unlabeled.

use crate::error::{BotError, Result};
use crate::report::assembler::{ChartPanel, ChartSpec};
use chrono::{DateTime, Duration, Utc};
use image::{ImageFormat, RgbImage};
use once_cell::sync::Lazy;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io::Cursor;
use tracing::debug;

const PANEL_WIDTH: u32 = 1000;
const PANEL_HEIGHT: u32 = 260;
const TITLE_STRIP: u32 = 40;

/// Series color, the same blue the web UI uses
const LINE_COLOR: RGBColor = RGBColor(0x00, 0x7b, 0xff);
const PLACEHOLDER_COLOR: RGBColor = RGBColor(0x78, 0x78, 0x78);

static FONT_AVAILABLE: Lazy<bool> = Lazy::new(register_system_font);

/// Register the first usable system font under the "sans-serif" family.
/// Returns false when none is found; callers then skip text elements.
fn register_system_font() -> bool {
    const CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ];

    for path in CANDIDATES {
        if let Ok(bytes) = std::fs::read(path) {
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font(
                "sans-serif",
                plotters::style::FontStyle::Normal,
                bytes,
            )
            .is_ok()
            {
                debug!("Chart font registered from {}", path);
                return true;
            }
        }
    }

    debug!("No system font found, charts render without text");
    false
}

/// Render the chart spec to PNG bytes
pub fn render_png(spec: &ChartSpec) -> Result<Vec<u8>> {
    let rows = spec.panels.len().max(1) as u32;
    let width = PANEL_WIDTH;
    let height = rows * PANEL_HEIGHT + TITLE_STRIP;

    let mut buf = vec![0u8; (width * height * 3) as usize];
    draw_spec(spec, &mut buf, (width, height)).map_err(|e| BotError::Render(e.to_string()))?;

    let img = RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| BotError::Render("pixel buffer size mismatch".to_string()))?;
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| BotError::Render(e.to_string()))?;
    Ok(png)
}

fn draw_spec(
    spec: &ChartSpec,
    buf: &mut [u8],
    size: (u32, u32),
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buf, size).into_drawing_area();
    root.fill(&WHITE)?;

    if spec.panels.is_empty() {
        return Ok(());
    }

    let (title_area, body) = root.split_vertically(TITLE_STRIP as i32);
    if *FONT_AVAILABLE {
        title_area.draw(&Text::new(
            spec.title.clone(),
            (12, 10),
            ("sans-serif", 22).into_font(),
        ))?;
    }

    let areas = body.split_evenly((spec.panels.len(), 1));
    for (area, panel) in areas.iter().zip(&spec.panels) {
        match panel.placeholder {
            Some(msg) => draw_placeholder(area, msg)?,
            None => draw_series(area, panel)?,
        }
    }

    root.present()?;
    Ok(())
}

fn draw_placeholder(
    area: &DrawingArea<BitMapBackend, Shift>,
    msg: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (w, h) = area.dim_in_pixel();
    area.draw(&Rectangle::new(
        [(8, 8), (w as i32 - 8, h as i32 - 8)],
        &PLACEHOLDER_COLOR,
    ))?;
    if *FONT_AVAILABLE {
        area.draw(&Text::new(
            msg.to_string(),
            (w as i32 / 2 - 60, h as i32 / 2),
            ("sans-serif", 20).into_font().color(&PLACEHOLDER_COLOR),
        ))?;
    }
    Ok(())
}

fn draw_series(
    area: &DrawingArea<BitMapBackend, Shift>,
    panel: &ChartPanel,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let (t0, t1) = time_range(&panel.series);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(12)
        .x_label_area_size(26)
        .y_label_area_size(48);
    if *FONT_AVAILABLE {
        builder.caption(&panel.title, ("sans-serif", 16).into_font());
    }
    let mut chart = builder.build_cartesian_2d(t0..t1, 0f64..100f64)?;

    let hhmm = |t: &DateTime<Utc>| t.format("%H:%M").to_string();
    if *FONT_AVAILABLE {
        chart
            .configure_mesh()
            .x_label_formatter(&hhmm)
            .y_desc("Prob (%)")
            .draw()?;
    } else {
        chart.configure_mesh().x_labels(0).y_labels(0).draw()?;
    }

    chart.draw_series(LineSeries::new(
        panel.series.iter().copied(),
        LINE_COLOR.stroke_width(2),
    ))?;

    if let Some(&(last_t, last_p)) = panel.series.last() {
        // marker line and dot at the current value
        chart.draw_series(LineSeries::new(
            [(t0, last_p), (t1, last_p)],
            RED.stroke_width(1),
        ))?;
        chart.draw_series(std::iter::once(Circle::new((last_t, last_p), 3, RED.filled())))?;

        if *FONT_AVAILABLE {
            chart.draw_series(std::iter::once(Text::new(
                format!("{:.1}%", last_p),
                (last_t, (last_p + 3.0).min(96.0)),
                ("sans-serif", 14).into_font().color(&RED),
            )))?;
        }
    }

    Ok(())
}

/// Inclusive time range of the series, widened when degenerate so the
/// axis never collapses to a single instant
fn time_range(series: &[(DateTime<Utc>, f64)]) -> (DateTime<Utc>, DateTime<Utc>) {
    let first = series.first().map(|(t, _)| *t).unwrap_or_else(Utc::now);
    let last = series.last().map(|(t, _)| *t).unwrap_or_else(Utc::now);
    if first == last {
        (first - Duration::minutes(30), last + Duration::minutes(30))
    } else {
        (first, last)
    }
}
