use crate::config::DrawingConfig;
use crate::device::{ConnectionManager, DrawSequencer};
use crate::geometry::{GeometryEngine, PolylineSet};
use crate::pipeline::PipelineError;

/// Area the artwork is fitted into before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTarget {
    pub width: f64,
    pub height: f64,
    pub preserve_aspect: bool,
}

impl Default for DrawTarget {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 100.0,
            preserve_aspect: true,
        }
    }
}

impl DrawTarget {
    pub fn from_config(config: &DrawingConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            preserve_aspect: config.preserve_aspect,
        }
    }
}

/// SVG to polylines fitted to `target`.
pub fn prepare_polylines(
    geometry: &dyn GeometryEngine,
    target: DrawTarget,
    svg: &str,
) -> Result<PolylineSet, PipelineError> {
    let polylines = geometry.svg_to_polylines(svg)?;
    let scaled = geometry.scale_to_dimension(
        &polylines,
        target.width,
        target.height,
        target.preserve_aspect,
    );
    log::debug!(
        "Prepared {} polylines ({} points) for a {}x{} area",
        scaled.len(),
        scaled.point_count(),
        target.width,
        target.height
    );
    Ok(scaled)
}

/// Convert and draw one SVG document.
pub async fn draw_svg(
    geometry: &dyn GeometryEngine,
    target: DrawTarget,
    sequencer: &DrawSequencer,
    connection: &ConnectionManager,
    svg: &str,
) -> Result<(), PipelineError> {
    let polylines = prepare_polylines(geometry, target, svg)?;
    sequencer.draw(&polylines, connection).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::device::{DrawCommand, DrawSettings};
    use crate::geometry::{LyonGeometryEngine, Point};

    #[test]
    fn default_config_fits_into_100_and_flips_against_125() {
        let config = Config::default();
        let target = DrawTarget::from_config(&config.drawing);
        let sequencer = DrawSequencer::new(DrawSettings::from_config(&config));
        let svg = r#"<svg><path d="M 0 0 L 50 200"/></svg>"#;

        let polylines = prepare_polylines(&LyonGeometryEngine::default(), target, svg).unwrap();
        let moves: Vec<Point> = sequencer
            .commands(&polylines)
            .into_iter()
            .filter_map(|command| match command {
                DrawCommand::MoveTo(point) => Some(point),
                _ => None,
            })
            .collect();

        // home, then source y=0 at the top of the page and y=200 at the bottom margin
        assert_eq!(
            moves,
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 125.0),
                Point::new(25.0, 25.0),
            ]
        );
    }
}
