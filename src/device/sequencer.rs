use std::time::Duration;

use crate::config::Config;
use crate::device::{
    manager::ConnectionManager,
    transport::DeviceHandle,
    types::{DeviceError, DrawCommand, DrawError, PenState},
};
use crate::geometry::{Point, PolylineSet};

/// Physical parameters of a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSettings {
    /// Height of the drawable area; device Y is `draw_height - source_y`.
    pub draw_height: f64,
    /// Flip the vertical axis (source Y grows downward, device Y upward).
    pub flip_y: bool,
    pub pen_up_level: u16,
    pub pen_down_level: u16,
    /// Pause after lowering the pen at the start of a stroke.
    pub settle_delay: Duration,
    /// Pause after lifting the pen at the end of a stroke.
    pub stroke_delay: Duration,
    /// Issue a best-effort pen lift when a draw fails part-way.
    pub lift_pen_on_failure: bool,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            draw_height: 125.0,
            flip_y: true,
            pen_up_level: 1000,
            pen_down_level: 1700,
            settle_delay: Duration::from_millis(100),
            stroke_delay: Duration::from_millis(150),
            lift_pen_on_failure: true,
        }
    }
}

impl DrawSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            draw_height: config.drawing.draw_height,
            flip_y: config.drawing.flip_y,
            pen_up_level: config.device.pen_up_pulse,
            pen_down_level: config.device.pen_down_pulse,
            settle_delay: Duration::from_millis(config.drawing.settle_delay_ms),
            stroke_delay: Duration::from_millis(config.drawing.stroke_delay_ms),
            lift_pen_on_failure: config.drawing.lift_pen_on_failure,
        }
    }

    fn pulse(&self, pen: PenState) -> u16 {
        match pen {
            PenState::Up => self.pen_up_level,
            PenState::Down => self.pen_down_level,
        }
    }

    fn device_point(&self, point: Point) -> Point {
        if self.flip_y {
            Point::new(point.x, self.draw_height - point.y)
        } else {
            point
        }
    }
}

/// Turns a polyline set into the timed pen-up/move/pen-down stream and drives
/// it through the connection. Holds no state between draws.
#[derive(Debug, Clone, Default)]
pub struct DrawSequencer {
    settings: DrawSettings,
}

impl DrawSequencer {
    pub fn new(settings: DrawSettings) -> Self {
        Self { settings }
    }

    /// The full command stream for `polylines`, in device coordinates.
    pub fn commands(&self, polylines: &PolylineSet) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(2 + polylines.point_count() + polylines.len() * 4);
        commands.push(DrawCommand::SetPen(PenState::Up));
        commands.push(DrawCommand::MoveTo(Point::ORIGIN));

        for line in polylines {
            for (index, point) in line.points().iter().enumerate() {
                commands.push(DrawCommand::MoveTo(self.settings.device_point(*point)));
                if index == 0 {
                    commands.push(DrawCommand::SetPen(PenState::Down));
                    commands.push(DrawCommand::Hold(self.settings.settle_delay));
                }
            }
            commands.push(DrawCommand::SetPen(PenState::Up));
            commands.push(DrawCommand::Hold(self.settings.stroke_delay));
        }

        commands
    }

    /// Draw `polylines`, holding the connection lock for the whole draw.
    ///
    /// Fails with [`DrawError::NotConnected`] before issuing any command when
    /// no link is open.
    pub async fn draw(
        &self,
        polylines: &PolylineSet,
        connection: &ConnectionManager,
    ) -> Result<(), DrawError> {
        let mut guard = connection.lock().await;
        let handle = guard.handle_mut().ok_or(DrawError::NotConnected)?;

        let commands = self.commands(polylines);
        log::info!(
            "Drawing {} polylines ({} device commands)",
            polylines.len(),
            commands.len()
        );

        for command in &commands {
            if let Err(err) = self.execute(handle, command).await {
                log::error!("Draw aborted at {:?}: {}", command, err);
                if self.settings.lift_pen_on_failure
                    && let Err(lift_err) = handle.set_pen(self.settings.pen_up_level).await
                {
                    log::warn!("Could not lift pen after failed draw: {}", lift_err);
                }
                return Err(DrawError::DeviceCommandFailed(err));
            }
        }

        log::info!("Draw complete");
        Ok(())
    }

    async fn execute(
        &self,
        handle: &mut Box<dyn DeviceHandle>,
        command: &DrawCommand,
    ) -> Result<(), DeviceError> {
        match *command {
            DrawCommand::SetPen(pen) => {
                log::debug!("pen {:?}", pen);
                handle.set_pen(self.settings.pulse(pen)).await
            }
            DrawCommand::MoveTo(point) => {
                log::debug!("move to ({:.2}, {:.2})", point.x, point.y);
                handle.move_to(point.x, point.y).await
            }
            DrawCommand::Hold(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}
