use std::sync::Arc;

use crate::capture::Camera;
use crate::config::Config;
use crate::device::{ConnectionManager, DrawSettings};
use crate::geometry::{GeometryEngine, LyonGeometryEngine};
use crate::pipeline::{PipelineError, draw::DrawTarget};
use crate::remote::{HttpRemoteClient, RemoteClient, SynthesisParams};

/// Everything a pipeline run talks to. Each collaborator can be mocked in tests.
#[derive(Clone)]
pub struct PipelineDependencies {
    pub camera: Camera,
    pub remote: Arc<dyn RemoteClient>,
    pub geometry: Arc<dyn GeometryEngine>,
    pub connection: ConnectionManager,
    pub draw_settings: DrawSettings,
    pub target: DrawTarget,
    pub synthesis: SynthesisParams,
}

impl PipelineDependencies {
    /// Default adapters built from config around an existing connection.
    pub fn from_config(
        config: &Config,
        connection: ConnectionManager,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            camera: Camera::from_config(&config.capture)?,
            remote: Arc::new(HttpRemoteClient::new(&config.remote)?),
            geometry: Arc::new(LyonGeometryEngine::new(config.drawing.flatten_tolerance)),
            connection,
            draw_settings: DrawSettings::from_config(config),
            target: DrawTarget::from_config(&config.drawing),
            synthesis: SynthesisParams::from_config(&config.remote),
        })
    }
}
