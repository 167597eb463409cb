use std::sync::Arc;

use crate::adapters::{
    AtomicParsleyAdapter, FFmpegAdapter, FFprobeAdapter, Mp4BoxAdapter, ProcessRunner, Settings,
    ToolPaths,
};
use crate::app::{
    assemble_interactor::AssembleInteractor, combine_interactor::CombineInteractor,
    episode_interactor::EpisodeInteractor,
};
use crate::ports::{ExecutePort, MuxPort, ProbePort, TagPort, ToolRunner};

/// The four external collaborators every interactor draws from
#[derive(Clone)]
pub struct Toolchain {
    pub probe: Arc<dyn ProbePort>,
    pub execute: Arc<dyn ExecutePort>,
    pub mux: Arc<dyn MuxPort>,
    pub tag: Arc<dyn TagPort>,
}

impl Toolchain {
    pub fn new(
        probe: Arc<dyn ProbePort>,
        execute: Arc<dyn ExecutePort>,
        mux: Arc<dyn MuxPort>,
        tag: Arc<dyn TagPort>,
    ) -> Self {
        Self {
            probe,
            execute,
            mux,
            tag,
        }
    }

    /// Adapters for the configured programs, all launched as child processes
    pub fn from_paths(paths: &ToolPaths) -> Self {
        let runner: Arc<dyn ToolRunner> = Arc::new(ProcessRunner::new());
        Self {
            probe: Arc::new(FFprobeAdapter::new(
                Arc::clone(&runner),
                paths.ffprobe.clone(),
                paths.mp4box.clone(),
            )),
            execute: Arc::new(FFmpegAdapter::new(Arc::clone(&runner), paths.ffmpeg.clone())),
            mux: Arc::new(Mp4BoxAdapter::new(Arc::clone(&runner), paths.mp4box.clone())),
            tag: Arc::new(AtomicParsleyAdapter::new(runner, paths.atomicparsley.clone())),
        }
    }
}

pub trait AppContainer: Send + Sync {
    fn assemble_interactor(&self) -> Arc<AssembleInteractor>;
    fn combine_interactor(&self) -> Arc<CombineInteractor>;
    fn episode_interactor(&self) -> Arc<EpisodeInteractor>;
}

pub struct DefaultAppContainer {
    assemble_interactor: Arc<AssembleInteractor>,
    combine_interactor: Arc<CombineInteractor>,
    episode_interactor: Arc<EpisodeInteractor>,
}

impl DefaultAppContainer {
    pub fn new(settings: &Settings) -> Self {
        Self::with_toolchain(Toolchain::from_paths(&settings.tools), settings)
    }

    /// Wire the interactors to an explicit toolchain
    pub fn with_toolchain(tools: Toolchain, settings: &Settings) -> Self {
        Self {
            assemble_interactor: Arc::new(AssembleInteractor::new(tools.clone(), settings.keyframes)),
            combine_interactor: Arc::new(CombineInteractor::new(tools.clone(), settings.keyframes)),
            episode_interactor: Arc::new(EpisodeInteractor::new(tools)),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn assemble_interactor(&self) -> Arc<AssembleInteractor> {
        Arc::clone(&self.assemble_interactor)
    }

    fn combine_interactor(&self) -> Arc<CombineInteractor> {
        Arc::clone(&self.combine_interactor)
    }

    fn episode_interactor(&self) -> Arc<EpisodeInteractor> {
        Arc::clone(&self.episode_interactor)
    }
}
