// Application layer - Use case interactors

pub mod assemble_interactor;
pub mod combine_interactor;
pub mod container;
pub mod description;
pub mod episode_interactor;

// Re-export interactors
pub use assemble_interactor::{AssembleInteractor, AssembleOptions};
pub use combine_interactor::CombineInteractor;
pub use container::{AppContainer, DefaultAppContainer, Toolchain};
pub use episode_interactor::{EpisodeInteractor, EpisodeReport};

#[cfg(test)]
pub(crate) mod testing;
