pub mod artifact;
pub mod dependency;
pub mod error;
pub mod manifest;
pub mod paths;
pub mod properties;
pub mod settings;
pub mod target;

pub use artifact::{Artifact, ArtifactKind};
pub use dependency::{GitLocation, GitRef, PodDependency, PodLocation};
pub use error::{PodError, PodResult};
pub use manifest::PodManifest;
pub use paths::absolutize;
pub use settings::BuildSettings;
pub use target::{Family, Sdk, Target};
