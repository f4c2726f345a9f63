/// Scene objects and the BHV used to frustum-cull them
pub mod bhv;
pub mod instance;

pub use bhv::{BhvConfig, BhvNode, BhvTree};
pub use instance::{MeshId, ObjectState, SceneInstance};
