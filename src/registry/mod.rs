pub mod container;
pub mod descriptor;
pub mod detector;
pub mod module;
pub mod project;

// Re-export commonly used types
pub use container::{ContainerBinding, ContainerBuilder, TestUnit};
pub use descriptor::{DESCRIPTOR_EXT, DescriptorError, ProjectDescriptor};
pub use detector::TestDetector;
pub use module::ModuleRegistry;
pub use project::ProjectBinding;
