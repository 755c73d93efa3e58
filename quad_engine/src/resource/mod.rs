/// Resource module - device-backed objects owned by the application

pub mod buffer;
pub mod layout;
pub mod vertex_array;
pub mod shader;
pub mod texture;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use layout::{VertexBufferElement, VertexBufferLayout};
pub use vertex_array::VertexArray;
pub use shader::{ShaderProgram, ShaderSource};
pub use texture::Texture;
