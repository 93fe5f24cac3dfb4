pub mod arena_renderer;
pub mod status;

pub use arena_renderer::render_app;
