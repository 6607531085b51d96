pub mod whiteboard;

pub use whiteboard::InMemoryWhiteboardStore;
