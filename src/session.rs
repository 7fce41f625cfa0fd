/// Generation-tracked render passes over a committed surface.
pub mod render_session;
