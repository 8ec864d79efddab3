// Pose input and analysis output models

pub mod analysis;
pub mod difficulty;
pub mod exercise;
pub mod landmark;
pub mod motion;
pub mod session;
pub mod tempo;

pub use analysis::*;
pub use difficulty::*;
pub use exercise::*;
pub use landmark::*;
pub use motion::*;
pub use session::*;
pub use tempo::*;
