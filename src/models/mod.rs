// Records, request payloads and the pure helpers computed from them

pub mod coach;
pub mod event;
pub mod gym_class;
pub mod program;
pub mod settings;
pub mod sponsor;
pub mod sponsorship;
pub mod validation;
pub mod workout;

pub use coach::*;
pub use event::*;
pub use gym_class::*;
pub use program::*;
pub use settings::*;
pub use sponsor::*;
pub use sponsorship::*;
pub use validation::*;
pub use workout::*;
