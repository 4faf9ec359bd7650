mod deploy;
mod doctor;

pub use deploy::deploy;
pub use doctor::doctor;
