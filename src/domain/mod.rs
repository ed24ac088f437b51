pub mod new_registrant;
pub mod rules;

pub use new_registrant::{NewRegistrant, RegistrantEmail, RegistrantName, RegistrantPhone};
