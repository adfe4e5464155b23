// Accounts, submitted forms and the patient record fed to the model

pub mod forms;
pub mod patient;
pub mod user;
pub mod validation;

pub use forms::*;
pub use patient::*;
pub use user::*;
pub use validation::*;
