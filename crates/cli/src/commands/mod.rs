pub mod mev;
pub mod run;
pub mod validate;
