pub mod check;
pub mod infer;
pub mod lattice;
