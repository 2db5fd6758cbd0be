pub mod build_bdd;

pub use build_bdd::BuildBddUseCase;
