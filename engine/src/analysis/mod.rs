pub mod derivation;
pub mod municipal;

pub use derivation::{
    account_evolution, derive_percentage, derive_percentages, percent_of, reference_row, share_ranking,
    AccountShare, EvolutionPoint, ShareRanking,
};
