mod artwork;

pub use artwork::*;
