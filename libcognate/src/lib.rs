//! Online-EM estimation of PMI sound-correspondence scores between phonetic
//! symbols, and progressive multiple alignment of cognate sets along a guide
//! tree.
pub mod align;
pub mod cluster;
pub mod distance;
pub mod multi_align;
pub mod scoring;
pub mod structs;
pub mod tree;
pub mod util;
