//! Audio combination: joins chunk files into one narration per document.

pub mod assembler;

pub use assembler::{
    AudioCombiner, CombinerKind, collect_chunk_files, combine_folder, select_combiner,
};
