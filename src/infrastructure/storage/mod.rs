mod local_scratch_store;

pub use local_scratch_store::LocalScratchStore;
