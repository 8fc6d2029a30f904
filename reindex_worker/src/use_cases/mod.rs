pub mod reindex_collection;
