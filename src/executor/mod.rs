pub mod cache_eviction;
