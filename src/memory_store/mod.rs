pub mod dash_map_store;
